pub mod extract;
pub mod health;
pub mod report;

pub use extract::extract_handler;
pub use health::health_handler;
pub use report::{copy_handler, download_handler, manual_handler, save_handler, view_handler};

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::middleware::{auth_middleware, AuthLayer};
use crate::AppState;

pub fn router(state: AppState) -> Router {
    let auth_layer = Arc::new(AuthLayer::new(state.config.api_key.clone()));

    Router::new()
        .route("/health", get(health_handler))
        .route("/extract", post(extract_handler))
        .route("/report", get(view_handler))
        .route("/report/copy", post(copy_handler))
        .route("/report/download", get(download_handler))
        .route("/report/save", post(save_handler))
        .route("/report/manual", get(manual_handler))
        .with_state(state)
        .layer(axum_middleware::from_fn(auth_middleware))
        .layer(Extension(auth_layer))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
