use axum::{extract::State, Json};
use crate::models::{BrowserPoolStatus, HealthResponse};
use crate::AppState;

pub async fn health_handler(
    State(state): State<AppState>,
) -> Json<HealthResponse> {
    let browser_pool = match state.browser_pool {
        Some(ref pool) => Some(BrowserPoolStatus {
            available: pool.available_slots(),
            total: pool.total_slots(),
            healthy: pool.is_healthy().await,
            recreation_count: pool.recreation_count(),
        }),
        None => None,
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        inspector: state.extraction.inspector_name().to_string(),
        browser_pool,
    })
}
