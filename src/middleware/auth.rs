use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

use crate::error::AppError;

#[derive(Clone)]
pub struct AuthLayer {
    api_key: Option<String>,
}

impl AuthLayer {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }

    fn check(&self, authorization: Option<&str>) -> Result<(), AppError> {
        let Some(ref expected) = self.api_key else {
            return Ok(());
        };

        let provided = authorization.ok_or(AppError::Unauthorized)?;
        let provided = provided.strip_prefix("Bearer ").unwrap_or(provided);

        if provided == expected {
            Ok(())
        } else {
            Err(AppError::InvalidApiKey)
        }
    }
}

pub async fn auth_middleware(
    auth: axum::extract::Extension<Arc<AuthLayer>>,
    request: Request,
    next: Next,
) -> Response {
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match auth.check(authorization) {
        Ok(()) => next.run(request).await,
        Err(e) => {
            warn!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
            e.into_response()
        }
    }
}
