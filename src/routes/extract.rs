use axum::{extract::State, Json};
use tracing::info;

use crate::error::AppError;
use crate::models::{ExtractRequest, ExtractResponse};
use crate::services::ExtractionRequest;
use crate::AppState;

#[axum::debug_handler]
pub async fn extract_handler(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, AppError> {
    info!("Processing extract request for URL: {}", request.url);

    let outcome = state
        .extraction
        .extract(&ExtractionRequest {
            url: request.url.clone(),
            wait_for_selector: request.options.wait_for_selector.clone(),
            copy_to_clipboard: request.options.copy_to_clipboard,
        })
        .await?;

    Ok(Json(ExtractResponse {
        url: outcome.record.page.url.clone(),
        stats: outcome.stats,
        clipboard: outcome.clipboard,
        report: outcome.report,
        record: outcome.record,
        processing_time_ms: outcome.elapsed.as_millis() as u64,
    }))
}
