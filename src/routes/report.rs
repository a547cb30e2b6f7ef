use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::{CopyResponse, SaveResponse, ViewerState};
use crate::services::export::{download_filename, MARKDOWN_CONTENT_TYPE};
use crate::AppState;

pub async fn view_handler(State(state): State<AppState>) -> Result<Json<ViewerState>, AppError> {
    Ok(Json(state.viewer.load().await?))
}

pub async fn copy_handler(State(state): State<AppState>) -> Result<Json<CopyResponse>, AppError> {
    state.viewer.copy().await?;
    info!("Report copied to clipboard");
    Ok(Json(CopyResponse { copied: true }))
}

pub async fn download_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    let report = state.viewer.report_text().await?;
    let filename = download_filename(Utc::now());

    Ok((
        [
            (header::CONTENT_TYPE, MARKDOWN_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        report,
    )
        .into_response())
}

pub async fn save_handler(State(state): State<AppState>) -> Result<Json<SaveResponse>, AppError> {
    let report = state.viewer.report_text().await?;

    let path = state
        .exporter
        .save(&report, Utc::now())
        .await
        .inspect_err(|e| warn!("Saving report failed, manual fallback offered: {}", e))?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    info!("Report saved to {}", path.display());
    Ok(Json(SaveResponse {
        path: path.display().to_string(),
        filename,
    }))
}

pub async fn manual_handler(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let report = state.viewer.report_text().await?;
    Ok(Html(state.exporter.manual_save_page(&report)))
}
