use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Why a target page was refused before inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restriction {
    InternalPage,
    ExtensionPage,
    Marketplace,
    LocalFile,
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Restriction::InternalPage => "internal browser pages cannot be inspected",
            Restriction::ExtensionPage => "extension pages cannot be inspected",
            Restriction::Marketplace => "extension marketplace pages cannot be inspected",
            Restriction::LocalFile => {
                "local files cannot be inspected unless file access is enabled (ALLOW_FILE_URLS=true)"
            }
        };
        f.write_str(reason)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Restricted page: {0}")]
    RestrictedPage(Restriction),

    #[error("An extraction is already in progress")]
    ExtractionInProgress,

    #[error("Inspection failed: {0}")]
    InspectionFailed(String),

    #[error("Inspection timed out after {0} seconds")]
    InspectionTimeout(u64),

    #[error("Browser error: {0}")]
    BrowserError(String),

    #[error("Clipboard write failed: {0}")]
    ClipboardWriteFailed(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Storage read failed: {0}")]
    StorageReadFailed(String),

    #[error("Storage write failed: {0}")]
    StorageWriteFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("No report has been extracted yet")]
    NoReportToExport,

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Stable machine-readable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "unauthorized",
            AppError::InvalidApiKey => "invalid_api_key",
            AppError::InvalidUrl(_) => "invalid_url",
            AppError::RestrictedPage(_) => "restricted_page",
            AppError::ExtractionInProgress => "extraction_in_progress",
            AppError::InspectionFailed(_) => "inspection_failed",
            AppError::InspectionTimeout(_) => "inspection_timeout",
            AppError::BrowserError(_) => "browser_error",
            AppError::ClipboardWriteFailed(_) => "clipboard_write_failed",
            AppError::StorageUnavailable(_) => "storage_unavailable",
            AppError::StorageReadFailed(_) => "storage_read_failed",
            AppError::StorageWriteFailed(_) => "storage_write_failed",
            AppError::DownloadFailed(_) => "download_failed",
            AppError::NoReportToExport => "no_report",
            AppError::Internal(_) => "internal",
            AppError::ConfigError(_) => "config_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            AppError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            AppError::RestrictedPage(_) => StatusCode::FORBIDDEN,
            AppError::ExtractionInProgress => StatusCode::CONFLICT,
            AppError::InspectionFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::InspectionTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NoReportToExport => StatusCode::NOT_FOUND,
            AppError::BrowserError(_)
            | AppError::ClipboardWriteFailed(_)
            | AppError::StorageReadFailed(_)
            | AppError::StorageWriteFailed(_)
            | AppError::DownloadFailed(_)
            | AppError::Internal(_)
            | AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let mut body = json!({
            "error": self.to_string(),
            "kind": self.kind(),
            "code": status.as_u16()
        });

        if matches!(self, AppError::DownloadFailed(_)) {
            body["fallback"] = json!("/report/manual");
        }

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
