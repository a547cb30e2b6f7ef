use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ReportRecord;

/// The four figures shown next to a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    pub element_count: usize,
    pub stylesheet_count: usize,
    pub script_count: usize,
    pub issue_count: usize,
}

impl From<&ReportRecord> for ReportStats {
    fn from(record: &ReportRecord) -> Self {
        Self {
            element_count: record.html.total_elements,
            stylesheet_count: record.css.stylesheets,
            script_count: record.javascript.scripts,
            issue_count: record.accessibility.issue_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardOutcome {
    pub copied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ClipboardOutcome {
    pub fn copied() -> Self {
        Self { copied: true, message: None }
    }

    pub fn skipped() -> Self {
        Self { copied: false, message: None }
    }

    pub fn failed(message: String) -> Self {
        Self { copied: false, message: Some(message) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub url: String,
    pub stats: ReportStats,
    pub clipboard: ClipboardOutcome,
    pub report: String,
    pub record: ReportRecord,
    pub processing_time_ms: u64,
}

/// What the viewer shows. `NoReportYet` is a normal state, not a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewerState {
    NoReportYet,
    #[serde(rename_all = "camelCase")]
    Ready {
        report: String,
        stats: ReportStats,
        saved_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyResponse {
    pub copied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveResponse {
    pub path: String,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub inspector: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_pool: Option<BrowserPoolStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserPoolStatus {
    pub available: usize,
    pub total: usize,
    pub healthy: bool,
    pub recreation_count: u64,
}
