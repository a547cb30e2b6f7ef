use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ReportRecord;

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// The single most recent report kept for the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    pub schema_version: u32,
    pub id: Uuid,
    pub saved_at: DateTime<Utc>,
    pub report: String,
    pub record: ReportRecord,
}

impl PersistedSnapshot {
    pub fn new(report: String, record: ReportRecord) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            id: Uuid::new_v4(),
            saved_at: Utc::now(),
            report,
            record,
        }
    }
}
