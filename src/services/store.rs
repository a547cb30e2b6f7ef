//! Key-value persistence for the most recent report.
//!
//! Lifecycle of the snapshot: absent until the first successful extraction,
//! then replaced wholesale by every later one. Readers never observe a
//! partially written snapshot because [`KeyValueStore::set`] replaces all
//! given keys in one step.

use crate::error::{AppError, Result};
use crate::models::{PersistedSnapshot, ReportRecord, SNAPSHOT_SCHEMA_VERSION};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

pub const KEY_REPORT: &str = "lastReport";
pub const KEY_STATS: &str = "lastStats";
pub const KEY_SCHEMA_VERSION: &str = "schemaVersion";
pub const KEY_SNAPSHOT_ID: &str = "snapshotId";
pub const KEY_SAVED_AT: &str = "savedAt";

const SNAPSHOT_KEYS: [&str; 5] = [
    KEY_REPORT,
    KEY_STATS,
    KEY_SCHEMA_VERSION,
    KEY_SNAPSHOT_ID,
    KEY_SAVED_AT,
];

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Values for the requested keys. Missing keys are left out of the map.
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>>;

    /// Writes all entries as one replacement.
    async fn set(&self, entries: Map<String, Value>) -> Result<()>;

    fn backend(&self) -> &'static str;
}

/// Process-local store; gone when the service stops.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let entries = self.entries.read();
        let found = keys
            .iter()
            .filter_map(|key| entries.get(*key).map(|value| (key.to_string(), value.clone())))
            .collect();
        Ok(found)
    }

    async fn set(&self, entries: Map<String, Value>) -> Result<()> {
        let mut stored = self.entries.write();
        for (key, value) in entries {
            debug!("Memory store set {}", key);
            stored.insert(key, value);
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// One JSON object on disk, replaced through a temp file and a rename.
pub struct FileStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    fn ensure_parent(&self) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => return Ok(()),
        };
        if parent.is_dir() {
            Ok(())
        } else {
            Err(AppError::StorageUnavailable(format!(
                "directory {} does not exist",
                parent.display()
            )))
        }
    }

    async fn read_all(&self) -> Result<Map<String, Value>> {
        self.ensure_parent()?;

        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Store file {} not created yet", self.path.display());
                return Ok(Map::new());
            }
            Err(e) => {
                return Err(AppError::StorageReadFailed(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        match serde_json::from_slice::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(AppError::StorageReadFailed(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(AppError::StorageReadFailed(format!(
                "{} is corrupt: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let mut all = self.read_all().await?;
        Ok(keys
            .iter()
            .filter_map(|key| all.remove(*key).map(|value| (key.to_string(), value)))
            .collect())
    }

    async fn set(&self, entries: Map<String, Value>) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut all = self.read_all().await.or_else(|e| match e {
            // A corrupt file is overwritten rather than blocking every later save.
            AppError::StorageReadFailed(_) => Ok(Map::new()),
            other => Err(other),
        })?;
        all.extend(entries);

        let body = serde_json::to_vec_pretty(&Value::Object(all))
            .map_err(|e| AppError::StorageWriteFailed(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)
            .await
            .map_err(|e| AppError::StorageWriteFailed(format!("{}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| AppError::StorageWriteFailed(format!("{}: {}", self.path.display(), e)))?;

        debug!("Store file {} replaced", self.path.display());
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}

/// Typed access to the snapshot keys.
pub struct SnapshotRepository {
    store: Arc<dyn KeyValueStore>,
}

impl SnapshotRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub async fn save(&self, snapshot: &PersistedSnapshot) -> Result<()> {
        let record = serde_json::to_value(&snapshot.record)
            .map_err(|e| AppError::StorageWriteFailed(e.to_string()))?;

        let mut entries = Map::new();
        entries.insert(KEY_REPORT.to_string(), Value::String(snapshot.report.clone()));
        entries.insert(KEY_STATS.to_string(), record);
        entries.insert(KEY_SCHEMA_VERSION.to_string(), Value::from(snapshot.schema_version));
        entries.insert(KEY_SNAPSHOT_ID.to_string(), Value::String(snapshot.id.to_string()));
        entries.insert(KEY_SAVED_AT.to_string(), Value::String(snapshot.saved_at.to_rfc3339()));

        self.store.set(entries).await?;
        info!("Persisted snapshot {} ({} backend)", snapshot.id, self.backend());
        Ok(())
    }

    /// `Ok(None)` means nothing was ever saved; read problems are errors.
    pub async fn load(&self) -> Result<Option<PersistedSnapshot>> {
        let mut found = self.store.get(&SNAPSHOT_KEYS).await?;

        let report = match found.remove(KEY_REPORT) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(report)) => report,
            Some(_) => {
                return Err(AppError::StorageReadFailed(format!(
                    "{} is not a string",
                    KEY_REPORT
                )))
            }
        };

        let schema_version = match found.remove(KEY_SCHEMA_VERSION) {
            None | Some(Value::Null) => SNAPSHOT_SCHEMA_VERSION,
            Some(raw) => raw
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| {
                    AppError::StorageReadFailed(format!(
                        "{} is not a valid version: {}",
                        KEY_SCHEMA_VERSION, raw
                    ))
                })?,
        };
        if schema_version != SNAPSHOT_SCHEMA_VERSION {
            return Err(AppError::StorageReadFailed(format!(
                "unsupported snapshot schema version {}",
                schema_version
            )));
        }

        let record: ReportRecord = found
            .remove(KEY_STATS)
            .ok_or_else(|| AppError::StorageReadFailed(format!("{} is missing", KEY_STATS)))
            .and_then(|v| {
                serde_json::from_value(v)
                    .map_err(|e| AppError::StorageReadFailed(format!("{}: {}", KEY_STATS, e)))
            })?;

        let id = found
            .remove(KEY_SNAPSHOT_ID)
            .and_then(|v| v.as_str().and_then(|s| Uuid::parse_str(s).ok()))
            .unwrap_or_else(Uuid::nil);

        let saved_at = found
            .remove(KEY_SAVED_AT)
            .and_then(|v| {
                v.as_str()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|dt| dt.with_timezone(&Utc))
            })
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        Ok(Some(PersistedSnapshot {
            schema_version,
            id,
            saved_at,
            report,
            record,
        }))
    }
}
