use crate::error::{AppError, Result};
use crate::models::{ReportStats, ViewerState};
use crate::services::clipboard::ClipboardSink;
use crate::services::store::SnapshotRepository;
use std::sync::Arc;
use tracing::debug;

/// Read side of the persisted snapshot.
pub struct ViewerService {
    snapshots: Arc<SnapshotRepository>,
    clipboard: Arc<dyn ClipboardSink>,
}

impl ViewerService {
    pub fn new(snapshots: Arc<SnapshotRepository>, clipboard: Arc<dyn ClipboardSink>) -> Self {
        Self {
            snapshots,
            clipboard,
        }
    }

    pub async fn load(&self) -> Result<ViewerState> {
        match self.snapshots.load().await? {
            Some(snapshot) => {
                debug!("Viewer loaded snapshot {} ({} bytes)", snapshot.id, snapshot.report.len());
                Ok(ViewerState::Ready {
                    stats: ReportStats::from(&snapshot.record),
                    report: snapshot.report,
                    saved_at: snapshot.saved_at,
                })
            }
            None => Ok(ViewerState::NoReportYet),
        }
    }

    /// The stored report text, for copy and download actions.
    pub async fn report_text(&self) -> Result<String> {
        match self.load().await? {
            ViewerState::Ready { report, .. } => Ok(report),
            ViewerState::NoReportYet => Err(AppError::NoReportToExport),
        }
    }

    pub async fn copy(&self) -> Result<()> {
        let report = self.report_text().await?;
        self.clipboard.write_text(&report).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PersistedSnapshot;
    use crate::services::store::{FileStore, MemoryStore};
    use crate::services::testing::{sample_record, RecordingClipboard};
    use pretty_assertions::assert_eq;

    fn viewer_with(store: Arc<SnapshotRepository>, clipboard: Arc<RecordingClipboard>) -> ViewerService {
        ViewerService::new(store, clipboard)
    }

    #[tokio::test]
    async fn absent_snapshot_is_no_report_yet() {
        let repo = Arc::new(SnapshotRepository::new(Arc::new(MemoryStore::new())));
        let viewer = viewer_with(repo, Arc::new(RecordingClipboard::new()));
        assert_eq!(viewer.load().await.unwrap(), ViewerState::NoReportYet);
    }

    #[tokio::test]
    async fn ready_state_carries_stats() {
        let repo = Arc::new(SnapshotRepository::new(Arc::new(MemoryStore::new())));
        let mut record = sample_record();
        record.accessibility.missing_alt = 3;
        record.accessibility.empty_links = 2;
        record.accessibility.missing_labels = 9;
        repo.save(&PersistedSnapshot::new("# r".into(), record)).await.unwrap();

        let viewer = viewer_with(repo, Arc::new(RecordingClipboard::new()));
        match viewer.load().await.unwrap() {
            ViewerState::Ready { report, stats, .. } => {
                assert_eq!(report, "# r");
                assert_eq!(stats.issue_count, 5);
                assert_eq!(stats.element_count, 120);
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[tokio::test]
    async fn unreadable_store_is_an_error_not_no_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, b"[1, 2, 3]").unwrap();

        let repo = Arc::new(SnapshotRepository::new(Arc::new(FileStore::new(&path))));
        let viewer = viewer_with(repo, Arc::new(RecordingClipboard::new()));
        assert!(matches!(viewer.load().await, Err(AppError::StorageReadFailed(_))));
    }

    #[tokio::test]
    async fn copy_writes_stored_report() {
        let repo = Arc::new(SnapshotRepository::new(Arc::new(MemoryStore::new())));
        let clipboard = Arc::new(RecordingClipboard::new());
        let viewer = viewer_with(repo.clone(), clipboard.clone());

        assert!(matches!(viewer.copy().await, Err(AppError::NoReportToExport)));

        repo.save(&PersistedSnapshot::new("report body".into(), sample_record()))
            .await
            .unwrap();
        viewer.copy().await.unwrap();
        assert_eq!(clipboard.written(), vec!["report body".to_string()]);
    }
}
