use crate::error::{AppError, Result};
use crate::models::{ClipboardOutcome, PersistedSnapshot, ReportRecord, ReportStats};
use crate::services::clipboard::ClipboardSink;
use crate::services::formatter::ReportFormatter;
use crate::services::inspector::PageInspector;
use crate::services::security::SecurityService;
use crate::services::store::SnapshotRepository;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub record: ReportRecord,
    pub report: String,
    pub stats: ReportStats,
    pub clipboard: ClipboardOutcome,
    pub elapsed: Duration,
}

/// Per-call switches.
#[derive(Debug, Clone, Default)]
pub struct ExtractionRequest {
    pub url: String,
    pub wait_for_selector: Option<String>,
    pub copy_to_clipboard: Option<bool>,
}

/// Guard → inspect → render → persist → copy, one extraction at a time.
pub struct ExtractionService {
    security: Arc<SecurityService>,
    inspector: Arc<dyn PageInspector>,
    formatter: ReportFormatter,
    snapshots: Arc<SnapshotRepository>,
    clipboard: Arc<dyn ClipboardSink>,
    inspection_timeout: Duration,
    copy_by_default: bool,
    in_flight: Mutex<()>,
}

impl ExtractionService {
    pub fn new(
        security: Arc<SecurityService>,
        inspector: Arc<dyn PageInspector>,
        snapshots: Arc<SnapshotRepository>,
        clipboard: Arc<dyn ClipboardSink>,
        inspection_timeout: Duration,
        copy_by_default: bool,
    ) -> Self {
        Self {
            security,
            inspector,
            formatter: ReportFormatter::new(),
            snapshots,
            clipboard,
            inspection_timeout,
            copy_by_default,
            in_flight: Mutex::new(()),
        }
    }

    pub fn inspector_name(&self) -> &'static str {
        self.inspector.name()
    }

    pub async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionOutcome> {
        let _running = self
            .in_flight
            .try_lock()
            .map_err(|_| AppError::ExtractionInProgress)?;

        let start = Instant::now();

        let mut target = self.security.check_target(&request.url)?;
        target.wait_for_selector = request.wait_for_selector.clone();

        info!("Inspecting {} with the {} inspector", target.url, self.inspector.name());

        let record = tokio::time::timeout(self.inspection_timeout, self.inspector.inspect(&target))
            .await
            .map_err(|_| AppError::InspectionTimeout(self.inspection_timeout.as_secs()))??;

        // Redirects may have carried the page somewhere the guard refuses.
        self.security.check_landing(&record.page.url)?;

        let report = self.formatter.render(&record);
        let stats = ReportStats::from(&record);

        self.snapshots
            .save(&PersistedSnapshot::new(report.clone(), record.clone()))
            .await?;

        let clipboard = if request.copy_to_clipboard.unwrap_or(self.copy_by_default) {
            match self.clipboard.write_text(&report).await {
                Ok(()) => ClipboardOutcome::copied(),
                Err(e) => {
                    warn!("Report saved but not copied: {}", e);
                    ClipboardOutcome::failed(e.to_string())
                }
            }
        } else {
            ClipboardOutcome::skipped()
        };

        let elapsed = start.elapsed();
        info!(
            "Extracted {} in {}ms ({} elements, {} issues)",
            target.url,
            elapsed.as_millis(),
            stats.element_count,
            stats.issue_count
        );

        Ok(ExtractionOutcome {
            record,
            report,
            stats,
            clipboard,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::Restriction;
    use crate::services::store::MemoryStore;
    use crate::services::testing::{sample_record, FakeInspector, RecordingClipboard};
    use pretty_assertions::assert_eq;
    use tokio_test::assert_ok;

    struct Fixture {
        service: Arc<ExtractionService>,
        inspector: Arc<FakeInspector>,
        clipboard: Arc<RecordingClipboard>,
        snapshots: Arc<SnapshotRepository>,
    }

    fn fixture(inspector: FakeInspector, clipboard: RecordingClipboard) -> Fixture {
        let inspector = Arc::new(inspector);
        let clipboard = Arc::new(clipboard);
        let snapshots = Arc::new(SnapshotRepository::new(Arc::new(MemoryStore::new())));
        let service = Arc::new(ExtractionService::new(
            Arc::new(SecurityService::new(&Config::default())),
            inspector.clone(),
            snapshots.clone(),
            clipboard.clone(),
            Duration::from_millis(200),
            true,
        ));
        Fixture {
            service,
            inspector,
            clipboard,
            snapshots,
        }
    }

    fn request(url: &str) -> ExtractionRequest {
        ExtractionRequest {
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn restricted_page_never_reaches_inspector() {
        let f = fixture(FakeInspector::returning(sample_record()), RecordingClipboard::new());

        let err = f.service.extract(&request("chrome://extensions")).await.unwrap_err();

        assert!(matches!(err, AppError::RestrictedPage(_)));
        assert_eq!(f.inspector.calls(), 0);
        assert_eq!(f.snapshots.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn redirect_onto_marketplace_is_not_reported() {
        let mut landed = sample_record();
        landed.page.url = "https://chromewebstore.google.com/detail/abc".to_string();
        let f = fixture(FakeInspector::returning(landed), RecordingClipboard::new());

        let err = f.service.extract(&request("https://short.example/x")).await.unwrap_err();

        assert!(matches!(err, AppError::RestrictedPage(Restriction::Marketplace)));
        assert_eq!(f.inspector.calls(), 1);
        assert_eq!(f.snapshots.load().await.unwrap(), None);
        assert!(f.clipboard.written().is_empty());
    }

    #[tokio::test]
    async fn successful_extraction_persists_and_copies() {
        let f = fixture(FakeInspector::returning(sample_record()), RecordingClipboard::new());

        let outcome = f.service.extract(&request("https://example.com/")).await.unwrap();

        assert!(outcome.clipboard.copied);
        assert_eq!(f.clipboard.written(), vec![outcome.report.clone()]);
        assert_eq!(outcome.stats, ReportStats::from(&sample_record()));

        let saved = f.snapshots.load().await.unwrap().unwrap();
        assert_eq!(saved.report, outcome.report);
        assert_eq!(saved.record, outcome.record);
    }

    #[tokio::test]
    async fn clipboard_failure_still_persists() {
        let f = fixture(FakeInspector::returning(sample_record()), RecordingClipboard::failing());

        let outcome = f.service.extract(&request("https://example.com/")).await.unwrap();

        assert!(!outcome.clipboard.copied);
        assert!(outcome.clipboard.message.unwrap().contains("Clipboard write failed"));
        assert!(f.snapshots.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn clipboard_can_be_skipped_per_request() {
        let f = fixture(FakeInspector::returning(sample_record()), RecordingClipboard::new());

        let outcome = f
            .service
            .extract(&ExtractionRequest {
                copy_to_clipboard: Some(false),
                ..request("https://example.com/")
            })
            .await
            .unwrap();

        assert!(!outcome.clipboard.copied);
        assert!(outcome.clipboard.message.is_none());
        assert!(f.clipboard.written().is_empty());
    }

    #[tokio::test]
    async fn inspection_failure_leaves_previous_snapshot() {
        let f = fixture(FakeInspector::returning(sample_record()), RecordingClipboard::new());
        let first = f.service.extract(&request("https://example.com/")).await.unwrap();

        f.inspector.fail_next("page closed");
        let err = f.service.extract(&request("https://example.com/")).await.unwrap_err();
        assert!(matches!(err, AppError::InspectionFailed(_)));

        let saved = f.snapshots.load().await.unwrap().unwrap();
        assert_eq!(saved.report, first.report);
    }

    #[tokio::test]
    async fn slow_inspection_times_out() {
        let f = fixture(
            FakeInspector::returning(sample_record()).with_delay(Duration::from_secs(5)),
            RecordingClipboard::new(),
        );

        let err = f.service.extract(&request("https://example.com/")).await.unwrap_err();
        assert!(matches!(err, AppError::InspectionTimeout(_)));
        assert_eq!(f.snapshots.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn second_trigger_is_rejected_while_first_runs() {
        let f = fixture(
            FakeInspector::returning(sample_record()).with_delay(Duration::from_millis(100)),
            RecordingClipboard::new(),
        );

        let service = f.service.clone();
        let first = tokio::spawn(async move {
            service.extract(&request("https://example.com/")).await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let second = f.service.extract(&request("https://example.com/")).await;
        assert!(matches!(second, Err(AppError::ExtractionInProgress)));

        assert_ok!(first.await.unwrap());
        assert_eq!(f.inspector.calls(), 1);
    }
}
