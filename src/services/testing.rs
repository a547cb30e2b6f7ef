//! Fakes shared by the unit tests.

use crate::error::{AppError, Result};
use crate::models::{
    AccessibilityStats, BodyStyles, CssStats, HtmlStats, JavascriptStats, LoadTiming, MetaTags,
    OpenGraph, PageInfo, PageStructure, ReportRecord, ScrollOffset, SemanticElements,
    SeoIndicators, SeoReport, TwitterCard, Viewport,
};
use crate::services::clipboard::ClipboardSink;
use crate::services::inspector::PageInspector;
use crate::services::security::PageTarget;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A record whose SEO group triggers no findings.
pub fn sample_record() -> ReportRecord {
    ReportRecord {
        timestamp: "2026/10/19 08:15:02".to_string(),
        page: PageInfo {
            title: "Example Domain - Sample Page".to_string(),
            url: "https://example.com/".to_string(),
            viewport: Some(Viewport {
                width: 1920,
                height: 1080,
            }),
            scroll_position: Some(ScrollOffset { x: 0.0, y: 0.0 }),
        },
        html: HtmlStats {
            total_elements: 120,
            forms: 1,
            buttons: 2,
            inputs: 3,
            images: 4,
            links: 12,
            semantic_elements: SemanticElements {
                headers: 5,
                sections: 2,
                articles: 1,
                navs: 1,
            },
        },
        css: CssStats {
            stylesheets: 3,
            inline_styles: 6,
            body_styles: Some(BodyStyles {
                color: "rgb(33, 33, 33)".to_string(),
                background_color: "rgb(255, 255, 255)".to_string(),
                font_size: "16px".to_string(),
                font_family: "system-ui, sans-serif".to_string(),
            }),
        },
        javascript: JavascriptStats {
            scripts: 7,
            has_jquery: false,
            has_react: true,
            has_vue: false,
            has_angular: false,
        },
        accessibility: AccessibilityStats {
            missing_alt: 1,
            empty_links: 0,
            missing_labels: 1,
        },
        seo: SeoReport {
            meta: MetaTags {
                description: Some("d".repeat(100)),
                keywords: Some("example, sample".to_string()),
                author: None,
                viewport: Some("width=device-width, initial-scale=1".to_string()),
                robots: Some("index, follow".to_string()),
            },
            og: OpenGraph {
                title: Some("Example".to_string()),
                description: Some("An example page".to_string()),
                image: Some("https://example.com/og.png".to_string()),
                url: Some("https://example.com/".to_string()),
                kind: Some("website".to_string()),
            },
            twitter: TwitterCard {
                card: Some("summary_large_image".to_string()),
                title: Some("Example".to_string()),
                description: None,
                image: None,
            },
            structure: PageStructure {
                h1_count: 1,
                h1_text: Some("Example Domain".to_string()),
                canonical: Some("https://example.com/".to_string()),
                favicon: Some("https://example.com/favicon.ico".to_string()),
                language: Some("en".to_string()),
            },
            performance: SeoIndicators {
                title_length: 28,
                meta_desc_length: 100,
                has_schema_org: true,
                schema_count: 1,
            },
        },
        performance: Some(LoadTiming {
            page_load_time: 950,
            dom_content_loaded: 620,
            dom_interactive: 540,
        }),
    }
}

pub struct FakeInspector {
    record: ReportRecord,
    delay: Option<Duration>,
    calls: AtomicUsize,
    fail_with: Mutex<Option<String>>,
}

impl FakeInspector {
    pub fn returning(record: ReportRecord) -> Self {
        Self {
            record,
            delay: None,
            calls: AtomicUsize::new(0),
            fail_with: Mutex::new(None),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fail_next(&self, message: &str) {
        *self.fail_with.lock() = Some(message.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageInspector for FakeInspector {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn inspect(&self, _target: &PageTarget) -> Result<ReportRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.fail_with.lock().take();
        match failure {
            Some(message) => Err(AppError::InspectionFailed(message)),
            None => Ok(self.record.clone()),
        }
    }
}

pub struct RecordingClipboard {
    written: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingClipboard {
    pub fn new() -> Self {
        Self {
            written: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn written(&self) -> Vec<String> {
        self.written.lock().clone()
    }
}

#[async_trait]
impl ClipboardSink for RecordingClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        if self.fail {
            return Err(AppError::ClipboardWriteFailed("no display available".to_string()));
        }
        self.written.lock().push(text.to_string());
        Ok(())
    }
}
