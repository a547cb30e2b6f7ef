use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{BodyStyles, LoadTiming, ReportRecord, ScrollOffset, Viewport};
use crate::services::browser::BrowserPool;
use crate::services::dom::{DomAnalyzer, LibraryFlags, LiveSignals};
use crate::services::security::PageTarget;
use async_trait::async_trait;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const INSPECT_SCRIPT: &str = include_str!("inspect_page.js");
const MAX_INSPECT_RETRIES: u32 = 2;

/// Produces one [`ReportRecord`] for a page without modifying it.
#[async_trait]
pub trait PageInspector: Send + Sync {
    fn name(&self) -> &'static str;

    async fn inspect(&self, target: &PageTarget) -> Result<ReportRecord>;
}

/// Local wall-clock time in the format shown at the top of the report.
pub fn inspection_timestamp() -> String {
    chrono::Local::now().format("%Y/%m/%d %H:%M:%S").to_string()
}

/// What the injected script hands back.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LivePage {
    url: String,
    html: String,
    title: String,
    viewport: Viewport,
    scroll: ScrollOffset,
    stylesheets: usize,
    body_styles: Option<BodyStyles>,
    libraries: LibraryFlags,
    timing: Option<LoadTiming>,
}

impl LivePage {
    fn into_parts(self) -> (String, String, LiveSignals) {
        let signals = LiveSignals {
            title: Some(self.title),
            viewport: Some(self.viewport),
            scroll: Some(self.scroll),
            stylesheets: Some(self.stylesheets),
            body_styles: self.body_styles,
            libraries: Some(self.libraries),
            timing: self.timing,
        };
        (self.url, self.html, signals)
    }
}

/// Runs the inspection script inside a headless Chromium tab.
pub struct BrowserInspector {
    pool: Arc<BrowserPool>,
    analyzer: DomAnalyzer,
}

impl BrowserInspector {
    pub fn new(pool: Arc<BrowserPool>) -> Self {
        Self {
            pool,
            analyzer: DomAnalyzer::new(),
        }
    }

    async fn inspect_once(&self, target: &PageTarget) -> Result<ReportRecord> {
        let tab = self.pool.get_page().await?;

        let outcome = async {
            self.pool
                .navigate_and_wait(&tab.page, target.url.as_str(), target.wait_for_selector.as_deref())
                .await?;

            let params = EvaluateParams::builder()
                .expression(INSPECT_SCRIPT)
                .return_by_value(true)
                .build()
                .map_err(AppError::BrowserError)?;

            let evaluation = tab
                .page
                .evaluate_expression(params)
                .await
                .map_err(|e| AppError::BrowserError(format!("Inspection script failed: {}", e)))?;

            evaluation
                .into_value::<LivePage>()
                .map_err(|e| AppError::InspectionFailed(format!("Unexpected script result: {}", e)))
        }
        .await;

        tab.close().await;

        let (url, html, signals) = outcome?.into_parts();
        let page_url = Url::parse(&url).unwrap_or_else(|_| target.url.clone());

        Ok(self
            .analyzer
            .analyze(&html, &page_url, signals, inspection_timestamp()))
    }
}

#[async_trait]
impl PageInspector for BrowserInspector {
    fn name(&self) -> &'static str {
        "browser"
    }

    async fn inspect(&self, target: &PageTarget) -> Result<ReportRecord> {
        let mut last_error = None;

        for attempt in 0..=MAX_INSPECT_RETRIES {
            if attempt > 0 {
                warn!(
                    "Retrying inspection of {} (attempt {}/{})",
                    target.url,
                    attempt + 1,
                    MAX_INSPECT_RETRIES + 1
                );
                tokio::time::sleep(Duration::from_millis(500)).await;
            }

            match self.inspect_once(target).await {
                Ok(record) => return Ok(record),
                Err(e) if BrowserPool::is_connection_error(&e) => {
                    warn!("Connection error inspecting {}: {}, will retry", target.url, e);
                    self.pool.invalidate_browser().await;
                    last_error = Some(e);
                }
                Err(e) => return Err(classify(e)),
            }
        }

        Err(classify(last_error.unwrap_or_else(|| {
            AppError::BrowserError("Failed to inspect page after max retries".to_string())
        })))
    }
}

/// Inside the inspector every browser-level failure means the page could
/// not be inspected; timeouts keep their own kind.
fn classify(error: AppError) -> AppError {
    match error {
        AppError::BrowserError(message) => AppError::InspectionFailed(message),
        other => other,
    }
}

/// Fetches the HTML and analyses it without a browser. Computed styles,
/// viewport, scroll offset and timing are reported as unavailable.
pub struct StaticInspector {
    client: reqwest::Client,
    analyzer: DomAnalyzer,
}

impl StaticInspector {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|e| AppError::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            analyzer: DomAnalyzer::new(),
        })
    }

    async fn fetch(&self, url: &Url) -> Result<(Url, String)> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::InspectionFailed(format!("Timed out loading {}", url))
            } else {
                AppError::InspectionFailed(format!("Failed to load {}: {}", url, e))
            }
        })?;

        let response = response
            .error_for_status()
            .map_err(|e| AppError::InspectionFailed(e.to_string()))?;
        let final_url = response.url().clone();

        let html = response
            .text()
            .await
            .map_err(|e| AppError::InspectionFailed(format!("Failed to read body: {}", e)))?;

        Ok((final_url, html))
    }

    async fn read_file(&self, url: &Url) -> Result<String> {
        let path = url
            .to_file_path()
            .map_err(|_| AppError::InvalidUrl(format!("Not a local path: {}", url)))?;

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| AppError::InspectionFailed(format!("{}: {}", path.display(), e)))?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[async_trait]
impl PageInspector for StaticInspector {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn inspect(&self, target: &PageTarget) -> Result<ReportRecord> {
        let (page_url, html) = if target.is_local_file() {
            (target.url.clone(), self.read_file(&target.url).await?)
        } else {
            self.fetch(&target.url).await?
        };

        if target.wait_for_selector.is_some() {
            debug!("wait_for_selector is ignored by the static inspector");
        }

        info!("Fetched {} ({} bytes)", page_url, html.len());

        Ok(self
            .analyzer
            .analyze(&html, &page_url, LiveSignals::default(), inspection_timestamp()))
    }
}
