use crate::config::Config;
use crate::error::{AppError, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::future::BoxFuture;
use futures::StreamExt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

/// Cleanup that runs exactly once: awaited through [`CloseOnDrop::run`], or
/// spawned onto the runtime when the owner is dropped first (for example a
/// future cancelled by a timeout).
pub struct CloseOnDrop {
    close: Option<BoxFuture<'static, ()>>,
}

impl CloseOnDrop {
    pub fn new(close: impl Future<Output = ()> + Send + 'static) -> Self {
        Self {
            close: Some(Box::pin(close)),
        }
    }

    pub async fn run(mut self) {
        if let Some(close) = self.close.take() {
            close.await;
        }
    }
}

impl Drop for CloseOnDrop {
    fn drop(&mut self) {
        let Some(close) = self.close.take() else {
            return;
        };
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(close);
            }
            Err(_) => warn!("No runtime left to close an abandoned tab"),
        }
    }
}

/// A tab together with its pool slot. Dropping it frees the slot and
/// closes the tab in the background.
pub struct PooledPage {
    pub page: Page,
    closer: CloseOnDrop,
    _permit: OwnedSemaphorePermit,
}

impl PooledPage {
    fn new(page: Page, permit: OwnedSemaphorePermit) -> Self {
        let tab = page.clone();
        let closer = CloseOnDrop::new(async move {
            if let Err(e) = tab.close().await {
                debug!("Failed to close tab: {}", e);
            }
        });

        Self {
            page,
            closer,
            _permit: permit,
        }
    }

    pub async fn close(self) {
        self.closer.run().await;
    }
}

pub struct BrowserPool {
    browser: Arc<Mutex<Option<Browser>>>,
    semaphore: Arc<Semaphore>,
    recreation_count: AtomicU64,
    config: Config,
}

impl BrowserPool {
    pub async fn new(config: Config) -> Result<Self> {
        let browser = Self::create_browser(&config).await?;

        Ok(Self {
            browser: Arc::new(Mutex::new(Some(browser))),
            semaphore: Arc::new(Semaphore::new(config.browser_pool_size)),
            recreation_count: AtomicU64::new(0),
            config,
        })
    }

    async fn create_browser(config: &Config) -> Result<Browser> {
        let (browser, mut handler) = match config.chrome_ws_url {
            Some(ref ws_url) => {
                info!("Connecting to existing browser at {}", ws_url);
                Browser::connect(ws_url.as_str())
                    .await
                    .map_err(|e| AppError::BrowserError(e.to_string()))?
            }
            None => {
                let browser_config = BrowserConfig::builder()
                    .chrome_executable(&config.chrome_path)
                    .no_sandbox()
                    .arg("--disable-gpu")
                    .arg("--disable-dev-shm-usage")
                    .arg("--disable-extensions")
                    .arg("--disable-background-networking")
                    .arg("--disable-sync")
                    .arg("--disable-translate")
                    .arg("--mute-audio")
                    .arg("--no-first-run")
                    .arg("--disable-blink-features=AutomationControlled")
                    .window_size(config.window_width, config.window_height)
                    .viewport(None)
                    .build()
                    .map_err(AppError::BrowserError)?;

                Browser::launch(browser_config)
                    .await
                    .map_err(|e| AppError::BrowserError(e.to_string()))?
            }
        };

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {:?}", e);
                }
            }
            debug!("Browser handler finished");
        });

        info!("Browser ready");
        Ok(browser)
    }

    /// Opens a blank tab, relaunching the browser first if it was dropped.
    pub async fn get_page(&self) -> Result<PooledPage> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AppError::BrowserError(e.to_string()))?;

        let mut browser_guard = self.browser.lock().await;
        if browser_guard.is_none() {
            warn!("Browser missing, relaunching");
            *browser_guard = Some(Self::create_browser(&self.config).await?);
            self.recreation_count.fetch_add(1, Ordering::Relaxed);
        }
        let browser = browser_guard
            .as_ref()
            .ok_or_else(|| AppError::BrowserError("Browser not initialized".to_string()))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| AppError::BrowserError(e.to_string()))?;

        drop(browser_guard);

        page.set_user_agent(self.config.user_agent.as_str())
            .await
            .map_err(|e| AppError::BrowserError(e.to_string()))?;

        Ok(PooledPage::new(page, permit))
    }

    pub async fn navigate_and_wait(
        &self,
        page: &Page,
        url: &str,
        wait_for_selector: Option<&str>,
    ) -> Result<()> {
        let timeout = Duration::from_secs(self.config.request_timeout);

        tokio::time::timeout(timeout, async {
            page.goto(url)
                .await
                .map_err(|e| AppError::BrowserError(format!("Navigation failed: {}", e)))?;

            page.evaluate("document.readyState")
                .await
                .map_err(|e| AppError::BrowserError(format!("Ready state check failed: {}", e)))?;

            Ok::<(), AppError>(())
        })
        .await
        .map_err(|_| AppError::InspectionTimeout(timeout.as_secs()))??;

        if let Some(selector) = wait_for_selector {
            tokio::time::timeout(timeout, async {
                page.find_element(selector)
                    .await
                    .map_err(|e| AppError::BrowserError(format!("Selector wait failed: {}", e)))
            })
            .await
            .map_err(|_| AppError::InspectionTimeout(timeout.as_secs()))??;
        }

        if self.config.settle_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.settle_delay_ms)).await;
        }

        Ok(())
    }

    /// Drops the current browser so the next `get_page` starts a fresh one.
    pub async fn invalidate_browser(&self) {
        let mut guard = self.browser.lock().await;
        if let Some(mut browser) = guard.take() {
            if let Err(e) = browser.close().await {
                debug!("Closing stale browser failed: {}", e);
            }
        }
    }

    pub fn is_connection_error(error: &AppError) -> bool {
        let AppError::BrowserError(message) = error else {
            return false;
        };
        let message = message.to_lowercase();
        ["connection", "channel closed", "websocket", "ws error", "browser closed"]
            .iter()
            .any(|needle| message.contains(needle))
    }

    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn total_slots(&self) -> usize {
        self.config.browser_pool_size
    }

    pub fn recreation_count(&self) -> u64 {
        self.recreation_count.load(Ordering::Relaxed)
    }

    pub async fn is_healthy(&self) -> bool {
        self.browser.lock().await.is_some()
    }
}
