//! Headless browser fetch strategy
//!
//! One browser is launched lazily per crawl and shared by every unit. Each
//! fetch runs in its own tab, which is closed once the HTML is captured.

use crate::config::FetchConfig;
use crate::crawler::fetcher::{FetchEngine, PageFetcher, RawPage};
use crate::{ConfigError, FetchError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

/// Pause between incremental scroll steps
const SCROLL_INTERVAL: Duration = Duration::from_millis(250);

/// Script scrolling the page by one viewport
const SCROLL_SCRIPT: &str = "window.scrollBy(0, window.innerHeight)";

/// Rendered strategy backed by a shared headless Chrome/Chromium
pub struct RenderedFetcher {
    browser: Mutex<Option<Arc<Browser>>>,
    user_agent: String,
    timeout: Duration,
    settle: Duration,
    scroll_steps: u32,
}

impl RenderedFetcher {
    /// Checks that a browser can be configured on this machine
    ///
    /// Building the browser configuration locates the Chrome/Chromium
    /// executable; nothing is launched until the first fetch.
    ///
    /// # Returns
    ///
    /// * `Ok(RenderedFetcher)` - A browser executable was found
    /// * `Err(ConfigError::RenderedUnavailable)` - No usable browser
    pub fn probe(config: &FetchConfig) -> Result<Self, ConfigError> {
        let fetcher = Self {
            browser: Mutex::new(None),
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
            settle: config.settle(),
            scroll_steps: config.scroll_steps,
        };

        fetcher
            .browser_config()
            .map_err(ConfigError::RenderedUnavailable)?;

        Ok(fetcher)
    }

    fn browser_config(&self) -> Result<BrowserConfig, String> {
        BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg(format!("--user-agent={}", self.user_agent))
            .request_timeout(self.timeout)
            .build()
    }

    async fn get_or_launch(&self, url: &Url) -> Result<Arc<Browser>, FetchError> {
        let mut guard = self.browser.lock().await;
        if let Some(browser) = guard.as_ref() {
            return Ok(Arc::clone(browser));
        }

        let browser_error = |message: String| FetchError::Browser {
            url: url.to_string(),
            message,
        };

        let config = self.browser_config().map_err(browser_error)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| browser_error(format!("browser launch failed: {}", e)))?;

        tokio::spawn(async move { while handler.next().await.is_some() {} });
        tracing::info!("Launched headless browser");

        let shared = Arc::new(browser);
        *guard = Some(Arc::clone(&shared));
        Ok(shared)
    }

    /// Waits for the page to settle, scrolls, and captures the document
    async fn capture(&self, page: &Page, url: &Url) -> Result<RawPage, FetchError> {
        tokio::time::timeout(self.timeout, page.wait_for_navigation())
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
            })?
            .map_err(|e| FetchError::Browser {
                url: url.to_string(),
                message: format!("navigation failed: {}", e),
            })?;

        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        for _ in 0..self.scroll_steps {
            if let Err(e) = page.evaluate(SCROLL_SCRIPT).await {
                tracing::debug!(url = %url, error = %e, "Scroll step failed");
                break;
            }
            tokio::time::sleep(SCROLL_INTERVAL).await;
        }

        let html = tokio::time::timeout(self.timeout, page.content())
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
            })?
            .map_err(|e| FetchError::Browser {
                url: url.to_string(),
                message: format!("failed to capture content: {}", e),
            })?;

        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .and_then(|u| Url::parse(&u).ok())
            .unwrap_or_else(|| url.clone());

        Ok(RawPage { final_url, html })
    }
}

#[async_trait]
impl PageFetcher for RenderedFetcher {
    fn engine(&self) -> FetchEngine {
        FetchEngine::Rendered
    }

    async fn fetch_html(&self, url: &Url) -> Result<RawPage, FetchError> {
        let browser = self.get_or_launch(url).await?;

        let page = tokio::time::timeout(self.timeout, browser.new_page(url.as_str()))
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
            })?
            .map_err(|e| FetchError::Browser {
                url: url.to_string(),
                message: format!("failed to open tab: {}", e),
            })?;

        let result = self.capture(&page, url).await;

        if let Err(e) = page.close().await {
            tracing::debug!(url = %url, error = %e, "Tab close error");
        }

        result
    }

    async fn shutdown(&self) {
        let mut guard = self.browser.lock().await;
        if let Some(browser) = guard.take() {
            if let Ok(mut browser) = Arc::try_unwrap(browser) {
                if let Err(e) = browser.close().await {
                    tracing::warn!(error = %e, "Browser close error");
                }
            }
        }
    }
}
