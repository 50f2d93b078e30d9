//! Headless Chrome host.
//!
//! Launches Chrome/Chromium through chromiumoxide and exposes one tab as a
//! [`PageHost`]: page functions run through `Runtime.evaluate` and the
//! viewport is captured with `Page.captureScreenshot`.

use std::time::Duration;

use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::ScreenshotParams;
use futures_util::StreamExt;
use pagelens_core::{AppConfig, Error};
use serde_json::Value;
use thiserror::Error;

use crate::host::{ActivePage, HostError, ImageFormat, PageHost, PageScript, encode_data_url};

/// Errors that can occur while driving the browser.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Failed to launch or connect to browser.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// Failed to navigate to URL.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Timeout waiting for page to load.
    #[error("navigation timeout after {0}ms")]
    Timeout(u64),

    /// Browser closed unexpectedly.
    #[error("browser closed unexpectedly")]
    BrowserClosed,
}

impl From<RenderError> for Error {
    fn from(err: RenderError) -> Self {
        Error::RenderFailed(err.to_string())
    }
}

/// Options for the headless browser.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Timeout for one navigation in milliseconds (default: 30000).
    pub timeout_ms: u64,

    /// Wait after the load event before the page is probed (default: 1000ms).
    pub load_wait: Duration,

    /// Viewport dimensions (default: 1280x720).
    pub viewport: (u32, u32),
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { timeout_ms: 30000, load_wait: Duration::from_millis(1000), viewport: (1280, 720) }
    }
}

impl From<&AppConfig> for RenderOptions {
    fn from(config: &AppConfig) -> Self {
        Self { viewport: (config.viewport_width, config.viewport_height), ..Default::default() }
    }
}

/// A running headless Chrome/Chromium instance.
pub struct HeadlessBrowser {
    browser: Browser,
    options: RenderOptions,
}

impl HeadlessBrowser {
    /// Launch the browser and drive its CDP event loop in a background task.
    pub async fn launch(options: RenderOptions) -> Result<Self, RenderError> {
        let (width, height) = options.viewport;
        let config = BrowserConfig::builder()
            .window_size(width, height)
            .viewport(Viewport { width, height, ..Default::default() })
            .build()
            .map_err(RenderError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::BrowserLaunch(e.to_string()))?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {e}");
                    break;
                }
            }
        });

        tracing::info!(width, height, "headless browser launched");
        Ok(Self { browser, options })
    }

    /// Open a blank tab.
    pub async fn open_tab(&self) -> Result<ChromeHost, RenderError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|_| RenderError::BrowserClosed)?;
        Ok(ChromeHost { page, options: self.options.clone() })
    }
}

/// One browser tab acting as the page host.
#[derive(Clone)]
pub struct ChromeHost {
    page: Page,
    options: RenderOptions,
}

impl ChromeHost {
    /// Load `url` in the tab and wait for it to settle.
    pub async fn navigate(&self, url: &str) -> Result<(), RenderError> {
        let timeout = Duration::from_millis(self.options.timeout_ms);
        tokio::time::timeout(timeout, async {
            self.page
                .goto(url)
                .await
                .map_err(|e| RenderError::Navigation(e.to_string()))?
                .wait_for_navigation()
                .await
                .map_err(|e| RenderError::Navigation(e.to_string()))?;
            Ok::<(), RenderError>(())
        })
        .await
        .map_err(|_| RenderError::Timeout(self.options.timeout_ms))??;

        tokio::time::sleep(self.options.load_wait).await;
        tracing::debug!(url, "page loaded");
        Ok(())
    }
}

#[async_trait::async_trait]
impl PageHost for ChromeHost {
    async fn active_page(&self) -> Result<ActivePage, HostError> {
        let url = self
            .page
            .url()
            .await
            .map_err(|_| HostError::Closed)?
            .unwrap_or_else(|| "about:blank".to_string());
        Ok(ActivePage { url, tab_id: self.page.target_id().inner().clone(), window_id: None })
    }

    async fn execute(&self, script: &PageScript) -> Result<Value, HostError> {
        let result = self
            .page
            .evaluate_expression(script.to_expression())
            .await
            .map_err(|e| HostError::Script(format!("{}: {e}", script.name())))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn capture_visible(&self, format: ImageFormat, quality: u8) -> Result<String, HostError> {
        let cdp_format = match format {
            ImageFormat::Png => CaptureScreenshotFormat::Png,
            ImageFormat::Jpeg => CaptureScreenshotFormat::Jpeg,
        };
        let params = ScreenshotParams::builder()
            .format(cdp_format)
            .quality(i64::from(quality))
            .build();

        let bytes = self
            .page
            .screenshot(params)
            .await
            .map_err(|e| HostError::Capture(e.to_string()))?;
        Ok(encode_data_url(format, &bytes))
    }
}
