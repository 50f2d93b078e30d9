//! Lazily launched headless tab.
//!
//! Chrome is started on the first tool call that needs a page and then kept
//! for the life of the server. Every call reuses the same tab, so the
//! session guard in [`crate::session`] serializes captures on it.

use pagelens_client::{ChromeHost, HeadlessBrowser, PageHost, RenderError, RenderOptions};
use pagelens_core::Error;
use tokio::sync::OnceCell;

struct Tab {
    _browser: HeadlessBrowser,
    host: ChromeHost,
    id: String,
}

/// Owner of the server's single browser tab.
pub struct BrowserSlot {
    options: RenderOptions,
    tab: OnceCell<Tab>,
}

impl BrowserSlot {
    pub fn new(options: RenderOptions) -> Self {
        Self { options, tab: OnceCell::new() }
    }

    /// The tab and its identifier, launching the browser if needed.
    pub async fn tab(&self) -> Result<(ChromeHost, String), Error> {
        let tab = self.tab.get_or_try_init(|| self.launch()).await?;
        Ok((tab.host.clone(), tab.id.clone()))
    }

    async fn launch(&self) -> Result<Tab, Error> {
        let browser = HeadlessBrowser::launch(self.options.clone()).await?;
        let host = browser.open_tab().await?;
        let id = host
            .active_page()
            .await
            .map_err(|_| Error::from(RenderError::BrowserClosed))?
            .tab_id;
        tracing::info!(tab = %id, "headless tab ready");
        Ok(Tab { _browser: browser, host, id })
    }
}
