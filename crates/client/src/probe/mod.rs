//! Page layout probing.
//!
//! Learns the layout facts a capture session needs by running one small
//! read-only query per fact inside the page:
//!
//! - document scroll height and viewport height
//! - the viewer container (known PDF viewer selectors first, then the
//!   tallest element that scrolls internally)
//! - the viewer kind (PDF.js, embed, object, iframe, canvas)
//!
//! Pages that cannot be scripted produce [`ProbeOutcome::Unavailable`]
//! rather than an error.

pub mod scripts;

use pagelens_core::{PageLayoutFacts, ViewerKind};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::host::{HostError, PageHost, PageScript};

/// Result of probing a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Available(PageLayoutFacts),
    /// The page could not be scripted; carries the reason.
    Unavailable(String),
}

impl ProbeOutcome {
    pub fn facts(&self) -> Option<&PageLayoutFacts> {
        match self {
            ProbeOutcome::Available(facts) => Some(facts),
            ProbeOutcome::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ProbeOutcome::Available(_))
    }
}

/// Scrollable container found in the page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerContainer {
    pub selector: String,
    #[serde(deserialize_with = "de_pixels")]
    pub scroll_height: u32,
    #[serde(deserialize_with = "de_pixels")]
    pub client_height: u32,
}

/// Layout probe bound to one host.
pub struct PageProbe<'h> {
    host: &'h dyn PageHost,
}

impl<'h> PageProbe<'h> {
    pub fn new(host: &'h dyn PageHost) -> Self {
        Self { host }
    }

    /// Gather all layout facts for the current page.
    pub async fn probe(&self) -> ProbeOutcome {
        match self.collect().await {
            Ok(facts) => {
                tracing::debug!(
                    scroll_height = facts.scroll_height,
                    viewport_height = facts.viewport_height,
                    container = ?facts.container_selector,
                    viewer = ?facts.viewer_kind,
                    "page probed"
                );
                ProbeOutcome::Available(facts)
            }
            Err(e) => {
                tracing::warn!("page probe unavailable: {e}");
                ProbeOutcome::Unavailable(e.to_string())
            }
        }
    }

    async fn collect(&self) -> Result<PageLayoutFacts, HostError> {
        let scroll_height = self.document_scroll_height().await?;
        let viewport_height = self.viewport_height().await?;
        let container = self.viewer_container().await?;
        let viewer_kind = self.viewer_kind().await?;

        let (container_selector, container_scroll_height, container_client_height) = match container {
            Some(c) => (Some(c.selector), c.scroll_height, c.client_height),
            None => (None, 0, 0),
        };

        Ok(PageLayoutFacts {
            scroll_height,
            viewport_height,
            has_scrollable_container: container_selector.is_some(),
            container_selector,
            container_scroll_height,
            container_client_height,
            viewer_kind,
        })
    }

    pub async fn document_scroll_height(&self) -> Result<u32, HostError> {
        self.pixels(&scripts::document_scroll_height()).await
    }

    pub async fn viewport_height(&self) -> Result<u32, HostError> {
        self.pixels(&scripts::viewport_height()).await
    }

    pub async fn viewer_container(&self) -> Result<Option<ViewerContainer>, HostError> {
        self.query(&scripts::viewer_container()).await
    }

    pub async fn viewer_kind(&self) -> Result<ViewerKind, HostError> {
        self.query(&scripts::viewer_kind()).await
    }

    /// Whether a "next page" pagination control is inside the viewport.
    pub async fn next_page_control_visible(&self) -> Result<bool, HostError> {
        let value = self.host.execute(&scripts::next_page_visible()).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    /// Serialized DOM of the page.
    pub async fn outer_html(&self) -> Result<String, HostError> {
        let html: Option<String> = self.query(&scripts::outer_html()).await?;
        html.filter(|h| !h.is_empty())
            .ok_or_else(|| HostError::Script("page returned no HTML".into()))
    }

    /// Current scroll offset of the document or of a container.
    pub async fn scroll_position(&self, selector: Option<&str>) -> Result<u32, HostError> {
        self.pixels(&scripts::scroll_position(selector)).await
    }

    pub async fn document_scroll_y(&self) -> Result<u32, HostError> {
        self.scroll_position(None).await
    }

    async fn pixels(&self, script: &PageScript) -> Result<u32, HostError> {
        let value = self.host.execute(script).await?;
        value
            .as_f64()
            .map(to_pixels)
            .ok_or_else(|| HostError::Script(format!("{} returned {value}", script.name())))
    }

    async fn query<T: DeserializeOwned>(&self, script: &PageScript) -> Result<T, HostError> {
        let value = self.host.execute(script).await?;
        serde_json::from_value(value).map_err(|e| HostError::Script(format!("{}: {e}", script.name())))
    }
}

/// DOM measurements are floats; clamp them into whole pixels.
fn to_pixels(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 { 0 } else { value.round().min(u32::MAX as f64) as u32 }
}

fn de_pixels<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.map(to_pixels).unwrap_or(0))
}
