//! Client code for pagelens.
//!
//! This crate provides the page capture pipeline (probe, classification,
//! scrolled capture, PDF extraction), the summarization transport, and a
//! headless Chrome host behind the `render` feature.

pub mod capture;
pub mod classify;
pub mod extract;
pub mod host;
pub mod page_url;
pub mod pipeline;
pub mod probe;
#[cfg(feature = "render")]
pub mod render;
pub mod scroll;
pub mod transport;

#[cfg(test)]
mod testing;

pub use capture::{CaptureLoop, CaptureReport, CaptureState, frames_needed};
pub use classify::classify;
pub use extract::{ContentExtractor, StrategyOutcome, strip_boilerplate};
pub use host::{ActivePage, HostError, ImageFormat, PageHost, PageScript, decode_data_url, encode_data_url};
pub use page_url::{PageUrl, UrlError};
pub use pipeline::{PreparedRequest, SummaryOutcome, Summarizer};
pub use probe::{PageProbe, ProbeOutcome, ViewerContainer};
#[cfg(feature = "render")]
pub use render::{ChromeHost, HeadlessBrowser, RenderError, RenderOptions};
pub use scroll::{ScrollCoordinator, ScrollSession, ScrollTarget};
pub use transport::{TransportClient, TransportConfig};
