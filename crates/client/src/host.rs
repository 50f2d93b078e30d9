//! Host capabilities the capture pipeline runs against.
//!
//! The browser is an external collaborator: it can run a function inside the
//! page, capture the visible viewport, and report which page is active.
//! Everything in this crate talks to it through [`PageHost`].

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

/// Identity of the page the pipeline is working on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePage {
    pub url: String,
    pub tab_id: String,
    pub window_id: Option<String>,
}

pub use pagelens_core::ImageFormat;

/// Errors raised by a host.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HostError {
    /// The page cannot run scripts (restricted scheme, local file).
    #[error("page is not scriptable: {0}")]
    NotScriptable(String),

    /// A script threw or returned something unexpected.
    #[error("script failed: {0}")]
    Script(String),

    /// The viewport capturer is rate limited.
    #[error("capture quota exceeded: {0}")]
    CaptureQuota(String),

    /// The viewport capturer failed for another reason.
    #[error("capture failed: {0}")]
    Capture(String),

    /// The page or tab went away.
    #[error("page closed")]
    Closed,
}

/// A function to run in page context, with JSON arguments.
///
/// The function source is a JavaScript function expression; it is invoked
/// immediately with the serialized arguments and may return a promise.
#[derive(Debug, Clone, PartialEq)]
pub struct PageScript {
    name: &'static str,
    function: &'static str,
    args: Vec<Value>,
}

impl PageScript {
    pub fn new(name: &'static str, function: &'static str) -> Self {
        Self { name, function, args: Vec::new() }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Short identifier used in logs and by test hosts.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Self-invoking expression suitable for `Runtime.evaluate`.
    pub fn to_expression(&self) -> String {
        let args = self
            .args
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!("({})({})", self.function.trim(), args)
    }
}

/// Browser-side capabilities consumed by the pipeline.
#[async_trait::async_trait]
pub trait PageHost: Send + Sync {
    /// URL and identity of the active page.
    async fn active_page(&self) -> Result<ActivePage, HostError>;

    /// Run a function in the page and return its (awaited) value.
    async fn execute(&self, script: &PageScript) -> Result<Value, HostError>;

    /// Capture the visible viewport, returned as a data URL.
    async fn capture_visible(&self, format: ImageFormat, quality: u8) -> Result<String, HostError>;
}

/// Encode image bytes as a data URL.
pub fn encode_data_url(format: ImageFormat, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", format.mime(), STANDARD.encode(bytes))
}

/// Decode a base64 data URL into its mime type and bytes.
pub fn decode_data_url(data_url: &str) -> Option<(String, Vec<u8>)> {
    let rest = data_url.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((mime.to_string(), bytes))
}
