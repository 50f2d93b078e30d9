//! Unified error types for pagelens.
//!
//! Every variant is recoverable: the host process keeps running and the
//! caller may retry the summarize action.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Guidance shown when a local file cannot be read from inside the page.
pub const LOCAL_FILE_UNSUPPORTED: &str =
    "Local file access not supported. Please enable file access in extension settings.";

/// Shown when a web page cannot be scripted.
pub const PAGE_UNAVAILABLE: &str = "Cannot summarize this page. Unable to access page content.";

/// Unified error types for the capture pipeline and its transport.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty URL).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Page context is not scriptable (restricted scheme, local file).
    /// Carries the guidance shown to the user.
    #[error("PROBE_UNAVAILABLE: {0}")]
    ProbeUnavailable(String),

    /// The viewport capturer rejected a call because of its rate limit.
    #[error("CAPTURE_QUOTA_EXCEEDED: {0}")]
    CaptureQuotaExceeded(String),

    /// No frame could be captured, including the single-shot fallback.
    #[error("CAPTURE_FAILED: {0}")]
    CaptureFailed(String),

    /// Every text extraction strategy declined.
    #[error("EXTRACTION_EXHAUSTED: {0}")]
    ExtractionExhausted(String),

    /// Network-level failure talking to the summarization service.
    #[error("TRANSPORT_FAILURE: {0}")]
    TransportFailure(String),

    /// The summarization service answered with a non-2xx status.
    #[error("SERVER_ERROR: {status}: {message}")]
    ServerError { status: u16, message: String },

    /// A capture session is already running for this tab.
    #[error("SESSION_IN_FLIGHT: {0}")]
    SessionInFlight(String),

    /// Render mode is disabled.
    #[error("RENDER_DISABLED")]
    RenderDisabled,

    /// Render failed.
    #[error("RENDER_FAILED: {0}")]
    RenderFailed(String),
}

impl Error {
    /// Message suitable for showing to the person who pressed "Summarize".
    pub fn user_message(&self) -> String {
        match self {
            Error::ProbeUnavailable(reason) if reason.trim().is_empty() => PAGE_UNAVAILABLE.to_string(),
            Error::ExtractionExhausted(reason) => format!("Unable to extract content: {reason}"),
            Error::TransportFailure(_) => {
                "Cannot connect to server. Make sure the summarization server is running.".to_string()
            }
            Error::ServerError { message, .. } => message.clone(),
            Error::CaptureQuotaExceeded(_) | Error::CaptureFailed(_) => {
                "Screenshot capture failed. The extension may need additional permissions.".to_string()
            }
            Error::SessionInFlight(_) => "A summary is already being generated for this page.".to_string(),
            Error::ProbeUnavailable(msg)
            | Error::InvalidInput(msg)
            | Error::InvalidUrl(msg)
            | Error::RenderFailed(msg) => msg.clone(),
            Error::RenderDisabled => "Render mode is disabled".to_string(),
        }
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::ExtractionExhausted(_) => -32000,
            Error::InvalidUrl(_) => -32003,
            Error::ProbeUnavailable(_) => -32004,
            Error::CaptureQuotaExceeded(_) => -32005,
            Error::CaptureFailed(_) => -32006,
            Error::TransportFailure(_) => -32007,
            Error::ServerError { .. } => -32008,
            Error::SessionInFlight(_) => -32009,
            Error::RenderDisabled => -32011,
            Error::RenderFailed(_) => -32012,
        };

        McpError { code: ErrorCode(code), message: err.user_message().into(), data: None }
    }
}
