//! MCP tool implementations.
//!
//! Tools work against any [`PageHost`](pagelens_client::PageHost); the
//! handler is responsible for loading the requested URL into the host
//! before calling them.

use pagelens_client::PageUrl;
use pagelens_core::Error;
use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

pub mod page_capture;
pub mod page_summarize;

pub use page_capture::{PageCaptureOutput, PageCaptureParams};
pub use page_summarize::{PageSummarizeOutput, PageSummarizeParams};

/// Validate the `url` argument of a tool call.
///
/// Only schemes a fresh tab can navigate to are accepted.
pub fn parse_target_url(url: &str) -> Result<PageUrl, Error> {
    let url = PageUrl::parse(url).map_err(|e| match e {
        pagelens_client::UrlError::Empty => Error::InvalidInput("url cannot be empty".into()),
        other => Error::InvalidUrl(other.to_string()),
    })?;

    match url.scheme() {
        "http" | "https" | "file" => Ok(url),
        scheme => Err(Error::InvalidInput(format!("unsupported scheme: {scheme}"))),
    }
}

fn json_result<T: Serialize>(output: &T) -> CallToolResult {
    CallToolResult::success(vec![Content::text(serde_json::to_string_pretty(output).unwrap_or_default())])
}

#[cfg(test)]
pub(crate) mod stub {
    use pagelens_client::{ActivePage, HostError, ImageFormat, PageHost, PageScript, encode_data_url};
    use pagelens_core::AppConfig;
    use serde_json::{Value, json};

    /// Scriptable page whose document fits in `viewport` unless `height` says otherwise.
    pub struct StubHost {
        pub url: String,
        pub height: u32,
        pub viewport: u32,
    }

    impl StubHost {
        pub fn page(url: &str, height: u32) -> Self {
            Self { url: url.to_string(), height, viewport: 720 }
        }
    }

    #[async_trait::async_trait]
    impl PageHost for StubHost {
        async fn active_page(&self) -> Result<ActivePage, HostError> {
            Ok(ActivePage { url: self.url.clone(), tab_id: "stub".into(), window_id: None })
        }

        async fn execute(&self, script: &PageScript) -> Result<Value, HostError> {
            Ok(match script.name() {
                "document_scroll_height" => json!(self.height),
                "viewport_height" => json!(self.viewport),
                "viewer_kind" => json!("none"),
                "outer_html" => json!("<html><body><p>stub page</p></body></html>"),
                "scroll_to" => json!("document"),
                "scroll_position" => json!(0),
                _ => Value::Null,
            })
        }

        async fn capture_visible(&self, format: ImageFormat, _quality: u8) -> Result<String, HostError> {
            Ok(encode_data_url(format, b"frame"))
        }
    }

    pub fn instant_config(endpoint: &str) -> AppConfig {
        AppConfig {
            endpoint: endpoint.to_string(),
            settle_delay_ms: 0,
            pdf_settle_delay_ms: 0,
            inter_capture_delay_ms: 0,
            ..AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_url_is_invalid_input() {
        assert!(matches!(parse_target_url("  "), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_malformed_url_is_invalid_url() {
        assert!(matches!(parse_target_url("not a url"), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_unsupported_scheme_rejected() {
        assert!(matches!(parse_target_url("chrome://settings"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_web_and_file_urls_accepted() {
        assert_eq!(parse_target_url("https://Example.com/a#top").unwrap().as_str(), "https://example.com/a");
        assert!(parse_target_url("file:///tmp/report.pdf").is_ok());
    }
}
