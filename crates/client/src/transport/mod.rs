//! Summarization service client.
//!
//! ### Exchange
//! - One `POST` with a JSON body per request; no retries
//! - No timeout unless one is configured
//! - 2xx: `{"summary": ...}`; a missing summary yields a placeholder message
//! - non-2xx: JSON `error` field, then plain text, then `Server error <status>`
//!
//! Connection-level failures surface as [`Error::TransportFailure`] and HTTP
//! failures as [`Error::ServerError`], so callers can tell "cannot connect"
//! apart from "server rejected".

pub mod wire;

pub use wire::{SummarizeBody, error_message};

use chrono::Utc;
use pagelens_core::{AppConfig, Error, SummarizationRequest, SummaryResult};
use reqwest::header;
use std::time::{Duration, Instant};

/// Default summarization endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/summarize";

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "pagelens/0.1";

/// Shown in place of a summary when the service returned none.
pub const NO_CONTENT_MESSAGE: &str = "Error summarizing - no content returned.";

/// Transport configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub endpoint: String,
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self { endpoint: DEFAULT_ENDPOINT.to_string(), timeout: None, user_agent: DEFAULT_USER_AGENT.to_string() }
    }
}

impl From<&AppConfig> for TransportConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            timeout: config.request_timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Client for the summarization endpoint.
#[derive(Debug, Clone)]
pub struct TransportClient {
    http: reqwest::Client,
    config: TransportConfig,
}

impl TransportClient {
    pub fn new(config: TransportConfig) -> Result<Self, Error> {
        url::Url::parse(&config.endpoint).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.endpoint)))?;

        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::TransportFailure(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(TransportConfig::from(config))
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Send one request and return the summary.
    pub async fn send(&self, request: &SummarizationRequest) -> Result<SummaryResult, Error> {
        let start = Instant::now();
        let body = SummarizeBody::from(request);

        tracing::debug!(
            endpoint = %self.config.endpoint,
            channel = request.channel.name(),
            is_pdf = ?body.is_pdf,
            screenshots = request.frame_count(),
            "sending summarization request"
        );

        let response = self
            .http
            .post(&self.config.endpoint)
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.network_error(&e))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.network_error(&e))?;

        if !status.is_success() {
            let message = error_message(status.as_u16(), &bytes);
            tracing::warn!(status = status.as_u16(), %message, "summarization server rejected request");
            return Err(Error::ServerError { status: status.as_u16(), message });
        }

        let parsed: wire::SummarizeResponse = serde_json::from_slice(&bytes).map_err(|e| Error::ServerError {
            status: status.as_u16(),
            message: format!("invalid response body: {e}"),
        })?;

        let summary = match parsed.summary.filter(|s| !s.trim().is_empty()) {
            Some(summary) => summary,
            None => {
                tracing::warn!(status = status.as_u16(), "summarization server returned no summary");
                NO_CONTENT_MESSAGE.to_string()
            }
        };

        tracing::debug!("summary received in {:?}, {} chars", start.elapsed(), summary.len());
        Ok(SummaryResult { summary, received_at: Utc::now() })
    }

    fn network_error(&self, e: &reqwest::Error) -> Error {
        let detail = if e.is_connect() {
            format!("cannot connect to {}: {e}", self.config.endpoint)
        } else if e.is_timeout() {
            format!("request to {} timed out", self.config.endpoint)
        } else {
            format!("network error: {e}")
        };
        tracing::warn!("{detail}");
        Error::TransportFailure(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagelens_core::{ContentChannel, FrameSequence};
    use serde_json::{Value, json};
    use wiremock::matchers::{header as header_matcher, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TransportClient {
        TransportClient::new(TransportConfig { endpoint: format!("{}/summarize", server.uri()), ..Default::default() })
            .unwrap()
    }

    fn html_request() -> SummarizationRequest {
        SummarizationRequest::new("https://example.com/article", ContentChannel::Html("<p>hi</p>".into()))
            .with_screenshots(FrameSequence::from(vec!["data:image/png;base64,AA==".to_string()]))
    }

    #[tokio::test]
    async fn test_send_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/summarize"))
            .and(header_matcher("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "summary": "A short summary." })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server).send(&html_request()).await.unwrap();
        assert_eq!(result.summary, "A short summary.");
    }

    #[tokio::test]
    async fn test_send_posts_request_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/summarize"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "summary": "ok" })))
            .mount(&server)
            .await;

        client_for(&server).send(&html_request()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["pageUrl"], "https://example.com/article");
        assert_eq!(body["html"], "<p>hi</p>");
        assert_eq!(body["screenshot"].as_array().unwrap().len(), 1);
        assert!(body.get("isPdf").is_none());
    }

    #[tokio::test]
    async fn test_arxiv_direct_url_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "summary": "paper" })))
            .mount(&server)
            .await;

        let url = "https://arxiv.org/pdf/1234.5678";
        let request = SummarizationRequest::new(url, ContentChannel::DirectPdfUrl(url.into())).pdf(true);
        client_for(&server).send(&request).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["isPdf"], true);
        assert_eq!(body["directPdfUrl"], url);
    }

    #[tokio::test]
    async fn test_json_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "bad input" })))
            .mount(&server)
            .await;

        let err = client_for(&server).send(&html_request()).await.unwrap_err();
        assert!(matches!(err, Error::ServerError { status: 400, ref message } if message == "bad input"));
        assert_eq!(err.user_message(), "bad input");
    }

    #[tokio::test]
    async fn test_unparsable_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("{oops"))
            .mount(&server)
            .await;

        let err = client_for(&server).send(&html_request()).await.unwrap_err();
        assert!(matches!(err, Error::ServerError { status: 500, ref message } if message == "Server error 500"));
    }

    #[tokio::test]
    async fn test_plain_text_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("upstream model unavailable"))
            .mount(&server)
            .await;

        let err = client_for(&server).send(&html_request()).await.unwrap_err();
        assert_eq!(err.user_message(), "upstream model unavailable");
    }

    #[tokio::test]
    async fn test_missing_summary_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "done" })))
            .mount(&server)
            .await;

        let result = client_for(&server).send(&html_request()).await.unwrap();
        assert_eq!(result.summary, NO_CONTENT_MESSAGE);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_failure() {
        let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let endpoint = format!("http://127.0.0.1:{port}/summarize");

        let client = TransportClient::new(TransportConfig { endpoint, ..Default::default() }).unwrap();
        let err = client.send(&html_request()).await.unwrap_err();

        assert!(matches!(err, Error::TransportFailure(_)));
        assert!(err.user_message().starts_with("Cannot connect"));
    }

    #[test]
    fn test_invalid_endpoint() {
        let result = TransportClient::new(TransportConfig { endpoint: "not a url".into(), ..Default::default() });
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
