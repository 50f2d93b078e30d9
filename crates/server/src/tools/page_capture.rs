//! page_capture tool implementation.
//!
//! Runs probe, classification, extraction and capture for a page and
//! reports what would be sent, without contacting the summarization service.

use chrono::Utc;
use pagelens_client::{PageHost, Summarizer};
use pagelens_core::{ContentChannel, Error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for page_capture tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageCaptureParams {
    /// The page to capture (http, https or file URL).
    pub url: String,

    /// Include the captured frames as data URLs in the output.
    #[serde(default)]
    pub include_frames: bool,
}

/// Output structure for page_capture tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageCaptureOutput {
    /// Canonical URL of the captured page.
    pub url: String,
    /// Content channel that would be sent: html, extracted_text, pdf_data,
    /// direct_pdf_url or screenshots.
    pub channel: String,
    pub is_pdf: bool,
    /// Capture strategy, absent when PDF extraction made capture unnecessary.
    pub strategy: Option<String>,
    pub frame_count: usize,
    /// PDF extraction method, if extraction ran.
    pub extraction: Option<String>,
    /// Length of the textual content channel in characters.
    pub content_chars: Option<usize>,
    /// Captured frames (only if include_frames=true).
    pub frames: Option<Vec<String>>,
    /// ISO8601 timestamp of the capture.
    pub captured_at: String,
}

/// Capture the page currently loaded in `host`.
pub async fn capture_page(
    summarizer: &Summarizer, host: &dyn PageHost, params: &PageCaptureParams,
) -> Result<PageCaptureOutput, Error> {
    let prepared = summarizer.prepare(host, None).await?;
    let request = &prepared.request;

    let content_chars = match &request.channel {
        ContentChannel::Html(text) | ContentChannel::ExtractedText(text) => Some(text.chars().count()),
        _ => None,
    };

    let frames = params
        .include_frames
        .then(|| request.screenshots.iter().flat_map(|s| s.iter()).map(str::to_string).collect());

    Ok(PageCaptureOutput {
        url: request.page_url.clone(),
        channel: request.channel.name().to_string(),
        is_pdf: request.is_pdf,
        strategy: prepared.strategy.map(|s| s.as_str().to_string()),
        frame_count: request.frame_count(),
        extraction: prepared.extraction.as_ref().map(|e| e.method().to_string()),
        content_chars,
        frames,
        captured_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    })
}

/// Implementation of the page_capture tool.
pub async fn capture_impl(
    summarizer: &Summarizer, host: &dyn PageHost, params: PageCaptureParams,
) -> Result<CallToolResult, McpError> {
    let output = capture_page(summarizer, host, &params).await?;
    tracing::info!(url = %output.url, channel = %output.channel, frames = output.frame_count, "page captured");
    Ok(json_result(&output))
}
