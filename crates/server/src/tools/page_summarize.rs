//! page_summarize tool implementation.
//!
//! Captures a page and sends it to the summarization service.

use chrono::Utc;
use pagelens_client::{PageHost, Summarizer};
use pagelens_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for page_summarize tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageSummarizeParams {
    /// The page to summarize (http, https or file URL).
    pub url: String,

    /// Extra guidance passed through to the summarization service.
    #[serde(default)]
    pub additional_instructions: Option<String>,
}

/// Output structure for page_summarize tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageSummarizeOutput {
    pub url: String,
    pub summary: String,
    /// Content channel that was sent.
    pub channel: String,
    pub is_pdf: bool,
    pub strategy: Option<String>,
    pub frame_count: usize,
    /// ISO8601 timestamp of when the summary was received.
    pub summarized_at: String,
}

/// Summarize the page currently loaded in `host`.
pub async fn summarize_page(
    summarizer: &Summarizer, host: &dyn PageHost, params: PageSummarizeParams,
) -> Result<PageSummarizeOutput, Error> {
    let instructions = params.additional_instructions.filter(|s| !s.trim().is_empty());
    let outcome = summarizer.summarize(host, instructions).await?;

    Ok(PageSummarizeOutput {
        url: outcome.page_url,
        summary: outcome.summary,
        channel: outcome.channel.to_string(),
        is_pdf: outcome.is_pdf,
        strategy: outcome.strategy.map(|s| s.as_str().to_string()),
        frame_count: outcome.frame_count,
        summarized_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    })
}

/// Implementation of the page_summarize tool.
pub async fn summarize_impl(
    summarizer: &Summarizer, host: &dyn PageHost, params: PageSummarizeParams,
) -> Result<CallToolResult, McpError> {
    let output = summarize_page(summarizer, host, params).await?;
    Ok(json_result(&output))
}
