//! PDF content extraction.
//!
//! ### Order
//! 1. `file:` URL: read the bytes inside the page, nothing else
//! 2. Direct PDF URL: forward the URL for server-side download
//! 3. Text strategies from the viewer DOM, first acceptance wins
//! 4. `blob:` URL: read the bytes inside the page
//! 5. Failed with a human-readable reason
//!
//! ### Text strategies
//! Each entry pairs a page query with a pure handler. Text is accepted only
//! when it is longer than the configured minimum (100 characters by default);
//! shorter candidates fall through to the next entry. The canvas and embed
//! entries are sentinels: they end the cascade with a descriptive reason
//! instead of text.

pub mod scripts;

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pagelens_core::{ExtractionResult, LOCAL_FILE_UNSUPPORTED};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::host::{PageHost, PageScript};
use crate::page_url::PageUrl;

pub const DEFAULT_MIN_TEXT_CHARS: usize = 100;

pub const CANVAS_SENTINEL: &str = "Canvas-based PDF detected - text extraction not implemented";
pub const EMBED_SENTINEL: &str = "Embedded PDF detected - text extraction limited";
pub const EXTRACTION_EXHAUSTED: &str = "Unable to extract content from PDF";

/// Page number indicators such as "Page 3 of 12"
#[allow(clippy::expect_used)]
static PAGE_INDICATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Page \d+ of \d+").expect("valid regex"));

/// Viewer toolbar labels
#[allow(clippy::expect_used)]
static VIEWER_CONTROLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Zoom In|Zoom Out|Previous|Next|Print|Download").expect("valid regex"));

/// Zoom percentages
#[allow(clippy::expect_used)]
static PERCENTAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+%").expect("valid regex"));

/// What a text strategy made of its query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    Accept(String),
    Decline,
    /// Stop the cascade; the page has no extractable text.
    Sentinel(&'static str),
}

/// One entry of the text cascade.
pub struct TextStrategy {
    pub name: &'static str,
    script: fn() -> PageScript,
    handler: fn(&Value, usize) -> StrategyOutcome,
}

pub const TEXT_STRATEGIES: &[TextStrategy] = &[
    TextStrategy { name: "single_text_layer", script: scripts::first_text_layer, handler: accept_text },
    TextStrategy { name: "all_text_layers", script: scripts::text_layers, handler: join_text_layers },
    TextStrategy { name: "pdfjs_application", script: scripts::pdfjs_document, handler: pdfjs_placeholder },
    TextStrategy { name: "body_text", script: scripts::body_text, handler: filtered_body_text },
    TextStrategy { name: "page_number_element", script: scripts::page_number_text, handler: accept_text },
    TextStrategy { name: "canvas_sentinel", script: scripts::canvas_count, handler: canvas_sentinel },
    TextStrategy { name: "embed_sentinel", script: scripts::embedded_pdf, handler: embed_sentinel },
];

/// Extracts PDF content from the viewer page.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    min_chars: usize,
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_TEXT_CHARS)
    }
}

impl ContentExtractor {
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }

    pub fn min_chars(&self) -> usize {
        self.min_chars
    }

    /// Run one extraction attempt for a PDF page.
    pub async fn extract(&self, host: &dyn PageHost, url: &PageUrl) -> ExtractionResult {
        if url.is_local_file() {
            tracing::debug!(url = %url, "local file, reading bytes in page");
            return match self.fetch_blob(host, url).await {
                Some(data) => ExtractionResult::BlobExtracted(data),
                None => ExtractionResult::Failed(LOCAL_FILE_UNSUPPORTED.to_string()),
            };
        }

        if url.is_direct_pdf() {
            tracing::debug!(url = %url, "direct PDF url, skipping extraction");
            return ExtractionResult::DirectUrl(url.as_str().to_string());
        }

        let sentinel = match self.extract_text(host).await {
            StrategyOutcome::Accept(text) => return ExtractionResult::TextExtracted(text),
            StrategyOutcome::Sentinel(reason) => Some(reason),
            StrategyOutcome::Decline => None,
        };

        if url.is_blob()
            && let Some(data) = self.fetch_blob(host, url).await
        {
            return ExtractionResult::BlobExtracted(data);
        }

        let reason = sentinel.unwrap_or(EXTRACTION_EXHAUSTED);
        tracing::info!(url = %url, reason, "PDF extraction failed");
        ExtractionResult::Failed(reason.to_string())
    }

    /// Walk the text cascade until a strategy accepts or a sentinel fires.
    pub async fn extract_text(&self, host: &dyn PageHost) -> StrategyOutcome {
        for strategy in TEXT_STRATEGIES {
            let value = match host.execute(&(strategy.script)()).await {
                Ok(value) => value,
                Err(e) => {
                    tracing::debug!(strategy = strategy.name, "strategy query failed: {e}");
                    continue;
                }
            };

            match (strategy.handler)(&value, self.min_chars) {
                StrategyOutcome::Decline => {
                    tracing::debug!(strategy = strategy.name, "strategy declined");
                }
                outcome => {
                    tracing::debug!(strategy = strategy.name, "strategy finished the cascade");
                    return outcome;
                }
            }
        }
        StrategyOutcome::Decline
    }

    /// Base64 contents of a `blob:` or `file:` URL, read from inside the page.
    async fn fetch_blob(&self, host: &dyn PageHost, url: &PageUrl) -> Option<String> {
        let value = match host.execute(&scripts::fetch_blob(url.as_str())).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(url = %url, "blob fetch failed: {e}");
                return None;
            }
        };

        let data = value.as_str().map(str::trim).filter(|d| !d.is_empty())?;
        match STANDARD.decode(data) {
            Ok(bytes) if !bytes.is_empty() => {
                tracing::debug!(url = %url, bytes = bytes.len(), "blob fetched");
                Some(data.to_string())
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(url = %url, "blob fetch returned invalid base64: {e}");
                None
            }
        }
    }
}

/// Strip viewer chrome from whole-page text.
pub fn strip_boilerplate(text: &str) -> String {
    let text = PAGE_INDICATOR.replace_all(text, "");
    let text = VIEWER_CONTROLS.replace_all(&text, "");
    let text = PERCENTAGE.replace_all(&text, "");
    text.trim().to_string()
}

fn long_enough(text: &str, min_chars: usize) -> bool {
    text.chars().count() > min_chars
}

fn accept_text(value: &Value, min_chars: usize) -> StrategyOutcome {
    match value.as_str().map(str::trim) {
        Some(text) if long_enough(text, min_chars) => StrategyOutcome::Accept(text.to_string()),
        _ => StrategyOutcome::Decline,
    }
}

fn join_text_layers(value: &Value, min_chars: usize) -> StrategyOutcome {
    let layers = Vec::<String>::deserialize(value).unwrap_or_default();
    if layers.len() < 2 {
        return StrategyOutcome::Decline;
    }
    let joined = layers.join("\n");
    if long_enough(joined.trim(), min_chars) { StrategyOutcome::Accept(joined) } else { StrategyOutcome::Decline }
}

fn pdfjs_placeholder(value: &Value, _min_chars: usize) -> StrategyOutcome {
    if value.as_bool() == Some(true) {
        tracing::debug!("PDF.js document present; reading it directly is not supported");
    }
    StrategyOutcome::Decline
}

fn filtered_body_text(value: &Value, min_chars: usize) -> StrategyOutcome {
    match value.as_str() {
        Some(text) => {
            let filtered = strip_boilerplate(text);
            if long_enough(&filtered, min_chars) { StrategyOutcome::Accept(filtered) } else { StrategyOutcome::Decline }
        }
        None => StrategyOutcome::Decline,
    }
}

fn canvas_sentinel(value: &Value, _min_chars: usize) -> StrategyOutcome {
    if value.as_u64().is_some_and(|count| count > 0) {
        StrategyOutcome::Sentinel(CANVAS_SENTINEL)
    } else {
        StrategyOutcome::Decline
    }
}

fn embed_sentinel(value: &Value, _min_chars: usize) -> StrategyOutcome {
    if value.as_bool() == Some(true) { StrategyOutcome::Sentinel(EMBED_SENTINEL) } else { StrategyOutcome::Decline }
}
