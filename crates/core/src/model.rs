//! Data model for a single summarize invocation.
//!
//! Everything here is created when the summarize action starts and dropped
//! once the summary (or an error) has been shown.

use std::time::Duration;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kind of document viewer detected in the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViewerKind {
    /// PDF.js (`window.PDFViewerApplication`).
    PdfJs,
    /// `<embed type="application/pdf">`.
    Embed,
    /// `<object type="application/pdf">`.
    Object,
    /// `<iframe>` pointing at a `.pdf` resource.
    Iframe,
    /// Canvas-rendered document without a text layer.
    Canvas,
    #[default]
    None,
}

impl ViewerKind {
    /// Whether the viewer marker on its own signals a PDF document.
    ///
    /// An iframe pointing at a PDF sits inside a regular page, so it does not.
    pub fn is_pdf_viewer(self) -> bool {
        matches!(self, ViewerKind::PdfJs | ViewerKind::Embed | ViewerKind::Object)
    }
}

/// Layout facts gathered from the page before capturing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLayoutFacts {
    /// `document.documentElement.scrollHeight` (or body, whichever is larger).
    pub scroll_height: u32,
    /// `window.innerHeight`.
    pub viewport_height: u32,
    pub has_scrollable_container: bool,
    pub container_selector: Option<String>,
    pub container_scroll_height: u32,
    pub container_client_height: u32,
    pub viewer_kind: ViewerKind,
}

impl PageLayoutFacts {
    /// Whether the dedicated container scrolls internally.
    pub fn container_overflows(&self) -> bool {
        self.has_scrollable_container
            && self.container_selector.is_some()
            && self.container_scroll_height > self.container_client_height
    }

    /// Whether the document itself is taller than the viewport.
    pub fn document_overflows(&self) -> bool {
        self.scroll_height > self.viewport_height
    }
}

/// How a capture session visits the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CaptureStrategy {
    /// One unscrolled capture of the visible viewport.
    SingleShot,
    /// Scroll the window from top to bottom.
    DocumentScroll,
    /// Scroll a viewer container element from top to bottom.
    ContainerScroll,
    /// Page cannot be probed; rely on raw bytes plus a single capture.
    BlobHeuristic,
}

impl CaptureStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            CaptureStrategy::SingleShot => "single_shot",
            CaptureStrategy::DocumentScroll => "document_scroll",
            CaptureStrategy::ContainerScroll => "container_scroll",
            CaptureStrategy::BlobHeuristic => "blob_heuristic",
        }
    }
}

/// Encoding requested from the viewport capturer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    /// Smaller frames; honours the configured quality.
    Jpeg,
}

impl ImageFormat {
    pub fn mime(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Limits and timings for one capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureLimits {
    pub max_frames: usize,
    /// Fixed wait after each scroll instruction.
    pub settle_delay: Duration,
    /// Wait between two captures, respecting the capturer's rate limit.
    pub inter_capture_delay: Duration,
    /// Frame encoding.
    pub format: ImageFormat,
    /// Encoder quality handed to the capturer (0-100).
    pub quality: u8,
    /// Stop once a "next page" control becomes visible.
    pub stop_at_next_page: bool,
}

impl CaptureLimits {
    /// Defaults for general web pages.
    pub fn general() -> Self {
        Self {
            max_frames: 10,
            settle_delay: Duration::from_millis(200),
            inter_capture_delay: Duration::from_millis(500),
            format: ImageFormat::Png,
            quality: 90,
            stop_at_next_page: false,
        }
    }

    /// Defaults for PDF viewers, which render more slowly.
    pub fn pdf() -> Self {
        Self { max_frames: 5, settle_delay: Duration::from_millis(300), ..Self::general() }
    }
}

impl Default for CaptureLimits {
    fn default() -> Self {
        Self::general()
    }
}

/// Captured frames in top-to-bottom visiting order.
///
/// Frames are data URLs (`data:image/png;base64,...`), the format the
/// summarization service expects in its `screenshot` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameSequence {
    frames: Vec<String>,
}

impl FrameSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next frame in visiting order.
    pub fn push(&mut self, frame: String) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.frames.iter().map(String::as_str)
    }

    /// Consume the sequence as a whole.
    pub fn into_frames(self) -> Vec<String> {
        self.frames
    }
}

impl From<Vec<String>> for FrameSequence {
    fn from(frames: Vec<String>) -> Self {
        Self { frames }
    }
}

/// Outcome of one PDF content extraction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    /// Text read directly from the viewer's DOM.
    TextExtracted(String),
    /// Raw document bytes, base64-encoded, for server-side parsing.
    BlobExtracted(String),
    /// URL the server can fetch the document from itself.
    DirectUrl(String),
    /// Nothing usable; the reason is human readable.
    Failed(String),
}

impl ExtractionResult {
    pub fn method(&self) -> &'static str {
        match self {
            ExtractionResult::TextExtracted(_) => "text_extraction",
            ExtractionResult::BlobExtracted(_) => "blob_data",
            ExtractionResult::DirectUrl(_) => "direct_url",
            ExtractionResult::Failed(_) => "none",
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, ExtractionResult::Failed(_))
    }
}

/// The single authoritative content channel of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentChannel {
    /// General web page: serialized DOM.
    Html(String),
    /// PDF text read from the viewer.
    ExtractedText(String),
    /// PDF bytes, base64-encoded.
    PdfData(String),
    /// PDF the server should download.
    DirectPdfUrl(String),
    /// Only screenshots are available.
    ScreenshotsOnly,
}

impl ContentChannel {
    pub fn name(&self) -> &'static str {
        match self {
            ContentChannel::Html(_) => "html",
            ContentChannel::ExtractedText(_) => "extracted_text",
            ContentChannel::PdfData(_) => "pdf_data",
            ContentChannel::DirectPdfUrl(_) => "direct_pdf_url",
            ContentChannel::ScreenshotsOnly => "screenshots",
        }
    }

    /// Build the channel for a successful extraction.
    ///
    /// Returns `None` for `ExtractionResult::Failed`.
    pub fn from_extraction(result: ExtractionResult) -> Option<Self> {
        match result {
            ExtractionResult::TextExtracted(text) => Some(ContentChannel::ExtractedText(text)),
            ExtractionResult::BlobExtracted(data) => Some(ContentChannel::PdfData(data)),
            ExtractionResult::DirectUrl(url) => Some(ContentChannel::DirectPdfUrl(url)),
            ExtractionResult::Failed(_) => None,
        }
    }
}

/// Everything sent to the summarization service for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizationRequest {
    pub page_url: String,
    pub channel: ContentChannel,
    /// Whether the page was handled on the PDF path.
    pub is_pdf: bool,
    pub screenshots: Option<FrameSequence>,
    pub additional_instructions: Option<String>,
}

impl SummarizationRequest {
    pub fn new(page_url: impl Into<String>, channel: ContentChannel) -> Self {
        Self { page_url: page_url.into(), channel, is_pdf: false, screenshots: None, additional_instructions: None }
    }

    pub fn pdf(mut self, is_pdf: bool) -> Self {
        self.is_pdf = is_pdf;
        self
    }

    pub fn with_screenshots(mut self, frames: FrameSequence) -> Self {
        if !frames.is_empty() {
            self.screenshots = Some(frames);
        }
        self
    }

    pub fn with_instructions(mut self, instructions: Option<String>) -> Self {
        self.additional_instructions = instructions.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn frame_count(&self) -> usize {
        self.screenshots.as_ref().map(FrameSequence::len).unwrap_or(0)
    }
}

/// Summary returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    pub received_at: DateTime<Utc>,
}
