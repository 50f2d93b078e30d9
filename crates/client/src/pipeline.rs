//! Summarize action for the active page.
//!
//! ### PDF path
//! Taken when the URL looks like a PDF or the probe found a PDF viewer.
//! Extraction runs first; a usable result skips capture entirely. When
//! extraction fails the page is captured with the PDF limits and sent as
//! screenshots only.
//!
//! ### General path
//! The serialized DOM is the content channel; screenshots of the page go
//! along with it. Paginated list pages stop capturing once a "next page"
//! control is visible. A page is never on both paths. A local file that
//! cannot be scripted has no DOM to send and goes out as one screenshot.

use pagelens_core::{
    AppConfig, CaptureStrategy, ContentChannel, Error, ExtractionResult, LOCAL_FILE_UNSUPPORTED, PAGE_UNAVAILABLE,
    SummarizationRequest,
};

use crate::capture::CaptureLoop;
use crate::classify::classify;
use crate::extract::ContentExtractor;
use crate::host::PageHost;
use crate::page_url::PageUrl;
use crate::probe::{PageProbe, ProbeOutcome};
use crate::transport::TransportClient;

/// Request built for the active page, before it is sent.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub request: SummarizationRequest,
    /// Capture strategy used, if the page was captured.
    pub strategy: Option<CaptureStrategy>,
    /// How extraction ended on the PDF path.
    pub extraction: Option<ExtractionResult>,
}

/// Result of a summarize action.
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub summary: String,
    pub page_url: String,
    pub channel: &'static str,
    pub is_pdf: bool,
    pub strategy: Option<CaptureStrategy>,
    pub frame_count: usize,
}

/// Runs probe, extraction, capture and transport for one page.
#[derive(Debug, Clone)]
pub struct Summarizer {
    config: AppConfig,
    extractor: ContentExtractor,
    transport: TransportClient,
}

impl Summarizer {
    pub fn new(config: AppConfig, transport: TransportClient) -> Self {
        let extractor = ContentExtractor::new(config.min_text_chars);
        Self { config, extractor, transport }
    }

    pub fn from_config(config: AppConfig) -> Result<Self, Error> {
        let transport = TransportClient::from_config(&config)?;
        Ok(Self::new(config, transport))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Build the request for the active page without sending it.
    pub async fn prepare(&self, host: &dyn PageHost, instructions: Option<String>) -> Result<PreparedRequest, Error> {
        let active = host.active_page().await.map_err(|e| Error::ProbeUnavailable(e.to_string()))?;
        let url = PageUrl::parse(&active.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let probe = PageProbe::new(host).probe().await;

        let viewer_is_pdf = probe.facts().is_some_and(|f| f.viewer_kind.is_pdf_viewer());
        let prepared = if url.is_likely_pdf() || viewer_is_pdf {
            self.prepare_pdf(host, &url, &probe).await?
        } else {
            self.prepare_page(host, &url, &probe).await?
        };

        Ok(PreparedRequest { request: prepared.request.with_instructions(instructions), ..prepared })
    }

    /// Summarize the active page.
    pub async fn summarize(&self, host: &dyn PageHost, instructions: Option<String>) -> Result<SummaryOutcome, Error> {
        let prepared = self.prepare(host, instructions).await?;
        let request = &prepared.request;

        tracing::info!(
            url = %request.page_url,
            channel = request.channel.name(),
            frames = request.frame_count(),
            "sending page for summarization"
        );
        let result = self.transport.send(request).await?;

        Ok(SummaryOutcome {
            summary: result.summary,
            page_url: request.page_url.clone(),
            channel: request.channel.name(),
            is_pdf: request.is_pdf,
            strategy: prepared.strategy,
            frame_count: request.frame_count(),
        })
    }

    async fn prepare_pdf(
        &self, host: &dyn PageHost, url: &PageUrl, probe: &ProbeOutcome,
    ) -> Result<PreparedRequest, Error> {
        let extraction = self.extractor.extract(host, url).await;
        tracing::debug!(url = %url, method = extraction.method(), "PDF extraction finished");

        if let Some(channel) = ContentChannel::from_extraction(extraction.clone()) {
            let request = SummarizationRequest::new(url.as_str(), channel).pdf(true);
            return Ok(PreparedRequest { request, strategy: None, extraction: Some(extraction) });
        }

        let reason = match &extraction {
            ExtractionResult::Failed(reason) => reason.clone(),
            _ => String::new(),
        };

        let strategy = classify(url, probe);
        let limits = self.config.capture_limits(true);
        let frames = match CaptureLoop::new(host).capture(strategy, probe.facts(), &limits).await {
            Ok(frames) => frames,
            Err(Error::CaptureQuotaExceeded(e)) => return Err(Error::CaptureQuotaExceeded(e)),
            Err(e) if url.is_local_file() => {
                tracing::warn!(url = %url, "local file capture failed: {e}");
                return Err(Error::ProbeUnavailable(LOCAL_FILE_UNSUPPORTED.to_string()));
            }
            Err(e) => return Err(Error::ExtractionExhausted(format!("{reason}; {e}"))),
        };

        tracing::info!(url = %url, reason = %reason, frames = frames.len(), "falling back to PDF screenshots");
        let request = SummarizationRequest::new(url.as_str(), ContentChannel::ScreenshotsOnly)
            .pdf(true)
            .with_screenshots(frames);
        Ok(PreparedRequest { request, strategy: Some(strategy), extraction: Some(extraction) })
    }

    async fn prepare_page(
        &self, host: &dyn PageHost, url: &PageUrl, probe: &ProbeOutcome,
    ) -> Result<PreparedRequest, Error> {
        if !probe.is_available() {
            if url.is_local_file() {
                return self.prepare_local_screenshot(host, url, probe).await;
            }
            return Err(Error::ProbeUnavailable(PAGE_UNAVAILABLE.to_string()));
        }
        let html = PageProbe::new(host).outer_html().await.map_err(|e| {
            tracing::warn!(url = %url, "outer HTML unavailable: {e}");
            Error::ProbeUnavailable(PAGE_UNAVAILABLE.to_string())
        })?;

        let strategy = classify(url, probe);
        let mut limits = self.config.capture_limits(false);
        limits.stop_at_next_page = url.is_paginated_list();

        let frames = CaptureLoop::new(host).capture(strategy, probe.facts(), &limits).await?;
        let request = SummarizationRequest::new(url.as_str(), ContentChannel::Html(html)).with_screenshots(frames);
        Ok(PreparedRequest { request, strategy: Some(strategy), extraction: None })
    }

    /// Unscriptable local page: no DOM, so a single screenshot is all there is to send.
    async fn prepare_local_screenshot(
        &self, host: &dyn PageHost, url: &PageUrl, probe: &ProbeOutcome,
    ) -> Result<PreparedRequest, Error> {
        let strategy = classify(url, probe);
        let limits = self.config.capture_limits(false);
        let frames = match CaptureLoop::new(host).capture(strategy, probe.facts(), &limits).await {
            Ok(frames) => frames,
            Err(Error::CaptureQuotaExceeded(e)) => return Err(Error::CaptureQuotaExceeded(e)),
            Err(e) => {
                tracing::warn!(url = %url, "local file capture failed: {e}");
                return Err(Error::ProbeUnavailable(LOCAL_FILE_UNSUPPORTED.to_string()));
            }
        };

        tracing::info!(url = %url, frames = frames.len(), "local page sent as screenshots");
        let request =
            SummarizationRequest::new(url.as_str(), ContentChannel::ScreenshotsOnly).with_screenshots(frames);
        Ok(PreparedRequest { request, strategy: Some(strategy), extraction: None })
    }
}
