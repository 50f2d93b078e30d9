//! JSON shapes exchanged with the summarization service.

use pagelens_core::{ContentChannel, FrameSequence, SummarizationRequest};
use serde::{Deserialize, Serialize};

/// Request body of `POST /summarize`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeBody<'a> {
    pub page_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_pdf: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direct_pdf_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_data: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<&'a FrameSequence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_instructions: Option<&'a str>,
}

impl<'a> From<&'a SummarizationRequest> for SummarizeBody<'a> {
    fn from(request: &'a SummarizationRequest) -> Self {
        let mut body = SummarizeBody {
            page_url: &request.page_url,
            html: None,
            extracted_text: None,
            is_pdf: None,
            direct_pdf_url: None,
            pdf_data: None,
            screenshot: request.screenshots.as_ref(),
            additional_instructions: request.additional_instructions.as_deref(),
        };

        // Server-side PDF handling is keyed on the flag: bytes and URLs need
        // it, extracted text is treated as plain text.
        match &request.channel {
            ContentChannel::Html(html) => body.html = Some(html),
            ContentChannel::ExtractedText(text) => {
                body.extracted_text = Some(text);
                body.is_pdf = Some(false);
            }
            ContentChannel::PdfData(data) => {
                body.pdf_data = Some(data);
                body.is_pdf = Some(true);
            }
            ContentChannel::DirectPdfUrl(url) => {
                body.direct_pdf_url = Some(url);
                body.is_pdf = Some(true);
            }
            ContentChannel::ScreenshotsOnly => body.is_pdf = Some(request.is_pdf),
        }
        body
    }
}

/// Success body; `summary` may be missing.
#[derive(Debug, Deserialize)]
pub struct SummarizeResponse {
    pub summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Human-readable message for a non-2xx response.
///
/// A JSON body is read for its `error` field; any other non-empty body is
/// used as plain text; everything else becomes `Server error <status>`.
pub fn error_message(status: u16, body: &[u8]) -> String {
    let fallback = || format!("Server error {status}");

    let Ok(text) = std::str::from_utf8(body) else {
        return fallback();
    };
    let text = text.trim();
    if text.is_empty() {
        return fallback();
    }

    if text.starts_with('{') || text.starts_with('[') {
        return serde_json::from_str::<ErrorBody>(text)
            .ok()
            .and_then(|b| b.error)
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(fallback);
    }

    text.to_string()
}
