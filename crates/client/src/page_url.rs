//! Page URL classification.
//!
//! ### Canonicalization
//! - Trim whitespace; reject empty input
//! - Lowercase the host and drop the fragment of http(s) URLs
//! - Keep `blob:` and `file:` URLs verbatim
//!
//! ### Pattern helpers
//! - Direct PDF: path ends in `.pdf`, contains a `/pdf/` segment, or is an
//!   arXiv PDF path
//! - Likely PDF: direct PDF, plus `pdf?`, `filetype=pdf`, and blob URLs
//! - Paginated list: Amazon order history

use url::Url;

/// Error type for page URL parsing failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// URL of the active page with classification helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUrl {
    raw: String,
    parsed: Url,
}

impl PageUrl {
    /// Parse and canonicalize a page URL.
    pub fn parse(input: &str) -> Result<Self, UrlError> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(UrlError::Empty);
        }

        let mut parsed = Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

        if matches!(parsed.scheme(), "http" | "https") {
            if let Some(host) = parsed.host_str() {
                let lowered = host.to_lowercase();
                parsed
                    .set_host(Some(&lowered))
                    .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
            }
            parsed.set_fragment(None);
            return Ok(Self { raw: parsed.to_string(), parsed });
        }

        Ok(Self { raw: trimmed.to_string(), parsed })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn scheme(&self) -> &str {
        self.parsed.scheme()
    }

    /// `file:` URL; the page usually cannot be scripted.
    pub fn is_local_file(&self) -> bool {
        self.scheme() == "file"
    }

    /// Transient `blob:` URL only resolvable inside its page.
    pub fn is_blob(&self) -> bool {
        self.scheme() == "blob"
    }

    /// Local resources the host may not be able to script.
    pub fn is_local_resource(&self) -> bool {
        self.is_local_file() || self.is_blob()
    }

    /// PDF the summarization server can download by itself.
    pub fn is_direct_pdf(&self) -> bool {
        if !matches!(self.scheme(), "http" | "https") {
            return false;
        }
        let path = self.parsed.path().to_lowercase();
        path.ends_with(".pdf") || path.contains("/pdf/") || self.is_arxiv_pdf()
    }

    /// URL patterns that usually point at a PDF document.
    pub fn is_likely_pdf(&self) -> bool {
        let lowered = self.raw.to_lowercase();
        self.is_direct_pdf()
            || self.is_blob()
            || lowered.contains("pdf?")
            || lowered.contains("filetype=pdf")
            || (self.is_local_file() && self.parsed.path().to_lowercase().ends_with(".pdf"))
    }

    /// List pages that paginate with a "next page" control.
    pub fn is_paginated_list(&self) -> bool {
        let host = self.parsed.host_str().unwrap_or_default();
        let on_amazon = host == "amazon.com" || host.ends_with(".amazon.com");
        on_amazon && self.parsed.path().contains("order-history")
    }

    fn is_arxiv_pdf(&self) -> bool {
        let host = self.parsed.host_str().unwrap_or_default();
        (host == "arxiv.org" || host.ends_with(".arxiv.org")) && self.parsed.path().starts_with("/pdf/")
    }
}

impl std::fmt::Display for PageUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> PageUrl {
        PageUrl::parse(s).unwrap()
    }

    #[test]
    fn test_parse_lowercases_host_and_drops_fragment() {
        let page = url("  https://EXAMPLE.com/Path?q=1#section  ");
        assert_eq!(page.as_str(), "https://example.com/Path?q=1");
    }

    #[test]
    fn test_parse_keeps_blob_verbatim() {
        let page = url("blob:https://mail.example.com/2f1c-44aa");
        assert_eq!(page.as_str(), "blob:https://mail.example.com/2f1c-44aa");
        assert!(page.is_blob());
        assert!(page.is_local_resource());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(PageUrl::parse("   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(PageUrl::parse("not a url"), Err(UrlError::InvalidUrl(_))));
    }

    #[test]
    fn test_direct_pdf_patterns() {
        assert!(url("https://arxiv.org/pdf/1234.5678").is_direct_pdf());
        assert!(url("https://example.com/files/report.PDF").is_direct_pdf());
        assert!(url("https://example.com/pdf/report").is_direct_pdf());
        assert!(!url("https://example.com/pdfs-explained").is_direct_pdf());
        assert!(!url("blob:https://example.com/abc").is_direct_pdf());
    }

    #[test]
    fn test_likely_pdf_patterns() {
        assert!(url("https://example.com/view?filetype=pdf").is_likely_pdf());
        assert!(url("https://example.com/download.pdf?version=2").is_likely_pdf());
        assert!(url("https://example.com/render/pdf?id=3").is_likely_pdf());
        assert!(url("blob:https://example.com/abc").is_likely_pdf());
        assert!(url("file:///home/me/paper.pdf").is_likely_pdf());
        assert!(!url("https://example.com/blog/post").is_likely_pdf());
    }

    #[test]
    fn test_local_file() {
        let page = url("file:///home/me/paper.pdf");
        assert!(page.is_local_file());
        assert!(!page.is_direct_pdf());
    }

    #[test]
    fn test_paginated_list() {
        assert!(url("https://www.amazon.com/gp/css/order-history?ref_=nav").is_paginated_list());
        assert!(url("https://amazon.com/your-orders/order-history").is_paginated_list());
        assert!(!url("https://www.amazon.com/dp/B000").is_paginated_list());
        assert!(!url("https://notamazon.com/order-history").is_paginated_list());
    }
}
