//! Read-only page-context snippets used by the probe.
//!
//! Each snippet answers one question about the page and never mutates it.

use crate::host::PageScript;

/// Selectors of known document viewer containers, in preference order.
pub const VIEWER_CONTAINER_SELECTORS: &[&str] = &[
    ".pdfViewer",
    "#viewer",
    ".pdf-container",
    ".document-container",
    ".page-container",
    "embed",
    "object",
    "iframe",
];

const DOCUMENT_SCROLL_HEIGHT: &str = r#"() => Math.max(
    document.documentElement ? document.documentElement.scrollHeight : 0,
    document.body ? document.body.scrollHeight : 0
)"#;

const VIEWPORT_HEIGHT: &str = "() => window.innerHeight";

const VIEWER_KIND: &str = r#"() => {
    if (window.PDFViewerApplication) return 'pdf_js';
    if (document.querySelector('embed[type="application/pdf"]')) return 'embed';
    if (document.querySelector('object[type="application/pdf"]')) return 'object';
    if (document.querySelector('iframe[src*=".pdf"]')) return 'iframe';
    if (document.querySelectorAll('canvas').length > 0) return 'canvas';
    return 'none';
}"#;

const VIEWER_CONTAINER: &str = r#"(selectors) => {
    for (const selector of selectors) {
        const element = document.querySelector(selector);
        if (element) {
            return {
                selector: selector,
                scrollHeight: element.scrollHeight || 0,
                clientHeight: element.clientHeight || 0
            };
        }
    }
    let best = null;
    let maxScrollHeight = 0;
    for (const element of document.querySelectorAll('body *')) {
        const overflowY = getComputedStyle(element).overflowY;
        if (overflowY !== 'auto' && overflowY !== 'scroll') continue;
        if (element.scrollHeight > element.clientHeight && element.scrollHeight > maxScrollHeight) {
            maxScrollHeight = element.scrollHeight;
            best = element;
        }
    }
    if (!best) return null;
    let selector = best.tagName.toLowerCase();
    if (best.id) {
        selector = '#' + CSS.escape(best.id);
    } else if (best.classList.length > 0) {
        selector += '.' + Array.from(best.classList).map((c) => CSS.escape(c)).join('.');
    }
    return { selector: selector, scrollHeight: best.scrollHeight, clientHeight: best.clientHeight };
}"#;

const NEXT_PAGE_VISIBLE: &str = r#"() => {
    const candidates = document.querySelectorAll(
        '.a-pagination .a-last, a[rel="next"], [aria-label="Next page"], [aria-label="Go to next page"]'
    );
    for (const element of candidates) {
        const rect = element.getBoundingClientRect();
        if (rect.width > 0 && rect.height > 0 && rect.top >= 0 && rect.bottom <= window.innerHeight) {
            return true;
        }
    }
    return false;
}"#;

const OUTER_HTML: &str = "() => document.documentElement.outerHTML";

const SCROLL_POSITION: &str = r#"(selector) => {
    if (selector) {
        const element = document.querySelector(selector);
        return element ? element.scrollTop : 0;
    }
    return window.scrollY;
}"#;

pub fn document_scroll_height() -> PageScript {
    PageScript::new("document_scroll_height", DOCUMENT_SCROLL_HEIGHT)
}

pub fn viewport_height() -> PageScript {
    PageScript::new("viewport_height", VIEWPORT_HEIGHT)
}

pub fn viewer_kind() -> PageScript {
    PageScript::new("viewer_kind", VIEWER_KIND)
}

pub fn viewer_container() -> PageScript {
    PageScript::new("viewer_container", VIEWER_CONTAINER).arg(VIEWER_CONTAINER_SELECTORS.to_vec())
}

pub fn next_page_visible() -> PageScript {
    PageScript::new("next_page_visible", NEXT_PAGE_VISIBLE)
}

pub fn outer_html() -> PageScript {
    PageScript::new("outer_html", OUTER_HTML)
}

pub fn scroll_position(selector: Option<&str>) -> PageScript {
    PageScript::new("scroll_position", SCROLL_POSITION).arg(selector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewer_container_passes_selectors() {
        let script = viewer_container();
        let selectors = script.args()[0].as_array().unwrap();
        assert_eq!(selectors.len(), VIEWER_CONTAINER_SELECTORS.len());
        assert_eq!(selectors[0], ".pdfViewer");
    }

    #[test]
    fn test_scroll_position_null_selector() {
        assert_eq!(scroll_position(None).args()[0], serde_json::Value::Null);
        assert_eq!(scroll_position(Some("#viewer")).args()[0], "#viewer");
    }

    #[test]
    fn test_snippets_are_function_expressions() {
        for script in [document_scroll_height(), viewport_height(), viewer_kind(), next_page_visible(), outer_html()] {
            assert!(script.to_expression().starts_with("(("), "{} is not invoked as a function", script.name());
        }
    }
}
