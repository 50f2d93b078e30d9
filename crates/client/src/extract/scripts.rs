//! Page-context snippets used by the PDF extractor.

use crate::host::PageScript;

const FIRST_TEXT_LAYER: &str = r#"() => {
    const layer = document.querySelector('.textLayer');
    return layer ? layer.innerText : null;
}"#;

const TEXT_LAYERS: &str =
    r#"() => Array.from(document.querySelectorAll('.textLayer')).map((layer) => layer.innerText)"#;

const PDFJS_DOCUMENT: &str = r#"() => Boolean(window.PDFViewerApplication && window.PDFViewerApplication.pdfDocument)"#;

const BODY_TEXT: &str = r#"() => (document.body ? document.body.innerText : null)"#;

const PAGE_NUMBER_TEXT: &str = r#"() => {
    const element = document.querySelector('[data-page-number]');
    return element ? element.innerText : null;
}"#;

const CANVAS_COUNT: &str = "() => document.querySelectorAll('canvas').length";

const EMBEDDED_PDF: &str = r#"() => Boolean(
    document.querySelector('embed[type="application/pdf"]') ||
    document.querySelector('object[type="application/pdf"]')
)"#;

const FETCH_BLOB: &str = r#"async (url) => {
    const response = await fetch(url);
    if (!response.ok) {
        throw new Error('HTTP error ' + response.status);
    }
    const buffer = await response.arrayBuffer();
    if (buffer.byteLength === 0) {
        throw new Error('empty buffer');
    }
    const bytes = new Uint8Array(buffer);
    const chunk = 0x8000;
    let binary = '';
    for (let i = 0; i < bytes.length; i += chunk) {
        binary += String.fromCharCode.apply(null, bytes.subarray(i, i + chunk));
    }
    return btoa(binary);
}"#;

pub fn first_text_layer() -> PageScript {
    PageScript::new("first_text_layer", FIRST_TEXT_LAYER)
}

pub fn text_layers() -> PageScript {
    PageScript::new("text_layers", TEXT_LAYERS)
}

pub fn pdfjs_document() -> PageScript {
    PageScript::new("pdfjs_document", PDFJS_DOCUMENT)
}

pub fn body_text() -> PageScript {
    PageScript::new("body_text", BODY_TEXT)
}

pub fn page_number_text() -> PageScript {
    PageScript::new("page_number_text", PAGE_NUMBER_TEXT)
}

pub fn canvas_count() -> PageScript {
    PageScript::new("canvas_count", CANVAS_COUNT)
}

pub fn embedded_pdf() -> PageScript {
    PageScript::new("embedded_pdf", EMBEDDED_PDF)
}

/// Read a blob or file URL from inside the page and return it base64-encoded.
pub fn fetch_blob(url: &str) -> PageScript {
    PageScript::new("fetch_blob", FETCH_BLOB).arg(url)
}
