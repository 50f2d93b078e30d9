//! Capture strategy selection.
//!
//! An ordered rule list, evaluated top to bottom; the first rule whose
//! predicate holds decides the strategy. Pure function of its inputs.

use pagelens_core::CaptureStrategy;

use crate::page_url::PageUrl;
use crate::probe::ProbeOutcome;

struct Rule {
    name: &'static str,
    applies: fn(&PageUrl, &ProbeOutcome) -> bool,
    strategy: CaptureStrategy,
}

const RULES: &[Rule] = &[
    Rule {
        name: "unscriptable_local_resource",
        applies: |url, probe| url.is_local_resource() && !probe.is_available(),
        strategy: CaptureStrategy::BlobHeuristic,
    },
    Rule {
        name: "overflowing_viewer_container",
        applies: |_, probe| probe.facts().is_some_and(|f| f.container_overflows()),
        strategy: CaptureStrategy::ContainerScroll,
    },
    Rule {
        name: "overflowing_document",
        applies: |_, probe| probe.facts().is_some_and(|f| f.document_overflows()),
        strategy: CaptureStrategy::DocumentScroll,
    },
];

/// Pick the capture strategy for a page.
///
/// Falls through to `SingleShot` when nothing needs scrolling, including
/// the tie `scroll_height == viewport_height`.
pub fn classify(url: &PageUrl, probe: &ProbeOutcome) -> CaptureStrategy {
    let strategy = RULES
        .iter()
        .find(|rule| (rule.applies)(url, probe))
        .map(|rule| {
            tracing::debug!(rule = rule.name, "capture strategy rule matched");
            rule.strategy
        })
        .unwrap_or(CaptureStrategy::SingleShot);

    tracing::debug!(url = %url, strategy = strategy.as_str(), "page classified");
    strategy
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagelens_core::PageLayoutFacts;

    fn url(s: &str) -> PageUrl {
        PageUrl::parse(s).unwrap()
    }

    fn document(scroll_height: u32, viewport_height: u32) -> ProbeOutcome {
        ProbeOutcome::Available(PageLayoutFacts { scroll_height, viewport_height, ..Default::default() })
    }

    fn container(scroll: u32, client: u32) -> ProbeOutcome {
        ProbeOutcome::Available(PageLayoutFacts {
            scroll_height: 900,
            viewport_height: 700,
            has_scrollable_container: true,
            container_selector: Some("#viewer".into()),
            container_scroll_height: scroll,
            container_client_height: client,
            ..Default::default()
        })
    }

    #[test]
    fn test_unprobed_local_file_uses_blob_heuristic() {
        let probe = ProbeOutcome::Unavailable("not scriptable".into());
        assert_eq!(classify(&url("file:///tmp/paper.pdf"), &probe), CaptureStrategy::BlobHeuristic);
        assert_eq!(classify(&url("blob:https://example.com/abc"), &probe), CaptureStrategy::BlobHeuristic);
    }

    #[test]
    fn test_unprobed_web_page_is_single_shot() {
        let probe = ProbeOutcome::Unavailable("restricted".into());
        assert_eq!(classify(&url("https://example.com"), &probe), CaptureStrategy::SingleShot);
    }

    #[test]
    fn test_probed_local_file_is_classified_by_layout() {
        assert_eq!(classify(&url("file:///tmp/a.pdf"), &document(2100, 700)), CaptureStrategy::DocumentScroll);
    }

    #[test]
    fn test_container_beats_document() {
        let strategy = classify(&url("https://example.com/viewer"), &container(5000, 700));
        assert_eq!(strategy, CaptureStrategy::ContainerScroll);
    }

    #[test]
    fn test_non_overflowing_container_falls_through() {
        assert_eq!(classify(&url("https://example.com"), &container(700, 700)), CaptureStrategy::DocumentScroll);
    }

    #[test]
    fn test_tall_document() {
        assert_eq!(classify(&url("https://example.com"), &document(2160, 720)), CaptureStrategy::DocumentScroll);
    }

    #[test]
    fn test_tie_is_single_shot() {
        assert_eq!(classify(&url("https://example.com"), &document(720, 720)), CaptureStrategy::SingleShot);
        assert_eq!(classify(&url("https://example.com"), &document(300, 720)), CaptureStrategy::SingleShot);
    }
}
