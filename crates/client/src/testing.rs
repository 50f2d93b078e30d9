//! Scripted in-memory host for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use pagelens_core::ViewerKind;
use serde_json::{Value, json};
use tokio::time::Instant;

use crate::host::{ActivePage, HostError, ImageFormat, PageHost, PageScript, decode_data_url, encode_data_url};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FakeEvent {
    Scroll(u32),
    Capture(u32),
}

struct State {
    url: String,
    scroll_height: u32,
    viewport_height: u32,
    container: Option<(String, u32, u32)>,
    viewer_kind: ViewerKind,
    document_scroll: u32,
    container_scroll: u32,
    container_active: bool,
    unscriptable: bool,
    scroll_failure: bool,
    scripts: HashMap<&'static str, Result<Value, HostError>>,
    capture_failure: Option<(usize, Option<usize>, HostError)>,
    capture_calls: usize,
    next_page_after: Option<usize>,
    executed: Vec<&'static str>,
    events: Vec<(Instant, FakeEvent)>,
}

pub(crate) struct FakeHost {
    state: Mutex<State>,
}

impl FakeHost {
    /// Plain page whose document scrolls.
    pub(crate) fn document(scroll_height: u32, viewport_height: u32) -> Self {
        Self {
            state: Mutex::new(State {
                url: "https://example.com/article".into(),
                scroll_height,
                viewport_height,
                container: None,
                viewer_kind: ViewerKind::None,
                document_scroll: 0,
                container_scroll: 0,
                container_active: false,
                unscriptable: false,
                scroll_failure: false,
                scripts: HashMap::new(),
                capture_failure: None,
                capture_calls: 0,
                next_page_after: None,
                executed: Vec::new(),
                events: Vec::new(),
            }),
        }
    }

    /// Page whose content scrolls inside a viewer element.
    pub(crate) fn container(selector: &str, scroll_height: u32, client_height: u32) -> Self {
        let host = Self::document(client_height, client_height);
        host.state().container = Some((selector.to_string(), scroll_height, client_height));
        host
    }

    pub(crate) fn with_url(self, url: &str) -> Self {
        self.state().url = url.to_string();
        self
    }

    pub(crate) fn with_viewer(self, kind: ViewerKind) -> Self {
        self.state().viewer_kind = kind;
        self
    }

    /// Every script fails as it would on a restricted page; capture still works.
    pub(crate) fn unscriptable(self) -> Self {
        self.state().unscriptable = true;
        self
    }

    /// Fixed result for a named script.
    pub(crate) fn with_script(self, name: &'static str, value: Value) -> Self {
        self.state().scripts.insert(name, Ok(value));
        self
    }

    pub(crate) fn with_script_error(self, name: &'static str, error: HostError) -> Self {
        self.state().scripts.insert(name, Err(error));
        self
    }

    /// Capture calls with index in `from..until` fail with `error`.
    pub(crate) fn failing_captures(self, from: usize, until: Option<usize>, error: HostError) -> Self {
        self.state().capture_failure = Some((from, until, error));
        self
    }

    pub(crate) fn fail_all_captures(self) -> Self {
        self.failing_captures(0, None, HostError::Capture("tab capture failed".into()))
    }

    /// A "next page" control becomes visible once `captures` frames were taken.
    pub(crate) fn next_page_after(self, captures: usize) -> Self {
        self.state().next_page_after = Some(captures);
        self
    }

    /// Scroll instructions issued from now on fail.
    pub(crate) fn fail_scrolls(&self) {
        self.state().scroll_failure = true;
    }

    pub(crate) fn scroll_offsets(&self) -> Vec<u32> {
        self.events()
            .into_iter()
            .filter_map(|(_, e)| match e {
                FakeEvent::Scroll(offset) => Some(offset),
                FakeEvent::Capture(_) => None,
            })
            .collect()
    }

    pub(crate) fn events(&self) -> Vec<(Instant, FakeEvent)> {
        self.state().events.clone()
    }

    pub(crate) fn capture_calls(&self) -> usize {
        self.state().capture_calls
    }

    /// Names of every script run so far, in order.
    pub(crate) fn executed(&self) -> Vec<&'static str> {
        self.state().executed.clone()
    }

    pub(crate) fn document_scroll(&self) -> u32 {
        self.state().document_scroll
    }

    pub(crate) fn container_scroll(&self) -> u32 {
        self.state().container_scroll
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

/// Offset a fake frame was captured at.
pub(crate) fn frame_offset(data_url: &str) -> u32 {
    let (_, bytes) = decode_data_url(data_url).unwrap();
    let label = String::from_utf8(bytes).unwrap();
    label.strip_prefix("frame@").unwrap().parse().unwrap()
}

fn viewer_kind_name(kind: ViewerKind) -> &'static str {
    match kind {
        ViewerKind::PdfJs => "pdf_js",
        ViewerKind::Embed => "embed",
        ViewerKind::Object => "object",
        ViewerKind::Iframe => "iframe",
        ViewerKind::Canvas => "canvas",
        ViewerKind::None => "none",
    }
}

#[async_trait::async_trait]
impl PageHost for FakeHost {
    async fn active_page(&self) -> Result<ActivePage, HostError> {
        let state = self.state();
        Ok(ActivePage { url: state.url.clone(), tab_id: "tab-1".into(), window_id: Some("window-1".into()) })
    }

    async fn execute(&self, script: &PageScript) -> Result<Value, HostError> {
        let mut state = self.state();
        state.executed.push(script.name());

        if state.unscriptable {
            return Err(HostError::NotScriptable(state.url.clone()));
        }
        if let Some(result) = state.scripts.get(script.name()) {
            return result.clone();
        }

        let value = match script.name() {
            "document_scroll_height" => json!(state.scroll_height),
            "viewport_height" => json!(state.viewport_height),
            "viewer_kind" => json!(viewer_kind_name(state.viewer_kind)),
            "viewer_container" => match &state.container {
                Some((selector, scroll, client)) => {
                    json!({ "selector": selector, "scrollHeight": scroll, "clientHeight": client })
                }
                None => Value::Null,
            },
            "next_page_visible" => json!(state.next_page_after.is_some_and(|n| state.capture_calls >= n)),
            "outer_html" => json!("<html><body><p>fake page</p></body></html>"),
            "scroll_position" => {
                if script.args()[0].is_string() {
                    json!(state.container_scroll)
                } else {
                    json!(state.document_scroll)
                }
            }
            "scroll_to" => {
                if state.scroll_failure {
                    return Err(HostError::Script("scroll rejected".into()));
                }
                let offset = script.args()[0].as_u64().unwrap_or(0) as u32;
                let selector = script.args()[1].as_str();
                let in_container = state.container.as_ref().is_some_and(|(s, _, _)| Some(s.as_str()) == selector);
                state.events.push((Instant::now(), FakeEvent::Scroll(offset)));
                if in_container {
                    state.container_scroll = offset;
                    state.container_active = true;
                    json!("container")
                } else {
                    state.document_scroll = offset;
                    state.container_active = false;
                    json!("document")
                }
            }
            _ => Value::Null,
        };
        Ok(value)
    }

    async fn capture_visible(&self, format: ImageFormat, _quality: u8) -> Result<String, HostError> {
        let mut state = self.state();
        let call = state.capture_calls;
        state.capture_calls += 1;

        if let Some((from, until, error)) = &state.capture_failure
            && call >= *from
            && until.is_none_or(|u| call < u)
        {
            return Err(error.clone());
        }

        let offset = if state.container_active { state.container_scroll } else { state.document_scroll };
        state.events.push((Instant::now(), FakeEvent::Capture(offset)));
        Ok(encode_data_url(format, format!("frame@{offset}").as_bytes()))
    }
}
