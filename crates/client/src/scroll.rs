//! Scroll coordination.
//!
//! There is no reliable cross-page "scroll finished" signal, so every
//! scroll instruction is followed by a fixed settle wait. A
//! [`ScrollSession`] returns its target to offset 0 when released.

use std::time::Duration;

use crate::host::{HostError, PageHost, PageScript};

const SCROLL_TO: &str = r#"(offset, selector) => {
    if (selector) {
        const element = document.querySelector(selector);
        if (element) {
            element.scrollTop = offset;
            return 'container';
        }
    }
    window.scrollTo(0, offset);
    return 'document';
}"#;

/// What gets scrolled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollTarget {
    Document,
    /// A viewer element, addressed by CSS selector.
    Container(String),
}

impl ScrollTarget {
    fn selector(&self) -> Option<&str> {
        match self {
            ScrollTarget::Document => None,
            ScrollTarget::Container(selector) => Some(selector),
        }
    }
}

/// Script that scrolls `target` to `offset`.
pub fn scroll_script(target: &ScrollTarget, offset: u32) -> PageScript {
    PageScript::new("scroll_to", SCROLL_TO).arg(offset).arg(target.selector())
}

/// Issues scroll instructions and waits for rendering to settle.
#[derive(Debug, Clone, Copy)]
pub struct ScrollCoordinator {
    settle_delay: Duration,
}

impl ScrollCoordinator {
    pub fn new(settle_delay: Duration) -> Self {
        Self { settle_delay }
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Move `target` to `offset` without waiting.
    pub async fn scroll(&self, host: &dyn PageHost, target: &ScrollTarget, offset: u32) -> Result<(), HostError> {
        let landed = host.execute(&scroll_script(target, offset)).await?;
        if matches!(target, ScrollTarget::Container(_)) && landed.as_str() == Some("document") {
            tracing::warn!(?target, "viewer container vanished; scrolled the document instead");
        }
        Ok(())
    }

    /// Fixed wait after a scroll instruction.
    pub async fn settle(&self) {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
    }

    /// Return `target` to the origin.
    pub async fn restore(&self, host: &dyn PageHost, target: &ScrollTarget) -> Result<(), HostError> {
        self.scroll(host, target, 0).await
    }

    /// Start a session that restores `target` to the origin when released.
    pub fn session<'h>(&self, host: &'h dyn PageHost, target: ScrollTarget) -> ScrollSession<'h> {
        ScrollSession { coordinator: *self, host, target, released: false }
    }
}

/// Scoped use of a scroll target.
///
/// Call [`ScrollSession::release`] on every path; a session dropped
/// without release (e.g. a cancelled future) leaves the page where it was.
pub struct ScrollSession<'h> {
    coordinator: ScrollCoordinator,
    host: &'h dyn PageHost,
    target: ScrollTarget,
    released: bool,
}

impl ScrollSession<'_> {
    pub fn target(&self) -> &ScrollTarget {
        &self.target
    }

    pub async fn scroll(&self, offset: u32) -> Result<(), HostError> {
        self.coordinator.scroll(self.host, &self.target, offset).await
    }

    pub async fn settle(&self) {
        self.coordinator.settle().await;
    }

    /// Restore the scroll position to 0.
    pub async fn release(mut self) {
        self.released = true;
        if let Err(e) = self.coordinator.restore(self.host, &self.target).await {
            tracing::warn!(target = ?self.target, "failed to restore scroll position: {e}");
        }
    }
}

impl Drop for ScrollSession<'_> {
    fn drop(&mut self) {
        if !self.released {
            tracing::debug!(target = ?self.target, "scroll session dropped before release");
        }
    }
}
