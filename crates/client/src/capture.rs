//! Paginated viewport capture.
//!
//! ### Loop
//! For each frame `i` of the plan: scroll the target to `i * viewport`,
//! wait the settle delay, capture the viewport, then wait the inter-capture
//! delay unless it was the last frame. The viewport capturer is rate
//! limited by the browser, so there is no parallel fan-out.
//!
//! ### Failure
//! A failing frame aborts the loop but keeps the frames already taken. With
//! zero frames the loop falls back to one unscrolled capture; only when
//! that fails too does the session end `Aborted`.

use pagelens_core::{CaptureLimits, CaptureStrategy, Error, FrameSequence, PageLayoutFacts};

use crate::host::{HostError, PageHost};
use crate::probe::PageProbe;
use crate::scroll::{ScrollCoordinator, ScrollTarget};

/// Capture session states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Scrolling,
    Settling,
    Capturing,
    Done,
    Aborted,
}

/// Outcome of one capture session.
#[derive(Debug, Clone)]
pub struct CaptureReport {
    pub frames: FrameSequence,
    /// Frames the plan called for before any early stop or failure.
    pub planned: usize,
    pub state: CaptureState,
    /// A "next page" control ended the loop.
    pub stopped_early: bool,
    /// The scrolled loop produced nothing and a single capture was used.
    pub fell_back: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ScrollPlan {
    target: ScrollTarget,
    step: u32,
    frames: usize,
}

/// Number of viewports needed to cover `content`, clamped to `max_frames`.
pub fn frames_needed(content_height: u32, viewport_height: u32, max_frames: usize) -> usize {
    if viewport_height == 0 {
        return 1;
    }
    let needed = content_height.div_ceil(viewport_height).max(1) as usize;
    needed.min(max_frames.max(1))
}

/// Drives scroll-settle-capture rounds against a host.
pub struct CaptureLoop<'h> {
    host: &'h dyn PageHost,
}

impl<'h> CaptureLoop<'h> {
    pub fn new(host: &'h dyn PageHost) -> Self {
        Self { host }
    }

    /// Capture the page and return the frames in visiting order.
    pub async fn capture(
        &self, strategy: CaptureStrategy, facts: Option<&PageLayoutFacts>, limits: &CaptureLimits,
    ) -> Result<FrameSequence, Error> {
        self.run(strategy, facts, limits).await.map(|report| report.frames)
    }

    /// Capture the page and report how the session went.
    pub async fn run(
        &self, strategy: CaptureStrategy, facts: Option<&PageLayoutFacts>, limits: &CaptureLimits,
    ) -> Result<CaptureReport, Error> {
        let Some(plan) = plan(strategy, facts, limits) else {
            tracing::debug!(strategy = strategy.as_str(), "single viewport capture");
            let frame = self.single_capture(limits).await?;
            let mut frames = FrameSequence::new();
            frames.push(frame);
            return Ok(CaptureReport {
                frames,
                planned: 1,
                state: CaptureState::Done,
                stopped_early: false,
                fell_back: false,
            });
        };

        tracing::info!(
            strategy = strategy.as_str(),
            target = ?plan.target,
            frames = plan.frames,
            "capture session started"
        );

        let mut state = CaptureState::Idle;
        let mut frames = FrameSequence::new();
        let mut stopped_early = false;
        let mut failure: Option<HostError> = None;

        let coordinator = ScrollCoordinator::new(limits.settle_delay);
        let session = coordinator.session(self.host, plan.target.clone());

        for i in 0..plan.frames {
            let offset = plan.step.saturating_mul(i as u32);

            transition(&mut state, CaptureState::Scrolling);
            if let Err(e) = session.scroll(offset).await {
                failure = Some(e);
                break;
            }

            transition(&mut state, CaptureState::Settling);
            session.settle().await;

            transition(&mut state, CaptureState::Capturing);
            match self.host.capture_visible(limits.format, limits.quality).await {
                Ok(frame) => {
                    frames.push(frame);
                    tracing::debug!(frame = i, offset, "frame captured");
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }

            if limits.stop_at_next_page && self.next_page_visible().await {
                tracing::debug!(frame = i, "next page control visible, stopping");
                stopped_early = true;
                break;
            }

            if i + 1 < plan.frames && !limits.inter_capture_delay.is_zero() {
                tokio::time::sleep(limits.inter_capture_delay).await;
            }
        }

        session.release().await;

        if let Some(e) = &failure {
            tracing::warn!(collected = frames.len(), "capture loop aborted: {e}");
        }

        if !frames.is_empty() {
            transition(&mut state, CaptureState::Done);
            tracing::info!(frames = frames.len(), "capture session finished");
            return Ok(CaptureReport { frames, planned: plan.frames, state, stopped_early, fell_back: false });
        }

        tracing::warn!("no frames collected, falling back to a single capture");
        match self.single_capture(limits).await {
            Ok(frame) => {
                frames.push(frame);
                transition(&mut state, CaptureState::Done);
                Ok(CaptureReport { frames, planned: plan.frames, state, stopped_early, fell_back: true })
            }
            Err(e) => {
                transition(&mut state, CaptureState::Aborted);
                Err(e)
            }
        }
    }

    async fn single_capture(&self, limits: &CaptureLimits) -> Result<String, Error> {
        self.host
            .capture_visible(limits.format, limits.quality)
            .await
            .map_err(capture_error)
    }

    async fn next_page_visible(&self) -> bool {
        match PageProbe::new(self.host).next_page_control_visible().await {
            Ok(visible) => visible,
            Err(e) => {
                tracing::debug!("next page check failed: {e}");
                false
            }
        }
    }
}

fn plan(strategy: CaptureStrategy, facts: Option<&PageLayoutFacts>, limits: &CaptureLimits) -> Option<ScrollPlan> {
    let facts = facts?;
    let (target, content, viewport) = match strategy {
        CaptureStrategy::SingleShot | CaptureStrategy::BlobHeuristic => return None,
        CaptureStrategy::DocumentScroll => (ScrollTarget::Document, facts.scroll_height, facts.viewport_height),
        CaptureStrategy::ContainerScroll => match &facts.container_selector {
            Some(selector) => (
                ScrollTarget::Container(selector.clone()),
                facts.container_scroll_height,
                facts.container_client_height,
            ),
            None => {
                tracing::warn!("container strategy without a container, scrolling the document");
                (ScrollTarget::Document, facts.scroll_height, facts.viewport_height)
            }
        },
    };

    let frames = frames_needed(content, viewport, limits.max_frames);
    if frames <= 1 {
        return None;
    }
    Some(ScrollPlan { target, step: viewport, frames })
}

fn transition(state: &mut CaptureState, next: CaptureState) {
    tracing::trace!(from = ?*state, to = ?next, "capture state");
    *state = next;
}

fn capture_error(error: HostError) -> Error {
    match error {
        HostError::CaptureQuota(reason) => Error::CaptureQuotaExceeded(reason),
        other => Error::CaptureFailed(other.to_string()),
    }
}
