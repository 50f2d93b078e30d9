//! Core types and shared functionality for pagelens.
//!
//! This crate provides:
//! - The capture data model (layout facts, strategies, frames, requests)
//! - Unified error types
//! - Configuration structures
//! - Per-tab panel state

pub mod config;
pub mod error;
pub mod model;
pub mod panel;

pub use config::{AppConfig, ConfigError};
pub use error::{Error, LOCAL_FILE_UNSUPPORTED, PAGE_UNAVAILABLE};
pub use model::{
    CaptureLimits, CaptureStrategy, ContentChannel, ExtractionResult, FrameSequence, ImageFormat, PageLayoutFacts,
    SummarizationRequest, SummaryResult, ViewerKind,
};
pub use panel::{PanelState, PanelStates, TabId};
