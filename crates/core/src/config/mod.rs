//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PAGELENS_*)
//! 2. TOML config file (if PAGELENS_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The capture timings and thresholds were tuned empirically against real
//! viewers; they are kept as named defaults.

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::model::{CaptureLimits, ImageFormat};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PAGELENS_*)
/// 2. TOML config file (if PAGELENS_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Summarization endpoint.
    ///
    /// Set via PAGELENS_ENDPOINT environment variable.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Optional timeout for the summarization request in milliseconds.
    ///
    /// Unset means the HTTP client's default (no timeout).
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Wait after each scroll on general pages.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Wait after each scroll inside PDF viewers.
    #[serde(default = "default_pdf_settle_delay_ms")]
    pub pdf_settle_delay_ms: u64,

    /// Wait between two viewport captures.
    #[serde(default = "default_inter_capture_delay_ms")]
    pub inter_capture_delay_ms: u64,

    /// Maximum frames per general page.
    #[serde(default = "default_max_frames")]
    pub max_frames: usize,

    /// Maximum frames per PDF.
    #[serde(default = "default_pdf_max_frames")]
    pub pdf_max_frames: usize,

    /// Encoding of captured frames: "png" or "jpeg".
    ///
    /// Set via PAGELENS_IMAGE_FORMAT environment variable.
    #[serde(default)]
    pub image_format: ImageFormat,

    /// Encoder quality for captured frames.
    #[serde(default = "default_image_quality")]
    pub image_quality: u8,

    /// Minimum characters for extracted PDF text to be accepted.
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,

    /// Headless browser viewport width.
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    /// Headless browser viewport height.
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,

    /// Whether the headless browser host is enabled.
    ///
    /// Set via PAGELENS_RENDER_ENABLED environment variable.
    #[serde(default = "default_true")]
    pub render_enabled: bool,
}

fn default_endpoint() -> String {
    "http://localhost:5000/summarize".into()
}

fn default_user_agent() -> String {
    "pagelens/0.1".into()
}

fn default_settle_delay_ms() -> u64 {
    200
}

fn default_pdf_settle_delay_ms() -> u64 {
    300
}

fn default_inter_capture_delay_ms() -> u64 {
    500
}

fn default_max_frames() -> usize {
    10
}

fn default_pdf_max_frames() -> usize {
    5
}

fn default_image_quality() -> u8 {
    90
}

fn default_min_text_chars() -> usize {
    100
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_viewport_height() -> u32 {
    720
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_ms: None,
            user_agent: default_user_agent(),
            settle_delay_ms: default_settle_delay_ms(),
            pdf_settle_delay_ms: default_pdf_settle_delay_ms(),
            inter_capture_delay_ms: default_inter_capture_delay_ms(),
            max_frames: default_max_frames(),
            pdf_max_frames: default_pdf_max_frames(),
            image_format: ImageFormat::Png,
            image_quality: default_image_quality(),
            min_text_chars: default_min_text_chars(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            render_enabled: true,
        }
    }
}

impl AppConfig {
    /// Request timeout as Duration, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Capture limits for a session on the PDF or general path.
    ///
    /// The paginated-list early stop is decided per page by the caller.
    pub fn capture_limits(&self, is_pdf: bool) -> CaptureLimits {
        let (max_frames, settle_ms) = if is_pdf {
            (self.pdf_max_frames, self.pdf_settle_delay_ms)
        } else {
            (self.max_frames, self.settle_delay_ms)
        };

        CaptureLimits {
            max_frames,
            settle_delay: Duration::from_millis(settle_ms),
            inter_capture_delay: Duration::from_millis(self.inter_capture_delay_ms),
            format: self.image_format,
            quality: self.image_quality,
            stop_at_next_page: false,
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PAGELENS_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PAGELENS_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
