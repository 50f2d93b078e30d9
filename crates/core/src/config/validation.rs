//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Longest accepted delay between capture steps.
const MAX_DELAY_MS: u64 = 10_000;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `endpoint` is not an http(s) URL
    /// - a frame limit is 0
    /// - `image_quality` exceeds 100
    /// - a capture delay exceeds 10 seconds
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        match url::Url::parse(&self.endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::Invalid {
                    field: "endpoint".into(),
                    reason: format!("unsupported scheme: {}", url.scheme()),
                });
            }
            Err(e) => return Err(ConfigError::Invalid { field: "endpoint".into(), reason: e.to_string() }),
        }

        if self.max_frames == 0 {
            return Err(ConfigError::Invalid { field: "max_frames".into(), reason: "must be greater than 0".into() });
        }
        if self.pdf_max_frames == 0 {
            return Err(ConfigError::Invalid {
                field: "pdf_max_frames".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.image_quality > 100 {
            return Err(ConfigError::Invalid { field: "image_quality".into(), reason: "must not exceed 100".into() });
        }

        for (field, value) in [
            ("settle_delay_ms", self.settle_delay_ms),
            ("pdf_settle_delay_ms", self.pdf_settle_delay_ms),
            ("inter_capture_delay_ms", self.inter_capture_delay_ms),
        ] {
            if value > MAX_DELAY_MS {
                return Err(ConfigError::Invalid {
                    field: field.into(),
                    reason: format!("must not exceed {MAX_DELAY_MS}ms"),
                });
            }
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.inter_capture_delay_ms == 0 {
            tracing::warn!("inter_capture_delay_ms is 0; the viewport capturer may reject back-to-back captures");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_endpoint_scheme() {
        let config = AppConfig { endpoint: "ftp://localhost/summarize".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "endpoint"));
    }

    #[test]
    fn test_validate_endpoint_unparsable() {
        let config = AppConfig { endpoint: "not a url".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "endpoint"));
    }

    #[test]
    fn test_validate_max_frames_zero() {
        let config = AppConfig { max_frames: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_frames"));
    }

    #[test]
    fn test_validate_pdf_max_frames_zero() {
        let config = AppConfig { pdf_max_frames: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "pdf_max_frames"));
    }

    #[test]
    fn test_validate_quality_over_100() {
        let config = AppConfig { image_quality: 101, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "image_quality"));
    }

    #[test]
    fn test_validate_delay_too_long() {
        let config = AppConfig { inter_capture_delay_ms: 10_001, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "inter_capture_delay_ms"));
    }

    #[test]
    fn test_validate_zero_delays_allowed() {
        let config =
            AppConfig { settle_delay_ms: 0, pdf_settle_delay_ms: 0, inter_capture_delay_ms: 0, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }
}
