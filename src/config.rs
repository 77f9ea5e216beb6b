//! # Configuration Module
//!
//! Environment-backed application settings plus tunables for the OCR
//! provider client (poll attempts, delays, upload limits).

use anyhow::{Context, Result};
use std::env;

// Constants for OCR provider polling and upload validation
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 10;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_POLL_JITTER_MS: u64 = 250;
pub const FORMAT_DETECTION_BUFFER_SIZE: usize = 32;
pub const MIN_FORMAT_BYTES: usize = 8;
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024; // 10MB limit for label photos

/// Settings for talking to the asynchronous OCR provider
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Maximum number of status polls before giving up on an operation
    pub max_poll_attempts: u32,
    /// Base delay between status polls in milliseconds
    pub poll_interval_ms: u64,
    /// Upper bound of the random jitter added to each poll delay
    pub poll_jitter_ms: u64,
    /// Maximum accepted upload size in bytes
    pub max_upload_size: usize,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            poll_jitter_ms: DEFAULT_POLL_JITTER_MS,
            max_upload_size: MAX_UPLOAD_SIZE,
        }
    }
}

/// Application configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres connection string
    pub database_url: String,
    /// Secret for signing and verifying HS256 access tokens
    pub jwt_secret: String,
    /// Base URL of the OCR provider (e.g. https://myresource.cognitiveservices.azure.com)
    pub vision_endpoint: String,
    /// Subscription key for the OCR provider
    pub vision_key: String,
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// OCR client tunables
    pub ocr: OcrConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// `BIND_ADDR` is optional and defaults to `0.0.0.0:8000`; everything
    /// else is required.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            vision_endpoint: env::var("VISION_ENDPOINT")
                .context("VISION_ENDPOINT must be set")?,
            vision_key: env::var("VISION_KEY").context("VISION_KEY must be set")?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            ocr: OcrConfig::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ocr_config_defaults() {
        let config = OcrConfig::default();

        assert_eq!(config.max_poll_attempts, 10);
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.poll_jitter_ms, 250);
        assert_eq!(config.max_upload_size, 10 * 1024 * 1024);
    }
}
