//! # OCR Provider Client
//!
//! Client for an Azure-Read-style asynchronous OCR service: submit an image,
//! receive an operation URL, poll until the operation settles, and return the
//! recognized lines joined in reading order.
//!
//! The poll loop is bounded by [`OcrConfig::max_poll_attempts`] and sleeps a
//! base interval plus random jitter between attempts, so a stuck operation
//! surfaces as a timeout instead of hanging the request.

use log::{debug, info, warn};
use rand::Rng;
use serde::Deserialize;
use std::time::Duration;

use crate::config::{OcrConfig, MIN_FORMAT_BYTES};
use crate::ocr_errors::OcrError;

/// Path of the provider's analyze endpoint, relative to the configured base URL
const ANALYZE_PATH: &str = "/vision/v3.2/read/analyze";

/// Operation states reported by the provider
const STATUS_SUCCEEDED: &str = "succeeded";
const STATUS_FAILED: &str = "failed";

/// Status payload returned when polling a read operation
#[derive(Debug, Deserialize)]
struct ReadOperation {
    status: String,
    #[serde(rename = "analyzeResult")]
    analyze_result: Option<AnalyzeResult>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResult {
    #[serde(rename = "readResults")]
    read_results: Vec<ReadResult>,
}

#[derive(Debug, Deserialize)]
struct ReadResult {
    lines: Vec<RecognizedLine>,
}

#[derive(Debug, Deserialize)]
struct RecognizedLine {
    text: String,
}

/// HTTP client for the asynchronous OCR provider
#[derive(Debug, Clone)]
pub struct OcrClient {
    http: reqwest::Client,
    endpoint: String,
    key: String,
    config: OcrConfig,
}

impl OcrClient {
    /// Create a client for the given provider endpoint and subscription key
    pub fn new(endpoint: &str, key: &str, config: OcrConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key: key.to_string(),
            config,
        }
    }

    /// Extract text from an image via the OCR provider.
    ///
    /// Submits the image, then polls the returned operation URL until it
    /// succeeds, fails, or the attempt budget runs out. On success the
    /// recognized lines are joined with `\n` in top-to-bottom reading order.
    pub async fn extract_text(&self, image: Vec<u8>) -> Result<String, OcrError> {
        let operation_url = self.submit(image).await?;
        debug!("OCR operation accepted: {}", operation_url);

        for attempt in 1..=self.config.max_poll_attempts {
            let operation = self.poll(&operation_url).await?;

            match operation.status.as_str() {
                STATUS_SUCCEEDED => {
                    let text = join_recognized_lines(operation.analyze_result);
                    info!(
                        "OCR succeeded after {} poll attempt(s), {} characters extracted",
                        attempt,
                        text.len()
                    );
                    return Ok(text);
                }
                STATUS_FAILED => {
                    warn!("OCR operation reported failure");
                    return Err(OcrError::Failed("provider reported failure".to_string()));
                }
                status => {
                    debug!(
                        "OCR operation still '{}' (attempt {}/{})",
                        status, attempt, self.config.max_poll_attempts
                    );
                    tokio::time::sleep(self.poll_delay()).await;
                }
            }
        }

        warn!(
            "OCR operation did not finish within {} attempts",
            self.config.max_poll_attempts
        );
        Err(OcrError::Timeout(format!(
            "operation still pending after {} attempts",
            self.config.max_poll_attempts
        )))
    }

    /// Submit the image and return the operation URL to poll
    async fn submit(&self, image: Vec<u8>) -> Result<String, OcrError> {
        let url = format!("{}{}", self.endpoint, ANALYZE_PATH);

        let response = self
            .http
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Content-Type", "application/octet-stream")
            .body(image)
            .send()
            .await
            .map_err(|e| OcrError::Submit(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OcrError::Submit(format!(
                "provider returned status {}",
                response.status()
            )));
        }

        response
            .headers()
            .get("operation-location")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| OcrError::Submit("missing operation-location header".to_string()))
    }

    /// Fetch the current status of a read operation
    async fn poll(&self, operation_url: &str) -> Result<ReadOperation, OcrError> {
        let response = self
            .http
            .get(operation_url)
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .send()
            .await
            .map_err(|e| OcrError::Poll(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OcrError::Poll(format!(
                "provider returned status {}",
                response.status()
            )));
        }

        response
            .json::<ReadOperation>()
            .await
            .map_err(|e| OcrError::Poll(e.to_string()))
    }

    /// Base poll interval plus random jitter, to avoid polling in lockstep
    fn poll_delay(&self) -> Duration {
        let jitter = if self.config.poll_jitter_ms > 0 {
            rand::thread_rng().gen_range(0..=self.config.poll_jitter_ms)
        } else {
            0
        };
        Duration::from_millis(self.config.poll_interval_ms + jitter)
    }
}

/// Join all recognized lines with `\n`, preserving page and line order
fn join_recognized_lines(result: Option<AnalyzeResult>) -> String {
    let Some(result) = result else {
        return String::new();
    };

    result
        .read_results
        .iter()
        .flat_map(|page| page.lines.iter())
        .map(|line| line.text.as_str())
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Validate an uploaded label photo before it is sent to the provider.
///
/// Checks the size limit and sniffs the magic bytes for a format the
/// provider accepts (PNG, JPEG, BMP, TIFF).
pub fn validate_upload(image: &[u8], config: &OcrConfig) -> Result<(), OcrError> {
    if image.len() > config.max_upload_size {
        return Err(OcrError::Validation(format!(
            "image is {} bytes, limit is {}",
            image.len(),
            config.max_upload_size
        )));
    }

    if !is_supported_image_format(image) {
        return Err(OcrError::Validation(
            "unsupported image format (PNG, JPEG, BMP or TIFF required)".to_string(),
        ));
    }

    Ok(())
}

/// Check whether the byte prefix looks like a supported image format
pub fn is_supported_image_format(image: &[u8]) -> bool {
    if image.len() < MIN_FORMAT_BYTES {
        debug!(
            "Not enough bytes to determine image format ({} read, need at least {})",
            image.len(),
            MIN_FORMAT_BYTES
        );
        return false;
    }

    match image::guess_format(image) {
        Ok(format) => {
            let supported = matches!(
                format,
                image::ImageFormat::Png
                    | image::ImageFormat::Jpeg
                    | image::ImageFormat::Bmp
                    | image::ImageFormat::Tiff
            );
            debug!("Detected image format {:?} (supported: {})", format, supported);
            supported
        }
        Err(e) => {
            debug!("Could not determine image format: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];

    #[test]
    fn test_supported_formats_accepted() {
        assert!(is_supported_image_format(PNG_MAGIC));
        assert!(is_supported_image_format(JPEG_MAGIC));
        assert!(is_supported_image_format(b"BM\x00\x00\x00\x00\x00\x00"));
    }

    #[test]
    fn test_garbage_and_short_input_rejected() {
        assert!(!is_supported_image_format(b"not an image at all"));
        assert!(!is_supported_image_format(&[0x89, b'P']));
        assert!(!is_supported_image_format(&[]));
    }

    #[test]
    fn test_validate_upload_size_limit() {
        let config = OcrConfig {
            max_upload_size: 4,
            ..OcrConfig::default()
        };

        let result = validate_upload(PNG_MAGIC, &config);
        assert!(matches!(result, Err(OcrError::Validation(_))));
    }

    #[test]
    fn test_validate_upload_accepts_png() {
        let config = OcrConfig::default();
        assert!(validate_upload(PNG_MAGIC, &config).is_ok());
    }

    #[test]
    fn test_join_recognized_lines_order() {
        let result = AnalyzeResult {
            read_results: vec![
                ReadResult {
                    lines: vec![
                        RecognizedLine { text: "Nutrition Facts".to_string() },
                        RecognizedLine { text: "Calories 120".to_string() },
                    ],
                },
                ReadResult {
                    lines: vec![RecognizedLine { text: "Protein 3g".to_string() }],
                },
            ],
        };

        assert_eq!(
            join_recognized_lines(Some(result)),
            "Nutrition Facts\nCalories 120\nProtein 3g"
        );
        assert_eq!(join_recognized_lines(None), "");
    }
}
