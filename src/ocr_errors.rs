//! # OCR Error Types Module
//!
//! Structured error types for the OCR provider client, covering upload
//! validation, submission, polling, and operation outcomes.

/// Custom error types for OCR operations
#[derive(Debug, Clone)]
pub enum OcrError {
    /// Upload validation errors (bad format, oversized payload)
    Validation(String),
    /// Errors submitting the image to the provider
    Submit(String),
    /// Errors while polling the provider's operation status
    Poll(String),
    /// The provider reported the operation failed
    Failed(String),
    /// The operation did not finish within the poll attempt budget
    Timeout(String),
}

impl std::fmt::Display for OcrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcrError::Validation(msg) => write!(f, "Validation error: {msg}"),
            OcrError::Submit(msg) => write!(f, "Submit error: {msg}"),
            OcrError::Poll(msg) => write!(f, "Poll error: {msg}"),
            OcrError::Failed(msg) => write!(f, "OCR processing failed: {msg}"),
            OcrError::Timeout(msg) => write!(f, "OCR processing timeout: {msg}"),
        }
    }
}

impl std::error::Error for OcrError {}
