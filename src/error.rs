//! Error taxonomy for per-image extraction.
//!
//! Only [`ExtractionError::Auth`] is fatal to a run. Every other variant is
//! caught at the per-image boundary, reported, and processing moves on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Missing or rejected credential (HTTP 403).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// HTTP 4xx/5xx other than 403, after retries were exhausted.
    #[error("request failed with HTTP {status} after {attempts} attempt(s): {message}")]
    RateLimitOrTransient {
        status: u16,
        attempts: u32,
        message: String,
    },

    /// Connectivity failure (DNS, connect, timeout).
    #[error("network error after {attempts} attempt(s): {message}")]
    Network { attempts: u32, message: String },

    /// The AI response could not be parsed as a JSON array.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Input image could not be read or decoded.
    #[error("image error: {0}")]
    Image(String),

    /// Local OCR engine missing or failed.
    #[error("OCR failed: {0}")]
    Ocr(String),
}

impl ExtractionError {
    /// Fatal errors abort the remaining queue.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}
