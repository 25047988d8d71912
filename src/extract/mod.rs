//! Raw text → records.
//!
//! - [`PatternExtractor`] scans OCR text for "name then digits" runs
//! - [`StructuredExtractor`] parses the JSON array returned by the AI source

pub mod pattern;
pub mod structured;

pub use pattern::PatternExtractor;
pub use structured::StructuredExtractor;

use crate::error::ExtractionError;
use crate::record::Record;

/// Common contract for both extractors. Implementations are pure.
pub trait Extractor {
    fn extract(&self, raw: &str) -> Result<Vec<Record>, ExtractionError>;
}
