//! Source adapters turn image bytes into raw text for an extractor.

use crate::error::ExtractionError;
use crate::extract::Extractor;
use crate::input::ImageInput;
use crate::record::RecordBatch;

/// Output of one image: the batch plus the raw text it came from.
#[derive(Debug, Clone)]
pub struct SourceOutput {
    pub batch: RecordBatch,
    pub raw_text: String,
}

/// An image → text adapter paired with the extractor for its text format.
pub trait ImageSource {
    /// Short name for logs ("ocr", "ai").
    fn name(&self) -> &'static str;

    fn read_text(&self, image: &ImageInput) -> Result<String, ExtractionError>;

    fn extractor(&self) -> &dyn Extractor;

    /// Runs the adapter and extractor for one image.
    fn process(&self, image: &ImageInput) -> Result<SourceOutput, ExtractionError> {
        let raw_text = self.read_text(image)?;
        let records = self.extractor().extract(&raw_text)?;
        Ok(SourceOutput {
            batch: RecordBatch::new(image.label.clone(), records),
            raw_text,
        })
    }
}
