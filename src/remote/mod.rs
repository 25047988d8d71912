//! Remote AI source: image → Gemini → JSON text.

pub mod gemini;
pub mod retry;

pub use gemini::{GeminiClient, GeminiSettings};
pub use retry::BackoffPolicy;

use crate::error::ExtractionError;
use crate::extract::{Extractor, StructuredExtractor};
use crate::input::ImageInput;
use crate::source::ImageSource;

pub struct RemoteSource {
    client: GeminiClient,
    extractor: StructuredExtractor,
}

impl RemoteSource {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client,
            extractor: StructuredExtractor::new(),
        }
    }
}

impl ImageSource for RemoteSource {
    fn name(&self) -> &'static str {
        "ai"
    }

    fn read_text(&self, image: &ImageInput) -> Result<String, ExtractionError> {
        crate::log(&format!(
            "Sending {} ({} bytes, {}) to {}",
            image.label,
            image.bytes.len(),
            image.mime_type,
            self.client.endpoint()
        ));
        self.client.fetch_extraction(&image.bytes, image.mime_type)
    }

    fn extractor(&self) -> &dyn Extractor {
        &self.extractor
    }
}
