//! Local OCR source: decode → grayscale/Otsu → Tesseract.

pub mod engine;
pub mod preprocess;
pub mod setup;

pub use setup::{find_tesseract_executable, TesseractSettings};

use crate::error::ExtractionError;
use crate::extract::{Extractor, PatternExtractor};
use crate::input::ImageInput;
use crate::source::ImageSource;

pub struct OcrSource {
    settings: TesseractSettings,
    extractor: PatternExtractor,
}

impl OcrSource {
    pub fn new(settings: TesseractSettings) -> Result<Self, regex::Error> {
        Ok(Self {
            settings,
            extractor: PatternExtractor::new()?,
        })
    }
}

impl ImageSource for OcrSource {
    fn name(&self) -> &'static str {
        "ocr"
    }

    fn read_text(&self, image: &ImageInput) -> Result<String, ExtractionError> {
        let decoded = image::load_from_memory(&image.bytes).map_err(|e| {
            ExtractionError::Image(format!("failed to decode {}: {}", image.label, e))
        })?;

        let preprocessed = preprocess::preprocess(&decoded);
        crate::log(&format!(
            "OCR {}: {}x{} (languages: {})",
            image.label,
            preprocessed.width(),
            preprocessed.height(),
            self.settings.languages
        ));

        engine::recognize_text(&preprocessed, &self.settings)
            .map_err(|e| ExtractionError::Ocr(format!("{:#}", e)))
    }

    fn extractor(&self) -> &dyn Extractor {
        &self.extractor
    }
}
