use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::engine::{OcrEngine, TesseractEngine, TesseractSettings};
use super::language::LanguageCode;
use super::preprocessing::NormalizedImage;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionFailure {
    /// The engine ran but produced nothing after trimming.
    #[error("No text found in image")]
    NoText,

    #[error("OCR engine error: {0}")]
    Engine(String),
}

/// Recognized text, already trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedText {
    pub text: String,
    pub language: LanguageCode,
}

impl ExtractedText {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    pub fn character_count(&self) -> usize {
        self.text.chars().count()
    }
}

pub type ExtractionResult = Result<ExtractedText, ExtractionFailure>;

/// Runs an [`OcrEngine`] over a normalized image and applies the output contract:
/// surrounding whitespace is stripped and empty output becomes
/// [`ExtractionFailure::NoText`].
#[derive(Clone)]
pub struct TextExtractor {
    engine: Arc<dyn OcrEngine>,
}

impl std::fmt::Debug for TextExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextExtractor")
            .field("engine", &self.engine.name())
            .finish()
    }
}

impl TextExtractor {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }

    pub fn tesseract(settings: TesseractSettings) -> Self {
        Self::new(Arc::new(TesseractEngine::new(settings)))
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn extract(&self, image: &NormalizedImage, language: &LanguageCode) -> ExtractionResult {
        let raw = self.engine.recognize(image, language).map_err(|e| {
            warn!(engine = self.engine.name(), language = %language, error = %e, "OCR engine failed");
            e
        })?;

        let text = raw.trim();
        if text.is_empty() {
            debug!(engine = self.engine.name(), language = %language, "OCR produced no text");
            return Err(ExtractionFailure::NoText);
        }

        Ok(ExtractedText {
            text: text.to_string(),
            language: language.clone(),
        })
    }

    pub fn probe(&self, language: &LanguageCode) -> Result<(), ExtractionFailure> {
        self.engine.probe(language)
    }
}
