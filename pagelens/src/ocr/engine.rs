use leptess::{LepTess, Variable};
use tracing::debug;

use crate::config::OcrConfig;

use super::extractor::ExtractionFailure;
use super::language::LanguageCode;
use super::preprocessing::{NormalizedImage, TARGET_DPI};

/// Tesseract engine mode. `LepTess::new` initialises with `OEM_DEFAULT`.
pub const ENGINE_MODE: u32 = 3;

/// Page segmentation mode: a single uniform block of text (`--psm 6`).
/// Not suited to multi-column layouts or sparse text.
pub const PAGE_SEG_MODE: &str = "6";

/// Recognition backend behind [`super::TextExtractor`].
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Raw engine output for `image`; `language` must reach the engine unchanged.
    fn recognize(
        &self,
        image: &NormalizedImage,
        language: &LanguageCode,
    ) -> Result<String, ExtractionFailure>;

    /// Check that the engine can load `language`.
    fn probe(&self, _language: &LanguageCode) -> Result<(), ExtractionFailure> {
        Ok(())
    }
}

/// Fixed at construction; never changed per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesseractSettings {
    pub tessdata_path: Option<String>,
    pub source_resolution: u32,
}

impl Default for TesseractSettings {
    fn default() -> Self {
        Self {
            tessdata_path: None,
            source_resolution: TARGET_DPI,
        }
    }
}

impl TesseractSettings {
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            tessdata_path: config.tessdata_path.clone(),
            ..Self::default()
        }
    }
}

/// Tesseract via leptess. A fresh handle is created for every call so that
/// concurrent requests with different languages never share engine state.
#[derive(Debug, Clone, Default)]
pub struct TesseractEngine {
    settings: TesseractSettings,
}

impl TesseractEngine {
    pub fn new(settings: TesseractSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TesseractSettings {
        &self.settings
    }

    fn open(&self, language: &LanguageCode) -> Result<LepTess, ExtractionFailure> {
        let mut lt = LepTess::new(self.settings.tessdata_path.as_deref(), language.as_str())
            .map_err(|e| {
                ExtractionFailure::Engine(format!(
                    "Failed to initialize Tesseract for language '{language}': {e}"
                ))
            })?;

        lt.set_variable(Variable::TesseditPagesegMode, PAGE_SEG_MODE)
        .map_err(|e| ExtractionFailure::Engine(format!("Failed to set page segmentation mode: {e}")))?;

        Ok(lt)
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize(
        &self,
        image: &NormalizedImage,
        language: &LanguageCode,
    ) -> Result<String, ExtractionFailure> {
        let png = image
            .encode_png()
            .map_err(|e| ExtractionFailure::Engine(format!("Failed to encode image: {e}")))?;

        let mut lt = self.open(language)?;
        lt.set_image_from_mem(&png)
            .map_err(|e| ExtractionFailure::Engine(format!("Failed to set image: {e}")))?;
        // Must follow set_image
        lt.set_source_resolution(self.settings.source_resolution as i32);

        debug!(
            language = %language,
            oem = ENGINE_MODE,
            psm = PAGE_SEG_MODE,
            width = image.width(),
            height = image.height(),
            "Running Tesseract"
        );

        lt.get_utf8_text()
            .map_err(|e| ExtractionFailure::Engine(format!("Failed to extract text: {e}")))
    }

    fn probe(&self, language: &LanguageCode) -> Result<(), ExtractionFailure> {
        self.open(language).map(|_| ())
    }
}
