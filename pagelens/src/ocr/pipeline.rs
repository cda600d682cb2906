use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::OcrConfig;
use crate::error::Result;

use super::engine::TesseractSettings;
use super::extractor::{ExtractedText, ExtractionFailure, TextExtractor};
use super::language::LanguageCode;
use super::preprocessing::{ImageNormalizer, NormalizedImage};

/// Normalizer followed by extractor. Blocking; callers on an async runtime
/// should go through `tokio::task::spawn_blocking`.
#[derive(Debug, Clone)]
pub struct OcrPipeline {
    normalizer: ImageNormalizer,
    extractor: TextExtractor,
}

impl OcrPipeline {
    pub fn new(normalizer: ImageNormalizer, extractor: TextExtractor) -> Self {
        Self {
            normalizer,
            extractor,
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(
            ImageNormalizer::from_config(config),
            TextExtractor::tesseract(TesseractSettings::from_config(config)),
        )
    }

    pub fn normalizer(&self) -> &ImageNormalizer {
        &self.normalizer
    }

    pub fn extractor(&self) -> &TextExtractor {
        &self.extractor
    }

    pub fn run_path(&self, path: &Path, language: &LanguageCode) -> Result<ExtractedText> {
        info!(path = %path.display(), binarization = %self.normalizer.binarization(), "Preprocessing image");
        let image = self.normalizer.normalize_path(path)?;
        self.recognize(&image, language)
    }

    pub fn run_bytes(&self, bytes: &[u8], language: &LanguageCode) -> Result<ExtractedText> {
        info!(bytes = bytes.len(), binarization = %self.normalizer.binarization(), "Preprocessing image");
        let image = self.normalizer.normalize_bytes(bytes)?;
        self.recognize(&image, language)
    }

    pub fn probe_engine(&self, language: &LanguageCode) -> std::result::Result<(), ExtractionFailure> {
        self.extractor.probe(language)
    }

    fn recognize(&self, image: &NormalizedImage, language: &LanguageCode) -> Result<ExtractedText> {
        let started = Instant::now();
        info!(
            engine = self.extractor.engine_name(),
            language = %language,
            width = image.width(),
            height = image.height(),
            "Extracting text"
        );

        match self.extractor.extract(image, language) {
            Ok(extracted) => {
                info!(
                    language = %language,
                    chars = extracted.character_count(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Text extracted"
                );
                Ok(extracted)
            }
            Err(ExtractionFailure::NoText) => {
                warn!(language = %language, "No text could be extracted from image");
                Err(ExtractionFailure::NoText.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PagelensError;
    use crate::ocr::{Binarization, OcrEngine};
    use image::{DynamicImage, GrayImage, ImageFormat, Luma};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Reports "INK" when the normalized image has any black sample, nothing otherwise.
    #[derive(Default)]
    struct InkDetector {
        calls: AtomicUsize,
    }

    impl OcrEngine for InkDetector {
        fn name(&self) -> &'static str {
            "ink-detector"
        }

        fn recognize(
            &self,
            image: &NormalizedImage,
            _language: &LanguageCode,
        ) -> std::result::Result<String, ExtractionFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(if image.is_blank() { String::new() } else { "INK\n".to_string() })
        }
    }

    fn pipeline_with(engine: Arc<InkDetector>) -> OcrPipeline {
        OcrPipeline::new(
            ImageNormalizer::new(Binarization::Adaptive),
            TextExtractor::new(engine),
        )
    }

    fn png_bytes(img: GrayImage) -> Vec<u8> {
        let mut out = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    fn page_with_bar() -> GrayImage {
        let mut img = GrayImage::from_pixel(60, 30, Luma([255]));
        for x in 10..50 {
            for y in 12..18 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
        img
    }

    #[test]
    fn test_missing_path_never_reaches_engine() {
        let engine = Arc::new(InkDetector::default());
        let pipeline = pipeline_with(engine.clone());

        let result = pipeline.run_path(
            Path::new("/definitely/not/here.png"),
            &LanguageCode::default(),
        );

        assert!(matches!(result, Err(PagelensError::Input(_))));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_undecodable_bytes_never_reach_engine() {
        let engine = Arc::new(InkDetector::default());
        let pipeline = pipeline_with(engine.clone());

        let result = pipeline.run_bytes(b"GIF89a but not really", &LanguageCode::default());

        assert!(matches!(result, Err(PagelensError::Input(_))));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_blank_page_is_no_text() {
        let engine = Arc::new(InkDetector::default());
        let pipeline = pipeline_with(engine.clone());
        let blank = png_bytes(GrayImage::from_pixel(60, 30, Luma([255])));

        let result = pipeline.run_bytes(&blank, &LanguageCode::default());

        assert!(matches!(
            result,
            Err(PagelensError::Extraction(ExtractionFailure::NoText))
        ));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_marked_page_yields_trimmed_text() {
        let pipeline = pipeline_with(Arc::new(InkDetector::default()));
        let extracted = pipeline
            .run_bytes(&png_bytes(page_with_bar()), &LanguageCode::new("ara"))
            .unwrap();

        assert_eq!(extracted.text, "INK");
        assert_eq!(extracted.language.as_str(), "ara");
    }

    #[test]
    fn test_run_path_matches_run_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        let bytes = png_bytes(page_with_bar());
        std::fs::write(&path, &bytes).unwrap();

        let pipeline = pipeline_with(Arc::new(InkDetector::default()));
        let from_path = pipeline.run_path(&path, &LanguageCode::default()).unwrap();
        let from_bytes = pipeline.run_bytes(&bytes, &LanguageCode::default()).unwrap();

        assert_eq!(from_path, from_bytes);
    }

    #[test]
    fn test_probe_forwards_to_engine() {
        let pipeline = pipeline_with(Arc::new(InkDetector::default()));
        assert!(pipeline.probe_engine(&LanguageCode::default()).is_ok());
        assert_eq!(pipeline.extractor().engine_name(), "ink-detector");
    }
}
