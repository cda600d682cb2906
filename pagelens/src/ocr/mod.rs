//! OCR (Optical Character Recognition) Module
//!
//! Turns a raster image into text in two stages:
//! - `ImageNormalizer` decodes the source, rescales it from 72 to 300 DPI,
//!   converts to grayscale, applies a 5x5 Gaussian blur and binarizes it to
//!   a two-tone image
//! - `TextExtractor` runs an `OcrEngine` (Tesseract via leptess by default)
//!   over the normalized image and trims the output
//!
//! `OcrPipeline` chains the two. A normalizer failure (`InputError`) aborts
//! before the engine is touched; engine-side failures come back as
//! `ExtractionFailure`.
//!
//! # Configuration
//!
//! Behavior is controlled via `OcrConfig` (see `config.rs`):
//! - `tessdata_path`: traineddata directory, fixed for the process lifetime
//! - `default_language`: Tesseract language profile used when a request names none
//! - `binarization`: `adaptive` (default) or `otsu`
//! - `max_source_dimension`: optional upper bound on the source image's larger side, off by default
//!
//! # Usage
//!
//! ```rust,ignore
//! let pipeline = OcrPipeline::from_config(&config.ocr);
//! let extracted = pipeline.run_path(Path::new("scan.png"), &LanguageCode::new("eng"))?;
//! println!("{}", extracted.text);
//! ```

mod engine;
mod extractor;
mod language;
mod pipeline;
mod preprocessing;

pub use engine::{OcrEngine, TesseractEngine, TesseractSettings, ENGINE_MODE, PAGE_SEG_MODE};
pub use extractor::{ExtractedText, ExtractionFailure, ExtractionResult, TextExtractor};
pub use language::{LanguageCode, DEFAULT_LANGUAGE};
pub use pipeline::OcrPipeline;
pub use preprocessing::{
    scaled_dimensions, Binarization, ImageNormalizer, InputError, NormalizedImage, BASE_DPI,
    TARGET_DPI,
};
