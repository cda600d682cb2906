use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{Config, LogFormat};
use crate::error::Result;
use crate::ocr::{Binarization, ExtractedText, ImageNormalizer, LanguageCode, OcrPipeline};

#[derive(Debug, Parser)]
#[command(name = "pagelens")]
#[command(about = "Extract text from images with a fixed preprocessing pipeline and Tesseract")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start the HTTP server (default)
    Serve {
        /// Port to bind, overrides PAGELENS_PORT
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run OCR on a single image and print the text
    Extract {
        /// Path to the source image
        image: PathBuf,
        /// Tesseract language code, e.g. eng, ara, eng+ara
        #[arg(short, long)]
        lang: Option<String>,
        /// Binarization policy, overrides OCR_BINARIZATION
        #[arg(short, long)]
        binarization: Option<Binarization>,
    },
}

impl Cli {
    /// The requested subcommand, `serve` when none was given.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve { port: None })
    }
}

pub fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pagelens=info,tower_http=debug".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Runs the pipeline once for `image`. Input and extraction failures come
/// back as errors for the caller to report.
pub fn extract(
    config: &Config,
    image: &std::path::Path,
    lang: Option<&str>,
    binarization: Option<Binarization>,
) -> Result<ExtractedText> {
    let language = LanguageCode::from_optional_or(lang, &config.ocr.default_language);

    let mut pipeline = OcrPipeline::from_config(&config.ocr);
    if let Some(binarization) = binarization {
        let normalizer = ImageNormalizer::new(binarization)
            .with_max_source_dimension(config.ocr.max_source_dimension);
        pipeline = OcrPipeline::new(normalizer, pipeline.extractor().clone());
    }

    pipeline.run_path(image, &language)
}
