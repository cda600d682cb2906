use serde::Deserialize;
use std::env;

use crate::ocr::{Binarization, LanguageCode};

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Parse `OCR_ALLOWED_EXTENSIONS`.
/// Format: comma-separated extensions with or without the leading dot, e.g. `png,.jpg,tiff`
fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

pub const DEFAULT_ALLOWED_EXTENSIONS: &str = "png,jpg,jpeg,bmp,tif,tiff";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}' (expected text or json)")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub max_concurrent_jobs: usize,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// Directory holding `*.traineddata`; `None` defers to Tesseract's own lookup.
    pub tessdata_path: Option<String>,
    pub default_language: LanguageCode,
    pub binarization: Binarization,
    pub timeout_secs: u64,
    pub max_source_dimension: u32,
    pub allowed_extensions: Vec<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tessdata_path: None,
            default_language: LanguageCode::default(),
            binarization: Binarization::default(),
            timeout_secs: 60,
            max_source_dimension: 0,
            allowed_extensions: parse_extensions(DEFAULT_ALLOWED_EXTENSIONS),
        }
    }
}

impl OcrConfig {
    pub fn is_allowed_extension(&self, extension: &str) -> bool {
        let ext = extension.trim_start_matches('.').to_lowercase();
        self.allowed_extensions.iter().any(|allowed| *allowed == ext)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("PAGELENS_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("PAGELENS_PORT", 3000),
                max_upload_bytes: parse_env_or("PAGELENS_MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
                max_concurrent_jobs: parse_env_or(
                    "PAGELENS_MAX_CONCURRENT_JOBS",
                    default_concurrency(),
                )
                .max(1),
                log_format: parse_env_or("PAGELENS_LOG_FORMAT", LogFormat::Text),
            },
            ocr: OcrConfig {
                tessdata_path: env::var("OCR_TESSDATA_PATH")
                    .ok()
                    .filter(|p| !p.trim().is_empty()),
                default_language: LanguageCode::from_optional(
                    env::var("OCR_LANGUAGE").ok().as_deref(),
                ),
                binarization: parse_env_or("OCR_BINARIZATION", Binarization::default()),
                timeout_secs: parse_env_or("OCR_TIMEOUT", 60),
                max_source_dimension: parse_env_or("OCR_MAX_DIMENSION", 0),
                allowed_extensions: parse_extensions(
                    &env::var("OCR_ALLOWED_EXTENSIONS")
                        .unwrap_or_else(|_| DEFAULT_ALLOWED_EXTENSIONS.to_string()),
                ),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
