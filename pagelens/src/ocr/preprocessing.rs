use std::io::{Cursor, ErrorKind};
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage, ImageFormat, ImageReader, Luma};
use imageproc::contrast::otsu_level;
use imageproc::filter::separable_filter_equal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::OcrConfig;

/// Density the source is assumed to be authored at.
pub const BASE_DPI: u32 = 72;
/// Density Tesseract is tuned for.
pub const TARGET_DPI: u32 = 300;

const SMOOTHING_KERNEL_SIZE: u32 = 5;
const ADAPTIVE_BLOCK_SIZE: u32 = 11;
const ADAPTIVE_OFFSET: i16 = 2;

const BLACK: u8 = 0;
const WHITE: u8 = 255;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Image not found: {path}")]
    NotFound { path: String },

    #[error("Image unreadable: {0}")]
    Unreadable(String),

    #[error("Image too large: {width}x{height}, maximum side {max}")]
    TooLarge { width: u32, height: u32, max: u32 },
}

/// How the smoothed grayscale image is cut into text and background.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Binarization {
    /// Per-pixel cutoff from the Gaussian-weighted mean of an 11x11
    /// neighborhood minus 2. Copes with uneven lighting.
    #[default]
    Adaptive,
    /// Single global cutoff chosen by Otsu's method. Assumes even lighting.
    Otsu,
}

impl std::fmt::Display for Binarization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Binarization::Adaptive => f.write_str("adaptive"),
            Binarization::Otsu => f.write_str("otsu"),
        }
    }
}

impl std::str::FromStr for Binarization {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "adaptive" | "gaussian" => Ok(Binarization::Adaptive),
            "otsu" | "global" => Ok(Binarization::Otsu),
            other => Err(format!(
                "unknown binarization '{other}' (expected adaptive or otsu)"
            )),
        }
    }
}

/// Two-tone grayscale image ready for recognition.
///
/// Every sample is exactly 0 or 255. Only [`ImageNormalizer`] builds these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    pixels: GrayImage,
}

impl NormalizedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.pixels
    }

    /// True when no sample is black, i.e. nothing survived binarization.
    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| p[0] == WHITE)
    }

    /// Lossless PNG encoding of the pixels, the form Leptonica reads from memory.
    pub fn encode_png(&self) -> image::ImageResult<Vec<u8>> {
        let mut output = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
        Ok(output)
    }
}

/// Fixed preprocessing chain in front of the OCR engine:
/// decode, rescale 72 -> 300 DPI, grayscale, 5x5 Gaussian smoothing, binarize.
#[derive(Debug, Clone)]
pub struct ImageNormalizer {
    binarization: Binarization,
    max_source_dimension: Option<u32>,
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self::new(Binarization::default())
    }
}

impl ImageNormalizer {
    pub fn new(binarization: Binarization) -> Self {
        Self {
            binarization,
            max_source_dimension: None,
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(config.binarization).with_max_source_dimension(config.max_source_dimension)
    }

    /// Reject sources whose larger side exceeds `max`. Zero disables the check.
    pub fn with_max_source_dimension(mut self, max: u32) -> Self {
        self.max_source_dimension = (max > 0).then_some(max);
        self
    }

    pub fn binarization(&self) -> Binarization {
        self.binarization
    }

    pub fn normalize_path(&self, path: &Path) -> Result<NormalizedImage, InputError> {
        let reader = ImageReader::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => InputError::NotFound {
                path: path.display().to_string(),
            },
            _ => InputError::Unreadable(format!("{}: {e}", path.display())),
        })?;
        let reader = reader
            .with_guessed_format()
            .map_err(|e| InputError::Unreadable(format!("{}: {e}", path.display())))?;
        let img = reader
            .decode()
            .map_err(|e| InputError::Unreadable(format!("{}: {e}", path.display())))?;

        self.normalize_image(img)
    }

    pub fn normalize_bytes(&self, bytes: &[u8]) -> Result<NormalizedImage, InputError> {
        if bytes.is_empty() {
            return Err(InputError::Unreadable("empty image buffer".to_string()));
        }

        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| InputError::Unreadable(format!("Failed to read image: {e}")))?;
        let img = reader
            .decode()
            .map_err(|e| InputError::Unreadable(format!("Failed to decode image: {e}")))?;

        self.normalize_image(img)
    }

    pub fn normalize_image(&self, img: DynamicImage) -> Result<NormalizedImage, InputError> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(InputError::Unreadable(format!(
                "Image has no pixels: {width}x{height}"
            )));
        }
        if let Some(max) = self.max_source_dimension {
            if width.max(height) > max {
                return Err(InputError::TooLarge { width, height, max });
            }
        }

        let img = rescale_to_target_dpi(&img);
        let gray = img.to_luma8();
        let smoothed = gaussian_smooth(&gray, SMOOTHING_KERNEL_SIZE);
        let pixels = match self.binarization {
            Binarization::Adaptive => adaptive_binarize(&smoothed),
            Binarization::Otsu => otsu_binarize(&smoothed),
        };

        debug!(
            source_width = width,
            source_height = height,
            width = pixels.width(),
            height = pixels.height(),
            binarization = %self.binarization,
            "Image normalized"
        );

        Ok(NormalizedImage { pixels })
    }
}

/// Size after scaling both axes by `TARGET_DPI / BASE_DPI`, truncated, never below 1.
pub fn scaled_dimensions(width: u32, height: u32) -> (u32, u32) {
    let scale = |v: u32| {
        let scaled = u64::from(v) * u64::from(TARGET_DPI) / u64::from(BASE_DPI);
        u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
    };
    (scale(width), scale(height))
}

fn rescale_to_target_dpi(img: &DynamicImage) -> DynamicImage {
    let (width, height) = scaled_dimensions(img.width(), img.height());
    img.resize_exact(width, height, FilterType::CatmullRom)
}

/// Gaussian sigma matching a square kernel of side `ksize`.
fn kernel_sigma(ksize: u32) -> f32 {
    0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1-D Gaussian weights for an odd window of `ksize` taps.
fn gaussian_kernel(ksize: u32) -> Vec<f32> {
    let sigma = kernel_sigma(ksize);
    let radius = (ksize / 2) as i32;
    let weights: Vec<f32> = (-radius..=radius)
        .map(|x| (-((x * x) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Gaussian blur over exactly a `ksize` x `ksize` window.
fn gaussian_smooth(gray: &GrayImage, ksize: u32) -> GrayImage {
    separable_filter_equal(gray, &gaussian_kernel(ksize))
}

fn adaptive_binarize(gray: &GrayImage) -> GrayImage {
    let local_mean = gaussian_smooth(gray, ADAPTIVE_BLOCK_SIZE);
    let mut output = GrayImage::new(gray.width(), gray.height());

    for ((out, src), mean) in output
        .pixels_mut()
        .zip(gray.pixels())
        .zip(local_mean.pixels())
    {
        let cutoff = i16::from(mean[0]) - ADAPTIVE_OFFSET;
        *out = Luma([if i16::from(src[0]) > cutoff { WHITE } else { BLACK }]);
    }

    output
}

fn otsu_binarize(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    let mut output = gray.clone();
    for pixel in output.pixels_mut() {
        pixel[0] = if pixel[0] > level { WHITE } else { BLACK };
    }
    output
}
