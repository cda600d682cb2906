// Shared fixtures for integration tests
#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Once;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use pagelens::ocr::{
    Binarization, ImageNormalizer, LanguageCode, OcrEngine, OcrPipeline, TesseractEngine,
    TextExtractor,
};

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

const INK: Luma<u8> = Luma([0]);
const PAPER: Luma<u8> = Luma([255]);

const GLYPH_WIDTH: u32 = 14;
const GLYPH_HEIGHT: u32 = 22;
const STROKE: u32 = 4;
const GLYPH_GAP: u32 = 6;
const MARGIN: u32 = 12;

/// Black block capitals on white, sized for 72 DPI so the normalizer's
/// upscale lands them at a comfortable size for Tesseract.
pub fn render_block_text(text: &str) -> GrayImage {
    let glyphs = text.chars().count() as u32;
    let width = MARGIN * 2 + glyphs * GLYPH_WIDTH + glyphs.saturating_sub(1) * GLYPH_GAP;
    let height = MARGIN * 2 + GLYPH_HEIGHT;
    let mut img = GrayImage::from_pixel(width, height, PAPER);

    for (i, ch) in text.chars().enumerate() {
        let x = (MARGIN + i as u32 * (GLYPH_WIDTH + GLYPH_GAP)) as i32;
        draw_glyph(&mut img, ch, x, MARGIN as i32);
    }

    img
}

fn draw_glyph(img: &mut GrayImage, ch: char, x: i32, y: i32) {
    let w = GLYPH_WIDTH;
    let h = GLYPH_HEIGHT;
    let s = STROKE;
    let right = x + (w - s) as i32;
    let middle = y + ((h - s) / 2) as i32;
    let bottom = y + (h - s) as i32;

    let mut bar = |bx: i32, by: i32, bw: u32, bh: u32| {
        draw_filled_rect_mut(img, Rect::at(bx, by).of_size(bw, bh), INK);
    };

    match ch.to_ascii_uppercase() {
        'H' => {
            bar(x, y, s, h);
            bar(right, y, s, h);
            bar(x, middle, w, s);
        }
        'E' => {
            bar(x, y, s, h);
            bar(x, y, w, s);
            bar(x, middle, w - 2, s);
            bar(x, bottom, w, s);
        }
        'L' => {
            bar(x, y, s, h);
            bar(x, bottom, w, s);
        }
        'O' => {
            bar(x, y, w, s);
            bar(x, bottom, w, s);
            bar(x, y, s, h);
            bar(right, y, s, h);
        }
        'I' => {
            bar(x + ((w - s) / 2) as i32, y, s, h);
        }
        _ => {}
    }
}

pub fn hello_image() -> GrayImage {
    render_block_text("HELLO")
}

pub fn encode(img: &GrayImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Vec::new();
    DynamicImage::ImageLuma8(img.clone())
        .write_to(&mut Cursor::new(&mut out), format)
        .expect("encode fixture");
    out
}

pub fn write_fixture(dir: &Path, name: &str, img: &GrayImage) -> PathBuf {
    let path = dir.join(name);
    img.save(&path).expect("write fixture");
    path
}

/// Pipeline backed by the real Tesseract engine, or `None` when the engine
/// (or its `eng` model) cannot be loaded on this machine.
pub fn tesseract_pipeline(binarization: Binarization) -> Option<OcrPipeline> {
    let engine = TesseractEngine::default();
    if let Err(e) = engine.probe(&LanguageCode::default()) {
        eprintln!("skipping: Tesseract unavailable ({e})");
        return None;
    }

    Some(OcrPipeline::new(
        ImageNormalizer::new(binarization),
        TextExtractor::tesseract(engine.settings().clone()),
    ))
}

/// Tesseract sometimes reads a square `O` as a zero.
pub fn normalize_ocr(text: &str) -> String {
    text.to_uppercase().replace('0', "O")
}
