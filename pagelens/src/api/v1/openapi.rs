use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pagelens API",
        version = "1.0.0",
        description = "Image-to-text extraction. Uploaded images are normalized (300 DPI, grayscale, smoothed, binarized) and read by Tesseract.",
    ),
    paths(
        handlers::health::health_check,
        handlers::ocr::extract_text,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        // OCR
        dto::ocr::OcrUploadForm,
        dto::ocr::OcrResponse,
        crate::ocr::Binarization,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::EngineHealth,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "ocr", description = "Text extraction from uploaded images"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
