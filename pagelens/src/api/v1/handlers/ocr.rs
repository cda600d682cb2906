use std::path::Path;
use std::time::Duration;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;

use crate::api::state::AppState;
use crate::api::v1::dto::{OcrResponse, OcrUploadForm};
use crate::api::v1::response::{ApiError, ApiResponse};
use crate::error::{PagelensError, Result};
use crate::ocr::{ExtractedText, LanguageCode};

/// Image pulled from the multipart body, held in memory for the request's lifetime.
#[derive(Debug)]
struct ImageUpload {
    file_name: String,
    bytes: Vec<u8>,
    language: Option<String>,
}

/// `POST /api/v1/ocr`
#[utoipa::path(
    post,
    path = "/api/v1/ocr",
    tag = "ocr",
    operation_id = "ocr.extract",
    request_body(content_type = "multipart/form-data", content = OcrUploadForm, description = "Image file with an optional language field"),
    responses(
        (status = 200, description = "Text recognized", body = OcrResponse),
        (status = 400, description = "Invalid upload or undecodable image", body = ApiError),
        (status = 413, description = "Upload exceeds the size limit", body = ApiError),
        (status = 422, description = "No text found in the image", body = ApiError),
        (status = 500, description = "OCR engine failure", body = ApiError),
        (status = 504, description = "OCR timed out", body = ApiError),
    )
)]
pub async fn extract_text(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResponse<OcrResponse> {
    let upload = match read_upload(&state, multipart).await {
        Ok(upload) => upload,
        Err(e) => return e.into(),
    };

    let language = LanguageCode::from_optional_or(
        upload.language.as_deref(),
        &state.config.ocr.default_language,
    );

    tracing::info!(
        file_name = %upload.file_name,
        bytes = upload.bytes.len(),
        language = %language,
        "OCR request received"
    );

    match run_ocr_job(&state, upload.bytes, language).await {
        Ok(extracted) => ApiResponse::success(OcrResponse::from(extracted)),
        Err(e) => e.into(),
    }
}

async fn read_upload(state: &AppState, mut multipart: Multipart) -> Result<ImageUpload> {
    let max = state.config.server.max_upload_bytes;
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut language: Option<String> = None;

    let multipart_error = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            PagelensError::PayloadTooLarge { max }
        } else {
            PagelensError::Validation(format!("Invalid multipart body: {}", e.body_text()))
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|n| !n.trim().is_empty())
                    .ok_or_else(|| {
                        PagelensError::Validation("Uploaded file has no file name".to_string())
                    })?;

                let bytes = field.bytes().await.map_err(multipart_error)?;
                if bytes.len() > max {
                    return Err(PagelensError::PayloadTooLarge { max });
                }

                file = Some((file_name, bytes.to_vec()));
            }
            "language" | "lang" => {
                let value = field.text().await.map_err(multipart_error)?;
                language = Some(value);
            }
            _ => {}
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| {
        PagelensError::Validation("Missing required 'file' field".to_string())
    })?;

    validate_image(state, &file_name, &bytes)?;

    Ok(ImageUpload {
        file_name,
        bytes,
        language,
    })
}

fn validate_image(state: &AppState, file_name: &str, bytes: &[u8]) -> Result<()> {
    if bytes.is_empty() {
        return Err(PagelensError::Validation("Uploaded file is empty".to_string()));
    }

    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");
    if !state.config.ocr.is_allowed_extension(extension) {
        return Err(PagelensError::Validation(format!(
            "Unsupported file type '{file_name}'. Allowed extensions: {}",
            state.config.ocr.allowed_extensions.join(", ")
        )));
    }

    if !infer::is_image(bytes) {
        return Err(PagelensError::Validation(format!(
            "'{file_name}' does not contain a recognized image format"
        )));
    }

    Ok(())
}

/// Runs the pipeline on the blocking pool, bounded by the job semaphore and
/// the configured timeout.
async fn run_ocr_job(
    state: &AppState,
    bytes: Vec<u8>,
    language: LanguageCode,
) -> Result<ExtractedText> {
    let permit = state
        .jobs
        .clone()
        .acquire_owned()
        .await
        .map_err(|e| PagelensError::Internal(format!("OCR job queue closed: {e}")))?;

    let timeout_secs = state.config.ocr.timeout_secs;
    let pipeline = state.pipeline.clone();
    let task = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        pipeline.run_bytes(&bytes, &language)
    });

    match tokio::time::timeout(Duration::from_secs(timeout_secs), task).await {
        Ok(joined) => {
            joined.map_err(|e| PagelensError::Internal(format!("OCR task panicked: {e}")))?
        }
        Err(_) => {
            tracing::warn!(timeout_secs, "OCR request timed out");
            Err(PagelensError::Timeout(timeout_secs))
        }
    }
}

