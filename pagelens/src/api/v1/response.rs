//! # V1 API Response Envelope & Error Contract
//!
//! Every v1 endpoint returns an [`ApiResponse<T>`] envelope:
//!
//! ```json
//! {
//!   "data": { ... },                                           // present on success
//!   "error": { "code": "no_text_found", "message": "..." }     // present on error
//! }
//! ```
//!
//! Exactly one of `data` and `error` is present. The HTTP status is derived
//! from the [`ErrorCode`] on error.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::PagelensError;
use crate::ocr::ExtractionFailure;

/// Machine-readable error code included in every error response.
///
/// Serialized as a snake_case string on the wire (e.g. `"invalid_request"`).
/// Each variant maps to a fixed HTTP status code via [`ErrorCode::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed upload, unsupported file type, or an image that could not
    /// be decoded. HTTP 400.
    InvalidRequest,
    /// Upload exceeds the configured size limit. HTTP 413.
    PayloadTooLarge,
    /// The image was processed but the engine recognized no text. HTTP 422.
    NoTextFound,
    /// Engine or server-side failure. Internal details are never leaked to
    /// the client. HTTP 500.
    InternalError,
    /// Recognition did not finish within the configured timeout. HTTP 504.
    Timeout,
}

impl ErrorCode {
    /// Returns the HTTP status code corresponding to this error code.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NoTextFound => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::PayloadTooLarge => write!(f, "payload_too_large"),
            Self::NoTextFound => write!(f, "no_text_found"),
            Self::InternalError => write!(f, "internal_error"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

/// Structured error payload within the API envelope.
///
/// ```json
/// { "code": "invalid_request", "message": "Missing required 'file' field" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiError {
    pub code: ErrorCode,
    /// Human-readable description safe to display to end users.
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    /// HTTP status to use in the response. Not serialized on the wire.
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success response with data (HTTP 200).
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            status: StatusCode::OK,
        }
    }

    /// Error response. HTTP status is derived from the [`ErrorCode`].
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        let status = code.status();
        Self {
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
            status,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        match serde_json::to_value(&self) {
            Ok(body) => (status, Json(body)).into_response(),
            Err(_) => {
                let body = serde_json::json!({
                    "error": {
                        "code": "internal_error",
                        "message": "An internal error occurred"
                    }
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl<T: Serialize> From<PagelensError> for ApiResponse<T> {
    /// Engine and server-side failures are logged with `tracing::error!` and
    /// answered with a generic message.
    fn from(err: PagelensError) -> Self {
        match err {
            PagelensError::Input(ref e) => ApiResponse::error(ErrorCode::InvalidRequest, e.to_string()),

            PagelensError::Validation(ref msg) => {
                ApiResponse::error(ErrorCode::InvalidRequest, msg.clone())
            }

            PagelensError::PayloadTooLarge { max } => ApiResponse::error(
                ErrorCode::PayloadTooLarge,
                format!("File too large (max {max} bytes)"),
            ),

            PagelensError::Extraction(ExtractionFailure::NoText) => ApiResponse::error(
                ErrorCode::NoTextFound,
                "No text could be extracted from the image",
            ),

            PagelensError::Timeout(_) => ApiResponse::error(ErrorCode::Timeout, err.to_string()),

            ref internal @ (PagelensError::Extraction(ExtractionFailure::Engine(_))
            | PagelensError::Io(_)
            | PagelensError::Internal(_)) => {
                tracing::error!(error = %internal, "Internal error mapped to v1 response");
                ApiResponse::error(ErrorCode::InternalError, "An internal error occurred")
            }
        }
    }
}
