use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::api::v1::response::ApiResponse;
use crate::ocr::{ExtractionFailure, InputError};

#[derive(Error, Debug)]
pub enum PagelensError {
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionFailure),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upload exceeds the {max} byte limit")]
    PayloadTooLarge { max: usize },

    #[error("OCR request timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl PagelensError {
    /// True when the failure came from the source image rather than the engine.
    pub fn is_input_error(&self) -> bool {
        matches!(self, PagelensError::Input(_))
    }
}

impl IntoResponse for PagelensError {
    fn into_response(self) -> Response {
        ApiResponse::<()>::from(self).into_response()
    }
}

pub type Result<T> = std::result::Result<T, PagelensError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_input_error_maps_to_bad_request() {
        let err: PagelensError = InputError::Unreadable("bad header".to_string()).into();
        assert!(err.is_input_error());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_no_text_maps_to_unprocessable() {
        let err: PagelensError = ExtractionFailure::NoText.into();
        assert!(!err.is_input_error());
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_engine_failure_maps_to_server_error() {
        let err: PagelensError = ExtractionFailure::Engine("model missing".to_string()).into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_timeout_message_mentions_seconds() {
        let err = PagelensError::Timeout(30);
        assert!(err.to_string().contains("30 seconds"));
        assert_eq!(err.into_response().status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_io_error_converts() {
        let err: PagelensError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, PagelensError::Io(_)));
    }
}
