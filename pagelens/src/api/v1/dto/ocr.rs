//! OCR request/response DTOs for the v1 API.

use serde::{Deserialize, Serialize};

use crate::ocr::ExtractedText;

/// Multipart form accepted by `POST /api/v1/ocr`. Documentation only; the
/// handler reads the fields straight from the multipart stream.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[allow(dead_code)]
pub struct OcrUploadForm {
    /// Image file. Extension must be in the configured allow-list
    /// (`png`, `jpg`, `jpeg`, `bmp`, `tif`, `tiff` by default).
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Tesseract language code, e.g. `eng`, `ara` or `eng+ara`. `lang` is
    /// accepted as an alias. Defaults to the server's configured language.
    pub language: Option<String>,
}

/// Response body for `POST /api/v1/ocr`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OcrResponse {
    /// Recognized text with surrounding whitespace removed. Never empty.
    pub text: String,
    /// Language profile the engine ran with.
    pub language: String,
    pub word_count: usize,
    pub character_count: usize,
}

impl From<ExtractedText> for OcrResponse {
    fn from(extracted: ExtractedText) -> Self {
        Self {
            word_count: extracted.word_count(),
            character_count: extracted.character_count(),
            language: extracted.language.to_string(),
            text: extracted.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::LanguageCode;

    #[test]
    fn ocr_response_serializes_camel_case() {
        let resp = OcrResponse::from(ExtractedText {
            text: "HELLO WORLD".to_string(),
            language: LanguageCode::default(),
        });
        let json = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(json["text"], "HELLO WORLD");
        assert_eq!(json["language"], "eng");
        assert_eq!(json["wordCount"], 2);
        assert_eq!(json["characterCount"], 11);
    }
}
