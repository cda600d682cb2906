use serde::{Deserialize, Serialize};

/// Latin-script profile used when the caller does not name one.
pub const DEFAULT_LANGUAGE: &str = "eng";

/// Tesseract language profile, e.g. `eng`, `ara` or `eng+ara`.
///
/// The value is opaque: it is handed to the engine exactly as supplied and
/// never checked against the installed traineddata. A missing model surfaces
/// as an engine failure at extraction time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Absent or blank input falls back to [`DEFAULT_LANGUAGE`].
    pub fn from_optional(code: Option<&str>) -> Self {
        Self::from_optional_or(code, &Self::default())
    }

    /// Absent or blank input falls back to `default`.
    pub fn from_optional_or(code: Option<&str>, default: &LanguageCode) -> Self {
        match code.map(str::trim) {
            Some(code) if !code.is_empty() => Self(code.to_string()),
            _ => default.clone(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self(DEFAULT_LANGUAGE.to_string())
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LanguageCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_latin_profile() {
        assert_eq!(LanguageCode::default().as_str(), "eng");
    }

    #[test]
    fn test_from_optional_missing_or_blank() {
        assert_eq!(LanguageCode::from_optional(None).as_str(), "eng");
        assert_eq!(LanguageCode::from_optional(Some("")).as_str(), "eng");
        assert_eq!(LanguageCode::from_optional(Some("  \t")).as_str(), "eng");
    }

    #[test]
    fn test_from_optional_keeps_value_unvalidated() {
        assert_eq!(LanguageCode::from_optional(Some(" ara ")).as_str(), "ara");
        assert_eq!(
            LanguageCode::from_optional(Some("not-a-real-model")).as_str(),
            "not-a-real-model"
        );
        assert_eq!(LanguageCode::from("eng+ara").to_string(), "eng+ara");
    }

    #[test]
    fn test_from_optional_or_uses_given_default() {
        let fallback = LanguageCode::new("deu");
        assert_eq!(LanguageCode::from_optional_or(None, &fallback).as_str(), "deu");
        assert_eq!(LanguageCode::from_optional_or(Some(" "), &fallback).as_str(), "deu");
        assert_eq!(LanguageCode::from_optional_or(Some("ara"), &fallback).as_str(), "ara");
    }
}
