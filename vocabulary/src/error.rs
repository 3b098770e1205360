//! Error types for the vocabulary application
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to whatever presentation layer hosts the library.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Unknown foreign language: {0}")]
    UnknownLanguage(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

/// Failures while turning a server response body into a vocabulary snapshot
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("response body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("response body is not a JSON object")]
    NotAnObject,

    #[error("missing field '{0}'")]
    MissingField(String),

    #[error("field '{field}' is not {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("recently_added_count is not a number: {0}")]
    InvalidCount(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serializes_as_message() {
        let error = AppError::UnknownLanguage("Klingon".to_string());

        assert_eq!(
            serde_json::to_string(&error).unwrap(),
            r#""Unknown foreign language: Klingon""#
        );
    }

    #[test]
    fn test_parse_error_converts() {
        let error: AppError = ParseError::NotAnObject.into();

        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            serde_json::json!("Parse error: response body is not a JSON object")
        );
    }
}
