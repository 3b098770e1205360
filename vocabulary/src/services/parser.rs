//! Response body parsing
//!
//! Turns the server's JSON object into a [`VocabularySnapshot`] plus the
//! declared `recently_added_count`.

use crate::database::{ForeignLanguage, Vocabulary, VocabularySnapshot};
use crate::error::ParseError;
use serde::Deserialize;
use serde_json::{Map, Value};

const RECENTLY_ADDED_COUNT: &str = "recently_added_count";

/// One element of a language array on the wire
#[derive(Debug, Deserialize)]
struct WireVocabulary {
    english_word: String,
    foreign_word: String,
}

/// Parse a raw response body.
pub fn parse_body(body: &str) -> Result<(Value, VocabularySnapshot, i64), ParseError> {
    let value: Value = serde_json::from_str(body)?;
    let (snapshot, count) = parse_value(&value)?;
    Ok((value, snapshot, count))
}

/// Parse an already decoded JSON value.
///
/// Every language must be present as an array; each element must carry
/// `english_word` and `foreign_word` strings.
pub fn parse_value(value: &Value) -> Result<(VocabularySnapshot, i64), ParseError> {
    let object = value.as_object().ok_or(ParseError::NotAnObject)?;

    let recently_added_count = parse_count(object)?;

    let mut snapshot = VocabularySnapshot::new();
    for language in ForeignLanguage::ALL {
        snapshot.insert(language, parse_language(object, language)?);
    }

    tracing::debug!(
        "Parsed response: json_length={} vocabularies={} recently_added_count={}",
        object.len(),
        snapshot.len(),
        recently_added_count
    );

    Ok((snapshot, recently_added_count))
}

/// Accepts a JSON integer, a whole-number float, or a string holding an integer
fn parse_count(object: &Map<String, Value>) -> Result<i64, ParseError> {
    match object.get(RECENTLY_ADDED_COUNT) {
        None => Err(ParseError::MissingField(RECENTLY_ADDED_COUNT.to_string())),
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|value| value.fract() == 0.0 && value.abs() <= i64::MAX as f64)
                    .map(|value| value as i64)
            })
            .ok_or_else(|| ParseError::InvalidCount(number.to_string())),
        Some(Value::String(text)) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| ParseError::InvalidCount(text.clone())),
        Some(other) => Err(ParseError::InvalidCount(other.to_string())),
    }
}

fn parse_language(
    object: &Map<String, Value>,
    language: ForeignLanguage,
) -> Result<Vec<Vocabulary>, ParseError> {
    let field = language.name();
    let entries = object
        .get(field)
        .ok_or_else(|| ParseError::MissingField(field.to_string()))?
        .as_array()
        .ok_or_else(|| ParseError::WrongType {
            field: field.to_string(),
            expected: "an array",
        })?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let wire = WireVocabulary::deserialize(entry).map_err(|_| {
                ParseError::MissingField(format!(
                    "{}[{}].english_word/foreign_word",
                    field, index
                ))
            })?;
            Ok(Vocabulary::new(wire.english_word, wire.foreign_word, language))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_payload() {
        let body = json!({
            "recently_added_count": 2,
            "Hokkien": [
                {"english_word": "cat", "foreign_word": "niau"},
                {"english_word": "dog", "foreign_word": "káu"}
            ],
            "Japanese": [{"english_word": "cat", "foreign_word": "neko"}],
            "Mandarin": []
        })
        .to_string();

        let (_, snapshot, count) = parse_body(&body).unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            snapshot.get(ForeignLanguage::Hokkien),
            &[
                Vocabulary::new("cat", "niau", ForeignLanguage::Hokkien),
                Vocabulary::new("dog", "káu", ForeignLanguage::Hokkien),
            ]
        );
        assert_eq!(snapshot.get(ForeignLanguage::Japanese).len(), 1);
        assert!(snapshot.contains_language(ForeignLanguage::Mandarin));
        assert!(snapshot.get(ForeignLanguage::Mandarin).is_empty());
    }

    #[test]
    fn test_count_as_numeric_string() {
        let value = json!({
            "recently_added_count": "7",
            "Hokkien": [], "Japanese": [], "Mandarin": []
        });

        let (snapshot, count) = parse_value(&value).unwrap();

        assert_eq!(count, 7);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_count_as_whole_number_float() {
        let value = json!({
            "recently_added_count": 2.0,
            "Hokkien": [], "Japanese": [], "Mandarin": []
        });

        let (_, count) = parse_value(&value).unwrap();
        assert_eq!(count, 2);

        let fractional = json!({
            "recently_added_count": 2.5,
            "Hokkien": [], "Japanese": [], "Mandarin": []
        });
        assert!(matches!(
            parse_value(&fractional),
            Err(ParseError::InvalidCount(text)) if text == "2.5"
        ));
    }

    #[test]
    fn test_non_numeric_count_is_rejected() {
        let value = json!({
            "recently_added_count": "many",
            "Hokkien": [], "Japanese": [], "Mandarin": []
        });

        assert!(matches!(
            parse_value(&value),
            Err(ParseError::InvalidCount(text)) if text == "many"
        ));
    }

    #[test]
    fn test_missing_count_is_rejected() {
        let value = json!({"Hokkien": [], "Japanese": [], "Mandarin": []});

        assert!(matches!(
            parse_value(&value),
            Err(ParseError::MissingField(field)) if field == "recently_added_count"
        ));
    }

    #[test]
    fn test_missing_language_array_is_rejected() {
        let value = json!({"recently_added_count": 1, "Hokkien": [], "Mandarin": []});

        assert!(matches!(
            parse_value(&value),
            Err(ParseError::MissingField(field)) if field == "Japanese"
        ));
    }

    #[test]
    fn test_language_must_be_an_array() {
        let value = json!({
            "recently_added_count": 1,
            "Hokkien": {"english_word": "cat", "foreign_word": "niau"},
            "Japanese": [], "Mandarin": []
        });

        assert!(matches!(
            parse_value(&value),
            Err(ParseError::WrongType { field, .. }) if field == "Hokkien"
        ));
    }

    #[test]
    fn test_missing_word_field_is_rejected() {
        let value = json!({
            "recently_added_count": 1,
            "Hokkien": [{"english_word": "cat"}],
            "Japanese": [], "Mandarin": []
        });

        assert!(matches!(parse_value(&value), Err(ParseError::MissingField(_))));
    }

    #[test]
    fn test_invalid_json_and_non_object() {
        assert!(matches!(parse_body("{not json"), Err(ParseError::InvalidJson(_))));
        assert!(matches!(parse_body("[1, 2]"), Err(ParseError::NotAnObject)));
    }
}
