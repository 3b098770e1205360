//! Database models
//!
//! Rust structs representing vocabulary entities and the snapshot parsed
//! from one server response. All models use serde so they can be handed to
//! the presentation layer and saved across view recreation.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Languages a vocabulary can be paired against English.
///
/// Declaration order is the iteration order used everywhere (parsing,
/// counting, snapshot traversal).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ForeignLanguage {
    #[default]
    Hokkien,
    Japanese,
    Mandarin,
}

impl ForeignLanguage {
    pub const ALL: [ForeignLanguage; 3] = [
        ForeignLanguage::Hokkien,
        ForeignLanguage::Japanese,
        ForeignLanguage::Mandarin,
    ];

    /// Name used as JSON key and as the stored column value
    pub fn name(self) -> &'static str {
        match self {
            ForeignLanguage::Hokkien => "Hokkien",
            ForeignLanguage::Japanese => "Japanese",
            ForeignLanguage::Mandarin => "Mandarin",
        }
    }
}

impl fmt::Display for ForeignLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ForeignLanguage {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ForeignLanguage::ALL
            .into_iter()
            .find(|language| language.name() == s)
            .ok_or_else(|| AppError::UnknownLanguage(s.to_string()))
    }
}

/// An English word paired with its translation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vocabulary {
    pub english_word: String,
    pub foreign_word: String,
    pub foreign_language: ForeignLanguage,
}

impl Vocabulary {
    pub fn new(
        english_word: impl Into<String>,
        foreign_word: impl Into<String>,
        foreign_language: ForeignLanguage,
    ) -> Self {
        Self {
            english_word: english_word.into(),
            foreign_word: foreign_word.into(),
            foreign_language,
        }
    }
}

impl fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "English: {} {}: {}",
            self.english_word, self.foreign_language, self.foreign_word
        )
    }
}

/// Row shape returned by vocabulary queries
#[derive(Debug, Clone, FromRow)]
pub struct VocabularyRow {
    pub english_word: String,
    pub foreign_word: String,
    pub foreign_language: String,
}

impl TryFrom<VocabularyRow> for Vocabulary {
    type Error = AppError;

    fn try_from(row: VocabularyRow) -> Result<Self, Self::Error> {
        Ok(Vocabulary {
            foreign_language: row.foreign_language.parse()?,
            english_word: row.english_word,
            foreign_word: row.foreign_word,
        })
    }
}

/// Vocabularies grouped by language, as parsed from one server response.
///
/// Languages iterate in declaration order; each list keeps server order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularySnapshot {
    languages: BTreeMap<ForeignLanguage, Vec<Vocabulary>>,
}

impl VocabularySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, language: ForeignLanguage, vocabularies: Vec<Vocabulary>) {
        self.languages.insert(language, vocabularies);
    }

    /// Vocabularies of one language; empty when the language is absent
    pub fn get(&self, language: ForeignLanguage) -> &[Vocabulary] {
        self.languages
            .get(&language)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains_language(&self, language: ForeignLanguage) -> bool {
        self.languages.contains_key(&language)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ForeignLanguage, &[Vocabulary])> {
        self.languages
            .iter()
            .map(|(language, list)| (*language, list.as_slice()))
    }

    /// Total number of vocabularies across all languages
    pub fn len(&self) -> usize {
        self.languages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of one fetch attempt against the server
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseVocabulary {
    pub status_code: u16,
    pub status_text: String,
    pub body: Option<serde_json::Value>,
    pub snapshot: Option<VocabularySnapshot>,
    pub recently_added_count: i64,
}

impl ResponseVocabulary {
    /// A 200 response carrying a parsed body
    pub fn ok(body: serde_json::Value, snapshot: VocabularySnapshot, recently_added_count: i64) -> Self {
        Self {
            status_code: 200,
            status_text: status_text(200).to_string(),
            body: Some(body),
            snapshot: Some(snapshot),
            recently_added_count,
        }
    }

    /// A 200 response whose body was blank
    pub fn empty() -> Self {
        Self {
            status_code: 200,
            status_text: status_text(200).to_string(),
            body: None,
            snapshot: None,
            recently_added_count: 0,
        }
    }

    /// A non-200 response, described by the status text table
    pub fn status(status_code: u16) -> Self {
        Self {
            status_code,
            status_text: status_text(status_code).to_string(),
            body: None,
            snapshot: None,
            recently_added_count: 0,
        }
    }

    /// A request that never produced a response
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            status_code: 500,
            status_text: message.into(),
            body: None,
            snapshot: None,
            recently_added_count: 0,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }
}

/// Human readable text for the status codes the server is known to send
pub fn status_text(status_code: u16) -> &'static str {
    match status_code {
        200 => "Ok",
        400 => "Bad Request",
        401 => "Unauthorized Access",
        500 => "Internal Server Error",
        _ => "Status Code Unknown",
    }
}

/// Outcome of `replace_all`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaceReport {
    pub inserted: u64,
    /// Rows skipped by the `(english_word, foreign_word)` uniqueness constraint
    pub rejected: u64,
}
