//! Headless presentation state
//!
//! The searchable list shown for the selected language, and the state saved
//! when the view is torn down and rebuilt.

use crate::database::Vocabulary;
use crate::error::Result;
use crate::services::settings::Settings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Which side of the pair a search matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchType {
    #[default]
    English,
    Foreign,
}

/// Full list plus the currently visible (filtered) list
#[derive(Debug, Clone, Default)]
pub struct VocabularyList {
    all: Vec<Vocabulary>,
    visible: Vec<Vocabulary>,
}

impl VocabularyList {
    pub fn new(vocabularies: Vec<Vocabulary>) -> Self {
        Self {
            visible: vocabularies.clone(),
            all: vocabularies,
        }
    }

    pub fn items(&self) -> &[Vocabulary] {
        &self.visible
    }

    pub fn all(&self) -> &[Vocabulary] {
        &self.all
    }

    /// Show only vocabularies with a `/`-separated word starting with `search`.
    ///
    /// Matching is case-sensitive. A blank search shows everything.
    pub fn filter(&mut self, search: &str, search_type: SearchType) {
        let search = search.trim();

        self.visible = if search.is_empty() {
            self.all.clone()
        } else {
            self.all
                .iter()
                .filter(|vocabulary| {
                    let word = match search_type {
                        SearchType::English => &vocabulary.english_word,
                        SearchType::Foreign => &vocabulary.foreign_word,
                    };
                    word.split('/').any(|part| part.trim().starts_with(search))
                })
                .cloned()
                .collect()
        };

        tracing::debug!(
            "Filtered vocabularies: search={} type={:?} visible={}",
            search,
            search_type,
            self.visible.len()
        );
    }

    /// Replace the list. `None` leaves it untouched.
    pub fn update(&mut self, vocabularies: Option<Vec<Vocabulary>>) {
        let Some(vocabularies) = vocabularies else {
            return;
        };

        self.visible = vocabularies.clone();
        self.all = vocabularies;
        tracing::debug!("Vocabulary list updated: size={}", self.all.len());
    }
}

/// State preserved across view recreation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub current_list: Vec<Vocabulary>,
}

impl ViewState {
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string(self)?;
        fs::write(path, content).await?;
        tracing::debug!(
            "View state saved: list_size={} path={:?}",
            self.current_list.len(),
            path
        );

        Ok(())
    }

    /// Restore saved state; a missing file gives the default state
    pub async fn restore_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).await?;
        let state: ViewState = serde_json::from_str(&content)?;
        tracing::debug!("View state restored: list_size={}", state.current_list.len());

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ForeignLanguage;
    use tempfile::TempDir;

    fn hokkien(english: &str, foreign: &str) -> Vocabulary {
        Vocabulary::new(english, foreign, ForeignLanguage::Hokkien)
    }

    fn sample_list() -> Vec<Vocabulary> {
        vec![
            hokkien("ugly", "asdasdⁿ pházxcⁿ / pháiⁿ khoàⁿ"),
            hokkien("below / beneath / bottom / underneath", "tē-bīn / ē-tóe"),
            hokkien("boss / employer / master", "thâu-ke"),
            hokkien("bad", "pháiⁿ"),
            hokkien("beat / hit / strike", "phah"),
        ]
    }

    #[test]
    fn test_filter_foreign() {
        let mut list = VocabularyList::new(vec![hokkien("bad", "pháiⁿ"), hokkien("beat / hit", "phah")]);

        list.filter("pha", SearchType::Foreign);

        assert_eq!(list.items(), &[hokkien("beat / hit", "phah")]);
    }

    #[test]
    fn test_filter_foreign_matches_any_part() {
        let mut list = VocabularyList::new(sample_list());

        list.filter("phá", SearchType::Foreign);

        let english: Vec<&str> = list.items().iter().map(|v| v.english_word.as_str()).collect();
        assert_eq!(english, vec!["ugly", "bad"]);
    }

    #[test]
    fn test_filter_english_keeps_each_entry_once() {
        let mut list = VocabularyList::new(sample_list());

        list.filter(" bo ", SearchType::English);

        assert_eq!(
            list.items(),
            &[
                hokkien("below / beneath / bottom / underneath", "tē-bīn / ē-tóe"),
                hokkien("boss / employer / master", "thâu-ke"),
            ]
        );

        list.filter("b", SearchType::English);
        assert_eq!(list.items().len(), 4);
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let mut list = VocabularyList::new(sample_list());

        list.filter("Bo", SearchType::English);

        assert!(list.items().is_empty());
    }

    #[test]
    fn test_blank_search_restores_everything() {
        let mut list = VocabularyList::new(sample_list());
        list.filter("bad", SearchType::English);
        assert_eq!(list.items().len(), 1);

        list.filter("   ", SearchType::English);

        assert_eq!(list.items(), sample_list().as_slice());
    }

    #[test]
    fn test_update() {
        let mut list = VocabularyList::new(sample_list());

        list.update(None);
        assert_eq!(list.items(), sample_list().as_slice());

        list.update(Some(Vec::new()));
        assert!(list.items().is_empty());
        assert!(list.all().is_empty());

        list.update(Some(sample_list()));
        assert_eq!(list.items(), sample_list().as_slice());
    }

    #[tokio::test]
    async fn test_view_state_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state").join("view_state.json");

        let state = ViewState {
            settings: Settings {
                foreign_language: ForeignLanguage::Mandarin,
                ..Settings::default()
            },
            current_list: vec![Vocabulary::new("cat", "māo", ForeignLanguage::Mandarin)],
        };
        state.save_to(&path).await.unwrap();

        assert_eq!(ViewState::restore_from(&path).await.unwrap(), state);
    }

    #[tokio::test]
    async fn test_restore_missing_view_state() {
        let temp = TempDir::new().unwrap();

        let state = ViewState::restore_from(&temp.path().join("missing.json"))
            .await
            .unwrap();

        assert_eq!(state, ViewState::default());
    }
}
