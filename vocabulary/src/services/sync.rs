//! Vocabulary synchronization
//!
//! Pulls the server snapshot newer than the local cache, replaces the cache
//! when the server reports new vocabularies, and turns every outcome into a
//! message for the user. At most one sync runs at a time; a trigger while
//! one is in flight is rejected, not queued.

use crate::config::DATE_FORMAT_WEB;
use crate::database::{ForeignLanguage, Vocabulary, VocabularyRepository, VocabularySnapshot};
use crate::services::fetcher::VocabularySource;
use crate::services::settings::Settings;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const NO_NEW_VOCABULARIES: &str = "No new vocabularies available.";
pub const FAILED_SAVING: &str = "Failed saving to disk.";
pub const FAILED_READING_DISK: &str = "Failed reading from disk.";
pub const FAILED_READING_SERVER: &str = "Failed reading vocabularies from server.";
pub const ALREADY_UPDATING: &str = "Already updating.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncKind {
    /// The cache was replaced; `added` is the server-declared count
    Applied { added: i64 },
    NoNewVocabularies,
    /// The server answered with a non-200 status
    Rejected { status_code: u16 },
    Failed,
    /// Another sync was already in flight
    Busy,
}

/// Result of one sync attempt, ready for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncOutcome {
    pub kind: SyncKind,
    pub message: String,
    /// Vocabularies of the selected language after the attempt
    pub vocabularies: Vec<Vocabulary>,
}

impl SyncOutcome {
    fn busy() -> Self {
        Self {
            kind: SyncKind::Busy,
            message: ALREADY_UPDATING.to_string(),
            vocabularies: Vec::new(),
        }
    }
}

/// Message for a successful replace
pub fn added_message(count: i64) -> String {
    if count > 1 {
        format!("{} new vocabularies added.", count)
    } else {
        format!("{} new vocabulary added.", count)
    }
}

/// Clears the in-flight flag however the sync ends, including when its
/// future is dropped mid-await.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Orchestrates fetch, replace and reporting
#[derive(Clone)]
pub struct Synchronizer {
    repo: VocabularyRepository,
    updating: Arc<AtomicBool>,
}

impl Synchronizer {
    pub fn new(repo: VocabularyRepository) -> Self {
        Self {
            repo,
            updating: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_updating(&self) -> bool {
        self.updating.load(Ordering::Acquire)
    }

    fn claim(&self) -> Option<InFlight> {
        self.updating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(Arc::clone(&self.updating)))
    }

    /// Run one sync. Never fails; every error becomes the outcome's message.
    pub async fn sync(&self, source: &dyn VocabularySource, settings: &Settings) -> SyncOutcome {
        let Some(_in_flight) = self.claim() else {
            tracing::info!("Sync requested while another is in flight");
            return SyncOutcome::busy();
        };

        let language = settings.foreign_language;
        let (kind, message, applied) = self.pull_and_apply(source).await;

        let vocabularies = match applied {
            Some(snapshot) => snapshot.get(language).to_vec(),
            None => self.reload(language).await,
        };

        tracing::info!(
            "Sync finished: kind={:?} message={} language={} shown={}",
            kind,
            message,
            language,
            vocabularies.len()
        );

        SyncOutcome {
            kind,
            message,
            vocabularies,
        }
    }

    async fn pull_and_apply(
        &self,
        source: &dyn VocabularySource,
    ) -> (SyncKind, String, Option<VocabularySnapshot>) {
        let last_updated = match self.repo.last_updated(DATE_FORMAT_WEB).await {
            Ok(last_updated) => last_updated,
            Err(e) => {
                tracing::error!("Failed to read last update time: {}", e);
                return (SyncKind::Failed, FAILED_READING_DISK.to_string(), None);
            }
        };

        let response = match source.fetch(&last_updated).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Failed to parse vocabulary response: {}", e);
                return (SyncKind::Failed, FAILED_READING_SERVER.to_string(), None);
            }
        };

        if !response.is_ok() {
            return (
                SyncKind::Rejected {
                    status_code: response.status_code,
                },
                format!("{}. {}", response.status_code, response.status_text),
                None,
            );
        }

        let recently_added_count = response.recently_added_count;
        let snapshot = match response.snapshot {
            Some(snapshot) if recently_added_count > 0 && !snapshot.is_empty() => snapshot,
            _ => {
                return (
                    SyncKind::NoNewVocabularies,
                    NO_NEW_VOCABULARIES.to_string(),
                    None,
                )
            }
        };

        match self.repo.replace_all(&snapshot).await {
            Ok(report) => {
                // Rejected duplicates are only logged; the message keeps the
                // count the server declared.
                if report.rejected > 0 {
                    tracing::warn!(
                        "{} vocabularies rejected as duplicates; server declared {} new",
                        report.rejected,
                        recently_added_count
                    );
                }
                (
                    SyncKind::Applied {
                        added: recently_added_count,
                    },
                    added_message(recently_added_count),
                    Some(snapshot),
                )
            }
            Err(e) => {
                tracing::error!("Failed to save vocabularies: {}", e);
                (SyncKind::Failed, FAILED_SAVING.to_string(), None)
            }
        }
    }

    async fn reload(&self, language: ForeignLanguage) -> Vec<Vocabulary> {
        self.repo
            .query_by_language(language)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("Failed to reload {} vocabularies: {}", language, e);
                Vec::new()
            })
    }
}
