//! Repository layer for the vocabulary table
//!
//! The table is only ever written in bulk: `replace_all` swaps the whole
//! cache for a new snapshot inside one transaction.

use super::models::*;
use crate::config::{DATE_FORMAT_DATABASE, DEFAULT_LAST_UPDATED};
use crate::error::Result;
use chrono::{Local, NaiveDateTime};
use sqlx::SqlitePool;
use std::collections::BTreeMap;

/// Repository for vocabulary storage
#[derive(Clone)]
pub struct VocabularyRepository {
    pool: SqlitePool,
}

impl VocabularyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Replace every stored vocabulary with the snapshot, stamped with the current time
    pub async fn replace_all(&self, snapshot: &VocabularySnapshot) -> Result<ReplaceReport> {
        self.replace_all_at(snapshot, Local::now().naive_local())
            .await
    }

    /// Replace every stored vocabulary with the snapshot.
    ///
    /// Runs as a single transaction: either the old rows are gone and the new
    /// ones are in, or nothing changed. Pairs that collide with the
    /// `(english_word, foreign_word)` constraint are skipped and counted.
    pub async fn replace_all_at(
        &self,
        snapshot: &VocabularySnapshot,
        stamped_at: NaiveDateTime,
    ) -> Result<ReplaceReport> {
        let date_in = stamped_at.format(DATE_FORMAT_DATABASE).to_string();
        let mut report = ReplaceReport::default();

        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM vocabulary")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        for (language, vocabularies) in snapshot.iter() {
            for vocabulary in vocabularies {
                let rows = sqlx::query(
                    r#"
                    INSERT OR IGNORE INTO vocabulary (english_word, foreign_word, foreign_language, date_in)
                    VALUES (?, ?, ?, ?)
                    "#,
                )
                .bind(&vocabulary.english_word)
                .bind(&vocabulary.foreign_word)
                .bind(language.name())
                .bind(&date_in)
                .execute(&mut *tx)
                .await?
                .rows_affected();

                if rows == 0 {
                    tracing::debug!("Rejected duplicate vocabulary: {}", vocabulary);
                    report.rejected += 1;
                } else {
                    report.inserted += rows;
                }
            }
        }

        tx.commit().await?;

        tracing::debug!(
            "Replaced vocabularies: deleted={} inserted={} rejected={} date_in={}",
            deleted,
            report.inserted,
            report.rejected,
            date_in
        );
        Ok(report)
    }

    /// Vocabularies of one language in storage order
    pub async fn query_by_language(&self, language: ForeignLanguage) -> Result<Vec<Vocabulary>> {
        let rows = sqlx::query_as::<_, VocabularyRow>(
            r#"
            SELECT english_word, foreign_word, foreign_language
            FROM vocabulary
            WHERE foreign_language = ?
            ORDER BY id ASC
            "#,
        )
        .bind(language.name())
        .fetch_all(&self.pool)
        .await?;

        let vocabularies = rows
            .into_iter()
            .map(Vocabulary::try_from)
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "Loaded {} {} vocabularies from disk",
            vocabularies.len(),
            language
        );
        Ok(vocabularies)
    }

    /// Stored vocabulary count for every language, zero included
    pub async fn count_per_language(&self) -> Result<BTreeMap<ForeignLanguage, i64>> {
        let mut counts = BTreeMap::new();

        for language in ForeignLanguage::ALL {
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM vocabulary WHERE foreign_language = ?")
                    .bind(language.name())
                    .fetch_one(&self.pool)
                    .await?;

            counts.insert(language, count);
        }

        tracing::debug!("Vocabulary counts: {:?}", counts);
        Ok(counts)
    }

    pub async fn count_all(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vocabulary")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Newest `date_in` rendered with the given chrono format string.
    ///
    /// An empty store yields [`DEFAULT_LAST_UPDATED`] unformatted. A stored
    /// value that cannot be parsed is returned as-is.
    pub async fn last_updated(&self, format: &str) -> Result<String> {
        let stored: Option<String> = sqlx::query_scalar(
            "SELECT date_in FROM vocabulary ORDER BY date_in DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(stored) = stored else {
            return Ok(DEFAULT_LAST_UPDATED.to_string());
        };

        let last_updated = match NaiveDateTime::parse_from_str(&stored, DATE_FORMAT_DATABASE) {
            Ok(date) => date.format(format).to_string(),
            Err(e) => {
                tracing::error!("Failed to parse stored date_in '{}': {}", stored, e);
                stored
            }
        };

        tracing::debug!("Last updated: {}", last_updated);
        Ok(last_updated)
    }

    /// Delete every stored vocabulary. Cannot be undone.
    pub async fn delete_all(&self) -> Result<u64> {
        let affected = sqlx::query("DELETE FROM vocabulary")
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!("Deleted all vocabularies from disk: affected={}", affected);
        Ok(affected)
    }
}
