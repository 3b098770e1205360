//! Application state and initialization
//!
//! This module manages the central application state and lifecycle.
//! All services are initialized here and made available through AppState.

use crate::config::{AppConfig, DATE_FORMAT_LONG};
use crate::database::{create_pool, ForeignLanguage, Vocabulary, VocabularyRepository};
use crate::error::Result;
use crate::services::{
    RemoteFetcher, Settings, SettingsService, SyncHandle, SyncOutcome, SyncTask, Synchronizer,
    ViewState,
};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Data behind the about screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AboutInfo {
    pub version: String,
    pub counts: BTreeMap<ForeignLanguage, i64>,
    pub last_updated: String,
}

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pool: SqlitePool,
    repo: VocabularyRepository,
    synchronizer: Synchronizer,
    settings_service: SettingsService,
}

impl AppState {
    /// Create directories, open the store and wire up the services
    pub async fn initialize(config: AppConfig) -> Result<Self> {
        tracing::info!("Initializing application");
        tracing::info!("App data directory: {:?}", config.data_dir);

        std::fs::create_dir_all(&config.data_dir)?;
        if let Some(log_dir) = config.log_path().parent() {
            std::fs::create_dir_all(log_dir)?;
        }

        let pool = create_pool(&config.database_path()).await?;
        let repo = VocabularyRepository::new(pool.clone());
        let synchronizer = Synchronizer::new(repo.clone());
        let settings_service = SettingsService::new(config.settings_dir());

        tracing::info!("Application initialized successfully");

        Ok(Self {
            config,
            pool,
            repo,
            synchronizer,
            settings_service,
        })
    }

    pub fn repository(&self) -> &VocabularyRepository {
        &self.repo
    }

    pub fn is_updating(&self) -> bool {
        self.synchronizer.is_updating()
    }

    pub async fn vocabularies(&self, language: ForeignLanguage) -> Result<Vec<Vocabulary>> {
        self.repo.query_by_language(language).await
    }

    pub async fn counts(&self) -> Result<BTreeMap<ForeignLanguage, i64>> {
        self.repo.count_per_language().await
    }

    pub async fn about(&self) -> Result<AboutInfo> {
        Ok(AboutInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
            counts: self.repo.count_per_language().await?,
            last_updated: self.repo.last_updated(DATE_FORMAT_LONG).await?,
        })
    }

    /// Remove every cached vocabulary. The next sync fetches everything again.
    pub async fn delete_all(&self) -> Result<u64> {
        self.repo.delete_all().await
    }

    fn fetcher(&self, settings: &Settings) -> Result<RemoteFetcher> {
        RemoteFetcher::for_settings(settings, self.config.server_host.as_deref())
    }

    /// Sync on the current task and wait for the outcome
    pub async fn sync(&self, settings: &Settings) -> Result<SyncOutcome> {
        let fetcher = self.fetcher(settings)?;
        Ok(self.synchronizer.sync(&fetcher, settings).await)
    }

    /// Sync on a background task
    pub fn start_sync(
        &self,
        settings: Settings,
    ) -> Result<(SyncHandle, oneshot::Receiver<SyncOutcome>)> {
        let fetcher = Arc::new(self.fetcher(&settings)?);
        Ok(SyncTask::spawn(self.synchronizer.clone(), fetcher, settings))
    }

    pub async fn load_settings(&self) -> Result<Settings> {
        self.settings_service.load().await
    }

    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.settings_service.save(settings).await
    }

    pub async fn save_view_state(&self, state: &ViewState) -> Result<()> {
        state.save_to(&self.config.view_state_path()).await
    }

    pub async fn restore_view_state(&self) -> Result<ViewState> {
        ViewState::restore_from(&self.config.view_state_path()).await
    }

    /// Close the store; in-flight queries finish first
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}
