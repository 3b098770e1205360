//! Application configuration
//!
//! Fixed constants for the server contract and storage formats, plus the
//! runtime configuration loaded from the environment at startup.

use crate::logging::DEFAULT_FILTER;
use std::path::PathBuf;
use std::time::Duration;

// ===== Server Contract =====

/// Host used when neither the settings nor the environment name one
pub const DEFAULT_SERVER_HOST: &str = "localhost:8080";

/// Resource path appended to the server host
pub const RESOURCE_PATH: &str = "/Vocabulary/vocabularies";

/// Query parameter carrying the local store's last update time
pub const LAST_UPDATED_PARAM: &str = "last_updated";

/// Seed hashed into the `Authorization` header value
pub const AUTH_SEED: &str = "aaron";

/// Connection establishment timeout
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Read timeout; the request as a whole may take connect + read
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

// ===== Date Formats =====

/// Timestamp format sent to the server (`yyyy-MM-dd HH:mm:ss`)
pub const DATE_FORMAT_WEB: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp format stored in the `date_in` column.
/// Sortable as text so `ORDER BY date_in DESC` yields the newest row.
pub const DATE_FORMAT_DATABASE: &str = "%Y-%m-%d %H:%M:%S";

/// Human readable format for the about screen (`MMMM d, yyyy hh:mm:ss a`)
pub const DATE_FORMAT_LONG: &str = "%B %-d, %Y %I:%M:%S %p";

/// Returned by `last_updated` when the store is empty
pub const DEFAULT_LAST_UPDATED: &str = "1950-01-01 00:00:00";

// ===== Storage =====

pub const DATABASE_FILE: &str = "vocabulary.db";
pub const SETTINGS_FILE: &str = "settings.json";
pub const VIEW_STATE_FILE: &str = "view_state.json";
pub const LOG_FILE: &str = "vocabulary.log";

// ===== Settings Limits =====

pub const MIN_FONT_SIZE: u8 = 14;
pub const MAX_FONT_SIZE: u8 = 20;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
    #[error("No data directory available; set VOCABULARY_DATA_DIR")]
    NoDataDir,
}

/// Runtime configuration loaded at startup
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    /// Replaces [`DEFAULT_SERVER_HOST`]; a non-empty server URL in the
    /// settings still takes precedence.
    pub server_host: Option<String>,
    pub log_filter: String,
}

impl AppConfig {
    /// Loads configuration from environment variables.
    ///
    /// A `.env` file in the current directory is honoured outside of tests.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let data_dir = match std::env::var("VOCABULARY_DATA_DIR") {
            Ok(dir) if dir.trim().is_empty() => {
                return Err(ConfigError::InvalidValue(
                    "VOCABULARY_DATA_DIR".to_string(),
                    "must not be empty".to_string(),
                ))
            }
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::data_dir()
                .map(|dir| dir.join("vocabulary"))
                .ok_or(ConfigError::NoDataDir)?,
        };

        let server_host = std::env::var("VOCABULARY_SERVER")
            .ok()
            .map(|host| host.trim().to_string())
            .filter(|host| !host.is_empty());

        let log_filter =
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());

        Ok(Self {
            data_dir,
            server_host,
            log_filter,
        })
    }

    /// Configuration rooted at an explicit directory, used by tests and embedders
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            server_host: None,
            log_filter: DEFAULT_FILTER.to_string(),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn settings_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    pub fn view_state_path(&self) -> PathBuf {
        self.data_dir.join(VIEW_STATE_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("logs").join(LOG_FILE)
    }
}
