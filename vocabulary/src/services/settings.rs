//! Settings service
//!
//! Manages user preferences persistence using JSON file storage.

use crate::config::{MAX_FONT_SIZE, MIN_FONT_SIZE, SETTINGS_FILE};
use crate::database::ForeignLanguage;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tokio::fs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontName {
    #[default]
    Default,
    Serif,
    SansSerif,
    Monospace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

/// Automatic refresh interval. Only manual updates exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpdateInterval {
    #[default]
    Never,
}

/// User preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub foreign_language: ForeignLanguage,
    #[serde(default)]
    pub font_name: FontName,
    #[serde(default)]
    pub font_style: FontStyle,
    #[serde(default = "default_font_size")]
    pub font_size: u8,
    #[serde(default)]
    pub update_interval: UpdateInterval,
    /// Host override; empty means use the configured server
    #[serde(default)]
    pub server_url: String,
}

fn default_font_size() -> u8 {
    MIN_FONT_SIZE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            foreign_language: ForeignLanguage::default(),
            font_name: FontName::default(),
            font_style: FontStyle::default(),
            font_size: default_font_size(),
            update_interval: UpdateInterval::default(),
            server_url: String::new(),
        }
    }
}

impl Settings {
    /// Server host override, if one is set
    pub fn server_override(&self) -> Option<&str> {
        let url = self.server_url.trim();
        (!url.is_empty()).then_some(url)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&self.font_size) {
            return Err(AppError::InvalidSettings(format!(
                "font size {} outside {}..={}",
                self.font_size, MIN_FONT_SIZE, MAX_FONT_SIZE
            )));
        }

        Ok(())
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Foreign language: {} Font name: {:?} Font style: {:?} Font size: {} Update interval: {:?} Server URL: {}",
            self.foreign_language,
            self.font_name,
            self.font_style,
            self.font_size,
            self.update_interval,
            self.server_url
        )
    }
}

/// Service for loading and saving [`Settings`]
#[derive(Clone)]
pub struct SettingsService {
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            settings_path: data_dir.join(SETTINGS_FILE),
        }
    }

    /// Load settings from disk or create default if not exists
    pub async fn load(&self) -> Result<Settings> {
        if !self.settings_path.exists() {
            tracing::info!("Settings file not found, creating default settings");
            let default = Settings::default();
            self.save(&default).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(&self.settings_path).await?;
        let settings: Settings = serde_json::from_str(&content)
            .map_err(|e| AppError::InvalidSettings(format!("Failed to parse settings: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub async fn save(&self, settings: &Settings) -> Result<()> {
        settings.validate()?;

        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.settings_path, content).await?;
        tracing::info!("Settings saved: {}", settings);

        Ok(())
    }
}
