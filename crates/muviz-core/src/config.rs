use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use muviz_api::tmdb::TmdbClient;
use serde::{Deserialize, Serialize};

use crate::error::MuvizError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Environment variable that overrides `tmdb.api_key`.
pub const API_KEY_ENV: &str = "MUVIZ_TMDB_API_KEY";

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub tmdb: TmdbConfig,
    pub paging: PagingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub log_filter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    pub api_key: String,
    pub base_url: String,
    pub image_base_url: String,
    pub language: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingConfig {
    pub prefetch_distance: usize,
}

impl AppConfig {
    /// Load config: user file if it exists, otherwise built-in defaults.
    /// The API key environment override is applied either way.
    pub fn load() -> Result<Self, MuvizError> {
        let mut config = Self::load_from(&Self::config_path())?;
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            config.apply_api_key_override(&key);
        }
        Ok(config)
    }

    /// Load from an explicit path, falling back to defaults when it is missing.
    pub fn load_from(path: &Path) -> Result<Self, MuvizError> {
        if path.exists() {
            let user_str =
                std::fs::read_to_string(path).map_err(|e| MuvizError::Config(e.to_string()))?;
            toml::from_str(&user_str).map_err(|e| MuvizError::Config(e.to_string()))
        } else {
            toml::from_str(DEFAULT_CONFIG).map_err(|e| MuvizError::Config(e.to_string()))
        }
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), MuvizError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), MuvizError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MuvizError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn apply_api_key_override(&mut self, key: &str) {
        let key = key.trim();
        if !key.is_empty() {
            self.tmdb.api_key = key.to_string();
        }
    }

    /// Build a TMDB client from the `[tmdb]` section.
    pub fn tmdb_client(&self) -> Result<TmdbClient, MuvizError> {
        let client = TmdbClient::new(self.tmdb.api_key.clone())
            .with_base_url(&self.tmdb.base_url)?
            .with_image_base_url(&self.tmdb.image_base_url)
            .with_language(self.tmdb.language.clone())
            .with_timeout(Duration::from_secs(self.tmdb.timeout_secs))?;
        Ok(client)
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Path to the database file.
    pub fn db_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().join("muviz.db"))
            .unwrap_or_else(|| PathBuf::from("muviz.db"))
    }

    /// Ensure the data directory exists and return the DB path.
    pub fn ensure_db_path() -> Result<PathBuf, MuvizError> {
        let path = Self::db_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "muviz")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}
