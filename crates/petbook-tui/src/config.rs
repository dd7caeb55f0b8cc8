//! Application configuration management.
//!
//! Configuration is stored at `~/.config/petbook/config.json`. The API
//! base URL can also come from the `PETBOOK_API_URL` environment
//! variable, which wins over the file.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/log directory paths
const APP_NAME: &str = "petbook";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default API base URL (the backend's development address)
const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default pets page size
const DEFAULT_PAGE_LIMIT: u32 = 50;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub page_limit: Option<u32>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    #[allow(dead_code)] // Infrastructure for a future settings screen
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Effective API base URL: env override, then config, then default.
    pub fn api_url(&self) -> String {
        std::env::var("PETBOOK_API_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn page_limit(&self) -> u32 {
        self.page_limit.unwrap_or(DEFAULT_PAGE_LIMIT)
    }

    /// Directory for the log file.
    pub fn log_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.page_limit(), 50);
    }

    #[test]
    fn test_config_file_url_wins_over_default() {
        let config = Config { api_url: Some("http://pets.example:9000".to_string()), page_limit: None };
        // Only meaningful when the env override is unset, as in tests
        if std::env::var("PETBOOK_API_URL").is_err() {
            assert_eq!(config.api_url(), "http://pets.example:9000");
        }
    }
}
