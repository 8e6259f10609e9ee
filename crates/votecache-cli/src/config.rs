//! Application configuration management.
//!
//! Configuration is stored at `~/.config/votecache/config.json`. Every
//! field is optional; missing values fall back to the defaults below.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_API_BASE_URL;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "votecache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides `api_base_url`
pub const API_URL_ENV: &str = "VOTECACHE_API_URL";

/// Default number of votes fetched at once
const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    /// Overrides the platform cache directory.
    pub cache_dir: Option<PathBuf>,
    /// Upper bound on bytes held by the cache files.
    pub quota_bytes: Option<usize>,
    pub max_concurrent_requests: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            cache_dir: None,
            quota_bytes: None,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

impl Config {
    /// Loads the config file and applies environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_base_url = url;
            }
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn concurrency(&self) -> usize {
        self.max_concurrent_requests.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api_base_url, "https://howtheyvote.eu/api");
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"quota_bytes": 5242880, "cache_dir": "/tmp/votes"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.quota_bytes, Some(5_242_880));
        assert_eq!(config.cache_dir().unwrap(), PathBuf::from("/tmp/votes"));
        assert_eq!(config.max_concurrent_requests, 4);
        assert_eq!(config.api_base_url, "https://howtheyvote.eu/api");
    }

    #[test]
    fn test_concurrency_is_at_least_one() {
        let config = Config {
            max_concurrent_requests: 0,
            ..Config::default()
        };
        assert_eq!(config.concurrency(), 1);
    }
}
