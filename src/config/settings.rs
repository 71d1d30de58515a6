use super::ConfigError;
use crate::shared::logging::DEFAULT_LOG_FILTER;
use crate::wizard::DEFAULT_MODEL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const PLATFORM_URL_ENV: &str = "AGENTWRIGHT_PLATFORM_URL";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    pub platform: PlatformSettings,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default)]
    pub catalog_file: Option<PathBuf>,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlatformSettings {
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Applies environment overrides. `lookup` stands in for `std::env::var`.
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(PLATFORM_URL_ENV).filter(|url| !url.trim().is_empty()) {
            self.platform.base_url = url.trim().to_string();
        }
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_with(|name| std::env::var(name).ok());
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.platform.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::Settings(
                "`platform.base_url` must be non-empty".to_string(),
            ));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Settings(format!(
                "`platform.base_url` must start with http:// or https://, got `{base_url}`"
            )));
        }
        if self.platform.timeout_seconds == 0 {
            return Err(ConfigError::Settings(
                "`platform.timeout_seconds` must be at least 1".to_string(),
            ));
        }
        if self.default_model.trim().is_empty() {
            return Err(ConfigError::Settings(
                "`default_model` must be non-empty".to_string(),
            ));
        }
        if self
            .catalog_file
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            return Err(ConfigError::Settings(
                "`catalog_file` must be a non-empty path when set".to_string(),
            ));
        }
        Ok(())
    }
}
