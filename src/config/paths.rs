use crate::config::ConfigError;
use std::path::PathBuf;

pub const GLOBAL_STATE_DIR: &str = ".agentwright";
pub const GLOBAL_SETTINGS_FILE_NAME: &str = "config.yaml";
/// Points at a settings file directly, bypassing `~/.agentwright`.
pub const CONFIG_PATH_ENV: &str = "AGENTWRIGHT_CONFIG";

pub fn default_global_config_path() -> Result<PathBuf, ConfigError> {
    config_path_with(|name| std::env::var_os(name).and_then(|value| value.into_string().ok()))
}

/// Resolves the settings path from `lookup`, which stands in for the process
/// environment. `AGENTWRIGHT_CONFIG` wins over `$HOME/.agentwright/config.yaml`.
pub fn config_path_with<F>(lookup: F) -> Result<PathBuf, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(CONFIG_PATH_ENV).filter(|path| !path.trim().is_empty()) {
        return Ok(PathBuf::from(path.trim()));
    }
    let home = lookup("HOME")
        .filter(|home| !home.is_empty())
        .ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home)
        .join(GLOBAL_STATE_DIR)
        .join(GLOBAL_SETTINGS_FILE_NAME))
}
