use super::{default_global_config_path, ConfigError, Settings};
use std::path::Path;

pub fn load_global_settings() -> Result<Settings, ConfigError> {
    let path = default_global_config_path()?;
    load_settings_from(&path)
}

/// Reads, applies environment overrides, then validates.
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let mut settings = Settings::from_path(path)?;
    settings.apply_env_overrides();
    settings.validate()?;
    tracing::debug!(path = %path.display(), "settings loaded");
    Ok(settings)
}
