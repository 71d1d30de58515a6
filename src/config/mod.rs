mod error;
mod load;
mod paths;
mod settings;

pub use error::ConfigError;
pub use load::{load_global_settings, load_settings_from};
pub use paths::{
    config_path_with, default_global_config_path, CONFIG_PATH_ENV, GLOBAL_SETTINGS_FILE_NAME,
    GLOBAL_STATE_DIR,
};
pub use settings::{PlatformSettings, Settings, PLATFORM_URL_ENV};
