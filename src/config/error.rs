use crate::shared::errors::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not valid settings yaml: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid settings: {0}")]
    Settings(String),
    #[error("no settings path: set AGENTWRIGHT_CONFIG or HOME")]
    HomeDirectoryUnavailable,
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Read { .. } => ErrorKind::NotFound,
            Self::Parse { .. } | Self::Settings(_) | Self::HomeDirectoryUnavailable => {
                ErrorKind::Validation
            }
        }
    }
}
