use crate::shared::errors::ErrorKind;
use serde::{Deserialize, Serialize};

pub const NOT_FOUND_CODE: &str = "NOT_FOUND";
pub const INTERNAL_ERROR_CODE: &str = "INTERNAL_ERROR";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("service error {code}: {message}")]
    Service { code: String, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl PlatformError {
    pub fn from_envelope(code: &str, message: &str) -> Self {
        if code == NOT_FOUND_CODE {
            Self::NotFound(message.to_string())
        } else {
            Self::Service {
                code: code.to_string(),
                message: message.to_string(),
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Service { .. } | Self::InvalidResponse(_) => ErrorKind::Service,
            Self::Network(_) => ErrorKind::Network,
        }
    }

    /// Human-readable reason without the classification prefix.
    pub fn reason(&self) -> &str {
        match self {
            Self::NotFound(message)
            | Self::Network(message)
            | Self::InvalidResponse(message) => message,
            Self::Service { message, .. } => message,
        }
    }
}

/// `{"error": {"code": ..., "message": ...}}` as returned by every boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl From<ErrorEnvelope> for PlatformError {
    fn from(envelope: ErrorEnvelope) -> Self {
        Self::from_envelope(&envelope.error.code, &envelope.error.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_codes_map_to_taxonomy() {
        let not_found: PlatformError = serde_json::from_str::<ErrorEnvelope>(
            r#"{"error": {"code": "NOT_FOUND", "message": "Agent 'x' not found"}}"#,
        )
        .expect("envelope")
        .into();
        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        assert_eq!(not_found.reason(), "Agent 'x' not found");

        let service = PlatformError::from_envelope("AZURE_SERVICE_ERROR", "quota exceeded");
        assert_eq!(service.kind(), ErrorKind::Service);
        assert_eq!(
            service.to_string(),
            "service error AZURE_SERVICE_ERROR: quota exceeded"
        );
    }

    #[test]
    fn transport_failures_are_network_errors() {
        assert_eq!(
            PlatformError::Network("refused".to_string()).kind(),
            ErrorKind::Network
        );
    }
}
