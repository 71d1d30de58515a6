use super::navigation::{WizardAction, WizardStep};
use crate::catalog::Section;
use crate::platform::PlatformError;
use crate::shared::errors::ErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("tool `{tool_id}` requires {section} field `{key}`")]
    MissingRequiredField {
        tool_id: String,
        section: Section,
        key: String,
    },
    #[error("agent {field} must not be blank")]
    BlankAgentField { field: &'static str },
    #[error("invalid schema for tool `{tool_id}`: {reason}")]
    InvalidSchema { tool_id: String, reason: String },
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },
    #[error("prompt parameter `{key}` is invalid: {reason}")]
    InvalidPromptParam { key: String, reason: String },
    #[error("action `{action}` is not valid in step `{step}`")]
    InvalidTransition {
        step: WizardStep,
        action: &'static str,
    },
    #[error("tool `{tool_id}` has no {section} field `{key}`")]
    UndeclaredField {
        tool_id: String,
        section: Section,
        key: String,
    },
    #[error("tool `{tool_id}` is not selected")]
    InactiveTool { tool_id: String },
    #[error("schema for tool `{tool_id}` is not loaded")]
    SchemaUnavailable { tool_id: String },
    #[error("{0}")]
    NotFound(String),
    #[error("deploy failed ({code}): {message}")]
    Service { code: String, message: String },
    #[error("platform unreachable: {0}")]
    Network(String),
    #[error("a deploy is already in flight")]
    DeployInFlight,
}

impl WizardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingRequiredField { .. }
            | Self::BlankAgentField { .. }
            | Self::InvalidSchema { .. }
            | Self::InvalidValue { .. }
            | Self::InvalidPromptParam { .. }
            | Self::InvalidTransition { .. }
            | Self::DeployInFlight => ErrorKind::Validation,
            Self::UndeclaredField { .. }
            | Self::InactiveTool { .. }
            | Self::SchemaUnavailable { .. } => ErrorKind::Schema,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Service { .. } => ErrorKind::Service,
            Self::Network(_) => ErrorKind::Network,
        }
    }

    pub(crate) fn invalid_transition(step: WizardStep, action: &WizardAction) -> Self {
        Self::InvalidTransition {
            step,
            action: action.as_str(),
        }
    }
}

impl From<PlatformError> for WizardError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::NotFound(message) => Self::NotFound(message),
            PlatformError::Service { code, message } => Self::Service { code, message },
            PlatformError::InvalidResponse(message) => Self::Service {
                code: "INVALID_RESPONSE".to_string(),
                message,
            },
            PlatformError::Network(message) => Self::Network(message),
        }
    }
}
