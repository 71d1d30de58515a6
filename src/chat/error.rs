use crate::shared::errors::ErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("prompt parameter `{key}` is required")]
    MissingRequiredParam { key: String },
    #[error("agent has no prompt parameter `{key}`")]
    UnknownParam { key: String },
    #[error("prompt parameter `{key}` is not a multi-select")]
    NotMultiSelect { key: String },
    #[error("`{option}` is not an option of prompt parameter `{key}`")]
    InvalidOption { key: String, option: String },
    #[error("prompt parameters are already confirmed")]
    AlreadyConfirmed,
    #[error("confirm prompt parameters before sending")]
    NotConfirmed,
    #[error("message must not be blank")]
    EmptyMessage,
    #[error("a chat turn is already in flight")]
    TurnInFlight,
}

impl ChatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownParam { .. } | Self::NotMultiSelect { .. } => ErrorKind::Schema,
            _ => ErrorKind::Validation,
        }
    }
}
