use serde::{Deserialize, Serialize};

/// Failure classes shared by every engine error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Local check failed; blocks a transition and never leaves the process.
    Validation,
    /// An override or lookup referenced a field the tool does not declare.
    Schema,
    /// A tool or agent is absent upstream.
    NotFound,
    /// The deploy or chat boundary rejected the request.
    Service,
    /// The boundary could not be reached at all.
    Network,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Schema => "schema",
            Self::NotFound => "not_found",
            Self::Service => "service",
            Self::Network => "network",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
