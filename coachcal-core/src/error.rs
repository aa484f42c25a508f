//! Error types for coachcal.

use thiserror::Error;

/// Errors that can occur in coachcal operations.
#[derive(Error, Debug)]
pub enum CoachCalError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Unsupported recurrence frequency: {0}")]
    UnsupportedFrequency(String),

    #[error("Invalid time slot '{0}'")]
    InvalidSlot(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CoachCalError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        CoachCalError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Stable error code reported across the query/command boundary.
    pub fn code(&self) -> &'static str {
        match self {
            CoachCalError::NotFound { .. } => "NotFound",
            CoachCalError::Conflict(_) => "Conflict",
            CoachCalError::InvalidRange(_) => "InvalidRange",
            CoachCalError::UnsupportedFrequency(_) => "UnsupportedFrequency",
            CoachCalError::InvalidSlot(_) => "InvalidSlot",
            CoachCalError::Config(_) => "Config",
            CoachCalError::Store(_) | CoachCalError::Io(_) | CoachCalError::Serialization(_) => {
                "Store"
            }
        }
    }
}

impl From<serde_json::Error> for CoachCalError {
    fn from(e: serde_json::Error) -> Self {
        CoachCalError::Serialization(e.to_string())
    }
}

/// Result type alias for coachcal operations.
pub type CoachCalResult<T> = Result<T, CoachCalError>;
