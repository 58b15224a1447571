//! Error types for the IFN console

use crate::models::UnitStatus;
use thiserror::Error;

/// Local input problems. These are reported where the input was given and
/// never reach the external service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Select a region before approving")]
    MissingRegion,

    #[error("A rejection reason is required")]
    EmptyReason,

    #[error("Generation count must be between {min} and {max}, got {count}")]
    CountOutOfRange { count: u32, min: u32, max: u32 },
}

#[derive(Debug, Error)]
pub enum IfnError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // Lifecycle preconditions
    #[error("Conglomerado {code} is {status} and can no longer be reviewed")]
    InvalidTransition { code: String, status: UnitStatus },

    #[error("Conglomerado not found: {id}")]
    UnitNotFound { id: String },

    #[error("No decision is open for this conglomerado")]
    NoOpenDecision,

    // Auth errors
    #[error("No authenticated session. Sign in first")]
    MissingSession,

    #[error("Session token is invalid or expired. Sign in again")]
    AuthExpired,

    #[error("Account {email} is suspended. Contact an administrator")]
    AccountSuspended { email: String },

    #[error("Role {role} is not allowed to use the review console")]
    Forbidden { role: String },

    // Remote operation errors
    #[error("{message}")]
    Remote { status: Option<u16>, message: String },

    #[error("Could not reach the service: {0}")]
    Transport(String),

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse classification used to pick the user-facing remedy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Precondition,
    Auth,
    Remote,
    Configuration,
    Io,
}

impl IfnError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            IfnError::Validation(_) => ErrorCategory::Validation,
            IfnError::InvalidTransition { .. }
            | IfnError::UnitNotFound { .. }
            | IfnError::NoOpenDecision => {
                ErrorCategory::Precondition
            }
            IfnError::MissingSession
            | IfnError::AuthExpired
            | IfnError::AccountSuspended { .. }
            | IfnError::Forbidden { .. } => ErrorCategory::Auth,
            IfnError::Remote { .. } | IfnError::Transport(_) | IfnError::Serialization(_) => {
                ErrorCategory::Remote
            }
            IfnError::ConfigMissing { .. } | IfnError::ConfigInvalid { .. } => {
                ErrorCategory::Configuration
            }
            IfnError::Io(_) => ErrorCategory::Io,
        }
    }

    /// True when the remedy is to sign in again.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, IfnError::MissingSession | IfnError::AuthExpired)
    }

    /// Build a remote error from the service message, falling back to the
    /// HTTP status line when the service gave none.
    pub fn remote(status: u16, reason: &str, message: Option<String>) -> Self {
        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("Error {}: {}", status, reason));
        IfnError::Remote { status: Some(status), message }
    }
}

pub type Result<T> = std::result::Result<T, IfnError>;
