use thiserror::Error;

/// Errors raised while deriving deployable state from a policy description.
///
/// All of these surface before any remote call is issued.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown event source mode type: {kind}")]
    UnknownModeType { kind: String },

    #[error("policy {policy} declares a periodic mode without a schedule")]
    MissingSchedule { policy: String },

    #[error("policy {policy} declares no execution role")]
    MissingRole { policy: String },
}

/// Provider-side call failures.
///
/// `NotFound` is a normal branch condition for lookups and for the tolerant
/// lifecycle operations (pause/resume/unbind/remove); every other failure is
/// fatal to the current reconciliation step and propagates unmodified.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("{operation} failed: {message}")]
    Call {
        operation: &'static str,
        message: String,
    },
}

impl RemoteError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn call(operation: &'static str, message: impl ToString) -> Self {
        Self::Call {
            operation,
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
