//! Error types for tablemate.

use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Caller Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Concurrency conflict: {0}")]
    Conflict(String),

    // === Collaborator Errors ===
    #[error("Restaurant retrieval failed: {0}")]
    Retrieval(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// The vote record was written but the plan tallies were not.
    #[error("Vote saved but plan update failed: {0}")]
    Inconsistent(Box<AppError>),

    // === Server Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the error code reported to transport layers.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidStateTransition(_) => "INVALID_STATE_TRANSITION",
            Self::Conflict(_) => "CONFLICT",
            Self::Retrieval(_) => "RETRIEVAL_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Inconsistent(_) => "INCONSISTENT_WRITE",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether the caller caused this error.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::Validation(_)
                | Self::InvalidStateTransition(_)
                | Self::Conflict(_)
        )
    }

    /// Returns whether retrying the same request may succeed.
    ///
    /// Nothing inside the engine retries; this is a hint for callers.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
