//! Error types shared by every Keel crate.

use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for Keel.
///
/// Failures raised by the database driver are carried unchanged in
/// [`KeelError::Database`] so callers can inspect the native error.
#[derive(Error, Debug)]
pub enum KeelError {
    /// Native failure from the persistence engine
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Entity mapping does not line up with its declared columns
    #[error("Mapping error for {entity}: {message}")]
    Mapping {
        entity: &'static str,
        message: String,
    },

    /// A flush failed earlier in this unit of work; it can only roll back
    #[error("Session is rollback-only after a failed flush: {0}")]
    RollbackOnly(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KeelError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Mapping { .. } => "MAPPING_ERROR",
            Self::RollbackOnly(_) => "ROLLBACK_ONLY",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration<T: Into<String>>(message: T) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a mapping error for the named entity.
    #[must_use]
    pub fn mapping<T: Into<String>>(entity: &'static str, message: T) -> Self {
        Self::Mapping {
            entity,
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Returns the underlying driver error, if any.
    #[must_use]
    pub const fn as_database(&self) -> Option<&sqlx::Error> {
        match self {
            Self::Database(err) => Some(err),
            _ => None,
        }
    }

    /// Checks if this error is a unique/primary key violation.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        let Some(sqlx::Error::Database(db_err)) = self.as_database() else {
            return false;
        };
        // PostgreSQL / MySQL / SQLite (unique, primary key)
        db_err.is_unique_violation()
            || matches!(
                db_err.code().as_deref(),
                Some("23505" | "1062" | "2067" | "1555")
            )
    }

    /// Checks if this error is retriable.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.as_database(),
            Some(
                sqlx::Error::Io(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            )
        )
    }
}
