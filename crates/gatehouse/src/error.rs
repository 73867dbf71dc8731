//! Error types for gatehouse.
//!
//! This module defines all error types used throughout the gatehouse crate.
//! Every variant collapses onto one [`ErrorKind`], which is what callers
//! branch on when deciding how to present a failure.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::visitor::VisitorId;

/// A column that carries a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UniqueField {
    /// Identity card number.
    IcNumber,
    /// Vehicle license plate.
    LicensePlate,
}

impl UniqueField {
    /// Column name in the visitors table.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::IcNumber => "ic_number",
            Self::LicensePlate => "license_plate",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::IcNumber => "IC number",
            Self::LicensePlate => "license plate",
        }
    }
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The main error type for gatehouse operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Service Errors ===
    /// Input was missing or malformed; storage was not touched.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// A registration would duplicate a unique key of a live record.
    #[error("a visitor with {field} '{value}' is already registered")]
    DuplicateKey {
        /// The violated constraint.
        field: UniqueField,
        /// The duplicated value.
        value: String,
    },

    /// No live record has this id.
    #[error("visitor {id} not found")]
    NotFound {
        /// The id that did not resolve.
        id: VisitorId,
    },

    /// A status outside the `Active`/`Left` vocabulary.
    #[error("invalid status '{value}': expected Active or Left")]
    InvalidStatus {
        /// The rejected status text.
        value: String,
    },

    /// The store cannot be reached.
    #[error("storage unavailable: {reason}")]
    StorageUnavailable {
        /// Why the store is unavailable.
        reason: String,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A store operation exceeded its bounded wait.
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        /// The operation that timed out.
        operation: &'static str,
        /// The bounded wait that elapsed, in milliseconds.
        timeout_ms: u128,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for gatehouse operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

/// The five ways a visitor operation can fail, as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or malformed input.
    Validation,
    /// Uniqueness violation on registration.
    DuplicateKey,
    /// The id does not resolve to a live record.
    NotFound,
    /// Status outside the enumeration.
    InvalidStatus,
    /// The store is unreachable.
    StorageUnavailable,
}

impl ErrorKind {
    /// The HTTP status code a transport should answer with.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Validation => 422,
            Self::DuplicateKey => 409,
            Self::NotFound => 404,
            Self::InvalidStatus => 400,
            Self::StorageUnavailable => 503,
        }
    }

    /// What the user should do about it.
    #[must_use]
    pub const fn hint(self) -> &'static str {
        match self {
            Self::Validation => "check the input and try again",
            Self::DuplicateKey => "this visitor or vehicle is already registered",
            Self::NotFound => "select an existing visitor",
            Self::InvalidStatus => "use Active or Left",
            Self::StorageUnavailable => "wait a moment and retry",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Validation => "invalid input",
            Self::DuplicateKey => "duplicate",
            Self::NotFound => "not found",
            Self::InvalidStatus => "invalid status",
            Self::StorageUnavailable => "storage unavailable",
        };
        f.write_str(label)
    }
}

impl Error {
    /// Create a validation error for a field.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a storage unavailable error.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Classify this error for the caller.
    ///
    /// Everything that is not a business-rule violation means the store could
    /// not do its job, and is reported as [`ErrorKind::StorageUnavailable`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::ConfigLoad(_) | Self::ConfigValidation { .. } => {
                ErrorKind::Validation
            }
            Self::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidStatus { .. } => ErrorKind::InvalidStatus,
            Self::StorageUnavailable { .. }
            | Self::DatabaseOpen { .. }
            | Self::DatabaseQuery(_)
            | Self::DatabaseMigration { .. }
            | Self::Timeout { .. }
            | Self::Io(_)
            | Self::DirectoryCreate { .. }
            | Self::Internal(_) => ErrorKind::StorageUnavailable,
        }
    }

    /// Check if this error means the record does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this error is a uniqueness violation.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.kind() == ErrorKind::DuplicateKey
    }
}
