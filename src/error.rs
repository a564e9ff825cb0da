//! Custom error types for order-undo
//!
//! This module defines the error hierarchy for the undo log using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

use crate::models::BackupId;

/// Message reported when a peek or restore finds no backups
pub const EMPTY_LOG_MESSAGE: &str = "no backups available";

/// The main error type for order-undo operations
#[derive(Error, Debug)]
pub enum UndoError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Rejected input, e.g. a mutation recorded without a pre-image
    #[error("Validation error: {0}")]
    Validation(String),

    /// Peek or restore against a log with no records
    #[error("{}", EMPTY_LOG_MESSAGE)]
    EmptyLog,

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// The target store rejected an insert because the identity is taken
    #[error("{entity_type} already exists: {identifier}")]
    Conflict {
        entity_type: &'static str,
        identifier: String,
    },

    /// Underlying store read/write/delete failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A backup was stored, but evicting old records afterwards failed
    #[error("Backup {backup_id} was recorded but retention failed: {source}")]
    RetentionFailed {
        backup_id: BackupId,
        #[source]
        source: Box<UndoError>,
    },
}

impl UndoError {
    /// Create a "not found" error for orders
    pub fn order_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Order",
            identifier: identifier.into(),
        }
    }

    /// Create a "conflict" error for documents
    pub fn document_conflict(identifier: impl Into<String>) -> Self {
        Self::Conflict {
            entity_type: "Document",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if the log was empty
    pub fn is_empty_log(&self) -> bool {
        matches!(self, Self::EmptyLog)
    }

    /// Check if a target store rejected an insert
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// The backup that was stored despite this error, if any
    pub fn recorded_backup(&self) -> Option<BackupId> {
        match self {
            Self::RetentionFailed { backup_id, .. } => Some(*backup_id),
            _ => None,
        }
    }
}

impl From<std::io::Error> for UndoError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for UndoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for order-undo operations
pub type UndoResult<T> = Result<T, UndoError>;
