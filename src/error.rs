//! # Error Types
//!
//! This module defines error types used throughout the etiket library.
//!
//! Every repository and editor operation reports one of these variants so the
//! caller can react to the outcome without inspecting transport errors.

use thiserror::Error;

use crate::barcode::EncodingError;

/// Main error type for etiket operations
#[derive(Debug, Error)]
pub enum EtiketError {
    /// A field is out of range, malformed or missing
    #[error("Validation failed for `{field}`: {reason}")]
    ValidationFailed { field: String, reason: String },

    /// Unknown layout id (or an id outside the requested owner scope)
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation would break the default/last-layout invariants
    #[error("Forbidden operation: {0}")]
    ForbiddenOperation(String),

    /// The symbol encoder rejected the payload
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Asset upload or backing-store failure
    #[error("Storage failure: {0}")]
    StorageFailure(String),

    /// The editor draft has edits that would be discarded
    #[error("Unsaved changes in layout draft")]
    UnsavedChanges,

    /// A save is already outstanding for this editor
    #[error("A save is already in progress")]
    SaveInProgress,

    /// Server transport errors (bind, accept)
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EtiketError {
    /// Shorthand for a `ValidationFailed` error.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The offending field name, for validation failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ValidationFailed { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, EtiketError>;
