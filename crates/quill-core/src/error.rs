//! Error types for Quill core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-facing messages and exit codes.

use thiserror::Error;
use uuid::Uuid;

use crate::policy::PolicyRejection;

/// Result type alias for Quill operations.
pub type Result<T> = std::result::Result<T, QuillError>;

/// Core error type for Quill operations.
#[derive(Debug, Error)]
pub enum QuillError {
    /// Key derivation rejected its inputs; the unlock attempt is abandoned
    #[error("Key derivation failed: {0}")]
    Derivation(String),

    /// Wrong key or tampered/malformed ciphertext
    #[error("Unable to decrypt note content ({0}). Check your passphrase.")]
    Decryption(String),

    /// Encrypt/decrypt attempted while no master key is held
    #[error("Encryption key is locked; unlock with your passphrase first")]
    KeyUnavailable,

    /// Server-side sensitivity policy refused the submission
    #[error("{0}")]
    PolicyRejection(PolicyRejection),

    /// Note payload failed structural validation at the boundary
    #[error("Invalid note payload: {0}")]
    InvalidPayload(String),

    /// Data validation error (limits, normalization)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// Note not found by ID
    #[error("Note not found: {0}")]
    NoteNotFound(Uuid),

    /// Note belongs to another owner
    #[error("Access denied")]
    AccessDenied,

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// Generic error (fallback)
    #[error("{0}")]
    Other(String),
}

impl From<PolicyRejection> for QuillError {
    fn from(rejection: PolicyRejection) -> Self {
        QuillError::PolicyRejection(rejection)
    }
}

impl QuillError {
    /// Keyword matches attached to a policy rejection, if any.
    pub fn policy_matches(&self) -> Option<&[String]> {
        match self {
            QuillError::PolicyRejection(rejection) => Some(&rejection.matches),
            _ => None,
        }
    }
}
