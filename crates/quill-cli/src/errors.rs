//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use quill_core::QuillError;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (config, key profile, note)
    NotFound { message: String, hint: String },

    /// Authentication failed (wrong passphrase)
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// Sensitivity policy refused the note
    PolicyRejected(String),

    /// Key needed while locked
    Locked(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
            CliError::PolicyRejected(message) => {
                write!(
                    f,
                    "{}\nHint: Encrypt the content client-side first; `quill add` does this automatically.",
                    message
                )
            }
            CliError::Locked(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Map a core error onto a CLI error, if it has a dedicated exit code.
    pub fn from_core(err: &QuillError) -> Option<Self> {
        match err {
            QuillError::NoteNotFound(id) => Some(CliError::not_found(
                format!("Note not found: {}", id),
                "Hint: Run `quill list` to find note IDs.",
            )),
            QuillError::AccessDenied => Some(CliError::not_found(
                "Note not found",
                "Hint: Run `quill list` to find note IDs.",
            )),
            QuillError::Decryption(_) => Some(CliError::auth_failed_with_hint(
                err.to_string(),
                "Hint: Set QUILL_PASSPHRASE or enter the passphrase used at `quill init`.",
            )),
            QuillError::PolicyRejection(rejection) => {
                Some(CliError::PolicyRejected(rejection.to_string()))
            }
            QuillError::KeyUnavailable => Some(CliError::Locked(err.to_string())),
            QuillError::InvalidInput(_)
            | QuillError::InvalidPayload(_)
            | QuillError::Validation(_) => Some(CliError::invalid_input(err.to_string())),
            _ => None,
        }
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        use super::constants::exit_codes;
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::PolicyRejected(_) => exit_codes::POLICY_REJECTED,
            CliError::Locked(_) => exit_codes::LOCKED,
        }
    }

    /// Print error message to stderr and exit with appropriate code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        std::process::exit(self.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::exit_codes;
    use quill_core::{PolicyRejection, RejectionReason};
    use uuid::Uuid;

    #[test]
    fn test_core_errors_map_to_exit_codes() {
        let cases = vec![
            (QuillError::NoteNotFound(Uuid::nil()), exit_codes::NOT_FOUND),
            (
                QuillError::Decryption("bad tag".to_string()),
                exit_codes::AUTH_FAILED,
            ),
            (QuillError::KeyUnavailable, exit_codes::LOCKED),
            (
                QuillError::InvalidPayload("missing".to_string()),
                exit_codes::INVALID_INPUT,
            ),
            (
                QuillError::PolicyRejection(PolicyRejection {
                    reason: RejectionReason::ContainsSensitiveKeywords,
                    matches: vec!["password".to_string()],
                }),
                exit_codes::POLICY_REJECTED,
            ),
        ];
        for (err, code) in cases {
            let mapped = CliError::from_core(&err).expect("error should map");
            assert_eq!(mapped.exit_code(), code, "for {}", err);
        }
    }

    #[test]
    fn test_unmapped_core_error() {
        assert!(CliError::from_core(&QuillError::Other("boom".to_string())).is_none());
    }
}
