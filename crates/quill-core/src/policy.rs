//! Server-side enforcement of "sensitive implies encrypted".
//!
//! Runs on every create and on every update that touches content or the
//! protection flags, after the payload has been parsed into a
//! [`NoteSubmission`]. The policy always uses the built-in keyword list so
//! it can never be weaker than what a client detects by default.

use std::fmt;

use serde::Serialize;

use crate::error::{QuillError, Result};
use crate::keywords::KeywordDetector;
use crate::payload::{NoteBody, NoteSubmission};

/// Why a submission was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    SensitiveNotEncrypted,
    ContainsSensitiveKeywords,
}

impl RejectionReason {
    pub fn message(&self) -> &'static str {
        match self {
            RejectionReason::SensitiveNotEncrypted => {
                "Sensitive notes must be encrypted client-side before upload"
            }
            RejectionReason::ContainsSensitiveKeywords => {
                "Content contains sensitive keywords and must be encrypted"
            }
        }
    }
}

/// A refused submission, with the keyword matches the client should react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyRejection {
    pub reason: RejectionReason,
    pub matches: Vec<String>,
}

impl fmt::Display for PolicyRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason.message())?;
        if !self.matches.is_empty() {
            write!(f, " (matched: {})", self.matches.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyOutcome {
    Accepted,
    Rejected(PolicyRejection),
}

impl PolicyOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PolicyOutcome::Accepted)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SensitivityPolicy {
    detector: KeywordDetector,
}

impl SensitivityPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate a submission. Terminal outcomes only.
    pub fn validate(&self, submission: &NoteSubmission) -> PolicyOutcome {
        match &submission.body {
            NoteBody::Encrypted { .. } => PolicyOutcome::Accepted,
            NoteBody::Plain(_) if submission.is_sensitive => {
                PolicyOutcome::Rejected(PolicyRejection {
                    reason: RejectionReason::SensitiveNotEncrypted,
                    matches: Vec::new(),
                })
            }
            NoteBody::Plain(text) => {
                let detection = self.detector.detect(text);
                if detection.is_sensitive {
                    PolicyOutcome::Rejected(PolicyRejection {
                        reason: RejectionReason::ContainsSensitiveKeywords,
                        matches: detection.matches,
                    })
                } else {
                    PolicyOutcome::Accepted
                }
            }
        }
    }

    /// Like [`validate`](Self::validate), but as a `Result`.
    ///
    /// # Errors
    ///
    /// Returns `QuillError::PolicyRejection` for any rejected submission.
    pub fn enforce(&self, submission: &NoteSubmission) -> Result<()> {
        match self.validate(submission) {
            PolicyOutcome::Accepted => Ok(()),
            PolicyOutcome::Rejected(rejection) => {
                tracing::warn!(
                    reason = ?rejection.reason,
                    match_count = rejection.matches.len(),
                    "note submission rejected by sensitivity policy"
                );
                Err(QuillError::PolicyRejection(rejection))
            }
        }
    }
}
