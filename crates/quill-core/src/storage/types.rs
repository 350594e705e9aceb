//! Core data types for the storage layer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::EncryptionEnvelope;
use crate::error::QuillError;

/// Content shown in listings for notes that are sensitive and encrypted.
pub const LOCKED_PLACEHOLDER: &str = "[LOCKED]";

/// A stored note.
///
/// `content` is plaintext when `content_encrypted` is false, otherwise the
/// base64 ciphertext described by `encryption_meta`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// Never encrypted
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_sensitive: bool,
    pub content_encrypted: bool,
    pub encryption_meta: Option<EncryptionEnvelope>,
    /// Informational record of what the detector matched
    pub sensitive_keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Whether listings must hide this note's content. Ciphertext is hidden
    /// whatever the sensitivity flag says.
    pub fn is_locked(&self) -> bool {
        self.content_encrypted
    }

    /// Copy of this note with content replaced by [`LOCKED_PLACEHOLDER`] if locked.
    pub fn sanitized(&self) -> Note {
        let mut note = self.clone();
        if note.is_locked() {
            note.content = Some(LOCKED_PLACEHOLDER.to_string());
        }
        note
    }
}

/// Fields for inserting a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub owner_id: Uuid,
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_sensitive: bool,
    pub content_encrypted: bool,
    pub encryption_meta: Option<EncryptionEnvelope>,
    pub sensitive_keywords: Vec<String>,
    /// Defaults to now
    pub created_at: Option<DateTime<Utc>>,
}

impl NewNote {
    pub fn plain(owner_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            owner_id,
            title: None,
            content: Some(content.into()),
            is_sensitive: false,
            content_encrypted: false,
            encryption_meta: None,
            sensitive_keywords: Vec::new(),
            created_at: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteChanges {
    pub title: Option<Option<String>>,
    pub content: Option<Option<String>>,
    pub is_sensitive: Option<bool>,
    pub content_encrypted: Option<bool>,
    pub encryption_meta: Option<Option<EncryptionEnvelope>>,
    pub sensitive_keywords: Option<Vec<String>>,
}

impl NoteChanges {
    pub fn is_empty(&self) -> bool {
        *self == NoteChanges::default()
    }

    /// Apply these changes to `note` in place (timestamps untouched).
    pub fn apply_to(&self, note: &mut Note) {
        if let Some(title) = &self.title {
            note.title = title.clone();
        }
        if let Some(content) = &self.content {
            note.content = content.clone();
        }
        if let Some(is_sensitive) = self.is_sensitive {
            note.is_sensitive = is_sensitive;
        }
        if let Some(content_encrypted) = self.content_encrypted {
            note.content_encrypted = content_encrypted;
        }
        if let Some(meta) = &self.encryption_meta {
            note.encryption_meta = meta.clone();
        }
        if let Some(keywords) = &self.sensitive_keywords {
            note.sensitive_keywords = keywords.clone();
        }
    }
}

/// Time window a digest covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestRange {
    Daily,
    Weekly,
}

impl DigestRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestRange::Daily => "daily",
            DigestRange::Weekly => "weekly",
        }
    }

    pub fn window(&self) -> Duration {
        match self {
            DigestRange::Daily => Duration::days(1),
            DigestRange::Weekly => Duration::days(7),
        }
    }

    pub fn max_bullets(&self) -> usize {
        match self {
            DigestRange::Daily => 5,
            DigestRange::Weekly => 10,
        }
    }
}

impl fmt::Display for DigestRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestRange {
    type Err = QuillError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(DigestRange::Daily),
            "weekly" => Ok(DigestRange::Weekly),
            other => Err(QuillError::InvalidInput(format!(
                "Unknown digest range '{}' (expected daily or weekly)",
                other
            ))),
        }
    }
}

/// A recurring word in summarized notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub keyword: String,
    pub count: usize,
}

/// A stored digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Digest {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub range: DigestRange,
    pub summary: String,
    pub themes: Vec<Theme>,
    pub source_note_ids: Vec<Uuid>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a digest.
#[derive(Debug, Clone)]
pub struct NewDigest {
    pub owner_id: Uuid,
    pub range: DigestRange,
    pub summary: String,
    pub themes: Vec<Theme>,
    pub source_note_ids: Vec<Uuid>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}
