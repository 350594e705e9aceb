//! Row types for database queries.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use uuid::Uuid;

use crate::crypto::EncryptionEnvelope;
use crate::error::{QuillError, Result};
use crate::storage::types::{Digest, DigestRange, Note, Theme};

pub const NOTE_COLUMNS: &str = "id, owner_id, title, content, is_sensitive, content_encrypted, \
     encryption_meta, sensitive_keywords, created_at, updated_at";

pub const DIGEST_COLUMNS: &str =
    "id, owner_id, digest_range, summary, themes, source_note_ids, period_start, period_end, created_at";

/// Raw row data from the notes table, before parsing into domain types.
#[derive(Debug)]
pub struct NoteRow {
    pub id: String,
    pub owner_id: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_sensitive: bool,
    pub content_encrypted: bool,
    pub encryption_meta: Option<String>,
    pub sensitive_keywords: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl NoteRow {
    /// Read a row selected with [`NOTE_COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            title: row.get(2)?,
            content: row.get(3)?,
            is_sensitive: row.get(4)?,
            content_encrypted: row.get(5)?,
            encryption_meta: row.get(6)?,
            sensitive_keywords: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }
}

pub(crate) fn parse_uuid(value: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| QuillError::Storage(format!("Invalid {} UUID: {}", what, e)))
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| QuillError::Storage(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc))
}

impl TryFrom<NoteRow> for Note {
    type Error = QuillError;

    fn try_from(row: NoteRow) -> Result<Self> {
        let encryption_meta: Option<EncryptionEnvelope> = row
            .encryption_meta
            .as_deref()
            .map(|json| {
                serde_json::from_str(json).map_err(|e| {
                    QuillError::Storage(format!("Invalid encryption metadata JSON: {}", e))
                })
            })
            .transpose()?;
        let sensitive_keywords: Vec<String> = match row.sensitive_keywords {
            Some(ref value) => serde_json::from_str(value)
                .map_err(|e| QuillError::Storage(format!("Invalid keywords JSON: {}", e)))?,
            None => Vec::new(),
        };

        Ok(Note {
            id: parse_uuid(&row.id, "note")?,
            owner_id: parse_uuid(&row.owner_id, "owner")?,
            title: row.title,
            content: row.content,
            is_sensitive: row.is_sensitive,
            content_encrypted: row.content_encrypted,
            encryption_meta,
            sensitive_keywords,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Raw row data from the digests table.
#[derive(Debug)]
pub struct DigestRow {
    pub id: String,
    pub owner_id: String,
    pub range: String,
    pub summary: String,
    pub themes: String,
    pub source_note_ids: String,
    pub period_start: String,
    pub period_end: String,
    pub created_at: String,
}

impl DigestRow {
    /// Read a row selected with [`DIGEST_COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            range: row.get(2)?,
            summary: row.get(3)?,
            themes: row.get(4)?,
            source_note_ids: row.get(5)?,
            period_start: row.get(6)?,
            period_end: row.get(7)?,
            created_at: row.get(8)?,
        })
    }
}

impl TryFrom<DigestRow> for Digest {
    type Error = QuillError;

    fn try_from(row: DigestRow) -> Result<Self> {
        let range: DigestRange = row
            .range
            .parse()
            .map_err(|e| QuillError::Storage(format!("Invalid digest range: {}", e)))?;
        let themes: Vec<Theme> = serde_json::from_str(&row.themes)
            .map_err(|e| QuillError::Storage(format!("Invalid themes JSON: {}", e)))?;
        let source_note_ids: Vec<Uuid> = serde_json::from_str(&row.source_note_ids)
            .map_err(|e| QuillError::Storage(format!("Invalid source ids JSON: {}", e)))?;

        Ok(Digest {
            id: parse_uuid(&row.id, "digest")?,
            owner_id: parse_uuid(&row.owner_id, "owner")?,
            range,
            summary: row.summary,
            themes,
            source_note_ids,
            period_start: parse_timestamp(&row.period_start)?,
            period_end: parse_timestamp(&row.period_end)?,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_row() -> NoteRow {
        NoteRow {
            id: Uuid::now_v7().to_string(),
            owner_id: Uuid::new_v4().to_string(),
            title: Some("t".to_string()),
            content: Some("hello".to_string()),
            is_sensitive: false,
            content_encrypted: false,
            encryption_meta: None,
            sensitive_keywords: None,
            created_at: "2024-05-01T10:00:00+00:00".to_string(),
            updated_at: "2024-05-01T10:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_note_row_parses() {
        let note: Note = note_row().try_into().unwrap();
        assert_eq!(note.content.as_deref(), Some("hello"));
        assert!(note.sensitive_keywords.is_empty());
        assert!(note.encryption_meta.is_none());
    }

    #[test]
    fn test_note_row_bad_uuid_is_storage_error() {
        let mut row = note_row();
        row.id = "not-a-uuid".to_string();
        let result: Result<Note> = row.try_into();
        assert!(matches!(result, Err(QuillError::Storage(_))));
    }

    #[test]
    fn test_note_row_bad_meta_is_storage_error() {
        let mut row = note_row();
        row.encryption_meta = Some("{".to_string());
        let result: Result<Note> = row.try_into();
        assert!(matches!(result, Err(QuillError::Storage(_))));
    }
}
