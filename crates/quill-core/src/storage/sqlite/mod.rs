//! SQLite storage backend.
//!
//! A single connection behind a mutex, with the schema versioned through
//! `PRAGMA user_version`. Timestamps are stored as fixed-width RFC 3339
//! strings (microsecond precision, `Z` suffix) so text ordering matches
//! time ordering.

mod row;
mod validation;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::{QuillError, Result};
use crate::storage::traits::{DigestStore, NoteStore};
use crate::storage::types::{Digest, NewDigest, NewNote, Note, NoteChanges};

use row::{DigestRow, NoteRow, DIGEST_COLUMNS, NOTE_COLUMNS};
pub use validation::{MAX_CONTENT_BYTES, MAX_KEYWORDS_PER_NOTE, MAX_TITLE_BYTES};
use validation::{normalize_keywords, validate_content, validate_title};

/// Ordered schema migrations; entry `n` moves `user_version` from `n` to `n + 1`.
const MIGRATIONS: &[&str] = &[r#"
    CREATE TABLE notes (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        title TEXT,
        content TEXT,
        is_sensitive INTEGER NOT NULL DEFAULT 0,
        content_encrypted INTEGER NOT NULL DEFAULT 0,
        encryption_meta TEXT,
        sensitive_keywords TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX notes_owner_created ON notes (owner_id, created_at);
    CREATE INDEX notes_owner_sensitive ON notes (owner_id, is_sensitive);

    CREATE TABLE digests (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        digest_range TEXT NOT NULL,
        summary TEXT NOT NULL,
        themes TEXT NOT NULL,
        source_note_ids TEXT NOT NULL,
        period_start TEXT NOT NULL,
        period_end TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE INDEX digests_owner_created ON digests (owner_id, created_at);
    "#];

/// Current schema version.
pub const SCHEMA_VERSION: u32 = MIGRATIONS.len() as u32;

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn to_json<T: serde::Serialize>(value: &T, what: &str) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| QuillError::Storage(format!("Failed to serialize {}: {}", what, e)))
}

/// Keyword lists are stored as NULL when empty.
fn keywords_json(keywords: &[String]) -> Result<Option<String>> {
    let normalized = normalize_keywords(keywords)?;
    if normalized.is_empty() {
        Ok(None)
    } else {
        Ok(Some(to_json(&normalized, "keywords")?))
    }
}

/// SQLite-backed note and digest store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file and bring its schema up to date.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let _mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrate(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| QuillError::Storage("SQLite connection poisoned".to_string()))
    }

    /// Schema version recorded in the database.
    pub fn schema_version(&self) -> Result<u32> {
        let conn = self.lock_conn()?;
        Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
    }

    fn fetch_note(conn: &Connection, id: &Uuid) -> Result<Option<Note>> {
        let row = conn
            .query_row(
                &format!("SELECT {} FROM notes WHERE id = ?", NOTE_COLUMNS),
                [id.to_string()],
                NoteRow::from_row,
            )
            .optional()?;
        row.map(Note::try_from).transpose()
    }

    fn collect_notes(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Note>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, NoteRow::from_row)?;
        let mut notes: Vec<Note> = Vec::new();
        for row in rows {
            notes.push(row?.try_into()?);
        }
        Ok(notes)
    }
}

fn migrate(conn: &mut Connection) -> Result<()> {
    let current: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if current > SCHEMA_VERSION {
        return Err(QuillError::Storage(format!(
            "Database schema version {} is newer than supported version {}",
            current, SCHEMA_VERSION
        )));
    }

    for (index, migration) in MIGRATIONS.iter().enumerate().skip(current as usize) {
        let tx = conn.transaction()?;
        tx.execute_batch(migration)?;
        tx.pragma_update(None, "user_version", (index + 1) as u32)?;
        tx.commit()?;
        tracing::debug!(version = index + 1, "applied schema migration");
    }
    Ok(())
}

impl NoteStore for SqliteStore {
    fn create_note(&self, note: &NewNote) -> Result<Note> {
        validate_title(note.title.as_deref())?;
        validate_content(note.content.as_deref())?;
        let keywords = keywords_json(&note.sensitive_keywords)?;
        let meta = note
            .encryption_meta
            .as_ref()
            .map(|meta| to_json(meta, "encryption metadata"))
            .transpose()?;

        let id = Uuid::now_v7();
        let now = Utc::now();
        let created_at = timestamp(note.created_at.unwrap_or(now));

        let conn = self.lock_conn()?;
        conn.execute(
            &format!(
                "INSERT INTO notes ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                NOTE_COLUMNS
            ),
            params![
                id.to_string(),
                note.owner_id.to_string(),
                note.title,
                note.content,
                note.is_sensitive,
                note.content_encrypted,
                meta,
                keywords,
                created_at,
                timestamp(now),
            ],
        )?;

        Self::fetch_note(&conn, &id)?
            .ok_or_else(|| QuillError::Storage("Inserted note could not be read back".to_string()))
    }

    fn get_note(&self, id: &Uuid) -> Result<Option<Note>> {
        let conn = self.lock_conn()?;
        Self::fetch_note(&conn, id)
    }

    fn update_note(&self, id: &Uuid, changes: &NoteChanges) -> Result<Note> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let mut note = Self::fetch_note(&tx, id)?.ok_or(QuillError::NoteNotFound(*id))?;
        changes.apply_to(&mut note);

        validate_title(note.title.as_deref())?;
        validate_content(note.content.as_deref())?;
        let keywords = keywords_json(&note.sensitive_keywords)?;
        let meta = note
            .encryption_meta
            .as_ref()
            .map(|meta| to_json(meta, "encryption metadata"))
            .transpose()?;
        let updated_at = Utc::now().max(note.updated_at);

        tx.execute(
            r#"
            UPDATE notes
            SET title = ?, content = ?, is_sensitive = ?, content_encrypted = ?,
                encryption_meta = ?, sensitive_keywords = ?, updated_at = ?
            WHERE id = ?
            "#,
            params![
                note.title,
                note.content,
                note.is_sensitive,
                note.content_encrypted,
                meta,
                keywords,
                timestamp(updated_at),
                id.to_string(),
            ],
        )?;

        let updated = Self::fetch_note(&tx, id)?.ok_or(QuillError::NoteNotFound(*id))?;
        tx.commit()?;
        Ok(updated)
    }

    fn delete_note(&self, id: &Uuid) -> Result<bool> {
        let conn = self.lock_conn()?;
        let deleted = conn.execute("DELETE FROM notes WHERE id = ?", [id.to_string()])?;
        Ok(deleted > 0)
    }

    fn list_notes(&self, owner_id: &Uuid) -> Result<Vec<Note>> {
        let conn = self.lock_conn()?;
        Self::collect_notes(
            &conn,
            &format!(
                "SELECT {} FROM notes WHERE owner_id = ? ORDER BY created_at DESC, id DESC",
                NOTE_COLUMNS
            ),
            [owner_id.to_string()],
        )
    }

    fn list_notes_for_digest(
        &self,
        owner_id: &Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Note>> {
        let conn = self.lock_conn()?;
        Self::collect_notes(
            &conn,
            &format!(
                r#"
                SELECT {} FROM notes
                WHERE owner_id = ? AND is_sensitive = 0 AND content_encrypted = 0
                  AND created_at >= ? AND created_at < ?
                ORDER BY created_at ASC, id ASC
                "#,
                NOTE_COLUMNS
            ),
            params![owner_id.to_string(), timestamp(start), timestamp(end)],
        )
    }
}

impl DigestStore for SqliteStore {
    fn insert_digest(&self, digest: &NewDigest) -> Result<Digest> {
        let id = Uuid::now_v7();
        let conn = self.lock_conn()?;
        conn.execute(
            &format!(
                "INSERT INTO digests ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                DIGEST_COLUMNS
            ),
            params![
                id.to_string(),
                digest.owner_id.to_string(),
                digest.range.as_str(),
                digest.summary,
                to_json(&digest.themes, "themes")?,
                to_json(&digest.source_note_ids, "source note ids")?,
                timestamp(digest.period_start),
                timestamp(digest.period_end),
                timestamp(Utc::now()),
            ],
        )?;

        let row = conn.query_row(
            &format!("SELECT {} FROM digests WHERE id = ?", DIGEST_COLUMNS),
            [id.to_string()],
            DigestRow::from_row,
        )?;
        row.try_into()
    }

    fn list_digests(&self, owner_id: &Uuid) -> Result<Vec<Digest>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM digests WHERE owner_id = ? ORDER BY created_at DESC, id DESC",
            DIGEST_COLUMNS
        ))?;
        let rows = stmt.query_map([owner_id.to_string()], DigestRow::from_row)?;
        let mut digests: Vec<Digest> = Vec::new();
        for row in rows {
            digests.push(row?.try_into()?);
        }
        Ok(digests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_in_memory_schema_is_current() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_reopen_keeps_data_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quill.db");
        let owner = Uuid::new_v4();

        let id = {
            let store = SqliteStore::open(&path).unwrap();
            store.create_note(&NewNote::plain(owner, "hello")).unwrap().id
        };

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
        assert!(store.get_note(&id).unwrap().is_some());
    }

    #[test]
    fn test_newer_schema_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
                .unwrap();
        }
        assert!(matches!(
            SqliteStore::open(&path),
            Err(QuillError::Storage(_))
        ));
    }

    #[test]
    fn test_timestamps_sort_as_text() {
        let early = Utc::now();
        let late = early + Duration::milliseconds(1);
        assert!(timestamp(early) < timestamp(late));
        assert_eq!(timestamp(early).len(), timestamp(late).len());
    }

    #[test]
    fn test_empty_keywords_stored_as_null() {
        assert_eq!(keywords_json(&[]).unwrap(), None);
        assert_eq!(
            keywords_json(&["SSN".to_string()]).unwrap().as_deref(),
            Some(r#"["ssn"]"#)
        );
    }
}
