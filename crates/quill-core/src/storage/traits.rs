//! Storage collaborator traits.
//!
//! The note service and digest generator only talk to storage through these
//! traits. Backends never inspect content: whatever the policy accepted is
//! stored byte for byte, and ciphertext is returned untouched.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::{Digest, NewDigest, NewNote, Note, NoteChanges};
use crate::error::Result;

/// Note persistence.
///
/// All implementations must ensure:
/// - Note ids are UUIDs assigned by the backend
/// - Content and encryption metadata are stored exactly as given
/// - Single-row operations are atomic
pub trait NoteStore: Send + Sync {
    /// Insert a new note.
    ///
    /// # Returns
    ///
    /// Returns the stored note, including its assigned id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns `QuillError::Validation` if title, content or the keyword
    /// list exceed storage limits.
    fn create_note(&self, note: &NewNote) -> Result<Note>;

    /// Get a note by ID.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(note))` if found, `Ok(None)` if not found.
    fn get_note(&self, id: &Uuid) -> Result<Option<Note>>;

    /// Apply a partial update and bump `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `QuillError::NoteNotFound` if no note has this id.
    fn update_note(&self, id: &Uuid, changes: &NoteChanges) -> Result<Note>;

    /// Delete a note.
    ///
    /// # Returns
    ///
    /// Returns `true` if a note was deleted.
    fn delete_note(&self, id: &Uuid) -> Result<bool>;

    /// List an owner's notes, newest first.
    fn list_notes(&self, owner_id: &Uuid) -> Result<Vec<Note>>;

    /// List an owner's plaintext, non-sensitive notes created in `[start, end)`,
    /// oldest first.
    ///
    /// Notes flagged sensitive or holding ciphertext are never returned.
    fn list_notes_for_digest(
        &self,
        owner_id: &Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Note>>;
}

/// Digest persistence.
pub trait DigestStore: Send + Sync {
    fn insert_digest(&self, digest: &NewDigest) -> Result<Digest>;

    /// List an owner's digests, newest first.
    fn list_digests(&self, owner_id: &Uuid) -> Result<Vec<Digest>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traits_are_object_safe() {
        fn _accepts_note_store(_store: &dyn NoteStore) {}
        fn _accepts_digest_store(_store: &dyn DigestStore) {}
    }
}
