//! Server-side note operations.
//!
//! Every write goes through the same sequence: parse the wire payload into
//! a [`NoteSubmission`], run the [`SensitivityPolicy`], then hand the result
//! to the store. Reads return ciphertext exactly as stored.

use uuid::Uuid;

use crate::error::{QuillError, Result};
use crate::payload::{NoteBody, NotePatch, NotePayload, NoteSubmission};
use crate::policy::SensitivityPolicy;
use crate::storage::{NewNote, Note, NoteChanges, NoteStore};

/// Owner-scoped note CRUD behind the sensitivity policy.
pub struct NoteService<S> {
    store: S,
    policy: SensitivityPolicy,
}

impl<S: NoteStore> NoteService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            policy: SensitivityPolicy::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate and store a new note for `owner`.
    ///
    /// # Errors
    ///
    /// `QuillError::InvalidPayload` for structurally inconsistent payloads,
    /// `QuillError::PolicyRejection` when sensitive plaintext is submitted.
    pub fn create(&self, owner: &Uuid, payload: NotePayload) -> Result<Note> {
        let submission = NoteSubmission::try_from(payload)?;
        self.policy.enforce(&submission)?;

        let (content_encrypted, encryption_meta) = match &submission.body {
            NoteBody::Plain(_) => (false, None),
            NoteBody::Encrypted { envelope, .. } => (true, Some(envelope.clone())),
        };
        let note = self.store.create_note(&NewNote {
            owner_id: *owner,
            title: submission.title.clone(),
            content: Some(submission.stored_content()),
            is_sensitive: submission.is_sensitive,
            content_encrypted,
            encryption_meta,
            sensitive_keywords: submission.sensitive_keywords,
            created_at: None,
        })?;

        tracing::info!(
            note_id = %note.id,
            owner = %owner,
            is_sensitive = note.is_sensitive,
            content_encrypted = note.content_encrypted,
            match_count = note.sensitive_keywords.len(),
            "note created"
        );
        Ok(note)
    }

    /// Fetch one of `owner`'s notes, content untouched.
    pub fn get(&self, owner: &Uuid, id: &Uuid) -> Result<Note> {
        let note = self.store.get_note(id)?.ok_or(QuillError::NoteNotFound(*id))?;
        if note.owner_id != *owner {
            tracing::warn!(note_id = %id, owner = %owner, "note access denied");
            return Err(QuillError::AccessDenied);
        }
        Ok(note)
    }

    /// `owner`'s notes, newest first, with locked content replaced by a placeholder.
    pub fn list(&self, owner: &Uuid) -> Result<Vec<Note>> {
        Ok(self
            .store
            .list_notes(owner)?
            .iter()
            .map(Note::sanitized)
            .collect())
    }

    /// Apply a partial update.
    ///
    /// Whenever the patch touches content or the protection flags, the merged
    /// note is re-validated by the policy. New content must restate its
    /// encryption state: a patch with `content` but no `contentEncrypted` is
    /// plaintext, and the encryption state cannot change without new content.
    ///
    /// # Errors
    ///
    /// Same as [`create`](Self::create), plus `NoteNotFound` / `AccessDenied`.
    pub fn update(&self, owner: &Uuid, id: &Uuid, patch: NotePatch) -> Result<Note> {
        let existing = self.get(owner, id)?;
        let mut changes = NoteChanges {
            title: patch
                .title
                .as_ref()
                .map(|t| Some(t.clone()).filter(|t| !t.trim().is_empty())),
            sensitive_keywords: patch.sensitive_keywords.clone(),
            ..NoteChanges::default()
        };

        if patch.touches_protection() {
            let body = if patch.changes_content() {
                NoteSubmission::body_from_parts(
                    patch.content,
                    patch.content_encrypted.unwrap_or(false),
                    patch.encryption_meta,
                )?
            } else {
                if patch
                    .content_encrypted
                    .is_some_and(|encrypted| encrypted != existing.content_encrypted)
                    || patch.encryption_meta.is_some()
                {
                    return Err(QuillError::InvalidPayload(
                        "encryption state can only change together with new content".to_string(),
                    ));
                }
                NoteSubmission::body_from_parts(
                    existing.content.clone(),
                    existing.content_encrypted,
                    existing.encryption_meta.clone(),
                )?
            };

            let submission = NoteSubmission {
                title: changes.title.clone().unwrap_or(existing.title.clone()),
                body,
                is_sensitive: patch.is_sensitive.unwrap_or(existing.is_sensitive),
                sensitive_keywords: patch
                    .sensitive_keywords
                    .clone()
                    .unwrap_or_else(|| existing.sensitive_keywords.clone()),
            };
            self.policy.enforce(&submission)?;

            changes.content = Some(Some(submission.stored_content()));
            changes.is_sensitive = Some(submission.is_sensitive);
            match submission.body {
                NoteBody::Plain(_) => {
                    changes.content_encrypted = Some(false);
                    changes.encryption_meta = Some(None);
                }
                NoteBody::Encrypted { envelope, .. } => {
                    changes.content_encrypted = Some(true);
                    changes.encryption_meta = Some(Some(envelope));
                }
            }
        }

        if changes.is_empty() {
            return Ok(existing);
        }

        let note = self.store.update_note(id, &changes)?;
        tracing::info!(
            note_id = %id,
            owner = %owner,
            is_sensitive = note.is_sensitive,
            content_encrypted = note.content_encrypted,
            "note updated"
        );
        Ok(note)
    }

    pub fn delete(&self, owner: &Uuid, id: &Uuid) -> Result<()> {
        self.get(owner, id)?;
        if !self.store.delete_note(id)? {
            return Err(QuillError::NoteNotFound(*id));
        }
        tracing::info!(note_id = %id, owner = %owner, "note deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{encrypt, EncryptedContent, MasterKey};
    use crate::storage::{SqliteStore, LOCKED_PLACEHOLDER};

    fn service() -> NoteService<SqliteStore> {
        NoteService::new(SqliteStore::open_in_memory().unwrap())
    }

    fn sealed(text: &str) -> EncryptedContent {
        encrypt(text, &MasterKey::from_bytes([4u8; 32])).unwrap()
    }

    fn encrypted_payload(text: &str) -> NotePayload {
        let sealed = sealed(text);
        NotePayload {
            title: Some("Bank".to_string()),
            content: Some(sealed.ciphertext_base64()),
            is_sensitive: true,
            content_encrypted: true,
            encryption_meta: Some(sealed.envelope),
            sensitive_keywords: vec!["bank account".to_string()],
        }
    }

    fn plain_payload(text: &str) -> NotePayload {
        NotePayload {
            content: Some(text.to_string()),
            ..NotePayload::default()
        }
    }

    #[test]
    fn test_create_plain_and_encrypted() {
        let service = service();
        let owner = Uuid::new_v4();

        let plain = service.create(&owner, plain_payload("buy milk")).unwrap();
        assert!(!plain.content_encrypted);
        assert!(plain.encryption_meta.is_none());

        let payload = encrypted_payload("my bank account number is 12345");
        let ciphertext = payload.content.clone();
        let secret = service.create(&owner, payload).unwrap();
        assert!(secret.content_encrypted);
        assert_eq!(secret.content, ciphertext);
    }

    #[test]
    fn test_create_rejects_sensitive_plaintext() {
        let service = service();
        let owner = Uuid::new_v4();

        let err = service
            .create(&owner, plain_payload("my password is 123"))
            .unwrap_err();
        assert_eq!(err.policy_matches(), Some(&["password".to_string()][..]));
        assert!(service.list(&owner).unwrap().is_empty());
    }

    #[test]
    fn test_get_enforces_owner() {
        let service = service();
        let owner = Uuid::new_v4();
        let note = service.create(&owner, plain_payload("hello")).unwrap();

        assert!(matches!(
            service.get(&Uuid::new_v4(), &note.id),
            Err(QuillError::AccessDenied)
        ));
        assert!(matches!(
            service.get(&owner, &Uuid::now_v7()),
            Err(QuillError::NoteNotFound(_))
        ));
    }

    #[test]
    fn test_list_hides_locked_content() {
        let service = service();
        let owner = Uuid::new_v4();
        service.create(&owner, plain_payload("hello")).unwrap();
        let secret = service
            .create(&owner, encrypted_payload("my bank account number is 12345"))
            .unwrap();

        let listed = service.list(&owner).unwrap();
        assert_eq!(listed.len(), 2);
        let listed_secret = listed.iter().find(|n| n.id == secret.id).unwrap();
        assert_eq!(listed_secret.content.as_deref(), Some(LOCKED_PLACEHOLDER));

        // Direct fetch still returns the ciphertext.
        assert_eq!(service.get(&owner, &secret.id).unwrap().content, secret.content);
    }

    #[test]
    fn test_update_title_only_skips_policy() {
        let service = service();
        let owner = Uuid::new_v4();
        let note = service
            .create(&owner, encrypted_payload("my bank account number is 12345"))
            .unwrap();

        let updated = service
            .update(
                &owner,
                &note.id,
                NotePatch {
                    title: Some("Finances".to_string()),
                    ..NotePatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title.as_deref(), Some("Finances"));
        assert!(updated.content_encrypted);
        assert_eq!(updated.content, note.content);
    }

    #[test]
    fn test_update_new_plaintext_drops_old_encryption() {
        let service = service();
        let owner = Uuid::new_v4();
        let mut payload = encrypted_payload("nothing secret here");
        payload.is_sensitive = false;
        let note = service.create(&owner, payload).unwrap();

        let updated = service
            .update(
                &owner,
                &note.id,
                NotePatch {
                    content: Some("now just groceries".to_string()),
                    ..NotePatch::default()
                },
            )
            .unwrap();
        assert!(!updated.content_encrypted);
        assert!(updated.encryption_meta.is_none());
        assert_eq!(updated.content.as_deref(), Some("now just groceries"));
    }

    #[test]
    fn test_update_cannot_smuggle_plaintext_under_old_flags() {
        let service = service();
        let owner = Uuid::new_v4();
        let note = service
            .create(&owner, encrypted_payload("my bank account number is 12345"))
            .unwrap();

        // Sensitive stays true but the new content is plaintext.
        let err = service
            .update(
                &owner,
                &note.id,
                NotePatch {
                    content: Some("my bank account number is 67890".to_string()),
                    ..NotePatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, QuillError::PolicyRejection(_)));

        let stored = service.get(&owner, &note.id).unwrap();
        assert_eq!(stored.content, note.content);
    }

    #[test]
    fn test_update_marking_plaintext_sensitive_rejected() {
        let service = service();
        let owner = Uuid::new_v4();
        let note = service.create(&owner, plain_payload("hello")).unwrap();

        let result = service.update(
            &owner,
            &note.id,
            NotePatch {
                is_sensitive: Some(true),
                ..NotePatch::default()
            },
        );
        assert!(matches!(result, Err(QuillError::PolicyRejection(_))));
    }

    #[test]
    fn test_update_flag_flip_without_content_rejected() {
        let service = service();
        let owner = Uuid::new_v4();
        let note = service
            .create(&owner, encrypted_payload("my bank account number is 12345"))
            .unwrap();

        let result = service.update(
            &owner,
            &note.id,
            NotePatch {
                content_encrypted: Some(false),
                ..NotePatch::default()
            },
        );
        assert!(matches!(result, Err(QuillError::InvalidPayload(_))));
    }

    #[test]
    fn test_update_with_new_ciphertext() {
        let service = service();
        let owner = Uuid::new_v4();
        let note = service
            .create(&owner, encrypted_payload("my bank account number is 12345"))
            .unwrap();
        let replacement = sealed("my ssn is 000-00-0000");

        let updated = service
            .update(
                &owner,
                &note.id,
                NotePatch {
                    content: Some(replacement.ciphertext_base64()),
                    content_encrypted: Some(true),
                    encryption_meta: Some(replacement.envelope.clone()),
                    sensitive_keywords: Some(vec!["ssn".to_string()]),
                    ..NotePatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.encryption_meta, Some(replacement.envelope));
        assert_eq!(updated.sensitive_keywords, vec!["ssn".to_string()]);
        assert!(updated.is_sensitive);
    }

    #[test]
    fn test_delete_requires_owner() {
        let service = service();
        let owner = Uuid::new_v4();
        let note = service.create(&owner, plain_payload("hello")).unwrap();

        assert!(matches!(
            service.delete(&Uuid::new_v4(), &note.id),
            Err(QuillError::AccessDenied)
        ));
        service.delete(&owner, &note.id).unwrap();
        assert!(matches!(
            service.delete(&owner, &note.id),
            Err(QuillError::NoteNotFound(_))
        ));
    }
}
