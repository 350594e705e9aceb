//! Client half of the note pipeline.
//!
//! A `ClientSession` is built once per authenticated session. It owns the
//! session's [`KeyCustody`], runs the advisory keyword check, and encrypts
//! sensitive text before a payload ever leaves the client.

use uuid::Uuid;

use crate::crypto::{decode_ciphertext, KeyCustody};
use crate::error::{QuillError, Result};
use crate::keywords::KeywordDetector;
use crate::payload::NotePayload;
use crate::storage::{Note, LOCKED_PLACEHOLDER};

pub struct ClientSession {
    owner: Uuid,
    custody: KeyCustody,
    detector: KeywordDetector,
}

impl ClientSession {
    /// A locked session for `owner`.
    pub fn new(owner: Uuid, detector: KeywordDetector) -> Self {
        Self {
            owner,
            custody: KeyCustody::new(),
            detector,
        }
    }

    pub fn owner(&self) -> &Uuid {
        &self.owner
    }

    pub fn custody(&self) -> &KeyCustody {
        &self.custody
    }

    pub fn detector(&self) -> &KeywordDetector {
        &self.detector
    }

    /// Build the payload for `text`, encrypting it if it is sensitive.
    ///
    /// Text is sensitive when the detector matches or the user marked it so.
    ///
    /// # Errors
    ///
    /// Returns `QuillError::KeyUnavailable` for sensitive text while locked.
    pub async fn compose(
        &self,
        title: Option<&str>,
        text: &str,
        mark_sensitive: bool,
    ) -> Result<NotePayload> {
        let detection = self.detector.detect(text);
        let is_sensitive = detection.is_sensitive || mark_sensitive;
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        if !is_sensitive {
            return Ok(NotePayload {
                title,
                content: Some(text.to_string()),
                ..NotePayload::default()
            });
        }

        let encrypted = self.custody.encrypt(text).await?;
        tracing::debug!(
            match_count = detection.matches.len(),
            marked = mark_sensitive,
            "note content encrypted before upload"
        );
        Ok(NotePayload {
            title,
            content: Some(encrypted.ciphertext_base64()),
            is_sensitive: true,
            content_encrypted: true,
            encryption_meta: Some(encrypted.envelope),
            sensitive_keywords: detection.matches,
        })
    }

    /// Plaintext of `note`, decrypting through custody when needed.
    ///
    /// # Errors
    ///
    /// `QuillError::KeyUnavailable` while locked, `QuillError::Decryption`
    /// for a wrong key, tampering, or a missing envelope.
    pub async fn reveal(&self, note: &Note) -> Result<String> {
        if !note.content_encrypted {
            return Ok(note.content.clone().unwrap_or_default());
        }

        let envelope = note
            .encryption_meta
            .as_ref()
            .ok_or_else(|| QuillError::Decryption("note has no encryption metadata".to_string()))?;
        let ciphertext = decode_ciphertext(note.content.as_deref().unwrap_or_default())?;
        self.custody.decrypt(&ciphertext, envelope).await
    }

    /// What to show for `note`: plaintext, or the placeholder while locked.
    pub async fn display_content(&self, note: &Note) -> Result<String> {
        if note.content_encrypted
            && (!self.custody.is_unlocked() || note.content.as_deref() == Some(LOCKED_PLACEHOLDER))
        {
            return Ok(LOCKED_PLACEHOLDER.to_string());
        }
        self.reveal(note).await
    }

    /// End the session, releasing the key.
    pub fn logout(self) {
        self.custody.lock();
        tracing::debug!(owner = %self.owner, "client session closed");
    }
}
