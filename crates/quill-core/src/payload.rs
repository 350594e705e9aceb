//! Note payloads crossing the client/server boundary.
//!
//! [`NotePayload`] is the flat wire shape. It is converted into the tagged
//! [`NoteSubmission`] before any policy or crypto logic sees it, so
//! structurally inconsistent payloads never get that far.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::crypto::EncryptionEnvelope;
use crate::error::{QuillError, Result};

/// Wire form of a note create request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, alias = "is_sensitive")]
    pub is_sensitive: bool,
    #[serde(default, alias = "content_encrypted")]
    pub content_encrypted: bool,
    #[serde(default, alias = "encryption_meta")]
    pub encryption_meta: Option<EncryptionEnvelope>,
    #[serde(default, alias = "sensitive_keywords")]
    pub sensitive_keywords: Vec<String>,
}

/// Wire form of a partial note update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    /// `Some("")` clears the title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, alias = "is_sensitive", skip_serializing_if = "Option::is_none")]
    pub is_sensitive: Option<bool>,
    #[serde(
        default,
        alias = "content_encrypted",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_encrypted: Option<bool>,
    #[serde(
        default,
        alias = "encryption_meta",
        skip_serializing_if = "Option::is_none"
    )]
    pub encryption_meta: Option<EncryptionEnvelope>,
    #[serde(
        default,
        alias = "sensitive_keywords",
        skip_serializing_if = "Option::is_none"
    )]
    pub sensitive_keywords: Option<Vec<String>>,
}

impl NotePatch {
    /// Whether the patch replaces note content.
    pub fn changes_content(&self) -> bool {
        self.content.is_some()
    }

    /// Whether the patch touches anything the sensitivity policy looks at.
    pub fn touches_protection(&self) -> bool {
        self.content.is_some()
            || self.is_sensitive.is_some()
            || self.content_encrypted.is_some()
            || self.encryption_meta.is_some()
    }
}

/// Note body, discriminated by whether it is already encrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteBody {
    /// Plaintext (possibly empty)
    Plain(String),
    /// Base64 ciphertext plus the envelope needed to decrypt it client-side
    Encrypted {
        ciphertext: String,
        envelope: EncryptionEnvelope,
    },
}

impl NoteBody {
    pub fn is_encrypted(&self) -> bool {
        matches!(self, NoteBody::Encrypted { .. })
    }
}

/// A structurally valid note submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSubmission {
    pub title: Option<String>,
    pub body: NoteBody,
    pub is_sensitive: bool,
    pub sensitive_keywords: Vec<String>,
}

impl NoteSubmission {
    /// Build a body from the flat wire fields.
    pub fn body_from_parts(
        content: Option<String>,
        content_encrypted: bool,
        encryption_meta: Option<EncryptionEnvelope>,
    ) -> Result<NoteBody> {
        if !content_encrypted {
            if encryption_meta.is_some() {
                return Err(QuillError::InvalidPayload(
                    "encryptionMeta supplied for a note that is not encrypted".to_string(),
                ));
            }
            return Ok(NoteBody::Plain(content.unwrap_or_default()));
        }

        let envelope = encryption_meta.ok_or_else(|| {
            QuillError::InvalidPayload("encrypted note is missing encryptionMeta".to_string())
        })?;
        envelope.validate()?;

        let ciphertext = content
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                QuillError::InvalidPayload("encrypted note is missing ciphertext".to_string())
            })?;
        STANDARD.decode(&ciphertext).map_err(|e| {
            QuillError::InvalidPayload(format!("ciphertext is not valid base64: {}", e))
        })?;

        Ok(NoteBody::Encrypted {
            ciphertext,
            envelope,
        })
    }

    /// Content string as stored.
    pub fn stored_content(&self) -> String {
        match &self.body {
            NoteBody::Plain(text) => text.clone(),
            NoteBody::Encrypted { ciphertext, .. } => ciphertext.clone(),
        }
    }
}

impl TryFrom<NotePayload> for NoteSubmission {
    type Error = QuillError;

    fn try_from(payload: NotePayload) -> Result<Self> {
        let body = NoteSubmission::body_from_parts(
            payload.content,
            payload.content_encrypted,
            payload.encryption_meta,
        )?;
        Ok(NoteSubmission {
            title: payload.title.filter(|t| !t.trim().is_empty()),
            body,
            is_sensitive: payload.is_sensitive,
            sensitive_keywords: payload.sensitive_keywords,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{encrypt, MasterKey};

    fn envelope_and_ciphertext() -> (EncryptionEnvelope, String) {
        let encrypted = encrypt("secret", &MasterKey::from_bytes([9u8; 32])).unwrap();
        let ciphertext = encrypted.ciphertext_base64();
        (encrypted.envelope, ciphertext)
    }

    #[test]
    fn test_plain_payload_parses() {
        let payload = NotePayload {
            title: Some("Groceries".to_string()),
            content: Some("milk, eggs".to_string()),
            ..NotePayload::default()
        };
        let submission = NoteSubmission::try_from(payload).unwrap();
        assert_eq!(submission.body, NoteBody::Plain("milk, eggs".to_string()));
        assert!(!submission.is_sensitive);
    }

    #[test]
    fn test_missing_content_is_empty_plaintext() {
        let submission = NoteSubmission::try_from(NotePayload::default()).unwrap();
        assert_eq!(submission.body, NoteBody::Plain(String::new()));
    }

    #[test]
    fn test_sensitive_unencrypted_still_parses() {
        // The policy, not the parser, rejects this combination.
        let payload = NotePayload {
            content: Some("hello".to_string()),
            is_sensitive: true,
            ..NotePayload::default()
        };
        let submission = NoteSubmission::try_from(payload).unwrap();
        assert!(submission.is_sensitive);
        assert!(!submission.body.is_encrypted());
    }

    #[test]
    fn test_encrypted_payload_parses() {
        let (envelope, ciphertext) = envelope_and_ciphertext();
        let payload = NotePayload {
            content: Some(ciphertext.clone()),
            is_sensitive: true,
            content_encrypted: true,
            encryption_meta: Some(envelope.clone()),
            ..NotePayload::default()
        };
        let submission = NoteSubmission::try_from(payload).unwrap();
        assert_eq!(
            submission.body,
            NoteBody::Encrypted {
                ciphertext,
                envelope
            }
        );
    }

    #[test]
    fn test_encrypted_without_envelope_rejected() {
        let payload = NotePayload {
            content: Some("AAAA".to_string()),
            content_encrypted: true,
            ..NotePayload::default()
        };
        assert!(matches!(
            NoteSubmission::try_from(payload),
            Err(QuillError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_encrypted_without_ciphertext_rejected() {
        let (envelope, _) = envelope_and_ciphertext();
        let payload = NotePayload {
            content_encrypted: true,
            encryption_meta: Some(envelope),
            ..NotePayload::default()
        };
        assert!(matches!(
            NoteSubmission::try_from(payload),
            Err(QuillError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_envelope_on_plaintext_rejected() {
        let (envelope, _) = envelope_and_ciphertext();
        let payload = NotePayload {
            content: Some("plain".to_string()),
            encryption_meta: Some(envelope),
            ..NotePayload::default()
        };
        assert!(matches!(
            NoteSubmission::try_from(payload),
            Err(QuillError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_non_base64_ciphertext_rejected() {
        let (envelope, _) = envelope_and_ciphertext();
        let payload = NotePayload {
            content: Some("my password is 123".to_string()),
            content_encrypted: true,
            encryption_meta: Some(envelope),
            ..NotePayload::default()
        };
        assert!(matches!(
            NoteSubmission::try_from(payload),
            Err(QuillError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_snake_case_wire_fields_accepted() {
        let json = serde_json::json!({
            "content": "hello",
            "is_sensitive": false,
            "content_encrypted": false,
            "sensitive_keywords": []
        });
        let payload: NotePayload = serde_json::from_value(json).unwrap();
        assert_eq!(payload.content.as_deref(), Some("hello"));
    }

    #[test]
    fn test_patch_classification() {
        let title_only = NotePatch {
            title: Some("New".to_string()),
            ..NotePatch::default()
        };
        assert!(!title_only.touches_protection());

        let flag_only = NotePatch {
            is_sensitive: Some(true),
            ..NotePatch::default()
        };
        assert!(flag_only.touches_protection());
        assert!(!flag_only.changes_content());
    }
}
