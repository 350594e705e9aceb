//! Persisted unlock profile.
//!
//! Holds what is needed to re-derive the same master key on every unlock:
//! the salt (generated once, never regenerated) and the KDF parameters. An
//! optional verifier lets a wrong passphrase fail at unlock time.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::cipher::{self, decode_ciphertext, EncryptionEnvelope};
use super::key::{KdfParams, MasterKey};
use super::salt::Salt;
use crate::error::{QuillError, Result};

/// Current profile format version.
pub const PROFILE_VERSION: u32 = 1;

const VERIFIER_MARKER: &str = "quill-key-check-v1";

/// Encryption of a fixed marker under the master key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyVerifier {
    pub ciphertext: String,
    pub envelope: EncryptionEnvelope,
}

/// Salt, KDF parameters and verifier for one user on one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyProfile {
    pub version: u32,
    pub salt: Salt,
    pub kdf: KdfParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifier: Option<KeyVerifier>,
}

impl KeyProfile {
    /// New profile with a freshly generated salt and no verifier.
    pub fn generate(kdf: KdfParams) -> Result<Self> {
        kdf.validate()?;
        Ok(Self {
            version: PROFILE_VERSION,
            salt: Salt::generate(),
            kdf,
            verifier: None,
        })
    }

    /// Bind the profile to `key` by storing a verifier encrypted under it.
    pub fn attach_verifier(&mut self, key: &MasterKey) -> Result<()> {
        let encrypted = cipher::encrypt(VERIFIER_MARKER, key)?;
        self.verifier = Some(KeyVerifier {
            ciphertext: encrypted.ciphertext_base64(),
            envelope: encrypted.envelope,
        });
        Ok(())
    }

    /// Check `key` against the verifier.
    ///
    /// Profiles without a verifier accept any key.
    ///
    /// # Errors
    ///
    /// Returns `QuillError::Decryption` when the key does not match.
    pub fn verify(&self, key: &MasterKey) -> Result<()> {
        let Some(verifier) = &self.verifier else {
            return Ok(());
        };
        let ciphertext = decode_ciphertext(&verifier.ciphertext)?;
        let marker = cipher::decrypt(&ciphertext, &verifier.envelope, key)?;
        if marker != VERIFIER_MARKER {
            return Err(QuillError::Decryption(
                "key verifier mismatch".to_string(),
            ));
        }
        Ok(())
    }

    /// Load a profile from disk; `Ok(None)` if the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let profile: KeyProfile = serde_json::from_str(&contents)?;
        if profile.version != PROFILE_VERSION {
            return Err(QuillError::Validation(format!(
                "Unsupported key profile version {} in {}",
                profile.version,
                path.display()
            )));
        }
        Ok(Some(profile))
    }

    /// Write the profile atomically with owner-only permissions.
    ///
    /// Refuses to overwrite an existing profile: replacing the salt would
    /// orphan every note encrypted under the old key.
    pub fn save_new(&self, path: &Path) -> Result<()> {
        if path.exists() {
            return Err(QuillError::Storage(format!(
                "Key profile already exists: {}",
                path.display()
            )));
        }
        let contents = serde_json::to_vec_pretty(self)?;
        crate::fs::write_atomic(path, &contents, true)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::derive_master_key;
    use tempfile::tempdir;

    #[test]
    fn test_verifier_accepts_matching_key() {
        let mut profile = KeyProfile::generate(KdfParams::default()).unwrap();
        let key = derive_master_key("correct-horse-battery", &profile.salt, &profile.kdf).unwrap();
        profile.attach_verifier(&key).unwrap();

        let again = derive_master_key("correct-horse-battery", &profile.salt, &profile.kdf).unwrap();
        assert!(profile.verify(&again).is_ok());
    }

    #[test]
    fn test_verifier_rejects_other_key() {
        let mut profile = KeyProfile::generate(KdfParams::default()).unwrap();
        let key = derive_master_key("correct-horse-battery", &profile.salt, &profile.kdf).unwrap();
        profile.attach_verifier(&key).unwrap();

        let wrong = derive_master_key("wrong-horse-battery", &profile.salt, &profile.kdf).unwrap();
        assert!(matches!(profile.verify(&wrong), Err(QuillError::Decryption(_))));
    }

    #[test]
    fn test_profile_without_verifier_accepts_any_key() {
        let profile = KeyProfile::generate(KdfParams::default()).unwrap();
        let key = derive_master_key("anything", &profile.salt, &profile.kdf).unwrap();
        assert!(profile.verify(&key).is_ok());
    }

    #[test]
    fn test_save_load_keeps_salt_stable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.json");

        let profile = KeyProfile::generate(KdfParams::default()).unwrap();
        profile.save_new(&path).unwrap();

        let loaded = KeyProfile::load(&path).unwrap().unwrap();
        assert_eq!(loaded, profile);
    }

    #[test]
    fn test_save_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.json");

        KeyProfile::generate(KdfParams::default())
            .unwrap()
            .save_new(&path)
            .unwrap();
        let second = KeyProfile::generate(KdfParams::default()).unwrap();
        assert!(second.save_new(&path).is_err());
    }

    #[test]
    fn test_load_missing_returns_none() {
        let dir = tempdir().unwrap();
        assert!(KeyProfile::load(&dir.path().join("absent.json"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_generate_rejects_weak_kdf() {
        let weak = KdfParams::Pbkdf2Sha256 { iterations: 10 };
        assert!(matches!(
            KeyProfile::generate(weak),
            Err(QuillError::Derivation(_))
        ));
    }
}
