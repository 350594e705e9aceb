//! Session-scoped holder of the unlocked master key.
//!
//! One `KeyCustody` is created per authenticated session and handed by
//! reference to whatever needs to encrypt or decrypt. It never writes the
//! key anywhere; dropping it (or calling [`KeyCustody::lock`]) releases the
//! key, which zeroizes itself once the last in-flight operation finishes.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::cipher::{self, EncryptedContent, EncryptionEnvelope};
use super::key::{derive_master_key_async, MasterKey};
use super::profile::KeyProfile;
use crate::error::{QuillError, Result};

/// Single-slot master key holder.
#[derive(Debug, Default)]
pub struct KeyCustody {
    slot: RwLock<Option<Arc<MasterKey>>>,
}

impl KeyCustody {
    /// A locked custody.
    pub fn new() -> Self {
        Self::default()
    }

    // The slot only ever holds a complete value, so a poisoned lock is
    // still safe to use.
    fn read_slot(&self) -> RwLockReadGuard<'_, Option<Arc<MasterKey>>> {
        self.slot.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, Option<Arc<MasterKey>>> {
        self.slot.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Hold `key`, replacing any previously held key.
    pub fn unlock(&self, key: MasterKey) {
        *self.write_slot() = Some(Arc::new(key));
        tracing::debug!("key custody unlocked");
    }

    /// Derive the key for `profile`, verify it, and only then hold it.
    ///
    /// On any failure the previous state is left exactly as it was.
    ///
    /// # Errors
    ///
    /// `QuillError::Derivation` for bad KDF inputs, `QuillError::Decryption`
    /// if the profile's verifier rejects the derived key.
    pub async fn unlock_with_passphrase(&self, passphrase: &str, profile: &KeyProfile) -> Result<()> {
        let key = derive_master_key_async(passphrase, &profile.salt, &profile.kdf).await?;
        profile.verify(&key)?;
        self.unlock(key);
        Ok(())
    }

    /// Handle to the held key, if unlocked.
    pub fn current_key(&self) -> Option<Arc<MasterKey>> {
        self.read_slot().clone()
    }

    /// Drop the held key.
    pub fn lock(&self) {
        if self.write_slot().take().is_some() {
            tracing::debug!("key custody locked");
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.read_slot().is_some()
    }

    fn require_key(&self) -> Result<Arc<MasterKey>> {
        self.current_key().ok_or(QuillError::KeyUnavailable)
    }

    /// Encrypt with the held key on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns `QuillError::KeyUnavailable` while locked.
    pub async fn encrypt(&self, plaintext: &str) -> Result<EncryptedContent> {
        let key = self.require_key()?;
        let plaintext = zeroize::Zeroizing::new(plaintext.to_string());
        tokio::task::spawn_blocking(move || cipher::encrypt(&plaintext, &key))
            .await
            .map_err(|e| QuillError::Other(format!("Encryption task failed: {}", e)))?
    }

    /// Decrypt with the held key on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns `QuillError::KeyUnavailable` while locked and
    /// `QuillError::Decryption` for any cipher failure. Never retried.
    pub async fn decrypt(&self, ciphertext: &[u8], envelope: &EncryptionEnvelope) -> Result<String> {
        let key = self.require_key()?;
        let ciphertext = ciphertext.to_vec();
        let envelope = envelope.clone();
        tokio::task::spawn_blocking(move || cipher::decrypt(&ciphertext, &envelope, &key))
            .await
            .map_err(|e| QuillError::Decryption(format!("decryption task failed: {}", e)))?
    }
}
