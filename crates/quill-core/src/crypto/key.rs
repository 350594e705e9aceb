//! Master-key derivation from a passphrase.
//!
//! Two slow, salted derivations are supported. PBKDF2-HMAC-SHA256 is the
//! default because browsers can reproduce it with WebCrypto; Argon2id is
//! available for local-only profiles.

use argon2::Argon2;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::salt::Salt;
use crate::error::{QuillError, Result};

/// Length of the master key in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// Lowest PBKDF2 iteration count accepted.
pub const MIN_PBKDF2_ITERATIONS: u32 = 100_000;

/// Default PBKDF2 iteration count.
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;

/// Argon2id defaults: 64 MB, 3 passes, single lane.
pub const ARGON2_MEMORY_KIB: u32 = 64 * 1024;
pub const ARGON2_ITERATIONS: u32 = 3;
pub const ARGON2_PARALLELISM: u32 = 1;

/// Key-derivation function and its cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum KdfParams {
    Pbkdf2Sha256 {
        iterations: u32,
    },
    Argon2id {
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    },
}

impl Default for KdfParams {
    fn default() -> Self {
        KdfParams::Pbkdf2Sha256 {
            iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

impl KdfParams {
    /// Argon2id with the default cost parameters.
    pub fn argon2id() -> Self {
        KdfParams::Argon2id {
            memory_kib: ARGON2_MEMORY_KIB,
            iterations: ARGON2_ITERATIONS,
            parallelism: ARGON2_PARALLELISM,
        }
    }

    /// Short human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            KdfParams::Pbkdf2Sha256 { .. } => "pbkdf2-sha256",
            KdfParams::Argon2id { .. } => "argon2id",
        }
    }

    /// Check the parameters without deriving anything.
    pub fn validate(&self) -> Result<()> {
        match *self {
            KdfParams::Pbkdf2Sha256 { iterations } => check_pbkdf2_iterations(iterations),
            KdfParams::Argon2id {
                memory_kib,
                iterations,
                parallelism,
            } => build_argon2(memory_kib, iterations, parallelism).map(|_| ()),
        }
    }
}

fn check_pbkdf2_iterations(iterations: u32) -> Result<()> {
    if iterations < MIN_PBKDF2_ITERATIONS {
        return Err(QuillError::Derivation(format!(
            "PBKDF2 needs at least {} iterations (got {})",
            MIN_PBKDF2_ITERATIONS, iterations
        )));
    }
    Ok(())
}

fn build_argon2(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Argon2<'static>> {
    let params = argon2::Params::new(memory_kib, iterations, parallelism, Some(KEY_LENGTH))
        .map_err(|e| QuillError::Derivation(format!("Invalid Argon2 params: {}", e)))?;
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

/// Symmetric master key held only in memory.
///
/// Zeroized on drop. Deliberately not `Clone`, `Serialize` or `Display`.
#[derive(ZeroizeOnDrop)]
pub struct MasterKey {
    key: [u8; KEY_LENGTH],
}

impl MasterKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Raw key bytes, for immediate cipher use only.
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive a master key from a passphrase and salt.
///
/// Empty passphrases are accepted here; reject them with
/// [`super::validate_passphrase`] before calling.
///
/// # Arguments
///
/// * `passphrase` - The user's passphrase
/// * `salt` - The salt stored in the key profile
/// * `params` - KDF choice and cost, also stored in the profile
///
/// # Security
///
/// - Same passphrase, salt and params always produce the same key
/// - The key lives only in memory and is zeroed on drop
/// - PBKDF2 below 100,000 iterations is refused
///
/// # Errors
///
/// Returns `QuillError::Derivation` if the KDF parameters are invalid.
///
/// # Examples
///
/// ```
/// use quill_core::crypto::{decrypt, derive_master_key, encrypt, KdfParams, Salt};
///
/// let salt = Salt::from_bytes([7u8; 16]);
/// let key = derive_master_key("correct-horse-battery", &salt, &KdfParams::default()).unwrap();
/// let sealed = encrypt("hello", &key).unwrap();
///
/// let again = derive_master_key("correct-horse-battery", &salt, &KdfParams::default()).unwrap();
/// assert_eq!(decrypt(&sealed.ciphertext, &sealed.envelope, &again).unwrap(), "hello");
/// ```
pub fn derive_master_key(passphrase: &str, salt: &Salt, params: &KdfParams) -> Result<MasterKey> {
    let mut key_bytes = [0u8; KEY_LENGTH];

    match *params {
        KdfParams::Pbkdf2Sha256 { iterations } => {
            check_pbkdf2_iterations(iterations)?;
            pbkdf2::pbkdf2_hmac::<Sha256>(
                passphrase.as_bytes(),
                salt.as_bytes(),
                iterations,
                &mut key_bytes,
            );
        }
        KdfParams::Argon2id {
            memory_kib,
            iterations,
            parallelism,
        } => {
            build_argon2(memory_kib, iterations, parallelism)?
                .hash_password_into(passphrase.as_bytes(), salt.as_bytes(), &mut key_bytes)
                .map_err(|e| QuillError::Derivation(format!("Argon2 failed: {}", e)))?;
        }
    }

    let key = MasterKey::from_bytes(key_bytes);
    key_bytes.zeroize();
    tracing::debug!(kdf = params.name(), "derived master key");
    Ok(key)
}

/// Run [`derive_master_key`] on the blocking pool.
///
/// A derivation abandoned by the caller simply finishes and is dropped.
pub async fn derive_master_key_async(
    passphrase: &str,
    salt: &Salt,
    params: &KdfParams,
) -> Result<MasterKey> {
    let passphrase = zeroize::Zeroizing::new(passphrase.to_string());
    let salt = *salt;
    let params = *params;
    tokio::task::spawn_blocking(move || derive_master_key(&passphrase, &salt, &params))
        .await
        .map_err(|e| QuillError::Derivation(format!("Derivation task failed: {}", e)))?
}
