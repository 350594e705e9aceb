//! Per-note envelope encryption.
//!
//! Each call generates a fresh 256-bit data key, encrypts the content with
//! it under AES-256-GCM, then wraps the data key under the master key with
//! its own random nonce. Envelope shape:
//!
//! ```text
//! iv             = b64( content nonce (12 bytes) )
//! wrappedDataKey = b64( wrap nonce (12 bytes) | AES-GCM(master, data key) (48 bytes) )
//! algorithm      = "AES-GCM-256"
//! ```

use aes_gcm::aead::{Aead, AeadCore, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::key::{MasterKey, KEY_LENGTH};
use crate::error::{QuillError, Result};

/// Algorithm tag written into every envelope.
pub const ALGORITHM_AES_256_GCM: &str = "AES-GCM-256";

/// AES-GCM nonce length (96-bit).
pub const NONCE_LENGTH: usize = 12;

const TAG_LENGTH: usize = 16;
const WRAPPED_KEY_LENGTH: usize = NONCE_LENGTH + KEY_LENGTH + TAG_LENGTH;

/// Metadata needed to reverse [`encrypt`]. Useless without the master key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionEnvelope {
    /// Base64 content nonce
    pub iv: String,
    /// Base64 wrap nonce followed by the wrapped data key
    #[serde(alias = "wrappedNoteKey", alias = "wrapped_data_key")]
    pub wrapped_data_key: String,
    #[serde(alias = "algo")]
    pub algorithm: String,
}

struct ParsedEnvelope {
    iv: [u8; NONCE_LENGTH],
    wrap_nonce: [u8; NONCE_LENGTH],
    wrapped_key: Vec<u8>,
}

impl EncryptionEnvelope {
    fn parse(&self) -> std::result::Result<ParsedEnvelope, String> {
        if self.algorithm != ALGORITHM_AES_256_GCM {
            return Err(format!("unsupported algorithm '{}'", self.algorithm));
        }

        let iv = STANDARD
            .decode(&self.iv)
            .map_err(|e| format!("iv is not valid base64: {}", e))?;
        let iv: [u8; NONCE_LENGTH] = iv
            .as_slice()
            .try_into()
            .map_err(|_| format!("iv must be {} bytes (got {})", NONCE_LENGTH, iv.len()))?;

        let wrapped = STANDARD
            .decode(&self.wrapped_data_key)
            .map_err(|e| format!("wrapped data key is not valid base64: {}", e))?;
        if wrapped.len() != WRAPPED_KEY_LENGTH {
            return Err(format!(
                "wrapped data key must be {} bytes (got {})",
                WRAPPED_KEY_LENGTH,
                wrapped.len()
            ));
        }
        let (nonce, key) = wrapped.split_at(NONCE_LENGTH);
        let mut wrap_nonce = [0u8; NONCE_LENGTH];
        wrap_nonce.copy_from_slice(nonce);

        Ok(ParsedEnvelope {
            iv,
            wrap_nonce,
            wrapped_key: key.to_vec(),
        })
    }

    /// Structural check used at the payload boundary.
    ///
    /// # Errors
    ///
    /// Returns `QuillError::InvalidPayload` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.parse().map(|_| ()).map_err(QuillError::InvalidPayload)
    }
}

/// Output of [`encrypt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedContent {
    pub ciphertext: Vec<u8>,
    pub envelope: EncryptionEnvelope,
}

impl EncryptedContent {
    /// Ciphertext in the base64 form notes are stored with.
    pub fn ciphertext_base64(&self) -> String {
        STANDARD.encode(&self.ciphertext)
    }
}

fn master_cipher(master_key: &MasterKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(master_key.as_bytes()))
}

/// Encrypt note content under a fresh data key wrapped by `master_key`.
///
/// # Arguments
///
/// * `plaintext` - Note content
/// * `master_key` - The unlocked master key; it only wraps the data key
///
/// # Security
///
/// - Every call draws a new 256-bit data key and new 96-bit nonces
/// - The data key is zeroed once wrapped
/// - Encrypting the same text twice yields different ciphertext
///
/// # Examples
///
/// ```
/// use quill_core::crypto::{derive_master_key, encrypt, KdfParams, Salt, ALGORITHM_AES_256_GCM};
///
/// let key = derive_master_key("correct-horse-battery", &Salt::generate(), &KdfParams::default()).unwrap();
/// let first = encrypt("seed phrase is on the fridge", &key).unwrap();
/// let second = encrypt("seed phrase is on the fridge", &key).unwrap();
///
/// assert_eq!(first.envelope.algorithm, ALGORITHM_AES_256_GCM);
/// assert_ne!(first.ciphertext, second.ciphertext);
/// ```
pub fn encrypt(plaintext: &str, master_key: &MasterKey) -> Result<EncryptedContent> {
    let mut data_key = Zeroizing::new([0u8; KEY_LENGTH]);
    OsRng.fill_bytes(&mut data_key[..]);

    let content_cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&data_key[..]));
    let iv = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = content_cipher
        .encrypt(&iv, plaintext.as_bytes())
        .map_err(|_| QuillError::Other("Content encryption failed".to_string()))?;

    let wrap_nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let wrapped = master_cipher(master_key)
        .encrypt(&wrap_nonce, &data_key[..])
        .map_err(|_| QuillError::Other("Data key wrap failed".to_string()))?;

    let mut wrapped_data_key = Vec::with_capacity(WRAPPED_KEY_LENGTH);
    wrapped_data_key.extend_from_slice(&wrap_nonce);
    wrapped_data_key.extend_from_slice(&wrapped);

    tracing::debug!(bytes = ciphertext.len(), "encrypted note content");

    Ok(EncryptedContent {
        ciphertext,
        envelope: EncryptionEnvelope {
            iv: STANDARD.encode(iv),
            wrapped_data_key: STANDARD.encode(wrapped_data_key),
            algorithm: ALGORITHM_AES_256_GCM.to_string(),
        },
    })
}

/// Reverse [`encrypt`].
///
/// # Errors
///
/// Returns `QuillError::Decryption` for a malformed envelope, a wrong master
/// key, tampered ciphertext, or plaintext that is not UTF-8. Never returns
/// partial output.
///
/// # Examples
///
/// ```
/// use quill_core::crypto::{decrypt, derive_master_key, encrypt, KdfParams, Salt};
/// use quill_core::QuillError;
///
/// let salt = Salt::generate();
/// let key = derive_master_key("correct-horse-battery", &salt, &KdfParams::default()).unwrap();
/// let sealed = encrypt("salary review notes", &key).unwrap();
/// assert_eq!(decrypt(&sealed.ciphertext, &sealed.envelope, &key).unwrap(), "salary review notes");
///
/// let wrong = derive_master_key("wrong-passphrase", &salt, &KdfParams::default()).unwrap();
/// assert!(matches!(
///     decrypt(&sealed.ciphertext, &sealed.envelope, &wrong),
///     Err(QuillError::Decryption(_))
/// ));
/// ```
pub fn decrypt(
    ciphertext: &[u8],
    envelope: &EncryptionEnvelope,
    master_key: &MasterKey,
) -> Result<String> {
    let parsed = envelope.parse().map_err(QuillError::Decryption)?;

    let data_key = master_cipher(master_key)
        .decrypt(
            Nonce::from_slice(&parsed.wrap_nonce),
            parsed.wrapped_key.as_slice(),
        )
        .map(Zeroizing::new)
        .map_err(|_| QuillError::Decryption("data key authentication failed".to_string()))?;
    if data_key.len() != KEY_LENGTH {
        return Err(QuillError::Decryption(
            "unwrapped data key has wrong length".to_string(),
        ));
    }

    let content_cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&data_key[..]));
    let plaintext = content_cipher
        .decrypt(Nonce::from_slice(&parsed.iv), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| QuillError::Decryption("content authentication failed".to_string()))?;

    String::from_utf8(plaintext.to_vec())
        .map_err(|_| QuillError::Decryption("plaintext is not valid UTF-8".to_string()))
}

/// Decode stored base64 ciphertext, failing closed.
pub fn decode_ciphertext(encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded)
        .map_err(|e| QuillError::Decryption(format!("ciphertext is not valid base64: {}", e)))
}
