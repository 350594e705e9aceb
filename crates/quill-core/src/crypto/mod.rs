//! Client-side key management and content protection.
//!
//! - **key**: PBKDF2-SHA256 / Argon2id master-key derivation
//! - **salt**: per-user derivation salt
//! - **profile**: persisted salt, KDF parameters and key verifier
//! - **custody**: session-scoped holder of the unlocked master key
//! - **cipher**: per-note AES-256-GCM envelope encryption
//!
//! ## Security Model
//!
//! - The master key exists only in process memory while unlocked
//! - Every note gets its own random data key, wrapped by the master key
//! - Every AEAD operation draws a fresh random 96-bit nonce
//! - Key material is zeroized from memory on drop
//!
//! ## Threat Model
//!
//! We defend against:
//! - A server (or its database) reading sensitive note content
//! - Offline brute-force of a captured salt and ciphertext
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Access to an unlocked session / memory

pub mod cipher;
pub mod custody;
pub mod key;
pub mod passphrase;
pub mod profile;
pub mod salt;

pub use cipher::{
    decode_ciphertext, decrypt, encrypt, EncryptedContent, EncryptionEnvelope,
    ALGORITHM_AES_256_GCM,
};
pub use custody::KeyCustody;
pub use key::{derive_master_key, derive_master_key_async, KdfParams, MasterKey};
pub use passphrase::validate_passphrase;
pub use profile::{KeyProfile, KeyVerifier};
pub use salt::Salt;
