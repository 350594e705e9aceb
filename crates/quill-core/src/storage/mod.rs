//! Storage collaborator for notes and digests.
//!
//! The storage layer is backend-agnostic: the note service and the digest
//! generator depend on the `NoteStore` and `DigestStore` traits, and
//! `SqliteStore` is the bundled implementation.
//!
//! ## Security
//!
//! Storage never decrypts anything and never sees a key. Sensitive notes
//! arrive already encrypted; the policy gate in [`crate::policy`] runs
//! before any write reaches a backend.

pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export public types
pub use sqlite::{SqliteStore, MAX_CONTENT_BYTES, MAX_KEYWORDS_PER_NOTE, MAX_TITLE_BYTES};
pub use traits::{DigestStore, NoteStore};
pub use types::{
    Digest, DigestRange, NewDigest, NewNote, Note, NoteChanges, Theme, LOCKED_PLACEHOLDER,
};
