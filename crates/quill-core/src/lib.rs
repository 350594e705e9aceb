//! # Quill Core
//!
//! Core library for Quill - a note keeper that encrypts sensitive notes on
//! the client before they are stored.
//!
//! ## Architecture
//!
//! - **keywords**: sensitive-topic keyword detection shared by both sides
//! - **crypto**: key derivation, key custody and per-note envelope encryption
//! - **payload**: wire payloads and the tagged submission they parse into
//! - **policy**: server-side "sensitive implies encrypted" gate
//! - **storage**: note/digest store traits and the SQLite backend
//! - **service**: owner-scoped note operations behind the policy
//! - **client**: per-session compose/reveal pipeline
//! - **digest**: summaries of non-sensitive notes

pub mod client;
pub mod crypto;
pub mod digest;
pub mod error;
pub mod fs;
pub mod keywords;
pub mod payload;
pub mod policy;
pub mod service;
pub mod storage;

pub use client::ClientSession;
pub use error::{QuillError, Result};
pub use keywords::{Detection, KeywordDetector, KEYWORD_LIST_VERSION};
pub use payload::{NoteBody, NotePatch, NotePayload, NoteSubmission};
pub use policy::{PolicyOutcome, PolicyRejection, RejectionReason, SensitivityPolicy};
pub use service::NoteService;
pub use storage::{DigestStore, NoteStore, SqliteStore};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
