//! Application-level utilities for the Quill CLI.
//!
//! This module provides:
//! - Path resolution for config, database and key profile files
//! - A lazily-loaded application context
//! - Session unlock (single attempt, no retry)

mod context;
mod resolver;
mod unlock;

// Re-export public API
pub use context::AppContext;
pub use resolver::{missing_config_hint, resolve_config_path, resolve_db_path};
pub use unlock::unlock_session;
