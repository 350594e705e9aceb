//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config, key profile, note).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong passphrase).
    pub const AUTH_FAILED: i32 = 5;

    /// The sensitivity policy refused to store the note.
    pub const POLICY_REJECTED: i32 = 6;

    /// A key was needed but the session is locked.
    pub const LOCKED: i32 = 7;
}

/// Environment variable overriding the config file path.
pub const ENV_CONFIG: &str = "QUILL_CONFIG";

/// Environment variable overriding the database path.
pub const ENV_DB: &str = "QUILL_DB";

/// Environment variable supplying the passphrase non-interactively.
pub const ENV_PASSPHRASE: &str = "QUILL_PASSPHRASE";

/// Environment variable holding the log filter.
pub const ENV_LOG: &str = "QUILL_LOG";
