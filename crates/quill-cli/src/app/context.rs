//! Application context for the Quill CLI.
//!
//! Provides a unified context that combines CLI arguments with the
//! lazily-loaded config file.

use std::path::{Path, PathBuf};

use once_cell::unsync::OnceCell;
use quill_core::crypto::KeyProfile;
use quill_core::{ClientSession, KeywordDetector, NoteService, SqliteStore};
use uuid::Uuid;

use crate::cli::Cli;
use crate::config::{read_config, QuillConfig};
use crate::errors::CliError;

use super::resolver::{missing_config_hint, resolve_config_path, resolve_db_path};

/// Application context that bundles CLI args with configuration.
///
/// This avoids repeatedly loading config and threading multiple parameters
/// through handler functions.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<QuillConfig>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    /// Get the CLI arguments.
    pub fn cli(&self) -> &Cli {
        self.cli
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Get the configuration, loading it lazily if needed.
    pub fn config(&self) -> anyhow::Result<&QuillConfig> {
        self.config.get_or_try_init(|| {
            let path = resolve_config_path()?;
            if !path.exists() {
                return Err(CliError::not_found(
                    format!("Quill is not initialized: no config at {}", path.display()),
                    missing_config_hint(&path),
                )
                .into());
            }
            read_config(&path)
        })
    }

    /// The note owner for this device.
    pub fn owner(&self) -> anyhow::Result<Uuid> {
        Ok(self.config()?.session.owner_id)
    }

    /// Path to the note database.
    pub fn db_path(&self) -> anyhow::Result<PathBuf> {
        Ok(resolve_db_path(self.cli, self.config()?))
    }

    /// Open the note database behind the sensitivity policy.
    pub fn open_service(&self) -> anyhow::Result<NoteService<SqliteStore>> {
        let path = self.db_path()?;
        if !path.exists() {
            return Err(CliError::not_found(
                format!("No note database found at {}", path.display()),
                "Hint: Run `quill init`, or check --db / QUILL_DB.",
            )
            .into());
        }
        let store = SqliteStore::open(&path)?;
        Ok(NoteService::new(store))
    }

    /// Client-side detector: the built-in list plus configured extras.
    pub fn detector(&self) -> anyhow::Result<KeywordDetector> {
        Ok(KeywordDetector::with_extra(&self.config()?.keywords.extra))
    }

    /// Load the key profile written by `quill init`.
    pub fn load_profile(&self) -> anyhow::Result<KeyProfile> {
        let path = Path::new(&self.config()?.security.profile_path);
        KeyProfile::load(path)?.ok_or_else(|| {
            CliError::not_found(
                format!("Key profile not found at {}", path.display()),
                "Hint: Run `quill init` to create one.",
            )
            .into()
        })
    }

    /// A fresh, locked client session for this device's owner.
    pub fn session(&self) -> anyhow::Result<ClientSession> {
        Ok(ClientSession::new(self.owner()?, self.detector()?))
    }
}
