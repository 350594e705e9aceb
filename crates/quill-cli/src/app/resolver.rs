//! Path resolution for config and database files.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{default_config_path, QuillConfig};
use crate::constants::ENV_CONFIG;

/// Resolve the config file path, checking QUILL_CONFIG env var first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(ENV_CONFIG) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Resolve the database path: `--db`/QUILL_DB first, then the config.
pub fn resolve_db_path(cli: &Cli, config: &QuillConfig) -> PathBuf {
    match cli.db.as_deref() {
        Some(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => PathBuf::from(&config.storage.path),
    }
}

/// Hint shown when no config file exists yet.
pub fn missing_config_hint(config_path: &Path) -> String {
    format!(
        "Hint: Run `quill init` to create {}\nOr point QUILL_CONFIG at an existing config.",
        config_path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KdfName;
    use clap::Parser;
    use uuid::Uuid;

    fn config() -> QuillConfig {
        QuillConfig::new(
            PathBuf::from("/data/quill.db"),
            PathBuf::from("/data/key-profile.json"),
            KdfName::Pbkdf2Sha256,
            Uuid::new_v4(),
        )
    }

    #[test]
    fn test_db_flag_overrides_config() {
        let cli = Cli::try_parse_from(["quill", "--db", "/tmp/other.db", "list"]).unwrap();
        assert_eq!(resolve_db_path(&cli, &config()), PathBuf::from("/tmp/other.db"));
    }

    #[test]
    fn test_missing_config_hint_names_path() {
        let hint = missing_config_hint(Path::new("/x/config.toml"));
        assert!(hint.contains("quill init"));
        assert!(hint.contains("/x/config.toml"));
    }
}
