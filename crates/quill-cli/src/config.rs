use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct QuillConfig {
    pub storage: StorageSection,
    pub security: SecuritySection,
    #[serde(default)]
    pub keywords: KeywordsSection,
    pub session: SessionSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StorageSection {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SecuritySection {
    pub profile_path: String,
    pub kdf: KdfName,
}

/// Extra client-side keywords on top of the built-in list.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct KeywordsSection {
    #[serde(default)]
    pub extra: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionSection {
    pub owner_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KdfName {
    Pbkdf2Sha256,
    Argon2id,
}

impl QuillConfig {
    pub fn new(db_path: PathBuf, profile_path: PathBuf, kdf: KdfName, owner_id: Uuid) -> Self {
        Self {
            storage: StorageSection {
                path: db_path.to_string_lossy().to_string(),
            },
            security: SecuritySection {
                profile_path: profile_path.to_string_lossy().to_string(),
                kdf,
            },
            keywords: KeywordsSection::default(),
            session: SessionSection { owner_id },
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_db_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("quill.db"))
}

pub fn default_profile_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("key-profile.json"))
}

pub fn read_config(path: &Path) -> anyhow::Result<QuillConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &QuillConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    quill_core::fs::write_atomic(path, contents.as_bytes(), false)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("quill"));
        }
    }
    Ok(home_dir()?.join(".config").join("quill"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("quill"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("quill"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
