//! `quill init`: config, key profile and an empty note database.

use std::path::PathBuf;

use quill_core::crypto::{derive_master_key_async, validate_passphrase, KdfParams, KeyProfile};
use quill_core::SqliteStore;
use uuid::Uuid;

use crate::app::{resolve_config_path, AppContext};
use crate::cli::{InitArgs, KdfChoice};
use crate::config::{default_db_path, default_profile_path, write_config, KdfName, QuillConfig};
use crate::errors::CliError;
use crate::helpers::{is_interactive, prompt_init_passphrase};
use crate::ui::Spinner;

pub async fn handle_init(ctx: &AppContext<'_>, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = resolve_config_path()?;
    if config_path.exists() {
        return Err(CliError::invalid_input(format!(
            "Quill is already initialized (config at {})",
            config_path.display()
        ))
        .into());
    }

    let db_path = match ctx.cli().db.as_deref() {
        Some(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => default_db_path()?,
    };
    let profile_path = default_profile_path()?;
    if profile_path.exists() {
        return Err(CliError::invalid_input(format!(
            "A key profile already exists at {}; refusing to replace its salt",
            profile_path.display()
        ))
        .into());
    }

    let passphrase = prompt_init_passphrase(!args.no_input && is_interactive())?;
    validate_passphrase(&passphrase)?;

    let (kdf, kdf_name) = match args.kdf {
        KdfChoice::Pbkdf2 => (KdfParams::default(), KdfName::Pbkdf2Sha256),
        KdfChoice::Argon2id => (KdfParams::argon2id(), KdfName::Argon2id),
    };
    let mut profile = KeyProfile::generate(kdf)?;

    let spinner = Spinner::new("Deriving key", ctx.quiet());
    spinner.start();
    let key = derive_master_key_async(&passphrase, &profile.salt, &profile.kdf).await;
    spinner.finish();
    profile.attach_verifier(&key?)?;
    profile.save_new(&profile_path)?;

    SqliteStore::open(&db_path)?;

    let owner = Uuid::new_v4();
    let config = QuillConfig::new(db_path.clone(), profile_path, kdf_name, owner);
    write_config(&config_path, &config)?;
    tracing::info!(owner = %owner, kdf = kdf.name(), "quill initialized");

    if !ctx.quiet() {
        println!("Initialized quill");
        println!("  Config:   {}", config_path.display());
        println!("  Database: {}", db_path.display());
        println!("  KDF:      {}", kdf.name());
    }
    Ok(())
}
