//! Session unlock.
//!
//! One passphrase, one derivation, one verdict: a wrong passphrase ends
//! the command instead of looping back to the prompt.

use quill_core::crypto::KeyProfile;
use quill_core::{ClientSession, QuillError};

use crate::errors::CliError;
use crate::helpers::{is_interactive, prompt_passphrase};
use crate::ui::Spinner;

/// Prompt for the passphrase and unlock `session` against `profile`.
pub async fn unlock_session(
    session: &ClientSession,
    profile: &KeyProfile,
    no_input: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let passphrase = prompt_passphrase(!no_input && is_interactive())?;

    let spinner = Spinner::new("Deriving key", quiet);
    spinner.start();
    let result = session
        .custody()
        .unlock_with_passphrase(&passphrase, profile)
        .await;
    spinner.finish();

    match result {
        Ok(()) => {
            tracing::debug!(kdf = profile.kdf.name(), "session unlocked");
            Ok(())
        }
        Err(QuillError::Decryption(_)) => Err(CliError::auth_failed_with_hint(
            "Wrong passphrase",
            "Hint: Use the passphrase chosen at `quill init`, or set QUILL_PASSPHRASE.",
        )
        .into()),
        Err(err) => Err(err.into()),
    }
}
