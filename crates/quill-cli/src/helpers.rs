//! Input helpers shared by command handlers.

use std::io::{self, IsTerminal, Read};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use dialoguer::{Confirm, Password};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::constants::ENV_PASSPHRASE;
use crate::errors::CliError;

fn passphrase_from_env() -> Option<Zeroizing<String>> {
    let value = Zeroizing::new(std::env::var(ENV_PASSPHRASE).ok()?);
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Prompt for passphrase (or read from QUILL_PASSPHRASE env var).
pub fn prompt_passphrase(interactive: bool) -> anyhow::Result<Zeroizing<String>> {
    if let Some(value) = passphrase_from_env() {
        return Ok(value);
    }
    if !interactive {
        return Err(anyhow::anyhow!(
            "No passphrase provided and no TTY available. Set QUILL_PASSPHRASE."
        ));
    }
    Password::new()
        .with_prompt("Passphrase")
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}

/// Prompt for passphrase with confirmation (for init), or read from QUILL_PASSPHRASE env var.
pub fn prompt_init_passphrase(interactive: bool) -> anyhow::Result<Zeroizing<String>> {
    if let Some(value) = passphrase_from_env() {
        return Ok(value);
    }
    if !interactive {
        return Err(anyhow::anyhow!(
            "No passphrase provided and no TTY available. Set QUILL_PASSPHRASE."
        ));
    }
    Password::new()
        .with_prompt("Enter passphrase")
        .with_confirmation("Confirm passphrase", "Passphrases do not match")
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}

/// Ask a yes/no question; non-interactive sessions answer no.
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    if !is_interactive() {
        return Ok(false);
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read confirmation: {}", e))
}

/// Whether both stdin and stderr are attached to a terminal.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stderr().is_terminal()
}

/// Parse a note ID argument.
pub fn parse_note_id(value: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        CliError::invalid_input(format!(
            "Invalid note ID: {}\nHint: Note IDs are UUIDs; run `quill list` to find them.",
            value
        ))
        .into()
    })
}

/// Read a note body from --body, stdin, or $EDITOR, in that order.
pub fn read_note_body(no_input: bool, body: Option<String>) -> anyhow::Result<String> {
    if let Some(value) = body {
        if value.trim().is_empty() {
            return Err(CliError::invalid_input("--body cannot be empty").into());
        }
        return Ok(value);
    }

    if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
        let trimmed = buffer.trim_end().to_string();
        if trimmed.is_empty() {
            return Err(CliError::invalid_input("No input provided on stdin").into());
        }
        return Ok(trimmed);
    }

    if no_input {
        return Err(CliError::invalid_input("--no-input requires content from stdin").into());
    }

    read_body_from_editor()
}

/// Open $EDITOR to compose a note body.
fn read_body_from_editor() -> anyhow::Result<String> {
    let editor = std::env::var("EDITOR").map_err(|_| {
        CliError::invalid_input("$EDITOR is not set; use --body or pipe content via stdin")
    })?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("System time error: {}", e))?
        .as_nanos();
    let filename = format!("quill_note_{}_{}.md", std::process::id(), nanos);
    let path = std::env::temp_dir().join(filename);

    // The draft may hold sensitive plaintext before it is encrypted.
    quill_core::fs::write_atomic(&path, b"", true)
        .map_err(|e| anyhow::anyhow!("Failed to create temp file: {}", e))?;

    let status = Command::new(editor)
        .arg(&path)
        .status()
        .map_err(|e| anyhow::anyhow!("Failed to launch editor: {}", e));
    let status = match status {
        Ok(status) => status,
        Err(err) => {
            let _ = std::fs::remove_file(&path);
            return Err(err);
        }
    };
    if !status.success() {
        let _ = std::fs::remove_file(&path);
        return Err(anyhow::anyhow!("Editor exited with failure"));
    }

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read temp file: {}", e));
    let _ = std::fs::remove_file(&path);

    let trimmed = contents?.trim_end().to_string();
    if trimmed.is_empty() {
        return Err(CliError::invalid_input("Note body is empty").into());
    }

    Ok(trimmed)
}
