//! CLI argument definitions using clap.
//!
//! This module contains all the command-line argument structures
//! for the Quill CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};
use quill_core::VERSION;

use crate::constants::ENV_DB;

/// Quill - notes that encrypt themselves when they look sensitive
#[derive(Parser)]
#[command(name = "quill")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the note database
    #[arg(short, long, global = true, env = ENV_DB)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Key-derivation function selectable at init.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KdfChoice {
    Pbkdf2,
    Argon2id,
}

#[derive(Args)]
pub struct InitArgs {
    /// Key-derivation function for the master key
    #[arg(long, value_enum, default_value_t = KdfChoice::Pbkdf2)]
    pub kdf: KdfChoice,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// Note title (never encrypted)
    #[arg(short, long)]
    pub title: Option<String>,

    /// Note body (overrides stdin/editor)
    #[arg(long)]
    pub body: Option<String>,

    /// Treat the note as sensitive even without keyword matches
    #[arg(long)]
    pub sensitive: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

#[derive(Args)]
pub struct EditArgs {
    /// Note ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// New title (empty string clears it)
    #[arg(short, long)]
    pub title: Option<String>,

    /// New body
    #[arg(long)]
    pub body: Option<String>,

    /// Treat the new body as sensitive even without keyword matches
    #[arg(long)]
    pub sensitive: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Note ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not unlock; show the placeholder for encrypted notes
    #[arg(long)]
    pub locked: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Limit number of results
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Note ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct DetectArgs {
    /// Text to scan (reads stdin when omitted)
    #[arg(value_name = "TEXT")]
    pub text: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct SubmitArgs {
    /// JSON payload file (reads stdin when omitted)
    #[arg(value_name = "FILE")]
    pub file: Option<String>,

    /// Output the stored note as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct DigestArgs {
    /// Period to summarize (daily, weekly)
    #[arg(long, default_value = "daily")]
    pub range: String,

    /// List stored digests instead of generating one
    #[arg(long)]
    pub list: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the config, key profile and note database
    Init(InitArgs),

    /// Add a new note; sensitive text is encrypted before it is stored
    Add(AddArgs),

    /// Edit a note's title or body
    Edit(EditArgs),

    /// Show a note, decrypting it if needed
    Show(ShowArgs),

    /// List notes (encrypted content stays locked)
    List(ListArgs),

    /// Delete a note
    Delete(DeleteArgs),

    /// Scan text for sensitive keywords
    Detect(DetectArgs),

    /// Submit a raw JSON note payload, exactly as a remote client would
    Submit(SubmitArgs),

    /// Summarize recent non-sensitive notes
    Digest(DigestArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
