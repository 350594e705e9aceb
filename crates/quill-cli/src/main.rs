//! Quill CLI - notes that encrypt themselves when they look sensitive
//!
//! This is the command-line interface for Quill. It runs both halves of the
//! note pipeline locally: the client session that detects and encrypts, and
//! the note service that enforces the sensitivity policy before storing.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod output;
mod ui;

use clap::{CommandFactory, Parser};
use quill_core::QuillError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use app::AppContext;
use cli::{Cli, Commands};
use constants::ENV_LOG;
use errors::CliError;

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli).await {
        exit_with_error(e);
    }
}

/// Log to stderr so stdout stays clean for `--json` output.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn exit_with_error(e: anyhow::Error) -> ! {
    if let Some(cli_err) = e.downcast_ref::<CliError>() {
        cli_err.exit();
    }
    if let Some(core_err) = e.downcast_ref::<QuillError>() {
        if let Some(cli_err) = CliError::from_core(core_err) {
            cli_err.exit();
        }
    }
    eprintln!("Error: {:#}", e);
    std::process::exit(1);
}

async fn run(ctx: &AppContext<'_>, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Init(args)) => commands::handle_init(ctx, args).await,
        Some(Commands::Add(args)) => commands::handle_add(ctx, args).await,
        Some(Commands::Edit(args)) => commands::handle_edit(ctx, args).await,
        Some(Commands::Show(args)) => commands::handle_show(ctx, args).await,
        Some(Commands::List(args)) => commands::handle_list(ctx, args),
        Some(Commands::Delete(args)) => commands::handle_delete(ctx, args),
        Some(Commands::Detect(args)) => commands::handle_detect(ctx, args),
        Some(Commands::Submit(args)) => commands::handle_submit(ctx, args),
        Some(Commands::Digest(args)) => commands::handle_digest(ctx, args),
        Some(Commands::Completions { shell }) => commands::handle_completions(*shell),
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
