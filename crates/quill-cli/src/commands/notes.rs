//! Note commands.
//!
//! `add` and `edit` act as the client: detect, encrypt if needed, then hand
//! the payload to the note service, which re-checks it before storing.
//! `submit` skips the client half entirely.

use std::io::{self, Read};

use quill_core::storage::Note;
use quill_core::{ClientSession, NotePatch, NotePayload};

use crate::app::{unlock_session, AppContext};
use crate::cli::{AddArgs, DeleteArgs, EditArgs, ListArgs, ShowArgs, SubmitArgs};
use crate::errors::CliError;
use crate::helpers::{confirm, parse_note_id, read_note_body};
use crate::output::{note_json, notes_table, print_note};

/// Unlock `session` if `text` will have to be encrypted.
async fn unlock_for_text(
    ctx: &AppContext<'_>,
    session: &ClientSession,
    text: &str,
    mark_sensitive: bool,
    no_input: bool,
) -> anyhow::Result<()> {
    if mark_sensitive || session.detector().detect(text).is_sensitive {
        let profile = ctx.load_profile()?;
        unlock_session(session, &profile, no_input, ctx.quiet()).await?;
    }
    Ok(())
}

fn report_saved(verb: &str, note: &Note, quiet: bool) {
    if quiet {
        println!("{}", note.id);
        return;
    }
    println!("{} note {}", verb, note.id);
    if note.content_encrypted {
        if note.sensitive_keywords.is_empty() {
            println!("Content encrypted (marked sensitive)");
        } else {
            println!(
                "Content encrypted (matched: {})",
                note.sensitive_keywords.join(", ")
            );
        }
    }
}

pub async fn handle_add(ctx: &AppContext<'_>, args: &AddArgs) -> anyhow::Result<()> {
    let body = read_note_body(args.no_input, args.body.clone())?;
    let service = ctx.open_service()?;
    let session = ctx.session()?;

    unlock_for_text(ctx, &session, &body, args.sensitive, args.no_input).await?;
    let payload = session
        .compose(args.title.as_deref(), &body, args.sensitive)
        .await?;
    let note = service.create(session.owner(), payload)?;
    session.logout();

    report_saved("Added", &note, ctx.quiet());
    Ok(())
}

pub async fn handle_edit(ctx: &AppContext<'_>, args: &EditArgs) -> anyhow::Result<()> {
    let id = parse_note_id(&args.id)?;
    let service = ctx.open_service()?;
    let session = ctx.session()?;
    let existing = service.get(session.owner(), &id)?;

    // A bare `edit ID` opens the body; `--title` alone only retitles.
    let body = if args.body.is_some() || args.title.is_none() {
        Some(read_note_body(args.no_input, args.body.clone())?)
    } else {
        None
    };

    let mut patch = NotePatch {
        title: args.title.clone(),
        ..NotePatch::default()
    };
    if let Some(body) = body {
        let mark_sensitive = args.sensitive || existing.is_sensitive;
        unlock_for_text(ctx, &session, &body, mark_sensitive, args.no_input).await?;
        let payload = session.compose(None, &body, mark_sensitive).await?;
        patch.content = Some(payload.content.unwrap_or_default());
        patch.is_sensitive = Some(payload.is_sensitive);
        patch.content_encrypted = Some(payload.content_encrypted);
        patch.encryption_meta = payload.encryption_meta;
        patch.sensitive_keywords = Some(payload.sensitive_keywords);
    }

    let note = service.update(session.owner(), &id, patch)?;
    session.logout();

    report_saved("Updated", &note, ctx.quiet());
    Ok(())
}

pub async fn handle_show(ctx: &AppContext<'_>, args: &ShowArgs) -> anyhow::Result<()> {
    let id = parse_note_id(&args.id)?;
    let service = ctx.open_service()?;
    let session = ctx.session()?;
    let note = service.get(session.owner(), &id)?;

    if note.content_encrypted && !args.locked {
        let profile = ctx.load_profile()?;
        unlock_session(&session, &profile, args.no_input, ctx.quiet()).await?;
    }
    let content = session.display_content(&note).await?;
    session.logout();

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&note_json(&note, &content))?
        );
    } else {
        print_note(&note, &content, ctx.quiet());
    }
    Ok(())
}

pub fn handle_list(ctx: &AppContext<'_>, args: &ListArgs) -> anyhow::Result<()> {
    let service = ctx.open_service()?;
    let mut notes = service.list(&ctx.owner()?)?;
    if let Some(limit) = args.limit {
        notes.truncate(limit);
    }

    if args.json {
        let values: Vec<serde_json::Value> = notes
            .iter()
            .map(|note| note_json(note, note.content.as_deref().unwrap_or_default()))
            .collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    if notes.is_empty() {
        if !ctx.quiet() {
            println!("No notes found.");
        }
        return Ok(());
    }
    println!("{}", notes_table(&notes));
    Ok(())
}

pub fn handle_delete(ctx: &AppContext<'_>, args: &DeleteArgs) -> anyhow::Result<()> {
    let id = parse_note_id(&args.id)?;
    let service = ctx.open_service()?;
    let owner = ctx.owner()?;
    service.get(&owner, &id)?;

    if !args.yes && !confirm(&format!("Delete note {}?", id))? {
        return Err(CliError::invalid_input(
            "Delete not confirmed\nHint: Pass --yes to delete without prompting.",
        )
        .into());
    }

    service.delete(&owner, &id)?;
    if !ctx.quiet() {
        println!("Deleted note {}", id);
    }
    Ok(())
}

pub fn handle_submit(ctx: &AppContext<'_>, args: &SubmitArgs) -> anyhow::Result<()> {
    let raw = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
            buffer
        }
    };
    let payload: NotePayload = serde_json::from_str(&raw)
        .map_err(|e| CliError::invalid_input(format!("Invalid note payload JSON: {}", e)))?;

    let service = ctx.open_service()?;
    let note = service.create(&ctx.owner()?, payload)?;

    if args.json {
        let sanitized = note.sanitized();
        println!(
            "{}",
            serde_json::to_string_pretty(&note_json(
                &sanitized,
                sanitized.content.as_deref().unwrap_or_default()
            ))?
        );
    } else {
        report_saved("Stored", &note, ctx.quiet());
    }
    Ok(())
}
