//! Output formatting helpers for the CLI.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use quill_core::storage::{Digest, Note};
use quill_core::Detection;

const PREVIEW_CHARS: usize = 48;

/// Convert a note to JSON for output, with `content` as displayed.
pub fn note_json(note: &Note, content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": note.id,
        "title": note.title,
        "content": content,
        "is_sensitive": note.is_sensitive,
        "content_encrypted": note.content_encrypted,
        "sensitive_keywords": note.sensitive_keywords,
        "created_at": note.created_at,
        "updated_at": note.updated_at,
    })
}

/// Print a single note in human-readable format.
pub fn print_note(note: &Note, content: &str, quiet: bool) {
    if !quiet {
        println!("ID: {}", note.id);
        if let Some(title) = &note.title {
            println!("Title: {}", title);
        }
        println!("Created: {}", note.created_at);
        if note.updated_at != note.created_at {
            println!("Updated: {}", note.updated_at);
        }
        if note.is_locked() {
            println!("Protection: encrypted");
        }
        if !note.sensitive_keywords.is_empty() {
            println!("Matched: {}", note.sensitive_keywords.join(", "));
        }
        println!();
    }
    println!("{}", content);
}

/// First line of `content`, shortened for table cells.
pub fn preview(content: &str) -> String {
    let line = content.lines().next().unwrap_or_default();
    if line.chars().count() > PREVIEW_CHARS {
        let cut: String = line.chars().take(PREVIEW_CHARS - 1).collect();
        format!("{}…", cut)
    } else {
        line.to_string()
    }
}

/// Render listed notes as a table. Content must already be sanitized.
pub fn notes_table(notes: &[Note]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Created", "Title", "Content", "Flags"]);

    for note in notes {
        let mut flags = Vec::new();
        if note.is_sensitive {
            flags.push("sensitive");
        }
        if note.content_encrypted {
            flags.push("encrypted");
        }
        table.add_row(vec![
            Cell::new(note.id.to_string()),
            Cell::new(note.created_at.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(note.title.as_deref().unwrap_or("")),
            Cell::new(preview(note.content.as_deref().unwrap_or(""))),
            Cell::new(flags.join(",")),
        ]);
    }
    table
}

/// Print a keyword scan result.
pub fn print_detection(detection: &Detection) {
    if detection.is_sensitive {
        println!("sensitive: yes");
        println!("matches: {}", detection.matches.join(", "));
    } else {
        println!("sensitive: no");
    }
}

/// Print a digest in human-readable format.
pub fn print_digest(digest: &Digest, quiet: bool) {
    if !quiet {
        println!(
            "{} digest {} → {}",
            digest.range,
            digest.period_start.format("%Y-%m-%d %H:%M"),
            digest.period_end.format("%Y-%m-%d %H:%M")
        );
        println!("Notes: {}", digest.source_note_ids.len());
        if !digest.themes.is_empty() {
            let themes: Vec<String> = digest
                .themes
                .iter()
                .map(|theme| format!("{} ({})", theme.keyword, theme.count))
                .collect();
            println!("Themes: {}", themes.join(", "));
        }
        println!();
    }
    println!("{}", digest.summary);
}
