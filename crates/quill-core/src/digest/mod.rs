//! Periodic digests of non-sensitive notes.
//!
//! Sensitive notes never reach a summarizer: the store query excludes them
//! and the generator drops any that slip through.

mod summarizer;

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use summarizer::{LocalSummarizer, Summarizer, Summary, SummaryOptions, EMPTY_SUMMARY};

use crate::error::Result;
use crate::storage::{Digest, DigestRange, DigestStore, NewDigest, Note, NoteStore};

/// Summarize `owner`'s notes from the `range` window ending at `now`.
///
/// # Returns
///
/// `Ok(None)` when the window holds no non-sensitive plaintext notes;
/// otherwise the
/// stored digest.
pub fn generate_digest<S>(
    store: &S,
    summarizer: &dyn Summarizer,
    owner: &Uuid,
    range: DigestRange,
    now: DateTime<Utc>,
) -> Result<Option<Digest>>
where
    S: NoteStore + DigestStore,
{
    let period_start = now - range.window();
    let notes: Vec<Note> = store
        .list_notes_for_digest(owner, period_start, now)?
        .into_iter()
        .filter(|note| !note.is_sensitive && !note.content_encrypted)
        .collect();
    if notes.is_empty() {
        tracing::info!(owner = %owner, range = %range, "no notes for digest period");
        return Ok(None);
    }

    let summary = summarizer.summarize(
        &notes,
        &SummaryOptions {
            max_bullets: range.max_bullets(),
        },
    )?;
    let digest = store.insert_digest(&NewDigest {
        owner_id: *owner,
        range,
        summary: summary.summary,
        themes: summary.themes,
        source_note_ids: notes.iter().map(|note| note.id).collect(),
        period_start,
        period_end: now,
    })?;

    tracing::info!(
        digest_id = %digest.id,
        owner = %owner,
        range = %range,
        note_count = notes.len(),
        "digest generated"
    );
    Ok(Some(digest))
}
