//! Pluggable note summarization.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::{Note, Theme};

/// Summary returned when there is nothing to summarize.
pub const EMPTY_SUMMARY: &str = "No notes to summarize.";

const MIN_SENTENCE_CHARS: usize = 20;
const MIN_THEME_WORD_CHARS: usize = 4;
const MAX_THEMES: usize = 5;

const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "also", "because", "been", "before", "being",
    "below", "between", "both", "could", "does", "doing", "down", "during", "each", "from",
    "further", "have", "having", "here", "hers", "herself", "himself", "into", "itself", "just",
    "more", "most", "myself", "once", "only", "other", "ours", "ourselves", "over", "same",
    "should", "some", "such", "than", "that", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "under", "until", "very", "was",
    "were", "what", "when", "where", "which", "while", "whom", "will", "with", "would", "your",
    "yours", "yourself", "yourselves",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    pub max_bullets: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self { max_bullets: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub summary: String,
    pub themes: Vec<Theme>,
}

/// Turns a set of notes into a short summary and recurring themes.
///
/// Implementations only ever receive non-sensitive notes.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, notes: &[Note], options: &SummaryOptions) -> Result<Summary>;
}

/// Frequency-based summarizer that needs no network access.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSummarizer;

impl LocalSummarizer {
    pub fn new() -> Self {
        Self
    }
}

fn sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().map_or(true, |next| next.is_whitespace());
        if at_boundary {
            sentences.push(current.trim().to_string());
            current.clear();
        }
    }
    if !current.trim().is_empty() {
        sentences.push(current.trim().to_string());
    }
    sentences
}

fn themes(notes: &[Note]) -> Vec<Theme> {
    // word -> (count, first position)
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut position = 0;
    for note in notes {
        let text = note.content.as_deref().unwrap_or_default().to_lowercase();
        for word in text.split(|c: char| !c.is_alphanumeric()) {
            if word.chars().count() < MIN_THEME_WORD_CHARS || STOP_WORDS.contains(&word) {
                continue;
            }
            counts.entry(word.to_string()).or_insert((0, position)).0 += 1;
            position += 1;
        }
    }

    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked
        .into_iter()
        .take(MAX_THEMES)
        .map(|(keyword, (count, _))| Theme { keyword, count })
        .collect()
}

impl Summarizer for LocalSummarizer {
    fn summarize(&self, notes: &[Note], options: &SummaryOptions) -> Result<Summary> {
        if notes.is_empty() {
            return Ok(Summary {
                summary: EMPTY_SUMMARY.to_string(),
                themes: Vec::new(),
            });
        }

        let joined = notes
            .iter()
            .map(|note| note.content.as_deref().unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" ");
        let summary = sentences(&joined)
            .into_iter()
            .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
            .take(options.max_bullets)
            .map(|s| format!("• {}", s))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Summary {
            summary,
            themes: themes(notes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn note(content: &str) -> Note {
        let now = Utc::now();
        Note {
            id: Uuid::now_v7(),
            owner_id: Uuid::nil(),
            title: None,
            content: Some(content.to_string()),
            is_sensitive: false,
            content_encrypted: false,
            encryption_meta: None,
            sensitive_keywords: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_notes() {
        let summary = LocalSummarizer::new()
            .summarize(&[], &SummaryOptions::default())
            .unwrap();
        assert_eq!(summary.summary, EMPTY_SUMMARY);
        assert!(summary.themes.is_empty());
    }

    #[test]
    fn test_short_sentences_skipped_and_bullets_capped() {
        let notes = vec![
            note("Short one. The garden needs watering every morning now."),
            note("Finished reading the book about rivers! Called the plumber about the leak."),
        ];
        let summary = LocalSummarizer::new()
            .summarize(&notes, &SummaryOptions { max_bullets: 2 })
            .unwrap();
        assert_eq!(
            summary.summary,
            "• The garden needs watering every morning now.\n• Finished reading the book about rivers!"
        );
    }

    #[test]
    fn test_themes_ranked_by_frequency() {
        let notes = vec![
            note("garden garden roses"),
            note("the garden and the roses with water"),
        ];
        let summary = LocalSummarizer::new()
            .summarize(&notes, &SummaryOptions::default())
            .unwrap();
        assert_eq!(
            summary.themes,
            vec![
                Theme {
                    keyword: "garden".to_string(),
                    count: 3
                },
                Theme {
                    keyword: "roses".to_string(),
                    count: 2
                },
                Theme {
                    keyword: "water".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_sentence_split_keeps_decimals() {
        assert_eq!(
            sentences("Paid 3.50 for coffee today. Then home"),
            vec!["Paid 3.50 for coffee today.".to_string(), "Then home".to_string()]
        );
    }
}
