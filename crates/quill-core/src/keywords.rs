//! Sensitive-content keyword detection.
//!
//! The same detector backs the advisory check a client runs before saving
//! and the enforcement gate in [`crate::policy`]. Both sides must see the
//! same keyword list, so the list is versioned and lives here only.

use serde::{Deserialize, Serialize};

/// Version of [`DEFAULT_KEYWORDS`]. Bump whenever the list changes.
pub const KEYWORD_LIST_VERSION: u32 = 1;

/// Built-in sensitive-topic keywords (lowercase, order is significant).
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "password",
    "passcode",
    "pin",
    "ssn",
    "social security",
    "credit card",
    "debit card",
    "bank account",
    "account number",
    "routing number",
    "medical",
    "diagnosis",
    "hiv",
    "cancer",
    "salary",
    "income",
    "tax",
    "bitcoin",
    "private key",
    "seed phrase",
    "mnemonic",
    "secret key",
    "api key",
    "access token",
];

/// Outcome of a keyword scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub is_sensitive: bool,
    /// Matched keywords in keyword-list order, without duplicates
    pub matches: Vec<String>,
}

/// Case-insensitive substring detector over the built-in list plus extras.
#[derive(Debug, Clone)]
pub struct KeywordDetector {
    keywords: Vec<String>,
}

impl Default for KeywordDetector {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl KeywordDetector {
    /// Detector over the built-in list only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Detector over the built-in list followed by caller-supplied keywords.
    ///
    /// Extras are trimmed and lowercased; blanks and duplicates are dropped.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut detector = Self::default();
        for keyword in extra {
            let normalized = keyword.as_ref().trim().to_lowercase();
            if normalized.is_empty() || detector.keywords.contains(&normalized) {
                continue;
            }
            detector.keywords.push(normalized);
        }
        detector
    }

    /// Keywords this detector matches against, in match order.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Scan `text` for sensitive keywords.
    ///
    /// Matching is case-insensitive substring containment. Matches come back
    /// lowercase, in keyword-list order, each at most once. Empty text is
    /// never sensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_core::KeywordDetector;
    ///
    /// let detection = KeywordDetector::new().detect("New SALARY and my password");
    /// assert!(detection.is_sensitive);
    /// assert_eq!(detection.matches, vec!["password", "salary"]);
    ///
    /// assert!(!KeywordDetector::new().detect("walk the dog").is_sensitive);
    /// ```
    pub fn detect(&self, text: &str) -> Detection {
        if text.is_empty() {
            return Detection::default();
        }

        let haystack = text.to_lowercase();
        let matches: Vec<String> = self
            .keywords
            .iter()
            .filter(|keyword| haystack.contains(keyword.as_str()))
            .cloned()
            .collect();

        Detection {
            is_sensitive: !matches.is_empty(),
            matches,
        }
    }
}

/// Scan `text` against the built-in keyword list.
pub fn detect(text: &str) -> Detection {
    KeywordDetector::default().detect(text)
}

/// Scan optional text (absent content is never sensitive).
pub fn detect_optional(text: Option<&str>) -> Detection {
    text.map(detect).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_not_sensitive() {
        assert_eq!(detect(""), Detection::default());
        assert_eq!(detect_optional(None), Detection::default());
    }

    #[test]
    fn test_case_insensitive_and_deduplicated() {
        let detection = detect("my SSN and ssn");
        assert!(detection.is_sensitive);
        assert_eq!(detection.matches, vec!["ssn".to_string()]);
    }

    #[test]
    fn test_multi_word_matches_keep_list_order() {
        let detection = detect("my bank account number is 12345");
        assert_eq!(
            detection.matches,
            vec!["bank account".to_string(), "account number".to_string()]
        );
    }

    #[test]
    fn test_detection_is_deterministic() {
        let text = "Diagnosis came back; cancer screening and tax forms next";
        assert_eq!(detect(text), detect(text));
        assert_eq!(detect(text).matches, vec!["diagnosis", "cancer", "tax"]);
    }

    #[test]
    fn test_clean_text_not_sensitive() {
        let detection = detect("Remember to water the ferns");
        assert!(!detection.is_sensitive);
        assert!(detection.matches.is_empty());
    }

    #[test]
    fn test_substring_matching_is_literal() {
        // "pin" is contained in "shopping"
        assert_eq!(detect("shopping list").matches, vec!["pin"]);
    }

    #[test]
    fn test_extra_keywords_normalized_and_appended() {
        let detector = KeywordDetector::with_extra(["  Locker Code ", "", "PASSWORD"]);
        assert_eq!(detector.keywords().len(), DEFAULT_KEYWORDS.len() + 1);

        let detection = detector.detect("The LOCKER CODE and password");
        assert_eq!(detection.matches, vec!["password", "locker code"]);
    }

    #[test]
    fn test_default_list_is_lowercase_and_unique() {
        for (i, keyword) in DEFAULT_KEYWORDS.iter().enumerate() {
            assert_eq!(*keyword, keyword.to_lowercase());
            assert!(!DEFAULT_KEYWORDS[i + 1..].contains(keyword));
        }
    }
}
