//! Storage limits and keyword normalization.

use crate::error::{QuillError, Result};

pub const MAX_TITLE_BYTES: usize = 512;
pub const MAX_CONTENT_BYTES: usize = 1024 * 1024;
pub const MAX_KEYWORDS_PER_NOTE: usize = 64;
const MAX_KEYWORD_BYTES: usize = 128;

pub fn validate_title(title: Option<&str>) -> Result<()> {
    match title {
        Some(title) if title.len() > MAX_TITLE_BYTES => Err(QuillError::Validation(format!(
            "Title too long (max {} bytes)",
            MAX_TITLE_BYTES
        ))),
        _ => Ok(()),
    }
}

pub fn validate_content(content: Option<&str>) -> Result<()> {
    match content {
        Some(content) if content.len() > MAX_CONTENT_BYTES => Err(QuillError::Validation(
            format!("Note content too large (max {} bytes)", MAX_CONTENT_BYTES),
        )),
        _ => Ok(()),
    }
}

/// Lowercase, trim and de-duplicate stored keyword matches, keeping order.
pub fn normalize_keywords(keywords: &[String]) -> Result<Vec<String>> {
    if keywords.len() > MAX_KEYWORDS_PER_NOTE {
        return Err(QuillError::Validation(format!(
            "Too many sensitive keywords (max {})",
            MAX_KEYWORDS_PER_NOTE
        )));
    }

    let mut normalized = Vec::new();
    for keyword in keywords {
        let trimmed = keyword.trim().to_lowercase();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.len() > MAX_KEYWORD_BYTES {
            return Err(QuillError::Validation(format!(
                "Sensitive keyword too long (max {} bytes)",
                MAX_KEYWORD_BYTES
            )));
        }
        if !normalized.contains(&trimmed) {
            normalized.push(trimmed);
        }
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_limit() {
        assert!(validate_title(None).is_ok());
        assert!(validate_title(Some(&"a".repeat(MAX_TITLE_BYTES))).is_ok());
        assert!(validate_title(Some(&"a".repeat(MAX_TITLE_BYTES + 1))).is_err());
    }

    #[test]
    fn test_content_limit() {
        assert!(validate_content(Some(&"x".repeat(MAX_CONTENT_BYTES + 1))).is_err());
        assert!(validate_content(Some("")).is_ok());
    }

    #[test]
    fn test_normalize_keywords() {
        let input = vec![
            " Password ".to_string(),
            "password".to_string(),
            "".to_string(),
            "SSN".to_string(),
        ];
        assert_eq!(
            normalize_keywords(&input).unwrap(),
            vec!["password".to_string(), "ssn".to_string()]
        );
    }

    #[test]
    fn test_too_many_keywords() {
        let input: Vec<String> = (0..=MAX_KEYWORDS_PER_NOTE).map(|i| format!("k{}", i)).collect();
        assert!(matches!(
            normalize_keywords(&input),
            Err(QuillError::Validation(_))
        ));
    }
}
