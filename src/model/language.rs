use std::fmt;

use crate::error::{QaError, Result};

/// Default language tag used when none is configured.
pub const DEFAULT_LANGUAGE: &str = "@en";

/// Language tag, always stored with its leading `@` (e.g. `@en`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language(String);

impl Language {
    /// Create a tag; `en` and `@en` are equivalent.
    pub fn new(tag: &str) -> Self {
        let tag = tag.trim();
        if tag.starts_with('@') {
            Self(tag.to_string())
        } else {
            Self(format!("@{}", tag))
        }
    }

    pub fn tag(&self) -> &str {
        &self.0
    }

    /// Extract the display text of a raw language-tagged value.
    ///
    /// Returns `Ok(None)` when the value is tagged with another language and
    /// `LanguageFormat` when it carries no tag at all. Hyphens become spaces.
    pub fn filter_label(&self, raw: &str) -> Result<Option<String>> {
        let at = raw
            .rfind('@')
            .ok_or_else(|| QaError::LanguageFormat(raw.to_string()))?;
        if &raw[at..] != self.tag() {
            return Ok(None);
        }
        Ok(Some(raw[..at].replace('-', " ").trim().to_string()))
    }

    /// Value stored in the index for a label in this language.
    pub fn tagged(&self, text: &str) -> String {
        format!("{} {}", text, self.tag())
    }
}

impl Default for Language {
    fn default() -> Self {
        Self(DEFAULT_LANGUAGE.to_string())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_english() {
        assert_eq!(Language::default().tag(), "@en");
    }

    #[test]
    fn test_tag_normalization() {
        assert_eq!(Language::new("it").tag(), "@it");
        assert_eq!(Language::new(" @it ").tag(), "@it");
    }

    #[test]
    fn test_filter_label_keeps_matching_language() {
        let en = Language::default();
        assert_eq!(en.filter_label("Inception @en").unwrap().as_deref(), Some("Inception"));
        assert_eq!(en.filter_label("Inception@en").unwrap().as_deref(), Some("Inception"));
        assert_eq!(en.filter_label("Inception @it").unwrap(), None);
    }

    #[test]
    fn test_filter_label_replaces_hyphens_and_trims() {
        let en = Language::default();
        assert_eq!(
            en.filter_label("  Science-Fiction @en").unwrap().as_deref(),
            Some("Science Fiction")
        );
    }

    #[test]
    fn test_filter_label_uses_last_at_sign() {
        let en = Language::default();
        assert_eq!(en.filter_label("me@home @en").unwrap().as_deref(), Some("me@home"));
        assert_eq!(en.filter_label("x @en @fr").unwrap(), None);
    }

    #[test]
    fn test_filter_label_without_tag_fails() {
        let en = Language::default();
        assert!(matches!(en.filter_label("Inception"), Err(QaError::LanguageFormat(_))));
    }

    #[test]
    fn test_tagged_value() {
        assert_eq!(Language::default().tagged("Barack Obama"), "Barack Obama @en");
    }
}
