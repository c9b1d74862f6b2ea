//! Watched-keyword detection for the `specific_keywords` condition.
//!
//! Patterns are regular expressions compiled once into a [`RegexSet`];
//! a match reports the pattern string so it can be fed straight into
//! [`ConversationFacts::matched_keywords`](crate::models::conversation::ConversationFacts).

use std::collections::BTreeSet;

use regex::{RegexSet, RegexSetBuilder};

/// Pre-compiled keyword patterns.
#[derive(Debug, Clone)]
pub struct KeywordDetector {
    set: RegexSet,
    patterns: Vec<String>,
}

impl KeywordDetector {
    /// Compile `patterns` case-insensitively.
    ///
    /// Invalid patterns are skipped with a tracing warning.
    #[must_use]
    pub fn new(patterns: &[String]) -> Self {
        let valid: Vec<String> = patterns
            .iter()
            .filter(|p| {
                let ok = regex::Regex::new(p).is_ok();
                if !ok {
                    tracing::warn!(pattern = %p, "invalid keyword pattern, skipping");
                }
                ok
            })
            .cloned()
            .collect();

        let set = RegexSetBuilder::new(&valid)
            .case_insensitive(true)
            .build()
            .unwrap_or_else(|_| RegexSet::empty());

        Self {
            set,
            patterns: valid,
        }
    }

    /// Detector that never matches.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            set: RegexSet::empty(),
            patterns: Vec::new(),
        }
    }

    /// Number of active patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether no pattern is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns matching `text`.
    #[must_use]
    pub fn detect(&self, text: &str) -> BTreeSet<String> {
        self.set
            .matches(text)
            .into_iter()
            .map(|idx| self.patterns[idx].clone())
            .collect()
    }
}

impl Default for KeywordDetector {
    fn default() -> Self {
        Self::empty()
    }
}
