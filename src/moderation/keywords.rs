// Keyword fallback classifier — deterministic, dependency-free.
//
// Used when the primary classifier is unavailable. A case-insensitive
// substring match against a fixed term list scores the text 0.95 in a single
// `hate` category (normalizes to flagged / high / confidence 0.95). No match
// scores 0.2 (normalizes to clean / low / confidence 0.8). Pure string
// matching — this classifier cannot fail.

use anyhow::Result;
use async_trait::async_trait;

use super::traits::Classifier;
use super::verdict::CategoryScores;

/// Terms that flag a text outright when the primary classifier is down.
/// Deliberately small: the fallback errs on the side of catching the obvious
/// cases rather than competing with the real classifiers.
const OFFENSIVE_TERMS: [&str; 4] = ["hate", "stupid", "kill", "idiot"];

/// The single category the fallback reports on.
pub const FALLBACK_CATEGORY: &str = "hate";

/// Score assigned when a term matches.
pub const MATCH_SCORE: f64 = 0.95;

/// Score assigned when nothing matches. Chosen so the negative verdict's
/// confidence (1 - score) comes out at 0.8.
pub const NO_MATCH_SCORE: f64 = 0.2;

/// Deterministic keyword classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Scan the text against the term list. Infallible, unlike the trait's
    /// `classify` — the pipeline leans on this to guarantee that evaluation
    /// always produces a verdict.
    pub fn scan(&self, text: &str) -> CategoryScores {
        let lower = text.to_lowercase();
        let matched = OFFENSIVE_TERMS.iter().any(|term| lower.contains(term));

        let score = if matched { MATCH_SCORE } else { NO_MATCH_SCORE };
        [(FALLBACK_CATEGORY, score)].into_iter().collect()
    }
}

#[async_trait]
impl Classifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> Result<CategoryScores> {
        Ok(self.scan(text))
    }
}
