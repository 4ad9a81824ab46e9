// Verdict types — the structured output of evaluating one piece of text.
//
// A ModerationVerdict is created fresh per evaluate() call and never mutated
// afterwards. Callers attach it to a Post at creation time, where it becomes
// part of that post's permanent history.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Coarse severity bucket derived from the worst-offending category score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Determine the severity from the maximum category score.
    ///
    /// NaN fails both comparisons and falls through to Low.
    pub fn from_score(max_score: f64) -> Self {
        if max_score > 0.8 {
            Severity::High
        } else if max_score > 0.5 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => anyhow::bail!("Unknown severity: {other}"),
        }
    }
}

/// Raw per-category scores as emitted by a classifier.
///
/// Order is preserved: when several categories tie at the maximum score, the
/// verdict's reason string lists them in the classifier's original label
/// order, so this is a Vec rather than a map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryScores {
    entries: Vec<(String, f64)>,
}

impl CategoryScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a category score, keeping insertion order.
    pub fn push(&mut self, category: impl Into<String>, score: f64) {
        self.entries.push((category.into(), score));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(c, s)| (c.as_str(), *s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The maximum score across all categories, or 0.0 when empty.
    /// NaN entries are ignored (f64::max skips NaN).
    pub fn max_score(&self) -> f64 {
        self.entries.iter().fold(0.0, |acc, (_, s)| acc.max(*s))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for CategoryScores {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(c, s)| (c.into(), s)).collect(),
        }
    }
}

/// The result of moderating one piece of text.
///
/// Invariants (enforced by `normalize`, which is the only constructor used
/// outside tests):
/// - `categories` and `category_scores` share the same key set
/// - `flagged` iff at least one category is true
/// - `severity` is `Severity::from_score(max score)`
/// - `confidence` is the max score when flagged, 1 - max score otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationVerdict {
    pub flagged: bool,
    /// Human-readable summary of which categories triggered; None when clean.
    pub reason: Option<String>,
    pub severity: Severity,
    /// Confidence in the verdict itself: how toxic when flagged, how clean
    /// when not. Always in [0, 1].
    pub confidence: f64,
    pub categories: BTreeMap<String, bool>,
    pub category_scores: BTreeMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_boundaries() {
        assert_eq!(Severity::from_score(0.0), Severity::Low);
        assert_eq!(Severity::from_score(0.5), Severity::Low);
        assert_eq!(Severity::from_score(0.51), Severity::Medium);
        assert_eq!(Severity::from_score(0.8), Severity::Medium);
        assert_eq!(Severity::from_score(0.81), Severity::High);
        assert_eq!(Severity::from_score(1.0), Severity::High);
    }

    #[test]
    fn test_severity_nan_falls_to_low() {
        assert_eq!(Severity::from_score(f64::NAN), Severity::Low);
    }

    #[test]
    fn test_severity_round_trip() {
        for severity in [Severity::Low, Severity::Medium, Severity::High] {
            let parsed: Severity = severity.as_str().parse().unwrap();
            assert_eq!(parsed, severity);
        }
    }

    #[test]
    fn test_max_score_empty_is_zero() {
        assert_eq!(CategoryScores::new().max_score(), 0.0);
    }

    #[test]
    fn test_max_score_ignores_nan() {
        let scores: CategoryScores = [("a", 0.4), ("b", f64::NAN)].into_iter().collect();
        assert_eq!(scores.max_score(), 0.4);
    }

    #[test]
    fn test_category_scores_preserve_order() {
        let scores: CategoryScores = [("zebra", 0.1), ("apple", 0.2)].into_iter().collect();
        let order: Vec<&str> = scores.iter().map(|(c, _)| c).collect();
        assert_eq!(order, vec!["zebra", "apple"]);
    }
}
