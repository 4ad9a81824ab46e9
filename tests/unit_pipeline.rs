// Pipeline tests — classifier chain, fallback cascade, and determinism.
//
// Mock classifiers stand in for the remote API and local model so every
// test runs without network, model files, or timing dependence (except the
// timeout test, which uses a deliberately slow mock).

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use gatepost::moderation::traits::Classifier;
use gatepost::moderation::verdict::{CategoryScores, Severity};
use gatepost::moderation::ModerationPipeline;

/// Returns fixed scores regardless of input.
struct FixedClassifier(Vec<(&'static str, f64)>);

#[async_trait]
impl Classifier for FixedClassifier {
    async fn classify(&self, _text: &str) -> Result<CategoryScores> {
        Ok(self.0.iter().map(|&(c, s)| (c, s)).collect())
    }
}

/// Always fails — simulates network errors, auth failures, missing models.
struct FailingClassifier;

#[async_trait]
impl Classifier for FailingClassifier {
    async fn classify(&self, _text: &str) -> Result<CategoryScores> {
        anyhow::bail!("connection refused")
    }
}

/// Never answers within any reasonable timeout.
struct SlowClassifier;

#[async_trait]
impl Classifier for SlowClassifier {
    async fn classify(&self, _text: &str) -> Result<CategoryScores> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(CategoryScores::new())
    }
}

fn pipeline_with(primary: impl Classifier + 'static) -> ModerationPipeline {
    ModerationPipeline::new(Some(Arc::new(primary)), Duration::from_secs(5))
}

fn fallback_only() -> ModerationPipeline {
    ModerationPipeline::new(None, Duration::from_secs(5))
}

// ============================================================
// Primary classifier path
// ============================================================

#[tokio::test]
async fn benign_text_with_low_scores_is_approved() {
    let pipeline = pipeline_with(FixedClassifier(vec![
        ("harassment", 0.05),
        ("hate", 0.1),
        ("violence", 0.02),
    ]));

    let verdict = pipeline.evaluate("I love sunny days").await;

    assert!(!verdict.flagged);
    assert_eq!(verdict.severity, Severity::Low);
    assert!(verdict.confidence >= 0.9);
}

#[tokio::test]
async fn harassment_dominates_the_verdict() {
    let pipeline = pipeline_with(FixedClassifier(vec![("harassment", 0.85), ("hate", 0.3)]));

    let verdict = pipeline.evaluate("some text").await;

    assert!(verdict.flagged);
    assert_eq!(verdict.severity, Severity::High);
    assert_eq!(verdict.confidence, 0.85);
    let reason = verdict.reason.unwrap();
    assert!(reason.contains("harassment"));
    assert!(!reason.contains("hate"));
}

#[tokio::test]
async fn evaluate_is_deterministic_for_a_fixed_classifier() {
    let pipeline = pipeline_with(FixedClassifier(vec![("harassment", 0.6), ("hate", 0.2)]));

    let first = pipeline.evaluate("identical text").await;
    let second = pipeline.evaluate("identical text").await;
    assert_eq!(first, second);
}

// ============================================================
// Fallback cascade
// ============================================================

#[tokio::test]
async fn failing_primary_yields_exactly_the_fallback_verdict() {
    let with_broken_primary = pipeline_with(FailingClassifier);
    let keyword_only = fallback_only();

    for text in ["I love sunny days", "you are stupid and I will kill you", ""] {
        let degraded = with_broken_primary.evaluate(text).await;
        let fallback = keyword_only.evaluate(text).await;
        assert_eq!(degraded, fallback, "no partial blending for {text:?}");
    }
}

#[tokio::test]
async fn offensive_text_with_primary_down_is_flagged_high() {
    let pipeline = pipeline_with(FailingClassifier);

    let verdict = pipeline.evaluate("you are stupid and I will kill you").await;

    assert!(verdict.flagged);
    assert_eq!(verdict.severity, Severity::High);
    assert_eq!(verdict.confidence, 0.95);
    assert_eq!(verdict.categories.get("hate"), Some(&true));
}

#[tokio::test]
async fn empty_string_with_primary_down_is_clean() {
    let pipeline = pipeline_with(FailingClassifier);

    let verdict = pipeline.evaluate("").await;

    assert!(!verdict.flagged);
    assert_eq!(verdict.severity, Severity::Low);
    assert!((verdict.confidence - 0.8).abs() < 1e-10);
    assert_eq!(verdict.categories.get("hate"), Some(&false));
}

#[tokio::test]
async fn fallback_only_pipeline_reports_single_hate_category() {
    let pipeline = fallback_only();

    let verdict = pipeline.evaluate("what a wonderful day").await;

    assert_eq!(verdict.categories.len(), 1);
    assert_eq!(verdict.category_scores.len(), 1);
    assert!(verdict.categories.contains_key("hate"));
}

#[tokio::test]
async fn slow_primary_times_out_to_fallback() {
    let pipeline = ModerationPipeline::new(
        Some(Arc::new(SlowClassifier)),
        Duration::from_millis(50),
    );

    let verdict = pipeline.evaluate("you idiot").await;

    // The fallback answered: single hate category, keyword match
    assert!(verdict.flagged);
    assert_eq!(verdict.confidence, 0.95);
    assert_eq!(verdict.categories.len(), 1);
}

#[tokio::test]
async fn fallback_verdicts_are_idempotent() {
    let pipeline = fallback_only();
    let first = pipeline.evaluate("you idiot").await;
    let second = pipeline.evaluate("you idiot").await;
    assert_eq!(first, second);
}
