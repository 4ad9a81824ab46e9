// Unit tests for verdict normalization.
//
// Exercises the pure function at the heart of the pipeline: per-category
// threshold flagging, severity derivation, confidence derivation, and
// reason-string ordering.

use gatepost::moderation::normalize;
use gatepost::moderation::traits::DEFAULT_FLAG_THRESHOLD;
use gatepost::moderation::verdict::{CategoryScores, Severity};

fn default_threshold(_category: &str) -> f64 {
    DEFAULT_FLAG_THRESHOLD
}

// ============================================================
// Flagging — flagged iff any score exceeds its threshold
// ============================================================

#[test]
fn all_scores_below_threshold_is_clean() {
    let scores: CategoryScores = [("harassment", 0.1), ("hate", 0.05)].into_iter().collect();
    let verdict = normalize(&scores, default_threshold);

    assert!(!verdict.flagged);
    assert_eq!(verdict.reason, None);
    assert!(verdict.categories.values().all(|&triggered| !triggered));
}

#[test]
fn single_score_above_threshold_flags() {
    let scores: CategoryScores = [("harassment", 0.6), ("hate", 0.1)].into_iter().collect();
    let verdict = normalize(&scores, default_threshold);

    assert!(verdict.flagged);
    assert_eq!(verdict.categories.get("harassment"), Some(&true));
    assert_eq!(verdict.categories.get("hate"), Some(&false));
}

#[test]
fn score_exactly_at_threshold_does_not_flag() {
    // Strictly greater-than: 0.5 with a 0.5 threshold stays clean
    let scores: CategoryScores = [("hate", 0.5)].into_iter().collect();
    let verdict = normalize(&scores, default_threshold);
    assert!(!verdict.flagged);
}

#[test]
fn per_category_threshold_is_respected() {
    let scores: CategoryScores = [("sexual", 0.3), ("violence", 0.3)].into_iter().collect();
    // A stricter threshold for one category only
    let verdict = normalize(&scores, |c| if c == "sexual" { 0.2 } else { 0.5 });

    assert!(verdict.flagged);
    assert_eq!(verdict.categories.get("sexual"), Some(&true));
    assert_eq!(verdict.categories.get("violence"), Some(&false));
}

#[test]
fn flagged_matches_triggered_categories() {
    let cases: Vec<CategoryScores> = vec![
        [("a", 0.0), ("b", 0.0)].into_iter().collect(),
        [("a", 0.51)].into_iter().collect(),
        [("a", 0.49), ("b", 0.99)].into_iter().collect(),
        CategoryScores::new(),
    ];
    for scores in cases {
        let verdict = normalize(&scores, default_threshold);
        let any_triggered = verdict.categories.values().any(|&t| t);
        assert_eq!(verdict.flagged, any_triggered);
    }
}

// ============================================================
// Severity — pure function of the maximum score
// ============================================================

#[test]
fn severity_tracks_max_score() {
    let low: CategoryScores = [("a", 0.2), ("b", 0.5)].into_iter().collect();
    let medium: CategoryScores = [("a", 0.2), ("b", 0.7)].into_iter().collect();
    let high: CategoryScores = [("a", 0.2), ("b", 0.9)].into_iter().collect();

    assert_eq!(normalize(&low, default_threshold).severity, Severity::Low);
    assert_eq!(normalize(&medium, default_threshold).severity, Severity::Medium);
    assert_eq!(normalize(&high, default_threshold).severity, Severity::High);
}

#[test]
fn severity_ignores_which_category_is_worst() {
    let a: CategoryScores = [("harassment", 0.9), ("hate", 0.1)].into_iter().collect();
    let b: CategoryScores = [("harassment", 0.1), ("hate", 0.9)].into_iter().collect();
    assert_eq!(
        normalize(&a, default_threshold).severity,
        normalize(&b, default_threshold).severity
    );
}

// ============================================================
// Confidence — derived, always in [0, 1]
// ============================================================

#[test]
fn confidence_is_max_score_when_flagged() {
    let scores: CategoryScores = [("harassment", 0.85), ("hate", 0.3)].into_iter().collect();
    let verdict = normalize(&scores, default_threshold);
    assert!(verdict.flagged);
    assert_eq!(verdict.confidence, 0.85);
}

#[test]
fn confidence_is_complement_when_clean() {
    let scores: CategoryScores = [("harassment", 0.1)].into_iter().collect();
    let verdict = normalize(&scores, default_threshold);
    assert!(!verdict.flagged);
    assert!((verdict.confidence - 0.9).abs() < 1e-10);
}

#[test]
fn confidence_stays_in_unit_interval() {
    let cases: Vec<CategoryScores> = vec![
        CategoryScores::new(),
        [("a", 0.0)].into_iter().collect(),
        [("a", 1.0)].into_iter().collect(),
        [("a", 0.5), ("b", 0.5)].into_iter().collect(),
    ];
    for scores in cases {
        let verdict = normalize(&scores, default_threshold);
        assert!(
            (0.0..=1.0).contains(&verdict.confidence),
            "confidence {} out of range",
            verdict.confidence
        );
    }
}

#[test]
fn empty_scores_normalize_to_confident_clean() {
    let verdict = normalize(&CategoryScores::new(), default_threshold);
    assert!(!verdict.flagged);
    assert_eq!(verdict.severity, Severity::Low);
    assert_eq!(verdict.confidence, 1.0);
    assert!(verdict.categories.is_empty());
    assert!(verdict.category_scores.is_empty());
}

// ============================================================
// Reason — triggered categories in original label order
// ============================================================

#[test]
fn reason_names_only_triggered_categories() {
    let scores: CategoryScores = [("harassment", 0.85), ("hate", 0.3)].into_iter().collect();
    let verdict = normalize(&scores, default_threshold);

    let reason = verdict.reason.unwrap();
    assert_eq!(reason, "Content flagged for: harassment");
    assert!(!reason.contains("hate"));
}

#[test]
fn tied_categories_all_appear_in_label_order() {
    // "violence" comes before "harassment" in this classifier's label order,
    // so the reason must list it first even though it sorts later
    // alphabetically.
    let scores: CategoryScores = [("violence", 0.9), ("harassment", 0.9), ("hate", 0.1)]
        .into_iter()
        .collect();
    let verdict = normalize(&scores, default_threshold);

    assert_eq!(
        verdict.reason.as_deref(),
        Some("Content flagged for: violence, harassment")
    );
}

// ============================================================
// Verdict maps — key-set invariant
// ============================================================

#[test]
fn categories_and_scores_share_a_key_set() {
    let scores: CategoryScores = [("a", 0.9), ("b", 0.2), ("c", 0.6)].into_iter().collect();
    let verdict = normalize(&scores, default_threshold);

    let category_keys: Vec<&String> = verdict.categories.keys().collect();
    let score_keys: Vec<&String> = verdict.category_scores.keys().collect();
    assert_eq!(category_keys, score_keys);
    assert_eq!(category_keys.len(), 3);
}

#[test]
fn verdict_serializes_camel_case() {
    let scores: CategoryScores = [("hate", 0.95)].into_iter().collect();
    let verdict = normalize(&scores, default_threshold);

    let json = serde_json::to_value(&verdict).unwrap();
    assert_eq!(json["flagged"], true);
    assert_eq!(json["severity"], "high");
    assert!(json.get("categoryScores").is_some());
    assert!(json.get("category_scores").is_none());
}
