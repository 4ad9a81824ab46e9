// Moderation decision pipeline.
//
// Turns a raw classification (remote API, local ONNX model, or the keyword
// fallback) into a normalized, severity-ranked ModerationVerdict. The
// classifier chain is ordered and first-success-wins: the configured primary
// runs under a timeout, and any failure degrades to the keyword fallback
// rather than propagating — evaluate() never fails.

pub mod download;
pub mod keywords;
pub mod lazy;
pub mod onnx;
pub mod openai;
pub mod rate_limiter;
pub mod traits;
pub mod verdict;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use tokio::time::Duration;
use tracing::{debug, warn};

use crate::config::{ClassifierBackend, Config};
use keywords::KeywordClassifier;
use lazy::LazyClassifier;
use onnx::OnnxClassifier;
use openai::OpenAiClassifier;
use traits::Classifier;
use verdict::{CategoryScores, ModerationVerdict, Severity};

/// The moderation pipeline. Stateless per call; the only shared resource is
/// the (possibly lazily-initialized) primary classifier handle, so a single
/// pipeline instance is shared across all concurrent evaluations.
pub struct ModerationPipeline {
    primary: Option<Arc<dyn Classifier>>,
    fallback: KeywordClassifier,
    timeout: Duration,
}

impl ModerationPipeline {
    /// Build a pipeline with an explicit primary classifier. `None` runs
    /// fallback-only, which is also what tests use for determinism.
    pub fn new(primary: Option<Arc<dyn Classifier>>, timeout: Duration) -> Self {
        Self {
            primary,
            fallback: KeywordClassifier::new(),
            timeout,
        }
    }

    /// Build the pipeline for the configured backend.
    ///
    /// Construction never fails: a misconfigured backend (missing API key,
    /// missing model files) shows up as a classifier error at evaluation
    /// time and degrades to the fallback.
    pub fn from_config(config: &Config) -> Self {
        let timeout = Duration::from_secs(config.classifier_timeout_secs);

        let primary: Option<Arc<dyn Classifier>> = match config.classifier_backend {
            ClassifierBackend::OpenAi => {
                Some(Arc::new(OpenAiClassifier::new(config.openai_api_key.clone())))
            }
            ClassifierBackend::Onnx => {
                let model_dir = config.model_dir.clone();
                Some(Arc::new(LazyClassifier::new(move || {
                    let model_dir = model_dir.clone();
                    async move {
                        // Model loading is CPU- and IO-heavy; keep it off
                        // the async runtime.
                        let classifier =
                            tokio::task::spawn_blocking(move || OnnxClassifier::load(&model_dir))
                                .await
                                .context("spawn_blocking panicked")??;
                        Ok(Arc::new(classifier) as Arc<dyn Classifier>)
                    }
                })))
            }
        };

        Self::new(primary, timeout)
    }

    /// Evaluate a text and return its verdict. Never fails: primary
    /// classifier errors and timeouts are logged and answered by the
    /// keyword fallback, which is pure string matching.
    ///
    /// Empty input is still sent to the classifier — an empty text is a
    /// valid (clean) input, not an error.
    pub async fn evaluate(&self, text: &str) -> ModerationVerdict {
        if let Some(primary) = &self.primary {
            match tokio::time::timeout(self.timeout, primary.classify(text)).await {
                Ok(Ok(scores)) => {
                    debug!(categories = scores.len(), "Primary classifier succeeded");
                    return normalize(&scores, |c| primary.flag_threshold(c));
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "Primary classifier failed, using keyword fallback");
                }
                Err(_) => {
                    warn!(
                        timeout_secs = self.timeout.as_secs(),
                        "Primary classifier timed out, using keyword fallback"
                    );
                }
            }
        }

        let scores = self.fallback.scan(text);
        normalize(&scores, |c| self.fallback.flag_threshold(c))
    }
}

/// Normalize raw classifier scores into a verdict.
///
/// This is the one place verdict invariants are established: the severity
/// and confidence are derived from the scores, `flagged` from the per-
/// category thresholds, and the reason string lists triggered categories in
/// the classifier's original label order.
pub fn normalize(
    scores: &CategoryScores,
    threshold_for: impl Fn(&str) -> f64,
) -> ModerationVerdict {
    let max_score = scores.max_score();

    let triggered: Vec<&str> = scores
        .iter()
        .filter(|&(category, score)| score > threshold_for(category))
        .map(|(category, _)| category)
        .collect();
    let flagged = !triggered.is_empty();

    let confidence = if flagged { max_score } else { 1.0 - max_score };

    let reason = flagged.then(|| format!("Content flagged for: {}", triggered.join(", ")));

    let mut categories = BTreeMap::new();
    let mut category_scores = BTreeMap::new();
    for (category, score) in scores.iter() {
        categories.insert(category.to_string(), triggered.contains(&category));
        category_scores.insert(category.to_string(), score);
    }

    ModerationVerdict {
        flagged,
        reason,
        severity: Severity::from_score(max_score),
        confidence: confidence.clamp(0.0, 1.0),
        categories,
        category_scores,
    }
}
