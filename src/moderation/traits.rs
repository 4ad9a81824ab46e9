// Classifier trait — the swap-ready abstraction.
//
// This trait defines the interface for content classifiers. The configured
// primary (remote OpenAI Moderation API or a local ONNX model) and the
// keyword fallback all implement it; the pipeline normalizes whatever scores
// come back, so callers never see which backend produced a verdict.

use anyhow::Result;
use async_trait::async_trait;

use super::verdict::CategoryScores;

/// Score above which a category counts as triggered, unless the classifier
/// overrides it for specific categories.
pub const DEFAULT_FLAG_THRESHOLD: f64 = 0.5;

/// Trait for classifying text into per-category scores. Implementations must
/// be async because most providers require HTTP API calls.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify a single text, returning scores in the classifier's own
    /// label order. Any failure (network, auth, malformed response, model
    /// not loaded) is an `Err` — the pipeline treats all of them uniformly
    /// as "classifier unavailable" and falls back.
    async fn classify(&self, text: &str) -> Result<CategoryScores>;

    /// The flag threshold for a given category. Scores strictly above this
    /// mark the category as triggered.
    fn flag_threshold(&self, _category: &str) -> f64 {
        DEFAULT_FLAG_THRESHOLD
    }
}
