// Lazily-initialized classifier handle with single-flight semantics.
//
// Loading the ONNX model takes a noticeable amount of time and memory, so it
// happens on first use rather than at startup. tokio's OnceCell guarantees
// that concurrent first calls share one in-flight initialization: the first
// caller runs the factory, the rest await it, and everyone thereafter reuses
// the cached handle for the process lifetime.
//
// A failed initialization is NOT cached — the next call retries, so a model
// downloaded after startup becomes usable without a restart. The failing
// call itself surfaces an Err, which the pipeline turns into a fallback
// verdict like any other classifier failure.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use super::traits::{Classifier, DEFAULT_FLAG_THRESHOLD};
use super::verdict::CategoryScores;

type InitFuture = Pin<Box<dyn Future<Output = Result<Arc<dyn Classifier>>> + Send>>;

/// Wraps a classifier factory, deferring construction to the first
/// `classify` call.
pub struct LazyClassifier {
    cell: OnceCell<Arc<dyn Classifier>>,
    factory: Box<dyn Fn() -> InitFuture + Send + Sync>,
}

impl LazyClassifier {
    pub fn new<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Arc<dyn Classifier>>> + Send + 'static,
    {
        Self {
            cell: OnceCell::new(),
            factory: Box::new(move || Box::pin(factory())),
        }
    }

    async fn inner(&self) -> Result<&Arc<dyn Classifier>> {
        self.cell
            .get_or_try_init(|| {
                debug!("Initializing classifier");
                (self.factory)()
            })
            .await
    }
}

#[async_trait]
impl Classifier for LazyClassifier {
    async fn classify(&self, text: &str) -> Result<CategoryScores> {
        self.inner().await?.classify(text).await
    }

    fn flag_threshold(&self, category: &str) -> f64 {
        // Only consulted after a successful classify, at which point the
        // cell is populated. Before that, fall back to the default.
        match self.cell.get() {
            Some(inner) => inner.flag_threshold(category),
            None => DEFAULT_FLAG_THRESHOLD,
        }
    }
}
