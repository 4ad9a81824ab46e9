// Local ONNX classifier using Detoxify's unbiased-toxic-roberta model.
//
// Runs entirely on the local CPU — no API key, no rate limits, no network
// dependency once the model is downloaded. The model emits seven category
// logits which map to verdict categories after a sigmoid.
//
// Model: protectai/unbiased-toxic-roberta-onnx (quantized, ~126MB)

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::debug;

use super::traits::Classifier;
use super::verdict::CategoryScores;

/// Labels output by unbiased-toxic-roberta, in the order the model returns
/// them. These become the verdict's category names directly.
const LABEL_ORDER: [&str; 7] = [
    "toxicity",
    "severe_toxicity",
    "obscene",
    "identity_attack",
    "insult",
    "threat",
    "sexual_explicit",
];

/// Local ONNX classifier. Holds the model session and tokenizer behind
/// Arc<Mutex> so inference can be offloaded to spawn_blocking without
/// blocking the async runtime.
#[derive(Debug)]
pub struct OnnxClassifier {
    // Arc+Mutex because:
    // 1. ort::Session::run takes &mut self, so we need interior mutability
    // 2. spawn_blocking requires 'static, so we need Arc for shared ownership
    // 3. We need Send+Sync for the Classifier trait
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
}

impl OnnxClassifier {
    /// Load the ONNX model and tokenizer from the given directory.
    ///
    /// Expects `model_quantized.onnx` and `tokenizer.json` to exist in
    /// `model_dir`. Call `download::download_model()` first if they don't.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join("model_quantized.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() {
            anyhow::bail!(
                "Model file not found: {}\nRun `gatepost download-model` to download it.",
                model_path.display()
            );
        }
        if !tokenizer_path.exists() {
            anyhow::bail!(
                "Tokenizer file not found: {}\nRun `gatepost download-model` to download it.",
                tokenizer_path.display()
            );
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        debug!("Loaded ONNX toxicity model from {}", model_dir.display());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
        })
    }
}

#[async_trait]
impl Classifier for OnnxClassifier {
    /// Tokenize the text, run one forward pass, apply sigmoid to the seven
    /// logits, and return them as ordered category scores.
    ///
    /// The CPU-bound tokenization and inference run in spawn_blocking so
    /// they don't block the tokio async runtime.
    async fn classify(&self, text: &str) -> Result<CategoryScores> {
        // Clone Arc handles for the spawn_blocking closure ('static requirement)
        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let text = text.to_string();

        tokio::task::spawn_blocking(move || {
            let encoding = tokenizer
                .encode(text.as_str(), true)
                .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

            let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
            let attention_mask: Vec<i64> =
                encoding.get_attention_mask().iter().map(|&m| m as i64).collect();

            let shape = [1_i64, input_ids.len() as i64];

            let input_ids_tensor = Tensor::from_array((shape, input_ids))
                .context("Failed to create input_ids tensor")?;
            let attention_mask_tensor = Tensor::from_array((shape, attention_mask))
                .context("Failed to create attention_mask tensor")?;

            let logits = {
                let mut session = session
                    .lock()
                    .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

                let outputs = session
                    .run(ort::inputs! {
                        "input_ids" => input_ids_tensor,
                        "attention_mask" => attention_mask_tensor
                    })
                    .context("ONNX inference failed")?;

                // Output shape: [1, 7] — raw logits (pre-sigmoid)
                let (_out_shape, data) = outputs[0]
                    .try_extract_tensor::<f32>()
                    .context("Failed to extract output tensor")?;

                data.to_vec()
            };

            if logits.len() < LABEL_ORDER.len() {
                anyhow::bail!(
                    "Model returned {} logits, expected {}",
                    logits.len(),
                    LABEL_ORDER.len()
                );
            }

            let scores: CategoryScores = LABEL_ORDER
                .into_iter()
                .zip(logits.iter().map(|&logit| sigmoid(logit as f64)))
                .collect();

            debug!(
                max_score = scores.max_score(),
                text_chars = text.chars().count(),
                "ONNX classified text"
            );

            Ok(scores)
        })
        .await
        .context("spawn_blocking panicked")?
    }
}

/// Sigmoid activation: maps any real number to (0, 1).
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
