use std::env;
use std::path::PathBuf;

use anyhow::Result;

/// Which primary classifier backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierBackend {
    /// Local ONNX model (default) — no API key needed, no rate limits
    Onnx,
    /// OpenAI Moderation API — requires OPENAI_API_KEY
    OpenAi,
}

impl ClassifierBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierBackend::Onnx => "onnx",
            ClassifierBackend::OpenAi => "openai",
        }
    }
}

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
pub struct Config {
    /// Which primary classifier to use (default: Onnx)
    pub classifier_backend: ClassifierBackend,
    pub openai_api_key: String,
    /// Directory containing the ONNX model files
    pub model_dir: PathBuf,
    pub db_path: String,
    /// Upper bound on a single primary classifier call; a timeout is treated
    /// as classifier failure and triggers the keyword fallback.
    pub classifier_timeout_secs: u64,
    pub bind: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default except OPENAI_API_KEY, which is only needed
    /// when the openai backend is selected.
    pub fn load() -> Result<Self> {
        let classifier_backend = match env::var("GATEPOST_CLASSIFIER").as_deref() {
            Ok("openai") => ClassifierBackend::OpenAi,
            // "onnx" or unset both default to ONNX
            _ => ClassifierBackend::Onnx,
        };

        let model_dir = env::var("GATEPOST_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| crate::moderation::download::default_model_dir());

        let classifier_timeout_secs = env::var("GATEPOST_CLASSIFIER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3001);

        Ok(Self {
            classifier_backend,
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            model_dir,
            db_path: env::var("GATEPOST_DB_PATH").unwrap_or_else(|_| "./gatepost.db".to_string()),
            classifier_timeout_secs,
            bind: env::var("GATEPOST_BIND").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
        })
    }

    /// Check that the OpenAI API key is configured.
    pub fn require_openai(&self) -> Result<()> {
        if self.openai_api_key.is_empty() {
            anyhow::bail!(
                "OPENAI_API_KEY not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        Ok(())
    }

    /// Validate that the chosen classifier backend has what it needs.
    /// For ONNX: model files must exist (or user should run download-model).
    /// For OpenAI: API key must be set.
    ///
    /// The pipeline itself degrades to the keyword fallback either way —
    /// this check exists so `serve` and `status` can warn up front.
    pub fn require_classifier(&self) -> Result<()> {
        match self.classifier_backend {
            ClassifierBackend::Onnx => {
                if !crate::moderation::download::model_files_present(&self.model_dir) {
                    anyhow::bail!(
                        "ONNX model files not found in {}\n\
                         Run `gatepost download-model` to download them.\n\
                         Or set GATEPOST_CLASSIFIER=openai to use the OpenAI Moderation API instead.",
                        self.model_dir.display()
                    );
                }
                Ok(())
            }
            ClassifierBackend::OpenAi => self.require_openai(),
        }
    }
}
