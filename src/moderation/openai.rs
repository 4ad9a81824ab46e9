// OpenAI Moderation API implementation.
//
// The moderation endpoint classifies text across eleven policy categories
// and is free to use with any API key. Every failure mode (transport, auth,
// non-2xx, malformed body) surfaces as an Err so the pipeline can treat the
// classifier as uniformly unavailable and fall back.
//
// API docs: https://platform.openai.com/docs/api-reference/moderations

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rate_limiter::RateLimiter;
use super::traits::Classifier;
use super::verdict::CategoryScores;

const MODERATIONS_URL: &str = "https://api.openai.com/v1/moderations";

/// Category labels in the order the verdict reports them. The API returns a
/// JSON object, so a fixed order here is what gives tie-broken reason
/// strings a deterministic join order.
const LABEL_ORDER: [&str; 11] = [
    "harassment",
    "harassment/threatening",
    "hate",
    "hate/threatening",
    "self-harm",
    "self-harm/intent",
    "self-harm/instructions",
    "sexual",
    "sexual/minors",
    "violence",
    "violence/graphic",
];

/// OpenAI Moderation API classifier.
pub struct OpenAiClassifier {
    client: Client,
    api_key: String,
    rate_limiter: RateLimiter,
}

impl OpenAiClassifier {
    /// Create a new classifier with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            // Stay well under the moderation endpoint's request quota
            rate_limiter: RateLimiter::new(10.0),
        }
    }
}

#[async_trait]
impl Classifier for OpenAiClassifier {
    async fn classify(&self, text: &str) -> Result<CategoryScores> {
        if self.api_key.is_empty() {
            anyhow::bail!("OPENAI_API_KEY not set");
        }

        self.rate_limiter.acquire().await;

        let request = ModerationRequest {
            input: text.to_string(),
            model: "omni-moderation-latest".to_string(),
        };

        let response = self
            .client
            .post(MODERATIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to call OpenAI Moderation API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI Moderation API returned {}: {}", status, body);
        }

        let result: ModerationResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI Moderation API response")?;

        let scores = result
            .results
            .into_iter()
            .next()
            .context("OpenAI Moderation API returned no results")?
            .category_scores;

        debug!(
            max_score = scores.max(),
            text_chars = text.chars().count(),
            "OpenAI moderation scored text"
        );

        Ok(scores.into_ordered())
    }
}

// --- Moderation API request/response types ---

#[derive(Serialize)]
struct ModerationRequest {
    input: String,
    model: String,
}

#[derive(Deserialize)]
struct ModerationResponse {
    results: Vec<ModerationResult>,
}

#[derive(Deserialize)]
struct ModerationResult {
    category_scores: ApiCategoryScores,
}

/// Typed view of the API's category_scores object. Missing categories
/// default to 0.0 so the verdict's key set stays stable across API versions.
#[derive(Deserialize, Default)]
struct ApiCategoryScores {
    #[serde(default)]
    harassment: f64,
    #[serde(default, rename = "harassment/threatening")]
    harassment_threatening: f64,
    #[serde(default)]
    hate: f64,
    #[serde(default, rename = "hate/threatening")]
    hate_threatening: f64,
    #[serde(default, rename = "self-harm")]
    self_harm: f64,
    #[serde(default, rename = "self-harm/intent")]
    self_harm_intent: f64,
    #[serde(default, rename = "self-harm/instructions")]
    self_harm_instructions: f64,
    #[serde(default)]
    sexual: f64,
    #[serde(default, rename = "sexual/minors")]
    sexual_minors: f64,
    #[serde(default)]
    violence: f64,
    #[serde(default, rename = "violence/graphic")]
    violence_graphic: f64,
}

impl ApiCategoryScores {
    fn values(&self) -> [f64; 11] {
        [
            self.harassment,
            self.harassment_threatening,
            self.hate,
            self.hate_threatening,
            self.self_harm,
            self.self_harm_intent,
            self.self_harm_instructions,
            self.sexual,
            self.sexual_minors,
            self.violence,
            self.violence_graphic,
        ]
    }

    fn max(&self) -> f64 {
        self.values().into_iter().fold(0.0, f64::max)
    }

    /// Convert to CategoryScores in LABEL_ORDER.
    fn into_ordered(self) -> CategoryScores {
        LABEL_ORDER.into_iter().zip(self.values()).collect()
    }
}
