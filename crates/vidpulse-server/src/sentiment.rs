//! Remote sentiment inference
//!
//! The Hugging Face Inference API does the actual model work; this module is
//! the typed client plus the trait seam the handlers (and tests) depend on.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use vidpulse_core::{Error, LabelScore, Result, SentimentScore};

/// Seam for the external sentiment-inference endpoint
#[async_trait]
pub trait SentimentBackend: Send + Sync {
    /// Analyze one text and return a normalized sentiment verdict
    async fn analyze(&self, text: &str) -> Result<SentimentScore>;
}

/// Hugging Face Inference API client
pub struct HfSentimentClient {
    http: reqwest::Client,
    api_base: String,
    model: String,
    token: String,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    options: InferenceOptions,
}

#[derive(Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

impl HfSentimentClient {
    pub fn new(token: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Self::with_api_base(token, model, "https://api-inference.huggingface.co/models")
    }

    pub fn with_api_base(
        token: impl Into<String>,
        model: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: api_base.into(),
            model: model.into(),
            token: token.into(),
        })
    }
}

#[async_trait]
impl SentimentBackend for HfSentimentClient {
    async fn analyze(&self, text: &str) -> Result<SentimentScore> {
        // Empty input never hits the network
        if text.trim().is_empty() {
            return Ok(SentimentScore::neutral());
        }

        let url = format!("{}/{}", self.api_base, self.model);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&InferenceRequest {
                inputs: text,
                options: InferenceOptions {
                    wait_for_model: true,
                },
            })
            .send()
            .await
            .map_err(|e| Error::upstream(format!("inference request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(format!(
                "inference endpoint returned {status}: {body}"
            )));
        }

        // The API returns one score list per input
        let rows: Vec<Vec<LabelScore>> = response
            .json()
            .await
            .map_err(|e| Error::upstream(format!("inference endpoint returned invalid JSON: {e}")))?;

        let scores = rows
            .into_iter()
            .next()
            .ok_or_else(|| Error::upstream("inference endpoint returned no scores"))?;

        let best = scores
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .ok_or_else(|| Error::upstream("inference endpoint returned an empty score list"))?;

        Ok(SentimentScore {
            label: normalize_label(&best.label),
            score: best.score,
            all_scores: Some(scores.clone()),
        })
    }
}

/// Collapse an arbitrary model label onto POSITIVE / NEGATIVE / NEUTRAL
pub fn normalize_label(label: &str) -> String {
    let upper = label.to_uppercase();
    if upper.contains("POSITIVE") {
        "POSITIVE".to_string()
    } else if upper.contains("NEGATIVE") {
        "NEGATIVE".to_string()
    } else {
        "NEUTRAL".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_model_labels() {
        assert_eq!(normalize_label("LABEL_POSITIVE"), "POSITIVE");
        assert_eq!(normalize_label("negative"), "NEGATIVE");
        assert_eq!(normalize_label("LABEL_1"), "NEUTRAL");
        assert_eq!(normalize_label("very_positive"), "POSITIVE");
    }

    #[tokio::test]
    async fn empty_text_short_circuits_to_neutral() {
        // Token and endpoint are never used for empty input
        let client = HfSentimentClient::with_api_base("token", "model", "http://invalid").unwrap();

        let result = client.analyze("   ").await.unwrap();
        assert_eq!(result.label, "NEUTRAL");
        assert_eq!(result.score, 0.0);
        assert!(result.all_scores.is_none());
    }
}
