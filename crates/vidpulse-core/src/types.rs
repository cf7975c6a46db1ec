//! Core types for VidPulse

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Verdict for a single comment run through the prediction pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    /// The raw comment text, as submitted
    pub comment: String,

    /// Decoded sentiment label
    pub sentiment: String,

    /// Maximum class probability for this row (0.0 when the model
    /// exposes no probability output)
    pub confidence: f64,
}

/// Label distribution over a prediction batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentimentDistribution {
    /// Absolute count per label
    pub counts: BTreeMap<String, usize>,

    /// Share of the batch per label, percent, rounded to one decimal
    pub percentages: BTreeMap<String, f64>,
}

/// Aggregate summary for one prediction batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of comments analyzed
    pub count: usize,

    /// Per-comment verdicts, in input order
    pub results: Vec<PredictionResult>,

    /// Label distribution across the batch
    pub distribution: SentimentDistribution,

    /// Arithmetic mean of all per-result confidences (0.0 for an empty batch)
    pub average_confidence: f64,

    /// Runtime name of the classifier that produced the batch
    pub model: Option<String>,
}

impl BatchSummary {
    /// Summary for an empty input batch. Callers short-circuit to this
    /// without invoking the pipeline.
    pub fn empty() -> Self {
        Self {
            count: 0,
            results: Vec::new(),
            distribution: SentimentDistribution::default(),
            average_confidence: 0.0,
            model: None,
        }
    }
}

/// Which model artifacts loaded successfully at startup
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ArtifactStatus {
    /// Text vectorizer artifact
    pub vectorizer: bool,

    /// Trained classifier artifact
    pub classifier: bool,

    /// Label decoder artifact
    pub label_decoder: bool,
}

impl ArtifactStatus {
    /// True when the artifacts required by `predict` are present.
    /// The label decoder is optional by contract.
    pub fn ready(&self) -> bool {
        self.vectorizer && self.classifier
    }
}

/// Sentiment verdict from the remote inference endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentScore {
    /// Normalized label: POSITIVE, NEGATIVE, or NEUTRAL
    pub label: String,

    /// Score of the winning label
    pub score: f64,

    /// Full per-label score list, when the endpoint returned one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_scores: Option<Vec<LabelScore>>,
}

impl SentimentScore {
    /// Neutral verdict used for empty input (no inference call made)
    pub fn neutral() -> Self {
        Self {
            label: "NEUTRAL".to_string(),
            score: 0.0,
            all_scores: None,
        }
    }
}

/// One label/score pair from the inference endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}
