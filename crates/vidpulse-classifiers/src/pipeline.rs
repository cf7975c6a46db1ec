//! Batch prediction over the loaded model bundle
//!
//! A single synchronous pass: vectorize the whole batch, predict one label
//! per row, attach the row-max probability as confidence, decode labels with
//! a row-local fallback, and aggregate into a distribution summary.

use crate::bundle::ModelBundle;
use crate::labels::LabelOutcome;
use std::collections::BTreeMap;
use tracing::debug;
use vidpulse_core::{
    BatchSummary, Error, PredictionResult, Result, SentimentDistribution,
};

impl ModelBundle {
    /// Predict sentiment for a non-empty batch of comments.
    ///
    /// Fails with [`Error::Unavailable`] before doing any work when either
    /// the vectorizer or the classifier is missing. A vectorize/predict
    /// failure aborts the whole batch; a label-decode failure only falls
    /// back for its own row. Empty input is the caller's short circuit, not
    /// handled here.
    pub fn predict(&self, comments: &[String]) -> Result<BatchSummary> {
        let (vectorizer, model) = match (&self.vectorizer, &self.model) {
            (Some(vectorizer), Some(model)) => (vectorizer, model),
            _ => {
                return Err(Error::unavailable(
                    "vectorizer or classifier artifact missing",
                ))
            }
        };

        let features = vectorizer.transform_batch(comments);
        let predictions = model.predict(&features)?;
        let probabilities = model.probabilities(&features);

        debug!(
            batch = comments.len(),
            model = model.name(),
            probabilities = probabilities.is_some(),
            "predicted comment batch"
        );

        let results: Vec<PredictionResult> = predictions
            .iter()
            .enumerate()
            .map(|(row, &label)| {
                let confidence = probabilities
                    .as_ref()
                    .map(|p| p.row(row).iter().copied().fold(0.0, f64::max))
                    .unwrap_or(0.0);

                PredictionResult {
                    comment: comments[row].clone(),
                    sentiment: LabelOutcome::resolve(self.labels.as_ref(), label).into_label(),
                    confidence,
                }
            })
            .collect();

        Ok(summarize(results, model.name()))
    }
}

/// Aggregate per-row results into the batch summary
fn summarize(results: Vec<PredictionResult>, model_name: &str) -> BatchSummary {
    let total = results.len();

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for result in &results {
        *counts.entry(result.sentiment.clone()).or_insert(0) += 1;
    }

    let percentages: BTreeMap<String, f64> = counts
        .iter()
        .map(|(label, &count)| (label.clone(), round1(count as f64 / total as f64 * 100.0)))
        .collect();

    let average_confidence = if total > 0 {
        results.iter().map(|r| r.confidence).sum::<f64>() / total as f64
    } else {
        0.0
    };

    BatchSummary {
        count: total,
        results,
        distribution: SentimentDistribution {
            counts,
            percentages,
        },
        average_confidence,
        model: Some(model_name.to_string()),
    }
}

/// Round to one decimal place
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
