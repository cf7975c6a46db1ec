//! Classifier models for the prediction pipeline
//!
//! Models are loaded from a `kind`-tagged JSON parameter export and share the
//! [`CommentModel`] trait: one predicted label code per feature row, plus an
//! optional per-row probability distribution. Probability support is a
//! capability of the model kind, not an error path.

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use vidpulse_core::{Error, Result};

/// Trait for loaded classifier models
pub trait CommentModel: Send + Sync {
    /// Runtime model identifier, reported in the batch summary
    fn name(&self) -> &'static str;

    /// Number of label classes this model predicts
    fn num_classes(&self) -> usize;

    /// Predict one label code per feature row, preserving row order
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>>;

    /// Per-row probability distribution over classes, or `None` when this
    /// model kind has no probability output
    fn probabilities(&self, features: &Array2<f64>) -> Option<Array2<f64>>;
}

/// Persisted model artifact, tagged by kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    SoftmaxRegression(SoftmaxRegression),
    MultinomialNb(MultinomialNb),
    NearestCentroid(NearestCentroid),
}

impl ModelArtifact {
    /// Convert the deserialized artifact into a runnable model
    pub fn into_model(self) -> Box<dyn CommentModel> {
        match self {
            Self::SoftmaxRegression(model) => Box::new(model),
            Self::MultinomialNb(model) => Box::new(model),
            Self::NearestCentroid(model) => Box::new(model),
        }
    }
}

/// Multinomial logistic regression over TF-IDF features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftmaxRegression {
    /// (n_classes, n_features) weight matrix
    weights: Array2<f64>,

    /// Per-class bias
    bias: Array1<f64>,
}

impl SoftmaxRegression {
    pub fn new(weights: Array2<f64>, bias: Array1<f64>) -> Result<Self> {
        if weights.nrows() != bias.len() {
            return Err(Error::classifier(format!(
                "weight rows ({}) do not match bias length ({})",
                weights.nrows(),
                bias.len()
            )));
        }
        Ok(Self { weights, bias })
    }

    fn logits(&self, features: &Array2<f64>) -> Array2<f64> {
        features.dot(&self.weights.t()) + &self.bias
    }
}

impl CommentModel for SoftmaxRegression {
    fn name(&self) -> &'static str {
        "SoftmaxRegression"
    }

    fn num_classes(&self) -> usize {
        self.weights.nrows()
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>> {
        check_width(features, self.weights.ncols())?;
        Ok(self.logits(features).rows().into_iter().map(argmax).collect())
    }

    fn probabilities(&self, features: &Array2<f64>) -> Option<Array2<f64>> {
        Some(softmax_rows(&self.logits(features)))
    }
}

/// Multinomial naive Bayes over TF-IDF features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNb {
    /// Per-class log-prior
    class_log_prior: Array1<f64>,

    /// (n_classes, n_features) per-class feature log-likelihoods
    feature_log_prob: Array2<f64>,
}

impl MultinomialNb {
    /// Closed-form fit with Lidstone smoothing.
    ///
    /// Used by the offline training path and by tests that need a real
    /// probability-capable model; every class in `0..n_classes` must occur
    /// in `labels`.
    pub fn fit(
        features: &Array2<f64>,
        labels: &[usize],
        n_classes: usize,
        alpha: f64,
    ) -> Result<Self> {
        if labels.len() != features.nrows() {
            return Err(Error::classifier(format!(
                "label count ({}) does not match sample count ({})",
                labels.len(),
                features.nrows()
            )));
        }
        let n_features = features.ncols();

        let mut class_count = vec![0usize; n_classes];
        let mut feature_count = Array2::<f64>::zeros((n_classes, n_features));

        for (row, &label) in labels.iter().enumerate() {
            if label >= n_classes {
                return Err(Error::classifier(format!(
                    "label {label} out of range for {n_classes} classes"
                )));
            }
            class_count[label] += 1;
            for (col, &value) in features.row(row).iter().enumerate() {
                feature_count[[label, col]] += value;
            }
        }

        if class_count.iter().any(|&count| count == 0) {
            return Err(Error::classifier(
                "every class must have at least one training sample",
            ));
        }

        let total = labels.len() as f64;
        let class_log_prior: Array1<f64> = class_count
            .iter()
            .map(|&c| (c as f64 / total).ln())
            .collect();

        let mut feature_log_prob = Array2::zeros((n_classes, n_features));
        for class in 0..n_classes {
            let class_total: f64 = feature_count.row(class).sum();
            let denominator = class_total + alpha * n_features as f64;
            for col in 0..n_features {
                feature_log_prob[[class, col]] =
                    ((feature_count[[class, col]] + alpha) / denominator).ln();
            }
        }

        Ok(Self {
            class_log_prior,
            feature_log_prob,
        })
    }

    fn joint_log_likelihood(&self, features: &Array2<f64>) -> Array2<f64> {
        features.dot(&self.feature_log_prob.t()) + &self.class_log_prior
    }
}

impl CommentModel for MultinomialNb {
    fn name(&self) -> &'static str {
        "MultinomialNb"
    }

    fn num_classes(&self) -> usize {
        self.class_log_prior.len()
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>> {
        check_width(features, self.feature_log_prob.ncols())?;
        Ok(self
            .joint_log_likelihood(features)
            .rows()
            .into_iter()
            .map(argmax)
            .collect())
    }

    fn probabilities(&self, features: &Array2<f64>) -> Option<Array2<f64>> {
        // Log-sum-exp normalization of the joint log-likelihood
        Some(softmax_rows(&self.joint_log_likelihood(features)))
    }
}

/// Nearest-centroid classifier: cosine similarity against per-class centroids.
///
/// Has no probability output; batches predicted by this model report a
/// confidence of 0.0 for every row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearestCentroid {
    /// (n_classes, n_features) class centroids
    centroids: Array2<f64>,
}

impl NearestCentroid {
    /// Fit centroids as the per-class mean feature vector
    pub fn fit(features: &Array2<f64>, labels: &[usize], n_classes: usize) -> Result<Self> {
        if labels.len() != features.nrows() {
            return Err(Error::classifier(format!(
                "label count ({}) does not match sample count ({})",
                labels.len(),
                features.nrows()
            )));
        }

        let mut centroids = Array2::<f64>::zeros((n_classes, features.ncols()));
        let mut class_count = vec![0usize; n_classes];

        for (row, &label) in labels.iter().enumerate() {
            if label >= n_classes {
                return Err(Error::classifier(format!(
                    "label {label} out of range for {n_classes} classes"
                )));
            }
            class_count[label] += 1;
            for (col, &value) in features.row(row).iter().enumerate() {
                centroids[[label, col]] += value;
            }
        }

        for class in 0..n_classes {
            if class_count[class] > 0 {
                let count = class_count[class] as f64;
                for col in 0..features.ncols() {
                    centroids[[class, col]] /= count;
                }
            }
        }

        Ok(Self { centroids })
    }
}

impl CommentModel for NearestCentroid {
    fn name(&self) -> &'static str {
        "NearestCentroid"
    }

    fn num_classes(&self) -> usize {
        self.centroids.nrows()
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>> {
        check_width(features, self.centroids.ncols())?;

        let predictions = features
            .rows()
            .into_iter()
            .map(|row| {
                let similarities: Vec<f64> = self
                    .centroids
                    .rows()
                    .into_iter()
                    .map(|centroid| cosine_similarity(row, centroid))
                    .collect();
                argmax_slice(&similarities)
            })
            .collect();

        Ok(predictions)
    }

    fn probabilities(&self, _features: &Array2<f64>) -> Option<Array2<f64>> {
        None
    }
}

fn check_width(features: &Array2<f64>, expected: usize) -> Result<()> {
    if features.ncols() != expected {
        return Err(Error::classifier(format!(
            "feature width ({}) does not match model width ({})",
            features.ncols(),
            expected
        )));
    }
    Ok(())
}

fn argmax(row: ArrayView1<f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (idx, &value) in row.iter().enumerate() {
        if value > best_value {
            best = idx;
            best_value = value;
        }
    }
    best
}

fn argmax_slice(values: &[f64]) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (idx, &value) in values.iter().enumerate() {
        if value > best_value {
            best = idx;
            best_value = value;
        }
    }
    best
}

/// Numerically stable row-wise softmax
fn softmax_rows(logits: &Array2<f64>) -> Array2<f64> {
    let mut probabilities = logits.clone();
    for mut row in probabilities.rows_mut() {
        let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        row.mapv_inplace(|v| (v - max).exp());
        let sum: f64 = row.sum();
        if sum > 0.0 {
            row.mapv_inplace(|v| v / sum);
        }
    }
    probabilities
}

fn cosine_similarity(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
