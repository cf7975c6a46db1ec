//! TF-IDF vectorizer: deterministic raw-text to feature-matrix transform
//!
//! The server only ever consumes a fitted vectorizer from the artifact file;
//! `fit` exists for the offline training job and for building real bundles in
//! tests.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Fitted TF-IDF vectorizer.
///
/// Vocabulary maps a term to its feature column; `idf` holds the smoothed
/// inverse document frequency for each column. Rows are L2-normalized, so
/// every transformed comment has unit norm unless no token is in vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// term -> column index
    vocabulary: HashMap<String, usize>,

    /// Smoothed IDF per column
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fit a vectorizer on a training corpus.
    ///
    /// Vocabulary columns are assigned in alphabetical term order so the
    /// fitted transform is deterministic across runs.
    pub fn fit<T: AsRef<str>>(documents: &[T]) -> Self {
        let n_docs = documents.len();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let unique: HashSet<String> = tokenize(doc.as_ref()).into_iter().collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let mut terms: Vec<&String> = document_frequency.keys().collect();
        terms.sort();

        let vocabulary: HashMap<String, usize> = terms
            .iter()
            .enumerate()
            .map(|(idx, term)| ((*term).clone(), idx))
            .collect();

        let mut idf = vec![0.0; vocabulary.len()];
        for (term, &idx) in &vocabulary {
            let df = document_frequency[term];
            idf[idx] = ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0;
        }

        Self { vocabulary, idf }
    }

    /// Transform a batch of texts into a feature matrix.
    ///
    /// One row per input, in input order. Terms outside the vocabulary are
    /// ignored; a text with no known terms yields a zero row.
    pub fn transform_batch<T: AsRef<str>>(&self, texts: &[T]) -> Array2<f64> {
        let n_features = self.idf.len();
        let mut features = Array2::zeros((texts.len(), n_features));

        for (row, text) in texts.iter().enumerate() {
            for token in tokenize(text.as_ref()) {
                if let Some(&col) = self.vocabulary.get(&token) {
                    features[[row, col]] += 1.0;
                }
            }

            for col in 0..n_features {
                features[[row, col]] *= self.idf[col];
            }

            let norm = features
                .row(row)
                .iter()
                .map(|v| v * v)
                .sum::<f64>()
                .sqrt();
            if norm > 0.0 {
                for col in 0..n_features {
                    features[[row, col]] /= norm;
                }
            }
        }

        features
    }

    /// Number of feature columns produced by this vectorizer
    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }
}

/// Lowercase, split on non-alphanumeric boundaries, keep tokens of >= 2 chars
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}
