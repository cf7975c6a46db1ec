//! Keyword-based commit-message classifier
//!
//! A lexicon lookup, not a model: each commit type has a keyword list and the
//! message is scored by how many distinct keywords it contains.

use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use vidpulse_core::{Error, Result};

const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("bugfix", &["fix", "bug", "issue", "patch", "resolve"]),
    ("feature", &["add", "new", "implement", "feature", "support"]),
    ("refactor", &["refactor", "cleanup", "reorganize", "restructure"]),
    ("docs", &["doc", "documentation", "readme", "comment"]),
    ("test", &["test", "spec", "coverage"]),
    ("chore", &["chore", "deps", "update", "upgrade", "bump"]),
    ("perf", &["perf", "performance", "optimize", "speed"]),
];

/// Commit-type verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitTypeResult {
    /// Winning commit type, or "other" when no keyword matched
    #[serde(rename = "type")]
    pub commit_type: String,

    /// Distinct-keyword hit ratio for the winning type, clamped to 1.0
    pub confidence: f64,

    /// Raw hit counts per type (absent for the no-match case)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_scores: Option<BTreeMap<String, usize>>,
}

struct Category {
    name: &'static str,
    matcher: AhoCorasick,
    keyword_count: usize,
}

/// Classifier over the fixed commit-type keyword table
pub struct CommitClassifier {
    categories: Vec<Category>,
}

impl CommitClassifier {
    pub fn new() -> Result<Self> {
        let categories = CATEGORY_KEYWORDS
            .iter()
            .map(|(name, keywords)| {
                let matcher = AhoCorasick::builder()
                    .ascii_case_insensitive(true)
                    .build(*keywords)
                    .map_err(|e| {
                        Error::classifier(format!("failed to build {name} keyword matcher: {e}"))
                    })?;
                Ok(Category {
                    name,
                    matcher,
                    keyword_count: keywords.len(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { categories })
    }

    /// Classify a commit message by its keyword hits
    pub fn classify(&self, message: &str) -> CommitTypeResult {
        let mut scores: BTreeMap<String, usize> = BTreeMap::new();
        let mut best: Option<&Category> = None;
        let mut best_score = 0usize;

        for category in &self.categories {
            // Overlapping search so "documentation" also counts its "doc"
            // keyword; distinct patterns only.
            let hits: HashSet<usize> = category
                .matcher
                .find_overlapping_iter(message)
                .map(|m| m.pattern().as_usize())
                .collect();
            let score = hits.len();
            scores.insert(category.name.to_string(), score);

            if score > best_score {
                best_score = score;
                best = Some(category);
            }
        }

        match best {
            Some(category) if best_score > 0 => {
                let confidence =
                    (best_score as f64 / category.keyword_count as f64).min(1.0);
                CommitTypeResult {
                    commit_type: category.name.to_string(),
                    confidence,
                    all_scores: Some(scores),
                }
            }
            _ => CommitTypeResult {
                commit_type: "other".to_string(),
                confidence: 0.0,
                all_scores: None,
            },
        }
    }
}

/// Overall commit quality in [0, 1]: message length, sentiment, and type
/// clarity each add to a 0.5 base.
pub fn quality_score(message: &str, sentiment_label: &str, type_confidence: f64) -> f64 {
    let mut score: f64 = 0.5;

    if message.len() > 20 {
        score += 0.2;
    }
    if message.len() > 50 {
        score += 0.1;
    }

    if sentiment_label == "POSITIVE" {
        score += 0.1;
    }

    if type_confidence > 0.5 {
        score += 0.1;
    }

    score.min(1.0)
}
