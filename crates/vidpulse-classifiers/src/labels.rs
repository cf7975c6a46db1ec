//! Label decoding: internal class codes to display names
//!
//! Decoding failures are row-local by contract. The outcome is a branch type
//! rather than a swallowed error so tests can see which rows fell back.

use serde::{Deserialize, Serialize};

/// Ordered class-name table mapping a predicted label code to its display name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelDecoder {
    classes: Vec<String>,
}

impl LabelDecoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    /// Decode a label code, or `None` for codes outside the class table
    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Per-row label decoding outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelOutcome {
    /// The decoder produced a display name
    Decoded(String),

    /// No decoder, or the code was unknown to it; the raw label's string
    /// form is used instead
    Fallback(String),
}

impl LabelOutcome {
    /// Resolve one row's label code against an optional decoder
    pub fn resolve(decoder: Option<&LabelDecoder>, code: usize) -> Self {
        match decoder.and_then(|d| d.decode(code)) {
            Some(name) => Self::Decoded(name.to_string()),
            None => Self::Fallback(code.to_string()),
        }
    }

    /// The sentiment string for this row, whichever branch was taken
    pub fn into_label(self) -> String {
        match self {
            Self::Decoded(label) | Self::Fallback(label) => label,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}
