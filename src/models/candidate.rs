//! Extracted field candidates.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::field::FieldName;

/// Extraction technique that produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Pattern match in the page's embedded text layer.
    Pattern,
    /// Named-entity recognition over page text.
    Entity,
    /// Pattern match inside OCR output of an embedded image.
    Ocr,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Pattern => "pattern",
            Source::Entity => "entity",
            Source::Ocr => "ocr",
        }
    }

    /// Rank under the source-priority reconciliation policy (higher wins).
    pub fn priority(&self) -> u8 {
        match self {
            Source::Pattern => 2,
            Source::Ocr => 1,
            Source::Entity => 0,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A proposed value for one field from one extraction attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub field: FieldName,
    /// Raw matched or recognized string, trimmed.
    pub value: String,
    pub source: Source,
    /// Always within [0, 1].
    pub confidence: f32,
    /// Zero-based page index.
    pub page: usize,
}

impl Candidate {
    pub fn new(
        field: FieldName,
        value: impl Into<String>,
        source: Source,
        confidence: f32,
        page: usize,
    ) -> Self {
        Self {
            field,
            value: value.into(),
            source,
            confidence: clamp_confidence(confidence),
            page,
        }
    }

    /// Copy of this candidate with its confidence capped at `cap`.
    pub fn capped(&self, cap: f32) -> Self {
        Self {
            confidence: self.confidence.min(clamp_confidence(cap)),
            ..self.clone()
        }
    }
}

fn clamp_confidence(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
