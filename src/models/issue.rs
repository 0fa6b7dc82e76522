//! Contract-level validation issues.

use serde::{Deserialize, Serialize};

use super::field::FieldName;

/// Category of a validation issue. Doubles as its severity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingRequired,
    LowConfidence,
    EndBeforeStart,
    UnparseableDates,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::MissingRequired => "missing_required",
            IssueKind::LowConfidence => "low_confidence",
            IssueKind::EndBeforeStart => "end_before_start",
            IssueKind::UnparseableDates => "unparseable_dates",
        }
    }
}

/// A human-readable finding about an extracted contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    /// Fields the issue is about.
    pub fields: Vec<FieldName>,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(kind: IssueKind, fields: Vec<FieldName>, message: impl Into<String>) -> Self {
        Self {
            kind,
            fields,
            message: message.into(),
        }
    }
}
