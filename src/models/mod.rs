//! Data models for huurscan.

mod candidate;
mod field;
mod field_set;
mod issue;

pub use candidate::{Candidate, Source};
pub use field::{FieldDefinition, FieldName, ValueKind};
pub use field_set::{FieldSet, FieldValue};
pub use issue::{IssueKind, ValidationIssue};
