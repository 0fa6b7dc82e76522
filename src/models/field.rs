//! The fixed rental-contract schema.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A field of the rental-contract schema.
///
/// Variant order is schema order: reports, field sets and issue messages
/// all list fields in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldName {
    Verhuurder,
    Huurder,
    Object,
    Huurprijs,
    Huuringangsdatum,
    Einddatum,
}

impl FieldName {
    /// All fields, in schema order.
    pub const ALL: [FieldName; 6] = [
        FieldName::Verhuurder,
        FieldName::Huurder,
        FieldName::Object,
        FieldName::Huurprijs,
        FieldName::Huuringangsdatum,
        FieldName::Einddatum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Verhuurder => "Verhuurder",
            FieldName::Huurder => "Huurder",
            FieldName::Object => "Object",
            FieldName::Huurprijs => "Huurprijs",
            FieldName::Huuringangsdatum => "Huuringangsdatum",
            FieldName::Einddatum => "Einddatum",
        }
    }

    /// Value kind used to validate candidates for this field.
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldName::Verhuurder | FieldName::Huurder | FieldName::Object => ValueKind::Text,
            FieldName::Huurprijs => ValueKind::Amount,
            FieldName::Huuringangsdatum | FieldName::Einddatum => ValueKind::Date,
        }
    }

    /// Einddatum is optional (open-ended contracts); everything else is required.
    pub fn is_required(&self) -> bool {
        !matches!(self, FieldName::Einddatum)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Value kind tag of a field definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Free text (names, addresses).
    Text,
    /// Currency amount in euros.
    Amount,
    /// Calendar date in `dd-mm-yyyy` notation.
    Date,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Amount => "amount",
            ValueKind::Date => "date",
        }
    }
}

/// A field with its ordered extraction patterns.
///
/// Patterns are tried in order and the first one that matches wins, so
/// strict labelled forms come before loose contextual phrasings.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: FieldName,
    pub kind: ValueKind,
    pub patterns: Vec<Regex>,
}

impl FieldDefinition {
    pub fn new(name: FieldName, patterns: Vec<Regex>) -> Self {
        Self {
            name,
            kind: name.kind(),
            patterns,
        }
    }
}
