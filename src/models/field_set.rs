//! The reconciled result: one value (or not-found) per schema field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::candidate::Candidate;
use super::field::FieldName;

/// Value of a field in a [`FieldSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldValue {
    Found(Candidate),
    NotFound,
}

impl FieldValue {
    pub fn candidate(&self) -> Option<&Candidate> {
        match self {
            FieldValue::Found(c) => Some(c),
            FieldValue::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, FieldValue::Found(_))
    }
}

/// Mapping from every schema field to its winning candidate or the
/// not-found sentinel. A field set always holds all six fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSet {
    fields: BTreeMap<FieldName, FieldValue>,
}

impl FieldSet {
    /// A field set with every field at the not-found sentinel.
    pub fn empty() -> Self {
        Self {
            fields: FieldName::ALL
                .into_iter()
                .map(|name| (name, FieldValue::NotFound))
                .collect(),
        }
    }

    pub fn get(&self, name: FieldName) -> &FieldValue {
        // Every field is inserted by `empty()` and never removed.
        self.fields.get(&name).unwrap_or(&FieldValue::NotFound)
    }

    pub fn candidate(&self, name: FieldName) -> Option<&Candidate> {
        self.get(name).candidate()
    }

    /// Convenience accessor for the winning value string.
    pub fn value(&self, name: FieldName) -> Option<&str> {
        self.candidate(name).map(|c| c.value.as_str())
    }

    /// Fields and values in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    pub fn missing(&self) -> impl Iterator<Item = FieldName> + '_ {
        self.iter()
            .filter(|(_, value)| !value.is_found())
            .map(|(name, _)| name)
    }

    pub(crate) fn set(&mut self, candidate: Candidate) {
        self.fields
            .insert(candidate.field, FieldValue::Found(candidate));
    }
}

impl Default for FieldSet {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;

    #[test]
    fn test_empty_has_every_field() {
        let set = FieldSet::empty();
        assert_eq!(set.iter().count(), FieldName::ALL.len());
        assert!(set.iter().all(|(_, v)| *v == FieldValue::NotFound));
        assert_eq!(set.missing().count(), 6);
    }

    #[test]
    fn test_iter_is_schema_order() {
        let names: Vec<FieldName> = FieldSet::empty().iter().map(|(n, _)| n).collect();
        assert_eq!(names, FieldName::ALL.to_vec());
    }

    #[test]
    fn test_set_replaces_sentinel() {
        let mut set = FieldSet::empty();
        set.set(Candidate::new(
            FieldName::Huurprijs,
            "1500,00",
            Source::Pattern,
            1.0,
            0,
        ));
        assert_eq!(set.value(FieldName::Huurprijs), Some("1500,00"));
        assert_eq!(set.missing().count(), 5);
    }
}
