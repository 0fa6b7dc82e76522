//! Entity Extractor: turns NER output into field candidates.
//!
//! Person entities feed `Huurder`, location entities feed `Object`. For each
//! field the highest-scoring entity on the page wins; on equal scores the
//! one found first wins.

use std::collections::BTreeMap;

use crate::models::{Candidate, FieldName, Source};

use super::diagnostics::{DiagnosticKind, Diagnostics};
use super::ner::{Entity, EntityType, NerBackend, RegexNerBackend};

/// Field fed by each entity type.
fn target_field(entity_type: EntityType) -> FieldName {
    match entity_type {
        EntityType::Person => FieldName::Huurder,
        EntityType::Location => FieldName::Object,
    }
}

pub struct EntityExtractor {
    backend: Box<dyn NerBackend>,
}

impl EntityExtractor {
    pub fn new(backend: Box<dyn NerBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_id(&self) -> &str {
        self.backend.backend_id()
    }

    /// Propose at most one candidate per entity-fed field for a page.
    ///
    /// `existing` holds the candidates other sources already produced for
    /// this page; a field is skipped when one of those is at least as
    /// confident as the best entity. A backend failure yields an empty map.
    pub fn extract_page(
        &self,
        text: &str,
        page: usize,
        existing: &[Candidate],
        diagnostics: &mut Diagnostics,
    ) -> BTreeMap<FieldName, Candidate> {
        let entities = match self.backend.extract(text) {
            Ok(entities) => entities,
            Err(e) => {
                diagnostics.record(
                    DiagnosticKind::NerFailure,
                    Some(page),
                    format!("{} backend: {}", self.backend.backend_id(), e),
                );
                return BTreeMap::new();
            }
        };

        let mut best: BTreeMap<FieldName, &Entity> = BTreeMap::new();
        for entity in &entities {
            if entity.text.trim().is_empty() {
                continue;
            }
            let field = target_field(entity.entity_type);
            match best.get(&field) {
                Some(current) if current.confidence >= entity.confidence => {}
                _ => {
                    best.insert(field, entity);
                }
            }
        }

        best.into_iter()
            .filter(|(field, entity)| {
                let covered = existing
                    .iter()
                    .any(|c| c.field == *field && c.confidence >= entity.confidence);
                if covered {
                    tracing::debug!(
                        "page {}: {} already covered, ignoring entity '{}'",
                        page + 1,
                        field,
                        entity.text
                    );
                }
                !covered
            })
            .map(|(field, entity)| {
                let candidate = Candidate::new(
                    field,
                    entity.text.trim(),
                    Source::Entity,
                    entity.confidence,
                    page,
                );
                (field, candidate)
            })
            .collect()
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new(Box::new(RegexNerBackend::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ner::NerError;

    struct FixedNer(Vec<Entity>);

    impl NerBackend for FixedNer {
        fn backend_id(&self) -> &str {
            "fixed"
        }

        fn extract(&self, _text: &str) -> Result<Vec<Entity>, NerError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenNer;

    impl NerBackend for BrokenNer {
        fn backend_id(&self) -> &str {
            "broken"
        }

        fn extract(&self, _text: &str) -> Result<Vec<Entity>, NerError> {
            Err(NerError::Failed("model crashed".to_string()))
        }
    }

    fn entity(entity_type: EntityType, text: &str, confidence: f32) -> Entity {
        Entity {
            entity_type,
            text: text.to_string(),
            confidence,
            start: 0,
        }
    }

    #[test]
    fn test_highest_confidence_wins_ties_go_to_first() {
        let extractor = EntityExtractor::new(Box::new(FixedNer(vec![
            entity(EntityType::Person, "Piet Bakker", 0.6),
            entity(EntityType::Person, "Anna de Wit", 0.85),
            entity(EntityType::Person, "Kees Smit", 0.85),
            entity(EntityType::Location, "Kerkstraat 1", 0.75),
        ])));
        let mut diag = Diagnostics::new();
        let out = extractor.extract_page("", 1, &[], &mut diag);

        assert_eq!(out[&FieldName::Huurder].value, "Anna de Wit");
        assert_eq!(out[&FieldName::Huurder].confidence, 0.85);
        assert_eq!(out[&FieldName::Huurder].source, Source::Entity);
        assert_eq!(out[&FieldName::Huurder].page, 1);
        assert_eq!(out[&FieldName::Object].value, "Kerkstraat 1");
        assert!(diag.is_empty());
    }

    #[test]
    fn test_skips_fields_covered_by_stronger_candidates() {
        let extractor = EntityExtractor::new(Box::new(FixedNer(vec![
            entity(EntityType::Person, "Piet Bakker", 0.6),
            entity(EntityType::Location, "Kerkstraat 1", 0.75),
        ])));
        let existing = vec![Candidate::new(
            FieldName::Huurder,
            "Jan Jansen",
            Source::Pattern,
            1.0,
            0,
        )];
        let out = extractor.extract_page("", 0, &existing, &mut Diagnostics::new());

        assert!(!out.contains_key(&FieldName::Huurder));
        assert!(out.contains_key(&FieldName::Object));
    }

    #[test]
    fn test_backend_failure_degrades_to_empty() {
        let extractor = EntityExtractor::new(Box::new(BrokenNer));
        let mut diag = Diagnostics::new();
        let out = extractor.extract_page("Huurder: Jan", 3, &[], &mut diag);

        assert!(out.is_empty());
        assert_eq!(diag.count(DiagnosticKind::NerFailure), 1);
        assert_eq!(diag.events()[0].page, Some(3));
    }

    #[test]
    fn test_default_backend_on_contract_text() {
        let extractor = EntityExtractor::default();
        let out = extractor.extract_page(
            "De woning aan de Kerkstraat 12, 1017 GM Amsterdam wordt verhuurd aan mevrouw Anna de Wit.",
            0,
            &[],
            &mut Diagnostics::new(),
        );
        assert_eq!(out[&FieldName::Huurder].value, "Anna de Wit");
        assert_eq!(out[&FieldName::Object].value, "Kerkstraat 12, 1017 GM Amsterdam");
        assert_eq!(extractor.backend_id(), "regex");
    }
}
