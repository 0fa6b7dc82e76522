//! Reconciliation Engine: picks one winning candidate per field.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{Candidate, FieldName, FieldSet};

use super::diagnostics::{DiagnosticKind, Diagnostics};
use super::validation::validate;

/// How conflicts between candidates for the same field are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReconcilePolicy {
    /// Strictly higher confidence replaces; ties keep the earlier candidate.
    #[default]
    Confidence,
    /// Higher-priority source replaces outright; confidence decides within
    /// the same source.
    SourcePriority,
}

impl ReconcilePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcilePolicy::Confidence => "confidence",
            ReconcilePolicy::SourcePriority => "source-priority",
        }
    }

    /// Whether `challenger` replaces the running best `current`.
    fn replaces(&self, current: &Candidate, challenger: &Candidate) -> bool {
        match self {
            ReconcilePolicy::Confidence => challenger.confidence > current.confidence,
            ReconcilePolicy::SourcePriority => {
                let (cur, new) = (current.source.priority(), challenger.source.priority());
                new > cur || (new == cur && challenger.confidence > current.confidence)
            }
        }
    }
}

impl fmt::Display for ReconcilePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReconcilePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "confidence" => Ok(ReconcilePolicy::Confidence),
            "source-priority" | "source" | "priority" => Ok(ReconcilePolicy::SourcePriority),
            other => Err(format!("unknown reconcile policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    policy: ReconcilePolicy,
}

impl Reconciler {
    pub fn new(policy: ReconcilePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    /// Merge all candidates of a document into a field set.
    ///
    /// Candidates are visited by ascending page; within a page their input
    /// order is kept, so earlier pages and earlier extractors win ties.
    /// Each candidate is validated for its field kind and its confidence
    /// capped at the validator's score; invalid candidates are dropped.
    pub fn reconcile(
        &self,
        candidates: &[Candidate],
        page_count: usize,
        diagnostics: &mut Diagnostics,
    ) -> FieldSet {
        let mut ordered: Vec<&Candidate> = candidates.iter().collect();
        // Stable sort keeps the within-page order.
        ordered.sort_by_key(|c| c.page);

        let mut best: BTreeMap<FieldName, Candidate> = BTreeMap::new();

        for candidate in ordered {
            if candidate.page >= page_count {
                diagnostics.record(
                    DiagnosticKind::CandidateOutOfRange,
                    Some(candidate.page),
                    format!(
                        "{} candidate '{}' on page {} of a {}-page document",
                        candidate.field,
                        candidate.value,
                        candidate.page + 1,
                        page_count
                    ),
                );
                continue;
            }

            let check = validate(candidate.field.kind(), &candidate.value);
            if !check.valid {
                diagnostics.record(
                    DiagnosticKind::CandidateRejected,
                    Some(candidate.page),
                    format!(
                        "{} value '{}' from {} is not a valid {}",
                        candidate.field,
                        candidate.value,
                        candidate.source,
                        candidate.field.kind().as_str()
                    ),
                );
                continue;
            }

            let scored = candidate.capped(check.confidence);
            let take = match best.get(&scored.field) {
                Some(current) => self.policy.replaces(current, &scored),
                None => true,
            };
            if take {
                best.insert(scored.field, scored);
            }
        }

        let mut set = FieldSet::empty();
        for winner in best.into_values() {
            tracing::debug!(
                "{} = '{}' ({} {:.2}, page {})",
                winner.field,
                winner.value,
                winner.source,
                winner.confidence,
                winner.page + 1
            );
            set.set(winner);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldValue, Source};

    fn prijs(value: &str, source: Source, confidence: f32, page: usize) -> Candidate {
        Candidate::new(FieldName::Huurprijs, value, source, confidence, page)
    }

    fn run(candidates: &[Candidate], pages: usize) -> (FieldSet, Diagnostics) {
        let mut diag = Diagnostics::new();
        let set = Reconciler::default().reconcile(candidates, pages, &mut diag);
        (set, diag)
    }

    #[test]
    fn test_unmatched_fields_get_sentinel() {
        let (set, _) = run(&[prijs("950,00", Source::Pattern, 1.0, 0)], 1);
        for (name, value) in set.iter() {
            if name == FieldName::Huurprijs {
                assert!(value.is_found());
            } else {
                assert_eq!(*value, FieldValue::NotFound);
            }
        }
    }

    #[test]
    fn test_higher_confidence_wins_in_either_order() {
        let strong = prijs("1200,00", Source::Ocr, 0.9, 0);
        let weak = prijs("800,00", Source::Entity, 0.6, 2);

        let (forward, _) = run(&[strong.clone(), weak.clone()], 3);
        assert_eq!(forward.value(FieldName::Huurprijs), Some("1200,00"));

        let strong_late = prijs("1200,00", Source::Ocr, 0.9, 2);
        let weak_early = prijs("800,00", Source::Entity, 0.6, 0);
        let (backward, _) = run(&[weak_early, strong_late], 3);
        assert_eq!(backward.value(FieldName::Huurprijs), Some("1200,00"));
        assert_eq!(backward.candidate(FieldName::Huurprijs).unwrap().page, 2);
    }

    #[test]
    fn test_tie_goes_to_earlier_page() {
        // Input order is reversed; page order must still decide.
        let (set, _) = run(
            &[
                prijs("700,00", Source::Pattern, 1.0, 2),
                prijs("650,00", Source::Pattern, 1.0, 0),
            ],
            3,
        );
        let winner = set.candidate(FieldName::Huurprijs).unwrap();
        assert_eq!(winner.value, "650,00");
        assert_eq!(winner.page, 0);
    }

    #[test]
    fn test_invalid_candidates_are_rejected() {
        let (set, diag) = run(
            &[
                prijs("abc", Source::Pattern, 1.0, 0),
                prijs("900,00", Source::Entity, 0.5, 1),
            ],
            2,
        );
        assert_eq!(set.value(FieldName::Huurprijs), Some("900,00"));
        assert_eq!(diag.count(DiagnosticKind::CandidateRejected), 1);
    }

    #[test]
    fn test_text_confidence_is_capped() {
        let (set, _) = run(
            &[Candidate::new(FieldName::Huurder, "Jan Jansen", Source::Pattern, 1.0, 0)],
            1,
        );
        assert_eq!(set.candidate(FieldName::Huurder).unwrap().confidence, 0.8);
    }

    #[test]
    fn test_out_of_range_pages_are_discarded() {
        let (set, diag) = run(&[prijs("900,00", Source::Pattern, 1.0, 4)], 2);
        assert!(!set.get(FieldName::Huurprijs).is_found());
        assert_eq!(diag.count(DiagnosticKind::CandidateOutOfRange), 1);
    }

    #[test]
    fn test_idempotent() {
        let candidates = vec![
            prijs("1200,00", Source::Ocr, 0.9, 1),
            prijs("800,00", Source::Entity, 0.6, 0),
            Candidate::new(FieldName::Huurder, "Jan", Source::Entity, 0.6, 0),
            Candidate::new(FieldName::Huurder, "Piet", Source::Pattern, 1.0, 1),
        ];
        let (first, _) = run(&candidates, 2);
        let (second, _) = run(&candidates, 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_source_priority_policy() {
        let candidates = vec![
            Candidate::new(FieldName::Object, "Kerkstraat 1", Source::Entity, 0.9, 0),
            Candidate::new(FieldName::Object, "Dorpsweg 2", Source::Ocr, 0.5, 1),
        ];
        let mut diag = Diagnostics::new();

        let by_confidence = Reconciler::new(ReconcilePolicy::Confidence)
            .reconcile(&candidates, 2, &mut diag);
        assert_eq!(by_confidence.value(FieldName::Object), Some("Kerkstraat 1"));

        let by_source = Reconciler::new(ReconcilePolicy::SourcePriority)
            .reconcile(&candidates, 2, &mut diag);
        assert_eq!(by_source.value(FieldName::Object), Some("Dorpsweg 2"));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "source_priority".parse::<ReconcilePolicy>().unwrap(),
            ReconcilePolicy::SourcePriority
        );
        assert_eq!(
            "Confidence".parse::<ReconcilePolicy>().unwrap(),
            ReconcilePolicy::Confidence
        );
        assert!("loudest".parse::<ReconcilePolicy>().is_err());
    }
}
