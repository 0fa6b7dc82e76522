//! Contract Validator: completeness and date consistency of a field set.

use crate::models::{FieldName, FieldSet, IssueKind, ValidationIssue};

use super::validation::parse_date;

/// Present fields below this confidence are flagged.
pub const DEFAULT_LOW_CONFIDENCE_THRESHOLD: f32 = 0.7;

#[derive(Debug, Clone)]
pub struct ContractValidator {
    low_confidence_threshold: f32,
}

impl ContractValidator {
    pub fn new(low_confidence_threshold: f32) -> Self {
        Self {
            low_confidence_threshold,
        }
    }

    /// Report the issues of a completed field set, in check order:
    /// missing required fields, low confidence, then date consistency.
    pub fn validate(&self, fields: &FieldSet) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let missing: Vec<FieldName> = fields.missing().filter(|f| f.is_required()).collect();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|f| f.as_str()).collect();
            issues.push(ValidationIssue::new(
                IssueKind::MissingRequired,
                missing.clone(),
                format!("Ontbrekende verplichte velden: {}", names.join(", ")),
            ));
        }

        for (name, value) in fields.iter() {
            let Some(candidate) = value.candidate() else {
                continue;
            };
            if candidate.confidence < self.low_confidence_threshold {
                issues.push(ValidationIssue::new(
                    IssueKind::LowConfidence,
                    vec![name],
                    format!(
                        "Lage betrouwbaarheid voor {}: {:.0}%",
                        name,
                        candidate.confidence * 100.0
                    ),
                ));
            }
        }

        if let (Some(start), Some(end)) = (
            fields.value(FieldName::Huuringangsdatum),
            fields.value(FieldName::Einddatum),
        ) {
            let date_fields = vec![FieldName::Huuringangsdatum, FieldName::Einddatum];
            match (parse_date(start), parse_date(end)) {
                (Some(start_date), Some(end_date)) => {
                    if end_date <= start_date {
                        issues.push(ValidationIssue::new(
                            IssueKind::EndBeforeStart,
                            date_fields,
                            format!(
                                "Einddatum ({}) ligt niet na de huuringangsdatum ({})",
                                end, start
                            ),
                        ));
                    }
                }
                _ => issues.push(ValidationIssue::new(
                    IssueKind::UnparseableDates,
                    date_fields,
                    format!(
                        "Datums konden niet worden vergeleken (huuringangsdatum '{}', einddatum '{}')",
                        start, end
                    ),
                )),
            }
        }

        issues
    }
}

impl Default for ContractValidator {
    fn default() -> Self {
        Self::new(DEFAULT_LOW_CONFIDENCE_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, Source};
    use crate::services::diagnostics::Diagnostics;
    use crate::services::reconcile::Reconciler;

    fn field_set(candidates: &[Candidate]) -> FieldSet {
        Reconciler::default().reconcile(candidates, 1, &mut Diagnostics::new())
    }

    fn complete(start: &str, end: &str) -> Vec<Candidate> {
        vec![
            Candidate::new(FieldName::Verhuurder, "Woonstichting De Linie", Source::Pattern, 1.0, 0),
            Candidate::new(FieldName::Huurder, "Jan Jansen", Source::Pattern, 1.0, 0),
            Candidate::new(FieldName::Object, "Kerkstraat 12", Source::Pattern, 1.0, 0),
            Candidate::new(FieldName::Huurprijs, "1500,00", Source::Pattern, 1.0, 0),
            Candidate::new(FieldName::Huuringangsdatum, start, Source::Pattern, 1.0, 0),
            Candidate::new(FieldName::Einddatum, end, Source::Pattern, 1.0, 0),
        ]
    }

    #[test]
    fn test_empty_field_set_reports_five_missing() {
        let issues = ContractValidator::default().validate(&FieldSet::empty());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::MissingRequired);
        assert_eq!(
            issues[0].fields,
            vec![
                FieldName::Verhuurder,
                FieldName::Huurder,
                FieldName::Object,
                FieldName::Huurprijs,
                FieldName::Huuringangsdatum,
            ]
        );
    }

    #[test]
    fn test_end_before_start() {
        let issues =
            ContractValidator::default().validate(&field_set(&complete("01-01-2024", "01-01-2023")));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::EndBeforeStart);

        let swapped =
            ContractValidator::default().validate(&field_set(&complete("01-01-2023", "01-01-2024")));
        assert!(swapped.is_empty());
    }

    #[test]
    fn test_equal_dates_are_inconsistent() {
        let issues =
            ContractValidator::default().validate(&field_set(&complete("01-07-2024", "01-07-2024")));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::EndBeforeStart);
    }

    #[test]
    fn test_unparseable_dates_are_a_separate_issue() {
        // Built directly: the reconciler would reject an unparseable date.
        let mut fields = field_set(&complete("01-07-2024", "30-06-2025"));
        fields.set(Candidate::new(
            FieldName::Einddatum,
            "30 juni 2025",
            Source::Pattern,
            1.0,
            0,
        ));
        let issues = ContractValidator::default().validate(&fields);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::UnparseableDates);
    }

    #[test]
    fn test_low_confidence_one_issue_per_field() {
        let mut candidates = complete("01-07-2024", "30-06-2025");
        candidates[1] = Candidate::new(FieldName::Huurder, "Jan Jansen", Source::Entity, 0.6, 0);
        candidates[2] = Candidate::new(FieldName::Object, "Kerkstraat 12", Source::Entity, 0.65, 0);

        let issues = ContractValidator::default().validate(&field_set(&candidates));
        let low: Vec<_> = issues
            .iter()
            .filter(|i| i.kind == IssueKind::LowConfidence)
            .collect();
        assert_eq!(low.len(), 2);
        assert_eq!(low[0].fields, vec![FieldName::Huurder]);
        assert_eq!(low[1].fields, vec![FieldName::Object]);
    }

    #[test]
    fn test_missing_end_date_is_fine() {
        let mut candidates = complete("01-07-2024", "30-06-2025");
        candidates.pop();
        let issues = ContractValidator::default().validate(&field_set(&candidates));
        assert!(issues.is_empty());
    }
}
