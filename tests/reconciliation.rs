//! Reconciliation and validation properties over hand-built candidates.

use huurscan::models::{Candidate, FieldName, FieldSet, FieldValue, IssueKind, Source, ValueKind};
use huurscan::services::validation::validate;
use huurscan::services::{ContractValidator, DiagnosticKind, Diagnostics, ReconcilePolicy, Reconciler};

fn reconcile(candidates: &[Candidate], page_count: usize) -> FieldSet {
    Reconciler::default().reconcile(candidates, page_count, &mut Diagnostics::new())
}

#[test]
fn test_unmatched_fields_are_sentinels() {
    let fields = reconcile(
        &[Candidate::new(FieldName::Huurder, "Jan Jansen", Source::Pattern, 1.0, 0)],
        1,
    );
    for (name, value) in fields.iter() {
        if name == FieldName::Huurder {
            assert!(value.is_found());
        } else {
            assert_eq!(*value, FieldValue::NotFound, "{}", name);
        }
    }
}

#[test]
fn test_reconcile_is_idempotent() {
    let candidates = vec![
        Candidate::new(FieldName::Huurprijs, "950,00", Source::Ocr, 0.9, 1),
        Candidate::new(FieldName::Huurder, "Jan Jansen", Source::Entity, 0.6, 0),
        Candidate::new(FieldName::Huurder, "P. Bakker", Source::Pattern, 1.0, 2),
        Candidate::new(FieldName::Einddatum, "31-13-2024", Source::Pattern, 1.0, 0),
    ];
    assert_eq!(reconcile(&candidates, 3), reconcile(&candidates, 3));
}

#[test]
fn test_higher_confidence_wins_in_either_order() {
    let strong = Candidate::new(FieldName::Huurprijs, "900,00", Source::Ocr, 0.9, 0);
    let weak = Candidate::new(FieldName::Huurprijs, "1500,00", Source::Entity, 0.6, 1);

    let forward = reconcile(&[strong.clone(), weak.clone()], 2);
    assert_eq!(forward.value(FieldName::Huurprijs), Some("900,00"));

    // Strong candidate on the later page.
    let strong_late = Candidate { page: 1, ..strong };
    let weak_early = Candidate { page: 0, ..weak };
    let backward = reconcile(&[weak_early, strong_late], 2);
    assert_eq!(backward.value(FieldName::Huurprijs), Some("900,00"));
}

#[test]
fn test_tie_keeps_earliest_page() {
    let late = Candidate::new(FieldName::Verhuurder, "Woonstichting Noord", Source::Pattern, 1.0, 2);
    let early = Candidate::new(FieldName::Verhuurder, "Woonstichting Zuid", Source::Pattern, 1.0, 0);

    let fields = reconcile(&[late, early], 3);
    let winner = fields.candidate(FieldName::Verhuurder).unwrap();
    assert_eq!(winner.value, "Woonstichting Zuid");
    assert_eq!(winner.page, 0);
}

#[test]
fn test_source_priority_policy() {
    let entity = Candidate::new(FieldName::Huurder, "Jan Jansen", Source::Entity, 0.85, 0);
    let pattern = Candidate::new(FieldName::Huurder, "J. Jansen", Source::Pattern, 0.5, 1);
    let candidates = [entity, pattern];

    let by_confidence = reconcile(&candidates, 2);
    assert_eq!(by_confidence.value(FieldName::Huurder), Some("Jan Jansen"));

    let by_source = Reconciler::new(ReconcilePolicy::SourcePriority).reconcile(
        &candidates,
        2,
        &mut Diagnostics::new(),
    );
    assert_eq!(by_source.value(FieldName::Huurder), Some("J. Jansen"));
}

#[test]
fn test_invalid_and_out_of_range_candidates() {
    let mut diagnostics = Diagnostics::new();
    let fields = Reconciler::default().reconcile(
        &[
            Candidate::new(FieldName::Huurprijs, "abc", Source::Pattern, 1.0, 0),
            Candidate::new(FieldName::Huurprijs, "1.250,00", Source::Entity, 0.4, 0),
            Candidate::new(FieldName::Object, "Dorpsstraat 1", Source::Pattern, 1.0, 5),
        ],
        2,
        &mut diagnostics,
    );

    // The invalid amount gives way to a weaker valid one.
    assert_eq!(fields.value(FieldName::Huurprijs), Some("1.250,00"));
    assert!(!fields.get(FieldName::Object).is_found());
    assert_eq!(diagnostics.count(DiagnosticKind::CandidateRejected), 1);
    assert_eq!(diagnostics.count(DiagnosticKind::CandidateOutOfRange), 1);
}

#[test]
fn test_currency_validation() {
    for raw in ["1500,00", "1500.00"] {
        let check = validate(ValueKind::Amount, raw);
        assert!(check.valid, "{}", raw);
        assert_eq!(check.confidence, 1.0);
    }
    assert!(!validate(ValueKind::Amount, "abc").valid);
}

#[test]
fn test_date_order_issue() {
    let dated = |start: &str, end: &str| {
        reconcile(
            &[
                Candidate::new(FieldName::Huuringangsdatum, start, Source::Pattern, 1.0, 0),
                Candidate::new(FieldName::Einddatum, end, Source::Pattern, 1.0, 0),
            ],
            1,
        )
    };
    let count = |fields: &FieldSet| {
        ContractValidator::default()
            .validate(fields)
            .iter()
            .filter(|i| i.kind == IssueKind::EndBeforeStart)
            .count()
    };

    assert_eq!(count(&dated("01-01-2024", "01-01-2023")), 1);
    assert_eq!(count(&dated("01-01-2023", "01-01-2024")), 0);
}

#[test]
fn test_low_confidence_issue() {
    let fields = reconcile(
        &[Candidate::new(FieldName::Object, "Utrecht", Source::Entity, 0.6, 0)],
        1,
    );
    let issues = ContractValidator::new(0.7).validate(&fields);
    let low: Vec<_> = issues
        .iter()
        .filter(|i| i.kind == IssueKind::LowConfidence)
        .collect();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].fields, vec![FieldName::Object]);
    assert_eq!(low[0].message, "Lage betrouwbaarheid voor Object: 60%");
}
