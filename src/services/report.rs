//! Plain-text analysis report.

use std::fmt::Write;

use crate::models::{FieldSet, FieldValue, ValidationIssue};

/// Render the fixed-format analysis report.
///
/// One block per field in schema order, followed by the validation
/// issues if there are any. Page numbers are 1-based.
pub fn render_report(fields: &FieldSet, issues: &[ValidationIssue]) -> String {
    let mut out = String::from("Analyse huurovereenkomst\n\n");

    for (name, value) in fields.iter() {
        let _ = writeln!(out, "Veld: {}", name);
        match value {
            FieldValue::Found(c) => {
                let _ = writeln!(out, "Waarde: {}", c.value);
                let _ = writeln!(out, "Betrouwbaarheid: {}%", percent(c.confidence));
                let _ = writeln!(out, "Bron: {}", c.source);
                let _ = writeln!(out, "Pagina: {}", c.page + 1);
            }
            FieldValue::NotFound => {
                out.push_str("Waarde: niet gevonden\n");
                out.push_str("Betrouwbaarheid: -\n");
                out.push_str("Bron: -\n");
                out.push_str("Pagina: -\n");
            }
        }
        out.push('\n');
    }

    if !issues.is_empty() {
        out.push_str("Aandachtspunten:\n");
        for issue in issues {
            let _ = writeln!(out, "- {}", issue.message);
        }
    }

    out
}

fn percent(confidence: f32) -> u32 {
    (confidence * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, FieldName, IssueKind, Source};
    use crate::services::diagnostics::Diagnostics;
    use crate::services::reconcile::Reconciler;

    #[test]
    fn test_found_field_block() {
        let fields = Reconciler::default().reconcile(
            &[Candidate::new(FieldName::Huurprijs, "€ 1.250,00", Source::Pattern, 1.0, 1)],
            2,
            &mut Diagnostics::new(),
        );
        let report = render_report(&fields, &[]);

        assert!(report.starts_with("Analyse huurovereenkomst\n"));
        assert!(report.contains(
            "Veld: Huurprijs\nWaarde: € 1.250,00\nBetrouwbaarheid: 100%\nBron: pattern\nPagina: 2\n\n"
        ));
        assert!(!report.contains("Aandachtspunten"));
    }

    #[test]
    fn test_not_found_and_issues() {
        let issues = vec![ValidationIssue::new(
            IssueKind::MissingRequired,
            vec![FieldName::Huurder],
            "Ontbrekende verplichte velden: Huurder",
        )];
        let report = render_report(&FieldSet::empty(), &issues);

        assert!(report.contains(
            "Veld: Einddatum\nWaarde: niet gevonden\nBetrouwbaarheid: -\nBron: -\nPagina: -\n"
        ));
        assert_eq!(report.matches("Veld: ").count(), 6);
        assert!(report.ends_with("Aandachtspunten:\n- Ontbrekende verplichte velden: Huurder\n"));
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percent(0.8), 80);
        assert_eq!(percent(0.856), 86);
        assert_eq!(percent(0.0), 0);
    }
}
