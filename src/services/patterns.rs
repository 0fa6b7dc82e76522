//! Field schema and the ordered-pattern extractor.
//!
//! Each field carries a list of patterns layered from explicit labels
//! (`Huurder: X`) to loose contract phrasing (`..., hierna te noemen
//! huurder`). The first pattern that matches wins. All patterns are
//! case-insensitive and confined to a single line.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Candidate, FieldDefinition, FieldName, Source};
use crate::ocr::PageText;

/// Amount token: optional currency marker followed by digits and separators.
/// Ends on a digit or `,-` so sentence punctuation stays outside the capture.
const AMOUNT: &str = r"((?:€|eur\b)?[ \t]*\d(?:[\d.,]*\d)?(?:,-)?)";

/// Amount token for unlabelled phrasing: needs a currency marker or decimal
/// cents, so counts such as "12 maanden" do not read as rent.
const MARKED_AMOUNT: &str =
    r"((?:€|eur\b)[ \t]*\d(?:[\d.,]*\d)?(?:,-)?|\d[\d.]*,(?:\d{2}\b|-))";

/// Numeric or spelled-out Dutch date.
const DATE: &str = r"(\d{1,2}[-/.]\d{1,2}[-/.]\d{4}|\d{1,2}[ \t]+(?:januari|februari|maart|april|mei|juni|juli|augustus|september|oktober|november|december)[ \t]+\d{4})";

/// Opening and closing quote characters seen around party labels.
const OPEN_QUOTE: &str = r#"["'‘“]?"#;
const CLOSE_QUOTE: &str = r#"["'’”]?"#;

fn compile(pattern: &str) -> Regex {
    Regex::new(&format!("(?im){}", pattern)).expect("field pattern should compile")
}

/// Patterns for a contract party (`verhuurder` or `huurder`).
fn party_patterns(label: &str) -> Vec<Regex> {
    vec![
        compile(&format!(r"^[ \t]*{label}[ \t]*:[ \t]*(.+)$")),
        compile(&format!(
            r"hierna[ \t]+(?:te[ \t]+noemen|genoemd)[ \t]+(?:de[ \t]+)?{OPEN_QUOTE}\b{label}\b{CLOSE_QUOTE}[ \t]*:[ \t]*(.+)$"
        )),
        compile(&format!(
            r"^[ \t]*(.+?)[ \t]*,?[ \t]+hierna[ \t]+(?:te[ \t]+noemen|genoemd)[ \t]*:?[ \t]*{OPEN_QUOTE}(?:de[ \t]+)?\b{label}\b"
        )),
    ]
}

static SCHEMA: LazyLock<Vec<FieldDefinition>> = LazyLock::new(|| {
    vec![
        FieldDefinition::new(FieldName::Verhuurder, party_patterns("verhuurder")),
        FieldDefinition::new(FieldName::Huurder, party_patterns("huurder")),
        FieldDefinition::new(
            FieldName::Object,
            vec![
                compile(r"^[ \t]*object[ \t]*:[ \t]*(.+)$"),
                compile(r"^[ \t]*(?:adres[ \t]+(?:van[ \t]+)?)?(?:het[ \t]+)?gehuurde[ \t]*:[ \t]*(.+)$"),
                compile(
                    r"\bde[ \t]+woonruimte[ \t]+(?:gelegen[ \t]+)?(?:aan|op)[ \t]+(?:de[ \t]+)?(.+?)[ \t]*[,.]?[ \t]*$",
                ),
                compile(r"^[ \t]*adres[ \t]*:[ \t]*(.+)$"),
            ],
        ),
        FieldDefinition::new(
            FieldName::Huurprijs,
            vec![
                compile(&format!(
                    r"^[ \t]*huurprijs[ \t]+op[ \t]+maandbasis[ \t]*:[ \t]*{AMOUNT}"
                )),
                compile(&format!(
                    r"^[ \t]*(?:kale[ \t]+)?huur(?:prijs)?(?:[ \t]+per[ \t]+maand)?[ \t]*:[ \t]*{AMOUNT}"
                )),
                compile(&format!(
                    r"\bhuur(?:prijs)?\b[^\n]*?\b(?:bedraagt|van)[ \t]+{MARKED_AMOUNT}"
                )),
            ],
        ),
        FieldDefinition::new(
            FieldName::Huuringangsdatum,
            vec![
                compile(r"^[ \t]*huuringangsdatum[ \t]*:[ \t]*(.+)$"),
                compile(r"^[ \t]*(?:ingangsdatum|datum[ \t]+ingang)[ \t]*:[ \t]*(.+)$"),
                compile(&format!(
                    r"\b(?:gaat[ \t]+in[ \t]+op|ingaande|met[ \t]+ingang[ \t]+van)[ \t]+{DATE}"
                )),
            ],
        ),
        FieldDefinition::new(
            FieldName::Einddatum,
            vec![
                compile(r"^[ \t]*einddatum[ \t]*:[ \t]*(.+)$"),
                compile(&format!(r"\b(?:eindigt|loopt[ \t]+af)[ \t]+op[ \t]+{DATE}")),
                compile(&format!(r"\btot[ \t]+en[ \t]+met[ \t]+{DATE}")),
            ],
        ),
    ]
});

/// The process-wide field schema, in schema order.
pub fn schema() -> &'static [FieldDefinition] {
    &SCHEMA
}

/// Definition of a single field.
pub fn definition(name: FieldName) -> &'static FieldDefinition {
    SCHEMA
        .iter()
        .find(|d| d.name == name)
        .expect("every field has a definition")
}

/// A successful pattern match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub value: String,
    /// Byte offset of the captured value in the searched text.
    pub start: usize,
    /// Index of the pattern that matched within the field's list.
    pub pattern_index: usize,
}

/// Try the field's patterns in order and return the first usable match.
///
/// A pattern whose capture is blank after trimming counts as no match.
pub fn find_first(definition: &FieldDefinition, text: &str) -> Option<PatternMatch> {
    definition
        .patterns
        .iter()
        .enumerate()
        .find_map(|(pattern_index, pattern)| {
            pattern.captures_iter(text).find_map(|caps| {
                let m = caps.get(1)?;
                let value = clean_value(m.as_str());
                if value.is_empty() {
                    None
                } else {
                    Some(PatternMatch {
                        value,
                        start: m.start(),
                        pattern_index,
                    })
                }
            })
        })
}

fn clean_value(raw: &str) -> String {
    raw.trim()
        .trim_end_matches([',', ';'])
        .trim_end()
        .to_string()
}

/// Runs every field definition over page text.
pub struct PatternExtractor {
    fields: &'static [FieldDefinition],
    /// Raw confidence for matches that fall inside the OCR layer.
    ocr_confidence: f32,
}

impl PatternExtractor {
    pub fn new(ocr_confidence: f32) -> Self {
        Self {
            fields: schema(),
            ocr_confidence,
        }
    }

    /// One candidate per field that matched on this page, in schema order.
    ///
    /// Matches located in the OCR layer are tagged [`Source::Ocr`].
    pub fn extract_page(&self, page: &PageText) -> Vec<Candidate> {
        let text = page.combined();
        let ocr_offset = page.ocr_offset();

        self.fields
            .iter()
            .filter_map(|def| {
                let m = find_first(def, &text)?;
                let (source, confidence) = match ocr_offset {
                    Some(offset) if m.start >= offset => (Source::Ocr, self.ocr_confidence),
                    _ => (Source::Pattern, 1.0),
                };
                tracing::debug!(
                    "page {}: {} matched pattern #{} ({})",
                    page.index + 1,
                    def.name,
                    m.pattern_index,
                    source
                );
                Some(Candidate::new(def.name, m.value, source, confidence, page.index))
            })
            .collect()
    }
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_OCR_CONFIDENCE)
    }
}
