//! Field validation: type-appropriate syntax checks and confidence scores.
//!
//! Pure functions; no knowledge of where a value came from.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::ValueKind;

/// Confidence assigned to any free-text value.
pub const TEXT_CONFIDENCE: f32 = 0.8;

/// Canonical day-month-year notation used in contracts (`01-07-2024`).
pub const DATE_FORMAT: &str = "%d-%m-%Y";

static PLAIN_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?$").expect("decimal pattern should compile"));

/// Outcome of validating one raw value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Validation {
    pub valid: bool,
    /// Meaningful only when `valid`.
    pub confidence: f32,
}

impl Validation {
    fn valid(confidence: f32) -> Self {
        Self {
            valid: true,
            confidence,
        }
    }

    fn invalid() -> Self {
        Self {
            valid: false,
            confidence: 0.0,
        }
    }
}

/// Validate a raw candidate string for the given value kind.
pub fn validate(kind: ValueKind, raw: &str) -> Validation {
    match kind {
        ValueKind::Amount => match parse_amount(raw) {
            Some(_) => Validation::valid(1.0),
            None => Validation::invalid(),
        },
        ValueKind::Date => match parse_date(raw) {
            Some(_) => Validation::valid(1.0),
            None => Validation::invalid(),
        },
        ValueKind::Text => Validation::valid(TEXT_CONFIDENCE),
    }
}

/// Parse a euro amount as written in Dutch or English notation.
///
/// Accepts `1500,00`, `1500.00`, `€ 1.250,00`, `EUR 1,250.00` and `1250,-`.
/// When both separators appear the last one is the decimal separator; a
/// separator repeated several times is a thousands separator; a single
/// separator is a decimal separator.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let mut s: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();

    for prefix in ["€", "EUR", "eur", "Eur"] {
        if let Some(rest) = s.strip_prefix(prefix) {
            s = rest.to_string();
            break;
        }
    }
    for suffix in [",-", ".-", "€"] {
        if let Some(rest) = s.strip_suffix(suffix) {
            s = rest.to_string();
        }
    }

    let commas = s.matches(',').count();
    let periods = s.matches('.').count();
    let normalized = match (commas, periods) {
        (0, 0) => s,
        (c, p) if c > 0 && p > 0 => {
            let last_comma = s.rfind(',')?;
            let last_period = s.rfind('.')?;
            if last_comma > last_period {
                s.replace('.', "").replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
        (1, 0) => s.replace(',', "."),
        (0, 1) => s,
        _ => s.replace([',', '.'], ""),
    };

    if !PLAIN_DECIMAL.is_match(&normalized) {
        return None;
    }
    normalized.parse().ok()
}

/// Parse a date in the canonical `dd-mm-yyyy` format.
///
/// Spelled-out Dutch dates ("1 juli 2024") are not accepted.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}
