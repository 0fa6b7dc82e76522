//! Named Entity Recognition for Dutch rental contracts.
//!
//! Provides a `NerBackend` trait for pluggable extraction backends and a
//! built-in `RegexNerBackend` tuned for Dutch names and addresses.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from NER backends.
#[derive(Debug, Error)]
pub enum NerError {
    #[error("NER failed: {0}")]
    Failed(String),
}

/// Classification of extracted entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Person,
    Location,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Person => "person",
            EntityType::Location => "location",
        }
    }
}

/// A single recognized entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_type: EntityType,
    pub text: String,
    /// Recognizer score in [0, 1].
    pub confidence: f32,
    /// Byte offset of the entity in the input text.
    pub start: usize,
}

/// Trait for pluggable NER backends.
///
/// Implementations return entities in the order they were found.
pub trait NerBackend: Send + Sync {
    /// Human-readable backend identifier (e.g. "regex").
    fn backend_id(&self) -> &str;

    /// Extract named entities from text.
    fn extract(&self, text: &str) -> Result<Vec<Entity>, NerError>;
}

// ============================================================================
// RegexNerBackend: built-in, zero-model backend
// ============================================================================

/// Regex-based NER backend for Dutch contract text.
///
/// Recognizes person names (with or without an honorific) and street
/// addresses, postcodes and places. Confidence reflects how much context
/// supported the match.
pub struct RegexNerBackend;

impl RegexNerBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RegexNerBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NerBackend for RegexNerBackend {
    fn backend_id(&self) -> &str {
        "regex"
    }

    fn extract(&self, text: &str) -> Result<Vec<Entity>, NerError> {
        let mut seen = HashSet::new();
        let mut entities = Vec::new();

        extract_persons(text, &mut entities, &mut seen);
        extract_locations(text, &mut entities, &mut seen);

        Ok(entities)
    }
}

/// Extracts entities using the default `RegexNerBackend`.
pub fn extract_entities(text: &str) -> Vec<Entity> {
    RegexNerBackend.extract(text).unwrap_or_default()
}

const TITLED_PERSON_CONFIDENCE: f32 = 0.85;
const BARE_PERSON_CONFIDENCE: f32 = 0.6;
const FULL_ADDRESS_CONFIDENCE: f32 = 0.9;
const STREET_CONFIDENCE: f32 = 0.75;
const POSTCODE_CONFIDENCE: f32 = 0.6;

// ============================================================================
// Person name patterns
// ============================================================================

/// Dutch surname particles ("van", "de", "van der", ...).
const PARTICLES: &str = r"(?:van|de|der|den|ter|ten|te|het|in\s+'t|op\s+de|van\s+de|van\s+der|van\s+den)";

static TITLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:[Dd]e\s+heer|[Dd]hr\.|[Mm]evrouw|[Mm]evr\.|[Mm]w\.)\s+((?:[A-Z]\.\s?)*(?:{PARTICLES}\s+)?[A-Z][\p{{Ll}}]+(?:[\s-]+(?:{PARTICLES}\s+)?[A-Z][\p{{Ll}}]+)*)"
    ))
    .expect("title pattern should compile")
});

static CAPITALIZED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b([A-Z][\p{{Ll}}]+(?:[ \t]+(?:{PARTICLES}[ \t]+)?[A-Z][\p{{Ll}}]+)+)\b"
    ))
    .expect("capitalized name pattern should compile")
});

// Capitalized words that start sentences or label contract sections.
static NAME_STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "De", "Het", "Een", "Deze", "Dit", "Die", "Dat", "Wij", "Zij", "Partijen", "Artikel",
        "Huurder", "Verhuurder", "Huurders", "Object", "Huurprijs", "Huuringangsdatum",
        "Einddatum", "Ingangsdatum", "Huurovereenkomst", "Overeenkomst", "Woonruimte",
        "Gehuurde", "Datum", "Plaats", "Handtekening", "Bijlage", "Algemene", "Bepalingen",
        "Nederland", "Servicekosten", "Borg", "Waarborgsom", "Pagina",
    ]
    .into_iter()
    .collect()
});

// ============================================================================
// Location patterns
// ============================================================================

const STREET_SUFFIXES: &str =
    r"(?:straat|laan|weg|plein|gracht|kade|singel|dijk|dreef|hof|steeg|pad|markt|park|baan|straatweg|wal)";

static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b((?:[A-Z][\p{{L}}'-]+\s+)?[A-Z][\p{{L}}'-]*?{STREET_SUFFIXES}\s+\d+(?:[-\s]?[a-zA-Z]\b|[-\s]\d+)?)(\s*,?\s*\d{{4}}\s?[A-Z]{{2}}\s+[A-Z][\p{{L}}-]+(?:\s+[A-Z][\p{{L}}-]+)?)?"
    ))
    .expect("address pattern should compile")
});

static POSTCODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4}\s?[A-Z]{2}\s+[A-Z][\p{L}-]+)")
        .expect("postcode pattern should compile")
});

// ============================================================================
// Extraction helpers
// ============================================================================

fn push_entity(
    entities: &mut Vec<Entity>,
    seen: &mut HashSet<String>,
    entity_type: EntityType,
    text: &str,
    confidence: f32,
    start: usize,
) {
    let key = format!("{}:{}", entity_type.as_str(), text.to_lowercase());
    if seen.insert(key) {
        entities.push(Entity {
            entity_type,
            text: text.to_string(),
            confidence,
            start,
        });
    }
}

fn extract_persons(text: &str, entities: &mut Vec<Entity>, seen: &mut HashSet<String>) {
    for cap in TITLE_PATTERN.captures_iter(text) {
        if let Some(m) = cap.get(1) {
            let name = m.as_str().trim();
            push_entity(
                entities,
                seen,
                EntityType::Person,
                name,
                TITLED_PERSON_CONFIDENCE,
                m.start(),
            );
        }
    }

    for cap in CAPITALIZED_NAME.captures_iter(text) {
        if let Some(m) = cap.get(1) {
            let name = m.as_str().trim();
            if is_plausible_name(name) && !contains_stopword(name) && !looks_like_address(name)
            {
                push_entity(
                    entities,
                    seen,
                    EntityType::Person,
                    name,
                    BARE_PERSON_CONFIDENCE,
                    m.start(),
                );
            }
        }
    }
}

fn extract_locations(text: &str, entities: &mut Vec<Entity>, seen: &mut HashSet<String>) {
    for cap in ADDRESS_PATTERN.captures_iter(text) {
        let Some(street) = cap.get(1) else { continue };
        let (value, confidence) = match cap.get(2) {
            Some(place) => (
                format!("{}{}", street.as_str(), place.as_str()),
                FULL_ADDRESS_CONFIDENCE,
            ),
            None => (street.as_str().to_string(), STREET_CONFIDENCE),
        };
        push_entity(
            entities,
            seen,
            EntityType::Location,
            value.trim(),
            confidence,
            street.start(),
        );
        // Do not report the embedded postcode on its own later.
        if let Some(place) = cap.get(2) {
            seen.insert(format!(
                "{}:{}",
                EntityType::Location.as_str(),
                place.as_str().trim_start_matches([',', ' ']).trim().to_lowercase()
            ));
        }
    }

    for cap in POSTCODE_PATTERN.captures_iter(text) {
        if let Some(m) = cap.get(1) {
            push_entity(
                entities,
                seen,
                EntityType::Location,
                m.as_str().trim(),
                POSTCODE_CONFIDENCE,
                m.start(),
            );
        }
    }
}

fn is_plausible_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split_whitespace().collect();
    (2..=6).contains(&parts.len())
}

fn contains_stopword(name: &str) -> bool {
    name.split_whitespace().any(|w| NAME_STOPWORDS.contains(w))
}

static STREET_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i){STREET_SUFFIXES}$")).expect("street suffix pattern should compile")
});

fn looks_like_address(name: &str) -> bool {
    name.split_whitespace().any(|w| STREET_WORD.is_match(w))
}
