//! End-to-end extraction: document in, field set and issues out.
//!
//! Pages are processed in order. For each page the pattern extractor runs
//! first and the entity extractor second, so pattern candidates precede
//! entity candidates from the same page when reconciliation breaks ties.

use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::Settings;
use crate::document::{DocumentError, DocumentSource, PdfDocument};
use crate::models::{Candidate, FieldSet, ValidationIssue};
use crate::ocr::{create_backend, PageText, TextExtractor};

use super::contract::ContractValidator;
use super::diagnostics::Diagnostics;
use super::entities::EntityExtractor;
use super::patterns::PatternExtractor;
use super::reconcile::Reconciler;
use super::report::render_report;

/// Result of processing one document.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub fields: FieldSet,
    pub issues: Vec<ValidationIssue>,
    pub page_count: usize,
    /// SHA-256 of the input bytes, when processed from bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    pub diagnostics: Diagnostics,
}

impl Extraction {
    /// Plain-text analysis report.
    pub fn report(&self) -> String {
        render_report(&self.fields, &self.issues)
    }
}

/// Hex SHA-256 digest of document bytes.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Wires text acquisition, both extractors, reconciliation and contract
/// validation together. Holds no per-document state.
pub struct ExtractionPipeline {
    text: TextExtractor,
    patterns: PatternExtractor,
    entities: EntityExtractor,
    reconciler: Reconciler,
    validator: ContractValidator,
}

impl ExtractionPipeline {
    pub fn new(
        text: TextExtractor,
        patterns: PatternExtractor,
        entities: EntityExtractor,
        reconciler: Reconciler,
        validator: ContractValidator,
    ) -> Self {
        Self {
            text,
            patterns,
            entities,
            reconciler,
            validator,
        }
    }

    /// Build a pipeline from effective settings.
    ///
    /// An OCR backend that cannot be constructed disables OCR with a warning;
    /// one that is merely not installed is reported per document instead.
    pub fn from_settings(settings: &Settings) -> Self {
        let ocr = if settings.ocr_enabled {
            match create_backend(settings.ocr_backend, settings.ocr_config()) {
                Ok(backend) => Some(backend),
                Err(e) => {
                    tracing::warn!("OCR disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self::new(
            TextExtractor::new(ocr, settings.denoise_radius),
            PatternExtractor::new(settings.ocr_confidence),
            EntityExtractor::default(),
            Reconciler::new(settings.reconcile_policy),
            ContractValidator::new(settings.low_confidence_threshold),
        )
    }

    pub fn has_ocr(&self) -> bool {
        self.text.has_ocr()
    }

    /// Process a PDF file.
    pub fn process_path(&self, path: &Path) -> Result<Extraction, DocumentError> {
        let bytes = std::fs::read(path).map_err(|e| {
            DocumentError::Unreadable(format!("Failed to read {}: {}", path.display(), e))
        })?;
        self.process_bytes(&bytes)
    }

    /// Process PDF bytes. Fails only when the bytes are not a readable PDF.
    pub fn process_bytes(&self, bytes: &[u8]) -> Result<Extraction, DocumentError> {
        let document = PdfDocument::from_bytes(bytes)?;
        let mut extraction = self.process_document(&document);
        extraction.fingerprint = Some(fingerprint(bytes));
        Ok(extraction)
    }

    /// Process any document handle. Never fails; degraded steps end up in
    /// the returned diagnostics.
    pub fn process_document(&self, document: &dyn DocumentSource) -> Extraction {
        let mut diagnostics = Diagnostics::new();
        let page_count = document.page_count();
        tracing::info!("Extracting fields from {} page(s)", page_count);

        let pages = self.text.extract_pages(document, &mut diagnostics);
        let candidates = self.collect_candidates(&pages, &mut diagnostics);
        tracing::debug!(
            "{} candidate(s) before reconciliation ({} policy)",
            candidates.len(),
            self.reconciler.policy()
        );

        let fields = self.reconciler.reconcile(&candidates, page_count, &mut diagnostics);
        let issues = self.validator.validate(&fields);
        tracing::info!(
            "Found {} of {} field(s), {} issue(s)",
            fields.iter().filter(|(_, v)| v.is_found()).count(),
            fields.iter().count(),
            issues.len()
        );

        Extraction {
            fields,
            issues,
            page_count,
            fingerprint: None,
            diagnostics,
        }
    }

    fn collect_candidates(&self, pages: &[PageText], diagnostics: &mut Diagnostics) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for page in pages {
            if page.is_empty() {
                continue;
            }
            let from_patterns = self.patterns.extract_page(page);
            let from_entities =
                self.entities
                    .extract_page(&page.combined(), page.index, &from_patterns, diagnostics);
            candidates.extend(from_patterns);
            candidates.extend(from_entities.into_values());
        }
        candidates
    }
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}
