//! Append-only diagnostic sink for non-fatal extraction events.
//!
//! Components receive `&mut Diagnostics` instead of only logging, so callers
//! (and tests) can see every degraded step of a run. Each recorded event is
//! also emitted through `tracing`.

use serde::{Deserialize, Serialize};

/// Category of a non-fatal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// An embedded image could not be decoded or preprocessed.
    ImageDecodeFailure,
    /// An embedded image uses an encoding we do not decode (CCITT, JBIG2, ...).
    UnsupportedImage,
    /// The OCR backend failed on an image.
    OcrFailure,
    /// The OCR backend is not installed; OCR skipped for the document.
    OcrUnavailable,
    /// The NER backend failed on a page.
    NerFailure,
    /// The embedded text layer of a page could not be read.
    PageTextUnavailable,
    /// A candidate failed type validation and was discarded.
    CandidateRejected,
    /// A candidate referenced a page the document does not have.
    CandidateOutOfRange,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::ImageDecodeFailure => "image_decode_failure",
            DiagnosticKind::UnsupportedImage => "unsupported_image",
            DiagnosticKind::OcrFailure => "ocr_failure",
            DiagnosticKind::OcrUnavailable => "ocr_unavailable",
            DiagnosticKind::NerFailure => "ner_failure",
            DiagnosticKind::PageTextUnavailable => "page_text_unavailable",
            DiagnosticKind::CandidateRejected => "candidate_rejected",
            DiagnosticKind::CandidateOutOfRange => "candidate_out_of_range",
        }
    }

    /// Rejections are routine; everything else deserves a warning.
    fn is_routine(&self) -> bool {
        matches!(self, DiagnosticKind::CandidateRejected)
    }
}

/// A single recorded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Zero-based page index, when the event is page-specific.
    pub page: Option<usize>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    events: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: DiagnosticKind, page: Option<usize>, message: impl Into<String>) {
        let message = message.into();
        match (kind.is_routine(), page) {
            (true, Some(p)) => tracing::debug!("[{}] page {}: {}", kind.as_str(), p + 1, message),
            (true, None) => tracing::debug!("[{}] {}", kind.as_str(), message),
            (false, Some(p)) => tracing::warn!("[{}] page {}: {}", kind.as_str(), p + 1, message),
            (false, None) => tracing::warn!("[{}] {}", kind.as_str(), message),
        }
        self.events.push(Diagnostic {
            kind,
            page,
            message,
        });
    }

    pub fn events(&self) -> &[Diagnostic] {
        &self.events
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_order() {
        let mut diag = Diagnostics::new();
        diag.record(DiagnosticKind::OcrFailure, Some(0), "tesseract exited 1");
        diag.record(DiagnosticKind::CandidateRejected, Some(1), "abc");

        assert_eq!(diag.len(), 2);
        assert_eq!(diag.events()[0].kind, DiagnosticKind::OcrFailure);
        assert_eq!(diag.events()[1].page, Some(1));
        assert_eq!(diag.count(DiagnosticKind::CandidateRejected), 1);
    }

    #[test]
    fn test_serializes_as_list() {
        let mut diag = Diagnostics::new();
        diag.record(DiagnosticKind::NerFailure, None, "boom");
        let json = serde_json::to_value(&diag).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["kind"], "ner_failure");
    }
}
