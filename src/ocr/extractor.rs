//! Text acquisition: embedded text layer plus OCR of embedded images.

use serde::Serialize;

use crate::document::{DocumentSource, EmbeddedImage};
use crate::services::diagnostics::{DiagnosticKind, Diagnostics};

use super::backend::{OcrBackend, OcrError};
use super::preprocess::{self, ImageDecodeError};

/// Text of one page, split by origin.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PageText {
    /// Zero-based page index.
    pub index: usize,
    /// The page's embedded text layer.
    pub embedded: String,
    /// OCR output of the page's images, one image per line block.
    pub ocr: String,
}

impl PageText {
    pub fn new(index: usize, embedded: String, ocr: String) -> Self {
        Self {
            index,
            embedded,
            ocr,
        }
    }

    /// Embedded text followed by OCR text, newline-separated.
    pub fn combined(&self) -> String {
        match (self.embedded.is_empty(), self.ocr.is_empty()) {
            (_, true) => self.embedded.clone(),
            (true, false) => self.ocr.clone(),
            (false, false) => format!("{}\n{}", self.embedded, self.ocr),
        }
    }

    /// Byte offset in [`PageText::combined`] where OCR text starts.
    pub fn ocr_offset(&self) -> Option<usize> {
        if self.ocr.is_empty() {
            None
        } else if self.embedded.is_empty() {
            Some(0)
        } else {
            Some(self.embedded.len() + 1)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.embedded.trim().is_empty() && self.ocr.trim().is_empty()
    }
}

/// Produces per-page text for a document.
///
/// OCR is optional: without a backend only the embedded text layer is read.
pub struct TextExtractor {
    ocr: Option<Box<dyn OcrBackend>>,
    denoise_radius: u32,
}

impl TextExtractor {
    pub fn new(ocr: Option<Box<dyn OcrBackend>>, denoise_radius: u32) -> Self {
        Self {
            ocr,
            denoise_radius,
        }
    }

    /// Embedded text only.
    pub fn text_only() -> Self {
        Self::new(None, 0)
    }

    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }

    /// Extract every page in order.
    ///
    /// Never fails: unreadable page text, undecodable images and OCR errors
    /// are recorded in `diagnostics` and contribute empty text.
    pub fn extract_pages(
        &self,
        document: &dyn DocumentSource,
        diagnostics: &mut Diagnostics,
    ) -> Vec<PageText> {
        let mut ocr = self.ocr.as_deref();
        if let Some(backend) = ocr {
            if !backend.is_available() {
                diagnostics.record(
                    DiagnosticKind::OcrUnavailable,
                    None,
                    format!("{}: {}", backend.backend_type(), backend.availability_hint()),
                );
                ocr = None;
            }
        }

        let page_count = document.page_count();
        let mut pages = Vec::with_capacity(page_count);
        for index in 0..page_count {
            let embedded = match document.page_text(index) {
                Ok(text) => text,
                Err(e) => {
                    diagnostics.record(DiagnosticKind::PageTextUnavailable, Some(index), e.to_string());
                    String::new()
                }
            };

            let ocr_text = match ocr {
                Some(backend) => match self.ocr_page(backend, document, index, diagnostics) {
                    Ok(text) => text,
                    Err(OcrError::BackendNotAvailable(hint)) => {
                        // Stop trying for the rest of the document.
                        diagnostics.record(DiagnosticKind::OcrUnavailable, Some(index), hint);
                        ocr = None;
                        String::new()
                    }
                    Err(e) => {
                        diagnostics.record(DiagnosticKind::OcrFailure, Some(index), e.to_string());
                        String::new()
                    }
                },
                None => String::new(),
            };

            tracing::debug!(
                "page {}: {} embedded chars, {} OCR chars",
                index + 1,
                embedded.len(),
                ocr_text.len()
            );
            pages.push(PageText::new(index, embedded, ocr_text));
        }
        pages
    }

    /// OCR every image on a page and join the results.
    ///
    /// Per-image failures are recorded and skipped; only an unavailable
    /// backend is returned as an error.
    fn ocr_page(
        &self,
        backend: &dyn OcrBackend,
        document: &dyn DocumentSource,
        index: usize,
        diagnostics: &mut Diagnostics,
    ) -> Result<String, OcrError> {
        let images = match document.page_images(index) {
            Ok(images) => images,
            Err(e) => {
                diagnostics.record(DiagnosticKind::ImageDecodeFailure, Some(index), e.to_string());
                return Ok(String::new());
            }
        };

        let mut texts = Vec::new();
        for image in &images {
            if preprocess::is_decoration(image.width, image.height) {
                tracing::debug!(
                    "page {}: skipping {}x{} image {}",
                    index + 1,
                    image.width,
                    image.height,
                    image.name
                );
                continue;
            }

            let prepared = match self.prepare(image) {
                Ok(prepared) => prepared,
                Err(ImageDecodeError::Unsupported(what)) => {
                    diagnostics.record(
                        DiagnosticKind::UnsupportedImage,
                        Some(index),
                        format!("{}: {}", image.name, what),
                    );
                    continue;
                }
                Err(e) => {
                    diagnostics.record(
                        DiagnosticKind::ImageDecodeFailure,
                        Some(index),
                        format!("{}: {}", image.name, e),
                    );
                    continue;
                }
            };

            match backend.ocr_gray(&prepared) {
                Ok(result) => {
                    tracing::debug!(
                        "page {}: {} OCR of {} took {}ms",
                        index + 1,
                        result.backend,
                        image.name,
                        result.processing_time_ms
                    );
                    let text = result.text.trim();
                    if !text.is_empty() {
                        texts.push(text.to_string());
                    }
                }
                Err(e @ OcrError::BackendNotAvailable(_)) => return Err(e),
                Err(e) => diagnostics.record(
                    DiagnosticKind::OcrFailure,
                    Some(index),
                    format!("{}: {}", image.name, e),
                ),
            }
        }

        Ok(texts.join("\n"))
    }

    fn prepare(&self, image: &EmbeddedImage) -> Result<image::GrayImage, ImageDecodeError> {
        let decoded = preprocess::decode(image)?;
        Ok(preprocess::preprocess(&decoded, self.denoise_radius))
    }
}
