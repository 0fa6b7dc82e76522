//! Document handles: page text and embedded raster images.
//!
//! The extraction core only needs page count, per-page text and per-page
//! images, so everything else about the container format stays behind
//! [`DocumentSource`].

mod pdf;

pub use pdf::PdfDocument;

use thiserror::Error;

/// Errors from reading a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The input is not a document we can parse at all.
    #[error("Document unreadable: {0}")]
    Unreadable(String),

    #[error("Page {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    /// Text or resources of a single page could not be read.
    #[error("Page {page}: {message}")]
    PageText { page: usize, message: String },
}

/// Color layout of raw image samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawColor {
    Gray,
    Rgb,
    Cmyk,
}

impl RawColor {
    pub fn channels(&self) -> usize {
        match self {
            RawColor::Gray => 1,
            RawColor::Rgb => 3,
            RawColor::Cmyk => 4,
        }
    }
}

/// Pixel payload of an embedded image.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageData {
    /// A complete encoded image file (JPEG, JPEG 2000, PNG, ...).
    Encoded(Vec<u8>),
    /// Uncompressed 8-bit samples, row-major.
    Raw { color: RawColor, samples: Vec<u8> },
    /// An encoding we do not decode; carries the filter or color space name.
    Unsupported(String),
}

/// A raster image placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    /// Resource name of the image on its page (e.g. `Im0`).
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub data: ImageData,
}

/// Read-only access to a paged document.
///
/// Page indices are zero-based.
pub trait DocumentSource {
    fn page_count(&self) -> usize;

    /// Embedded text layer of a page.
    fn page_text(&self, index: usize) -> Result<String, DocumentError>;

    /// Raster images embedded on a page, in resource order.
    fn page_images(&self, index: usize) -> Result<Vec<EmbeddedImage>, DocumentError>;
}
