//! OCR and text acquisition.
//!
//! Produces per-page text from a document using:
//! - the document's embedded text layer
//! - Tesseract OCR on embedded raster images (default)
//! - OCRS for pure-Rust OCR (feature: ocr-ocrs)
//!
//! Images are normalized (grayscale, Otsu binarization, median denoise)
//! before they reach an OCR backend.

mod backend;
mod extractor;
mod model_utils;
pub mod preprocess;
mod tesseract;

#[cfg(feature = "ocr-ocrs")]
mod ocrs_backend;

pub use backend::{create_backend, OcrBackend, OcrBackendType, OcrConfig, OcrError, OcrResult};
pub use extractor::{PageText, TextExtractor};
pub use model_utils::{check_binary, find_binary};
pub use preprocess::ImageDecodeError;
pub use tesseract::TesseractBackend;

#[cfg(feature = "ocr-ocrs")]
pub use ocrs_backend::OcrsBackend;
