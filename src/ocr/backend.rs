//! OCR backend abstraction.
//!
//! Supports two engines:
//! - Tesseract: traditional OCR via command-line (CPU)
//! - Ocrs: pure Rust OCR engine (CPU, feature `ocr-ocrs`)

use std::path::{Path, PathBuf};
use std::time::Instant;

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use thiserror::Error;

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(String),
}

/// Result of OCR processing.
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Extracted text content.
    pub text: String,
    /// Which backend produced this result.
    pub backend: OcrBackendType,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Available OCR backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackendType {
    /// Tesseract OCR via command-line.
    #[default]
    Tesseract,
    /// Pure Rust OCR engine (ocrs crate).
    Ocrs,
}

impl OcrBackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrBackendType::Tesseract => "tesseract",
            OcrBackendType::Ocrs => "ocrs",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tesseract" => Some(OcrBackendType::Tesseract),
            "ocrs" => Some(OcrBackendType::Ocrs),
            _ => None,
        }
    }
}

impl std::fmt::Display for OcrBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trait for OCR backends.
///
/// Calls are synchronous and may take arbitrarily long on pathological
/// images; callers that need a deadline impose it around the whole run.
pub trait OcrBackend: Send + Sync {
    /// Get the backend type.
    fn backend_type(&self) -> OcrBackendType;

    /// Check if this backend is available (binary installed, models present).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Core OCR: extract text from an image file.
    fn run_ocr(&self, image_path: &Path) -> Result<String, OcrError>;

    /// Run OCR on an image file, returning a timed result.
    fn ocr_image(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let text = self.run_ocr(image_path)?;
        Ok(OcrResult {
            text,
            backend: self.backend_type(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Run OCR on an in-memory grayscale image.
    ///
    /// The default writes a temporary PNG and calls [`OcrBackend::ocr_image`].
    fn ocr_gray(&self, image: &GrayImage) -> Result<OcrResult, OcrError> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("page-image.png");
        image
            .save(&path)
            .map_err(|e| OcrError::ImageError(format!("Failed to write image: {}", e)))?;
        self.ocr_image(&path)
    }
}

/// Configuration for OCR backends (language, model paths).
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Language for OCR (Tesseract language code, e.g. "nld").
    pub language: String,
    /// Path to model files (for backends that need them).
    pub model_path: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "nld".to_string(),
            model_path: None,
        }
    }
}

/// Build the backend for a backend type.
///
/// Fails with [`OcrError::BackendNotAvailable`] for engines not compiled in.
pub fn create_backend(
    backend_type: OcrBackendType,
    config: OcrConfig,
) -> Result<Box<dyn OcrBackend>, OcrError> {
    match backend_type {
        OcrBackendType::Tesseract => Ok(Box::new(super::TesseractBackend::with_config(config))),
        #[cfg(feature = "ocr-ocrs")]
        OcrBackendType::Ocrs => Ok(Box::new(super::OcrsBackend::with_config(config))),
        #[cfg(not(feature = "ocr-ocrs"))]
        OcrBackendType::Ocrs => {
            let _ = config;
            Err(OcrError::BackendNotAvailable(
                "ocrs support not compiled in (rebuild with --features ocr-ocrs)".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records the image it was given instead of recognizing anything.
    struct EchoBackend {
        seen: Mutex<Vec<(u32, u32)>>,
    }

    impl OcrBackend for EchoBackend {
        fn backend_type(&self) -> OcrBackendType {
            OcrBackendType::Tesseract
        }

        fn is_available(&self) -> bool {
            true
        }

        fn availability_hint(&self) -> String {
            "always".to_string()
        }

        fn run_ocr(&self, image_path: &Path) -> Result<String, OcrError> {
            let img = image::open(image_path).map_err(|e| OcrError::ImageError(e.to_string()))?;
            self.seen.lock().unwrap().push((img.width(), img.height()));
            Ok("Huurder: Jan Jansen".to_string())
        }
    }

    #[test]
    fn test_backend_type_round_trip() {
        assert_eq!(OcrBackendType::from_str("Tesseract"), Some(OcrBackendType::Tesseract));
        assert_eq!(OcrBackendType::from_str("ocrs"), Some(OcrBackendType::Ocrs));
        assert_eq!(OcrBackendType::from_str("paddle"), None);
        assert_eq!(OcrBackendType::Ocrs.to_string(), "ocrs");
    }

    #[test]
    fn test_default_language_is_dutch() {
        assert_eq!(OcrConfig::default().language, "nld");
    }

    #[test]
    fn test_ocr_gray_goes_through_a_file() {
        let backend = EchoBackend {
            seen: Mutex::new(Vec::new()),
        };
        let result = backend.ocr_gray(&GrayImage::new(20, 10)).unwrap();
        assert_eq!(result.text, "Huurder: Jan Jansen");
        assert_eq!(result.backend, OcrBackendType::Tesseract);
        assert_eq!(*backend.seen.lock().unwrap(), vec![(20, 10)]);
    }

    #[cfg(not(feature = "ocr-ocrs"))]
    #[test]
    fn test_ocrs_requires_feature() {
        assert!(matches!(
            create_backend(OcrBackendType::Ocrs, OcrConfig::default()),
            Err(OcrError::BackendNotAvailable(_))
        ));
    }
}
