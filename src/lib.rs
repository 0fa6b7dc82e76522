//! huurscan - field extraction for Dutch rental contracts.
//!
//! Reads a PDF huurovereenkomst (text layer plus OCR of scanned pages),
//! extracts the contract parties, the rented object, the rent and the
//! contract dates, and reports on anything that needs a human look.

pub mod cli;
pub mod config;
pub mod document;
pub mod models;
pub mod ocr;
pub mod services;

pub use document::{DocumentError, DocumentSource, PdfDocument};
pub use models::{Candidate, FieldName, FieldSet, FieldValue, Source, ValidationIssue};
pub use services::{Extraction, ExtractionPipeline};
