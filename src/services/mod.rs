//! Service layer for huurscan extraction logic.
//!
//! Each stage of the extraction lives in its own module; `pipeline`
//! wires them together for the CLI and library callers.

pub mod contract;
pub mod diagnostics;
pub mod entities;
pub mod ner;
pub mod patterns;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod validation;

pub use contract::ContractValidator;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use entities::EntityExtractor;
pub use ner::{Entity, EntityType, NerBackend, NerError, RegexNerBackend};
pub use patterns::PatternExtractor;
pub use pipeline::{Extraction, ExtractionPipeline};
pub use reconcile::{ReconcilePolicy, Reconciler};
pub use report::render_report;
