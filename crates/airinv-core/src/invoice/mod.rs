//! Invoice classification, field extraction and validation.

pub mod airlines;
pub mod classifier;
pub mod normalize;
mod pipeline;
pub mod rules;
pub mod validator;

pub use airlines::extractor_for;
pub use classifier::classify;
pub use normalize::{normalize_text, RawDocument};
pub use pipeline::{DocumentOutcome, DocumentState, InvoicePipeline};
pub use validator::{AvailTaxCredit, CrossValidator, ValidationOutcome, ValidationStatus};

use crate::error::DocumentError;
use crate::models::invoice::{Airline, DocumentClassification, InvoiceRecord};

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Trait for per-airline invoice extractors.
pub trait InvoiceExtractor: Send + Sync {
    /// The airline whose layout this extractor reads.
    fn airline(&self) -> Airline;

    /// Extract invoice data from a normalized document.
    fn extract(
        &self,
        doc: &RawDocument,
        classification: DocumentClassification,
    ) -> Result<InvoiceRecord>;
}
