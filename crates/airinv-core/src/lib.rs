//! Core library for airline GST invoice processing.
//!
//! This crate provides:
//! - PDF text extraction
//! - Airline and document type classification
//! - Per-airline field extraction with ordered landmark lists
//! - Arithmetic cross-validation of invoice totals
//! - Logisys purchase upload CSV synthesis, grouped by customer GSTIN
//! - Batch orchestration with an event channel and cancellation

pub mod batch;
pub mod error;
pub mod export;
pub mod invoice;
pub mod models;
pub mod pdf;

pub use batch::{
    BatchCollector, BatchEvent, BatchObserver, BatchProcessor, BatchResult, CancellationFlag,
    LogEntry, LogStatus, NoopObserver,
};
pub use error::{AirinvError, DocumentError, Result};
pub use export::{CsvRow, GroupKey, OutputGroup, RowContext, RowSynthesizer};
pub use invoice::{
    classify, CrossValidator, DocumentOutcome, DocumentState, InvoiceExtractor, InvoicePipeline,
    RawDocument, ValidationOutcome, ValidationStatus,
};
pub use models::config::AirinvConfig;
pub use models::invoice::{Airline, DocumentClassification, DocumentType, InvoiceRecord};
pub use pdf::{PdfProcessor, PdfTextExtractor, PdfType};
