//! Error types for the airinv-core library.

use thiserror::Error;

use crate::models::invoice::InvoiceField;

/// Main error type for the airinv library.
#[derive(Error, Debug)]
pub enum AirinvError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// A single document could not be turned into a record.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// CSV output error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF text extraction.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Terminal per-document failures.
///
/// The `Display` text of each variant is the reason shown in the processing
/// log, so it is worded for the person reading that log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// No usable text (scanned, image-only or unreadable PDF).
    #[error("Could not extract text from PDF")]
    NoText,

    /// Credit notes are always rejected, whatever the airline.
    #[error("Credit notes are not supported")]
    UnsupportedDocumentType,

    /// The airline could not be recognized.
    #[error("Unknown invoice format")]
    UnknownAirline,

    /// The document type (tax invoice / debit note) could not be recognized.
    #[error("Unknown invoice format - document type not recognized")]
    UnknownDocumentType,

    /// Every landmark for a required field failed.
    #[error("{} not found", .0.label())]
    FieldNotFound(InvoiceField),

    /// A landmark matched but the captured value is not a valid amount.
    #[error("{} has invalid amount '{value}'", .field.label())]
    InvalidAmount { field: InvoiceField, value: String },

    /// The invoice total is absent or zero.
    #[error("Total amount not found or is zero")]
    ZeroTotal,

    /// Processing stopped before the document resolved.
    #[error("Processing aborted: {0}")]
    Aborted(String),
}

impl DocumentError {
    /// Whether this is a rejection (document deliberately not processed)
    /// rather than a failure to process it.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            DocumentError::UnsupportedDocumentType
                | DocumentError::UnknownAirline
                | DocumentError::UnknownDocumentType
        )
    }
}

/// Errors related to CSV serialization.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The CSV writer failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The CSV writer could not be flushed into its buffer.
    #[error("failed to finish CSV buffer: {0}")]
    Buffer(String),
}

/// Result type for the airinv library.
pub type Result<T> = std::result::Result<T, AirinvError>;
