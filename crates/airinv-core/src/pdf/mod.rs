//! PDF text extraction.
//!
//! Only text-based PDFs are read. Scanned or image-only documents yield no
//! text and are failed by the pipeline; image-only ones are logged as such.

mod extractor;

pub use extractor::PdfTextExtractor;

use crate::error::PdfError;

/// Kind of content found in a PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfType {
    /// Contains enough extractable text.
    Text,
    /// Contains image objects but too little text.
    Image,
    /// Neither text nor images.
    Empty,
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF text sources.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Number of pages in the loaded PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;
}
