//! PDF text extraction using lopdf and pdf-extract.

use lopdf::{Document, Object};
use tracing::{debug, trace, warn};

use super::{PdfProcessor, PdfType, Result};
use crate::error::PdfError;
use crate::invoice::RawDocument;
use crate::models::config::PdfConfig;

/// Reads the text layer of airline invoice PDFs.
pub struct PdfTextExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    min_text_length: usize,
}

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self::from_config(&PdfConfig::default())
    }

    pub fn from_config(config: &PdfConfig) -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            min_text_length: config.min_text_length,
        }
    }

    /// Set the minimum amount of text for a PDF to count as text-based.
    pub fn with_min_text_length(mut self, min_text_length: usize) -> Self {
        self.min_text_length = min_text_length;
        self
    }

    /// Whether `text` carries at least the configured number of
    /// non-whitespace characters.
    pub fn is_text_based(&self, text: &str) -> bool {
        text.chars().filter(|c| !c.is_whitespace()).count() >= self.min_text_length
    }

    /// Load `data` and turn it into a pipeline document.
    ///
    /// A PDF without a usable text layer becomes a document with empty text,
    /// which the pipeline fails with a "no text" reason. Only a PDF that
    /// cannot be opened at all is an error.
    pub fn read_document(&mut self, filename: &str, data: &[u8]) -> Result<RawDocument> {
        self.load(data)?;

        let text = match self.extract_text() {
            Ok(text) => text,
            Err(e) => {
                debug!(file = filename, error = %e, "Text extraction failed");
                String::new()
            }
        };

        match self.content_type(&text) {
            PdfType::Text => Ok(RawDocument::new(filename, &text)),
            PdfType::Image => {
                warn!(
                    file = filename,
                    pages = self.page_count(),
                    "Image-only PDF, scanned invoices are not read"
                );
                Ok(RawDocument::new(filename, ""))
            }
            PdfType::Empty => {
                debug!(file = filename, chars = text.len(), "PDF has no usable text layer");
                Ok(RawDocument::new(filename, ""))
            }
        }
    }

    /// Classify the loaded PDF given the text extracted from it.
    pub fn content_type(&self, text: &str) -> PdfType {
        let pdf_type = if self.is_text_based(text) {
            PdfType::Text
        } else if self.has_image_objects() {
            PdfType::Image
        } else {
            PdfType::Empty
        };

        debug!("PDF analysis: {} chars text -> {:?}", text.len(), pdf_type);
        pdf_type
    }

    fn has_image_objects(&self) -> bool {
        let Some(doc) = self.document.as_ref() else {
            return false;
        };

        let found = doc.objects.values().any(|object| match object {
            Object::Stream(stream) => stream
                .dict
                .get(b"Subtype")
                .and_then(|s| s.as_name())
                .map(|name| name == b"Image")
                .unwrap_or(false),
            _ => false,
        });
        trace!(found, "Scanned objects for images");
        found
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfTextExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Many airline portals encrypt with an empty user password.
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}
