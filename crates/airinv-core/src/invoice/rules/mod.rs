//! Rule-based field extractors for airline GST invoices.

pub mod amounts;
pub mod dates;
pub mod gstin;
pub mod landmarks;
pub mod patterns;

pub use amounts::{format_amount, parse_amount, AmountExtractor};
pub use dates::{format_date, parse_invoice_date};
pub use gstin::{state_code, state_name, validate_gstin, GstinExtractor};
pub use landmarks::{Capture, FieldLandmarks, Landmark};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value found in the source text, with the landmark that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Name of the landmark that matched.
    pub landmark: &'static str,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, landmark: &'static str) -> Self {
        Self {
            value,
            landmark,
            position: None,
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
