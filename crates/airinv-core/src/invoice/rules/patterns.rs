//! Common regex patterns for Indian airline GST invoices.
//!
//! Airline specific landmarks live next to their extractors; this module only
//! holds the shapes shared by every layout.

use lazy_static::lazy_static;
use regex::Regex;

/// An amount with exactly two decimals and optional thousands separators.
pub const AMOUNT: &str = r"\d[\d,]*\.\d{2}\b";

/// The whole whitespace-delimited token after a label, starting at its first
/// digit. Captured as is so that `parse_amount` sees malformed values.
pub const AMOUNT_FIELD: &str = r"\d\S*";

/// An amount whose decimals may be omitted.
pub const LOOSE_AMOUNT: &str = r"\d[\d,]*(?:\.\d+)?";

/// GSTIN shape: state code, PAN, entity number, 'Z', check character.
pub const GSTIN: &str = r"\d{2}[A-Z]{5}\d{4}[A-Z][0-9A-Z][A-Z][0-9A-Z]";

/// SAC code for passenger air transport.
pub const SAC_AIR_TRAVEL: &str = "996425";

lazy_static! {
    // Identifiers
    pub static ref GSTIN_STANDALONE: Regex = Regex::new(
        &format!(r"\b({GSTIN})\b")
    ).unwrap();

    // Amounts
    pub static ref AMOUNT_TOKEN: Regex = Regex::new(
        &format!(r"(?:₹|Rs\.?|INR|\$)?\s*\b({LOOSE_AMOUNT})\b")
    ).unwrap();

    pub static ref NUMBER_TOKEN: Regex = Regex::new(
        r"^\d[\d,]*(?:\.\d+)?$"
    ).unwrap();

    // Text normalization
    pub static ref SPLIT_DECIMAL: Regex = Regex::new(
        r"(\d\.\d)\n(\d)"
    ).unwrap();

    pub static ref SPLIT_AFTER_POINT: Regex = Regex::new(
        r"(\d\.)\n(\d)"
    ).unwrap();

    pub static ref HORIZONTAL_WHITESPACE: Regex = Regex::new(
        r"[ \t\u{00a0}\u{2000}-\u{200b}\u{202f}\u{3000}]+"
    ).unwrap();

    // Document type landmarks
    pub static ref CREDIT_NOTE_TITLE: Regex = Regex::new(
        r"(?im)^\s*CREDIT\s+NOTE\b"
    ).unwrap();

    pub static ref DEBIT_NOTE_TITLE: Regex = Regex::new(
        r"(?im)^\s*DEBIT\s+NOTE\b"
    ).unwrap();

    pub static ref TAX_INVOICE_TITLE: Regex = Regex::new(
        r"(?im)^\s*TAX\s+INVOICE\b"
    ).unwrap();

    pub static ref INVOICE_WORD: Regex = Regex::new(
        r"(?i)\bINVOICE\b"
    ).unwrap();

    // Dates
    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"\b(\d{1,2})[./\-](\d{1,2})[./\-](\d{4})\b"
    ).unwrap();

    pub static ref DATE_MONTH_NAME: Regex = Regex::new(
        r"\b(\d{1,2})[\s./\-]+([A-Za-z]{3,9})[\s./\-,]+(\d{4})\b"
    ).unwrap();

    pub static ref DATE_ISO: Regex = Regex::new(
        r"\b(\d{4})-(\d{2})-(\d{2})\b"
    ).unwrap();
}

/// Compile a landmark pattern. Only called from `lazy_static!` blocks.
pub(crate) fn landmark(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid landmark pattern {pattern:?}: {e}"))
}
