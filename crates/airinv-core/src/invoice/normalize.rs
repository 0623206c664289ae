//! Text normalization applied to every document before classification.

use serde::{Deserialize, Serialize};

use super::rules::patterns::{HORIZONTAL_WHITESPACE, SPLIT_AFTER_POINT, SPLIT_DECIMAL};

/// A document as handed over by the text extraction collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Source file name, also used for document type hints.
    pub filename: String,
    /// Normalized text of all pages.
    pub text: String,
}

impl RawDocument {
    /// Build a document from already joined text.
    pub fn new(filename: impl Into<String>, text: &str) -> Self {
        Self {
            filename: filename.into(),
            text: normalize_text(text),
        }
    }

    /// Build a document from per-page text.
    pub fn from_pages<S: AsRef<str>>(filename: impl Into<String>, pages: &[S]) -> Self {
        Self {
            filename: filename.into(),
            text: normalize_pages(pages),
        }
    }

    /// Whether the text carries anything to extract from.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Upper-cased file name, for type hints.
    pub fn filename_upper(&self) -> String {
        self.filename.to_uppercase()
    }
}

/// Normalize extracted text.
///
/// - line endings become `\n` and form feeds become line breaks
/// - decimals split across a line break are joined again
/// - runs of horizontal whitespace collapse to one space
/// - lines are trimmed and blank lines dropped
///
/// The result is stable: normalizing it again changes nothing.
pub fn normalize_text(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace(['\r', '\u{000c}'], "\n");

    let lines: Vec<String> = unified
        .lines()
        .map(|line| HORIZONTAL_WHITESPACE.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();
    let mut joined = lines.join("\n");

    loop {
        let next = {
            let decimals = SPLIT_DECIMAL.replace_all(&joined, "$1$2");
            SPLIT_AFTER_POINT.replace_all(&decimals, "$1$2").into_owned()
        };
        if next == joined {
            return joined;
        }
        joined = next;
    }
}

/// Normalize a multi-page document; pages are joined with a line break.
pub fn normalize_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let joined = pages
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join("\n");
    normalize_text(&joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collapses_whitespace_and_blank_lines() {
        let text = "  AIR   INDIA\tLTD  \r\n\r\n\n  TAX\u{00a0}INVOICE \n";
        assert_eq!(normalize_text(text), "AIR INDIA LTD\nTAX INVOICE");
    }

    #[test]
    fn test_rejoins_split_decimals() {
        assert_eq!(normalize_text("Total 1,180.0\n0"), "Total 1,180.00");
        assert_eq!(normalize_text("Total 1,180.\n00"), "Total 1,180.00");
    }

    #[test]
    fn test_keeps_regular_line_breaks_between_numbers() {
        assert_eq!(normalize_text("996425\n1,000.00"), "996425\n1,000.00");
    }

    #[test]
    fn test_idempotent() {
        let text = "Grand Total   1,000.0\n0  \n\n\u{000c}Page 2\tend";
        let once = normalize_text(text);
        assert_eq!(normalize_text(&once), once);
    }

    #[test]
    fn test_pages_joined() {
        let doc = RawDocument::from_pages("a.pdf", &["GULF AIR ", "", " TAX INVOICE"]);
        assert_eq!(doc.text, "GULF AIR\nTAX INVOICE");
        assert!(doc.has_text());
        assert!(!RawDocument::new("b.pdf", " \n\t ").has_text());
    }
}
