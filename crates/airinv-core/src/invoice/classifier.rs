//! Airline and document type detection.

use tracing::debug;

use super::normalize::RawDocument;
use super::rules::patterns::{CREDIT_NOTE_TITLE, DEBIT_NOTE_TITLE, INVOICE_WORD, TAX_INVOICE_TITLE};
use crate::models::invoice::{Airline, DocumentClassification, DocumentType};

/// Letterhead landmarks for each airline, matched against upper-cased text.
fn airline_landmarks(airline: Airline) -> &'static [&'static str] {
    match airline {
        Airline::AirIndiaExpress => &["AIR INDIA EXPRESS"],
        Airline::AirIndia => &["AIR INDIA LTD", "AIR INDIA LIMITED"],
        Airline::IndiGo => &["INDIGO", "INTERGLOBE AVIATION"],
        Airline::Akasa => &["AKASA", "SNV AVIATION"],
        Airline::GulfAir => &["GULF AIR"],
        Airline::Unknown => &[],
    }
}

/// Detect the issuing airline. The first airline in priority order with a
/// matching landmark wins.
pub fn detect_airline(text: &str) -> Airline {
    let upper = text.to_uppercase();

    Airline::SUPPORTED
        .into_iter()
        .find(|airline| {
            airline_landmarks(*airline)
                .iter()
                .any(|landmark| upper.contains(landmark))
        })
        .unwrap_or(Airline::Unknown)
}

/// Detect the document type.
///
/// A hint in the file name wins over the text. In the text, a document
/// titled both "DEBIT NOTE" and "TAX INVOICE" is ambiguous and reported as
/// unknown; a generic "INVOICE" is only used when neither title is present.
pub fn detect_document_type(doc: &RawDocument) -> DocumentType {
    let filename = doc.filename_upper();

    if filename.contains("CREDIT") || CREDIT_NOTE_TITLE.is_match(&doc.text) {
        return DocumentType::CreditNote;
    }

    if filename.contains("DEBIT") {
        return DocumentType::DebitNote;
    }
    if filename.contains("INVOICE") {
        return DocumentType::TaxInvoice;
    }

    let debit = DEBIT_NOTE_TITLE.is_match(&doc.text);
    let invoice = TAX_INVOICE_TITLE.is_match(&doc.text);

    match (debit, invoice) {
        (true, true) => DocumentType::Unknown,
        (true, false) => DocumentType::DebitNote,
        (false, true) => DocumentType::TaxInvoice,
        (false, false) if INVOICE_WORD.is_match(&doc.text) => DocumentType::TaxInvoice,
        (false, false) => DocumentType::Unknown,
    }
}

/// Classify a document. Credit notes short-circuit airline detection.
pub fn classify(doc: &RawDocument) -> DocumentClassification {
    let doc_type = detect_document_type(doc);
    if doc_type == DocumentType::CreditNote {
        debug!(file = %doc.filename, "Credit note detected");
        return DocumentClassification::credit_note();
    }

    let airline = detect_airline(&doc.text);
    debug!(file = %doc.filename, %airline, ?doc_type, "Classified document");

    DocumentClassification::new(airline, doc_type)
}
