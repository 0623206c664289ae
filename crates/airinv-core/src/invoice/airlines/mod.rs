//! Per-airline extraction strategies.
//!
//! Every supported airline owns one [`AirlineLandmarks`] table. Extraction
//! itself is shared: walk each field's chain, parse what the first matching
//! landmark captured, and report the first required field that could not be
//! found.

mod air_india;
mod air_india_express;
mod akasa;
mod gulf_air;
mod indigo;

use rust_decimal::Decimal;
use tracing::debug;

use super::normalize::RawDocument;
use super::rules::amounts::parse_amount;
use super::rules::dates::parse_invoice_date;
use super::rules::gstin::GstinExtractor;
use super::rules::landmarks::{FieldLandmarks, Landmark};
use super::rules::patterns::NUMBER_TOKEN;
use super::rules::FieldExtractor;
use super::InvoiceExtractor;
use crate::error::DocumentError;
use crate::models::invoice::{Airline, DocumentClassification, InvoiceField, InvoiceRecord, Route};

pub use air_india::AirIndiaExtractor;
pub use air_india_express::AirIndiaExpressExtractor;
pub use akasa::AkasaExtractor;
pub use gulf_air::GulfAirExtractor;
pub use indigo::IndiGoExtractor;

/// Landmark chains of one airline layout.
pub struct AirlineLandmarks {
    pub invoice_number: FieldLandmarks,
    pub invoice_date: FieldLandmarks,
    pub customer_gstin: FieldLandmarks,
    pub vendor_gstin: FieldLandmarks,
    pub customer_name: FieldLandmarks,
    pub taxable_value: FieldLandmarks,
    pub non_taxable_value: FieldLandmarks,
    pub cgst: FieldLandmarks,
    pub sgst: FieldLandmarks,
    pub igst: FieldLandmarks,
    pub igst_rate: FieldLandmarks,
    pub total_amount: FieldLandmarks,
    pub pnr: FieldLandmarks,
    pub passenger_name: FieldLandmarks,
    pub route_from: FieldLandmarks,
    pub route_to: FieldLandmarks,
}

/// The extractor for a classified airline. `None` for [`Airline::Unknown`].
pub fn extractor_for(airline: Airline) -> Option<&'static dyn InvoiceExtractor> {
    match airline {
        Airline::AirIndia => Some(&AirIndiaExtractor),
        Airline::AirIndiaExpress => Some(&AirIndiaExpressExtractor),
        Airline::IndiGo => Some(&IndiGoExtractor),
        Airline::Akasa => Some(&AkasaExtractor),
        Airline::GulfAir => Some(&GulfAirExtractor),
        Airline::Unknown => None,
    }
}

/// Run a landmark table over a document.
pub(crate) fn extract_with(
    landmarks: &AirlineLandmarks,
    doc: &RawDocument,
    classification: DocumentClassification,
) -> Result<InvoiceRecord, DocumentError> {
    let text = doc.text.as_str();

    let invoice_number = required_text(&landmarks.invoice_number, text)?;
    let customer_gstin = required_text(&landmarks.customer_gstin, text)?;

    let taxable_value = optional_amount(&landmarks.taxable_value, text)?
        .ok_or(DocumentError::FieldNotFound(InvoiceField::TaxableValue))?;
    let non_taxable_value = optional_amount(&landmarks.non_taxable_value, text)?
        .ok_or(DocumentError::FieldNotFound(InvoiceField::NonTaxableValue))?;

    let cgst = optional_amount(&landmarks.cgst, text)?;
    let sgst = optional_amount(&landmarks.sgst, text)?;
    let igst = optional_amount(&landmarks.igst, text)?;
    let has_split_tax = cgst.is_some() && sgst.is_some();
    if !has_split_tax && igst.is_none() {
        return Err(DocumentError::FieldNotFound(InvoiceField::TaxAmounts));
    }

    let total_amount =
        optional_amount(&landmarks.total_amount, text)?.ok_or(DocumentError::ZeroTotal)?;

    let igst = igst.unwrap_or(Decimal::ZERO);
    let igst_rate = if igst > Decimal::ZERO {
        optional_amount(&landmarks.igst_rate, text).ok().flatten()
    } else {
        None
    };

    let invoice_date = optional_text(&landmarks.invoice_date, text).and_then(|raw| {
        let parsed = parse_invoice_date(&raw);
        if parsed.is_none() {
            debug!(file = %doc.filename, raw = %raw, "Unparseable invoice date ignored");
        }
        parsed
    });

    let route = optional_text(&landmarks.route_from, text).map(|from| Route {
        from,
        to: optional_text(&landmarks.route_to, text),
    });

    let record = InvoiceRecord {
        airline: classification.airline,
        doc_type: classification.doc_type,
        invoice_number,
        customer_gstin,
        taxable_value,
        non_taxable_value,
        cgst: cgst.unwrap_or(Decimal::ZERO),
        sgst: sgst.unwrap_or(Decimal::ZERO),
        igst,
        total_amount,
        invoice_date,
        vendor_gstin: optional_text(&landmarks.vendor_gstin, text),
        customer_name: optional_text(&landmarks.customer_name, text),
        igst_rate,
        pnr: optional_text(&landmarks.pnr, text),
        passenger_name: optional_text(&landmarks.passenger_name, text),
        route,
        filename: doc.filename.clone(),
    };

    debug!(
        file = %record.filename,
        airline = %record.airline,
        invoice = %record.invoice_number,
        total = %record.total_amount,
        "Extracted invoice"
    );

    Ok(record)
}

fn optional_text(field: &FieldLandmarks, text: &str) -> Option<String> {
    field.resolve(text).map(|m| m.value)
}

fn required_text(field: &FieldLandmarks, text: &str) -> Result<String, DocumentError> {
    optional_text(field, text).ok_or(DocumentError::FieldNotFound(field.field))
}

/// Resolve an amount. A landmark that matched but captured something that is
/// not an amount is an error, never a silent zero.
fn optional_amount(field: &FieldLandmarks, text: &str) -> Result<Option<Decimal>, DocumentError> {
    match field.resolve(text) {
        None => Ok(None),
        Some(found) => parse_amount(&found.value).map(Some).ok_or_else(|| {
            DocumentError::InvalidAmount {
                field: field.field,
                value: found.value,
            }
        }),
    }
}

// Landmarks shared by several layouts.

/// Last resort for the customer GSTIN: the second distinct valid GSTIN in
/// the document. The first one belongs to the airline's letterhead.
fn second_gstin(text: &str) -> Option<String> {
    GstinExtractor::new()
        .extract_all(text)
        .into_iter()
        .nth(1)
        .map(|m| m.value)
}

pub(crate) fn second_gstin_landmark() -> Landmark {
    Landmark::derived("second-gstin-in-document", second_gstin)
}

/// Documents without pass-through charges print no non-taxable line at all.
pub(crate) fn no_pass_through_charges() -> Landmark {
    Landmark::derived("no-pass-through-charges", |_| Some("0.00".to_string()))
}

/// Whitespace separated tokens of the line containing `needle` that carries
/// the most numeric tokens.
pub(crate) fn richest_line_tokens(text: &str, needle: &str) -> Option<Vec<String>> {
    text.lines()
        .filter(|line| line.contains(needle))
        .map(|line| {
            line.split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .max_by_key(|tokens| {
            tokens
                .iter()
                .filter(|t| NUMBER_TOKEN.is_match(t))
                .count()
        })
}

#[cfg(test)]
pub(crate) mod samples;
