//! IndiGo (InterGlobe Aviation) tax invoices.
//!
//! The SAC row is a bare run of numbers:
//! `996425 <taxable> [<discount> <net>] (<rate> <amount>)... <total>`.
//! Column order of the tax pairs differs between invoice generations, so
//! pairs are recognized by value: a GST rate followed by the amount that
//! rate yields on the taxable value.

use lazy_static::lazy_static;
use rust_decimal::Decimal;

use super::{
    extract_with, no_pass_through_charges, richest_line_tokens, second_gstin_landmark,
    AirlineLandmarks,
};
use crate::error::DocumentError;
use crate::invoice::normalize::RawDocument;
use crate::invoice::rules::amounts::parse_amount;
use crate::invoice::rules::landmarks::{FieldLandmarks, Landmark};
use crate::invoice::rules::patterns::{AMOUNT, GSTIN, NUMBER_TOKEN, SAC_AIR_TRAVEL};
use crate::invoice::InvoiceExtractor;
use crate::models::invoice::{Airline, DocumentClassification, InvoiceField, InvoiceRecord};

lazy_static! {
    static ref LANDMARKS: AirlineLandmarks = landmarks();
}

/// Half rates charged as CGST and SGST on intra-state travel.
const SPLIT_RATES: [u32; 4] = [250, 600, 900, 1400];
/// Rates charged as IGST.
const INTEGRATED_RATES: [u32; 4] = [500, 1200, 1800, 2800];

/// Amounts read off the SAC row.
#[derive(Debug, Default, PartialEq)]
struct SacRow {
    taxable: Decimal,
    cgst: Option<Decimal>,
    sgst: Option<Decimal>,
    igst: Option<Decimal>,
    igst_rate: Option<Decimal>,
    total: Decimal,
}

/// Rate in basis points, if it is a GST slab.
fn slab(rate: Decimal) -> Option<u32> {
    let bp = (rate * Decimal::ONE_HUNDRED).normalize();
    if !bp.fract().is_zero() {
        return None;
    }
    let bp = u32::try_from(bp.mantissa()).ok()?;
    (SPLIT_RATES.contains(&bp) || INTEGRATED_RATES.contains(&bp)).then_some(bp)
}

fn sac_row(text: &str) -> Option<SacRow> {
    let tokens = richest_line_tokens(text, SAC_AIR_TRAVEL)?;
    let sac = tokens.iter().position(|t| t == SAC_AIR_TRAVEL)?;
    let numbers: Vec<Decimal> = tokens[sac + 1..]
        .iter()
        .filter(|t| NUMBER_TOKEN.is_match(t))
        .filter_map(|t| parse_amount(t))
        .collect();

    if numbers.len() < 3 {
        return None;
    }

    // Discount column: taxable, discount, net taxable.
    let taxable = if numbers[0] - numbers[1] == numbers[2] {
        numbers[2]
    } else {
        numbers[0]
    };

    let mut row = SacRow {
        taxable,
        total: numbers[numbers.len() - 1],
        ..SacRow::default()
    };

    let tolerance = Decimal::ONE;
    let mut zero_rated = false;
    let mut i = 1;
    while i + 1 < numbers.len() - 1 {
        let (rate, amount) = (numbers[i], numbers[i + 1]);
        let expected = taxable * rate / Decimal::ONE_HUNDRED;
        if (expected - amount).abs() > tolerance {
            i += 1;
            continue;
        }

        if amount.is_zero() && (rate.is_zero() || slab(rate).is_some()) {
            zero_rated = true;
            i += 2;
            continue;
        }

        match slab(rate) {
            Some(bp) => {
                if INTEGRATED_RATES.contains(&bp) {
                    row.igst = Some(amount);
                    row.igst_rate = Some(rate);
                } else if row.cgst.is_none() {
                    row.cgst = Some(amount);
                } else {
                    row.sgst = Some(amount);
                }
                i += 2;
            }
            None => i += 1,
        }
    }

    // Zero-rated: every tax column is 0.00.
    if zero_rated && row.cgst.is_none() && row.sgst.is_none() && row.igst.is_none() {
        row.igst = Some(Decimal::ZERO);
    }

    Some(row)
}

fn sac_taxable(text: &str) -> Option<String> {
    sac_row(text).map(|r| r.taxable.to_string())
}

fn sac_cgst(text: &str) -> Option<String> {
    sac_row(text)?.cgst.map(|v| v.to_string())
}

fn sac_sgst(text: &str) -> Option<String> {
    sac_row(text)?.sgst.map(|v| v.to_string())
}

fn sac_igst(text: &str) -> Option<String> {
    sac_row(text)?.igst.map(|v| v.to_string())
}

fn sac_igst_rate(text: &str) -> Option<String> {
    sac_row(text)?.igst_rate.map(|v| v.to_string())
}

fn sac_total(text: &str) -> Option<String> {
    sac_row(text).map(|r| r.total.to_string())
}

fn landmarks() -> AirlineLandmarks {
    AirlineLandmarks {
        invoice_number: FieldLandmarks::new(
            InvoiceField::InvoiceNumber,
            vec![
                Landmark::group(
                    "number-label",
                    r"\bNumber\s*[:\s]*([A-Z]{2}\d+[A-Z]{2}\d+)",
                    1,
                ),
                Landmark::group(
                    "invoice-number",
                    r"(?i:Invoice\s*(?:Number|No\.?))\s*[:\s]*([A-Z0-9]+)",
                    1,
                ),
            ],
        ),
        invoice_date: FieldLandmarks::new(
            InvoiceField::InvoiceDate,
            vec![Landmark::group(
                "date-label",
                r"(?i:\bDate)\s*[:\s]*(\d{1,2}[\s./\-]+[A-Za-z]{3,9}[\s./\-]+\d{4}|\d{1,2}[/.\-]\d{1,2}[/.\-]\d{4})",
                1,
            )],
        ),
        customer_gstin: FieldLandmarks::new(
            InvoiceField::CustomerGstin,
            vec![
                Landmark::group(
                    "gstin-of-customer",
                    &format!(r"(?i:GSTIN\s*of\s*Customer)\s*[:\s]*({GSTIN})"),
                    1,
                ),
                second_gstin_landmark(),
            ],
        ),
        vendor_gstin: FieldLandmarks::new(
            InvoiceField::VendorGstin,
            vec![Landmark::group(
                "letterhead-gstin",
                &format!(r"(?m)^GSTIN\s*[:\s]*({GSTIN})"),
                1,
            )],
        ),
        customer_name: FieldLandmarks::new(
            InvoiceField::CustomerName,
            vec![Landmark::group(
                "customer-name",
                r"(?i:Customer\s*Name)[ \t]*:?[ \t]*([^\n]+)",
                1,
            )],
        ),
        taxable_value: FieldLandmarks::new(
            InvoiceField::TaxableValue,
            vec![Landmark::derived("sac-row", sac_taxable)],
        ),
        non_taxable_value: FieldLandmarks::new(
            InvoiceField::NonTaxableValue,
            vec![
                Landmark::group(
                    "airport-charges-row",
                    &format!(r"(?i)Airport\s*Charges\s+[\d,.]+\s+({AMOUNT})"),
                    1,
                ),
                no_pass_through_charges(),
            ],
        ),
        cgst: FieldLandmarks::new(InvoiceField::Cgst, vec![Landmark::derived("sac-row", sac_cgst)]),
        sgst: FieldLandmarks::new(InvoiceField::Sgst, vec![Landmark::derived("sac-row", sac_sgst)]),
        igst: FieldLandmarks::new(InvoiceField::Igst, vec![Landmark::derived("sac-row", sac_igst)]),
        igst_rate: FieldLandmarks::new(
            InvoiceField::IgstRate,
            vec![Landmark::derived("sac-row", sac_igst_rate)],
        ),
        total_amount: FieldLandmarks::new(
            InvoiceField::TotalAmount,
            vec![
                Landmark::last_amount("grand-total-line", r"(?i)Grand\s*Total[^\n]*"),
                Landmark::derived("sac-row-total", sac_total),
            ],
        ),
        pnr: FieldLandmarks::new(
            InvoiceField::Pnr,
            vec![Landmark::group("pnr-label", r"(?i:PNR)(?:\s*No\.?)?\s*[:\s]\s*([A-Z0-9]{6})\b", 1)],
        ),
        passenger_name: FieldLandmarks::new(
            InvoiceField::PassengerName,
            vec![Landmark::group(
                "passenger-name-label",
                r"(?i:Passenger\s*Name)[ \t]*:?[ \t]*([^\n]+)",
                1,
            )],
        ),
        route_from: FieldLandmarks::new(
            InvoiceField::Route,
            vec![Landmark::group("from-label", r"(?m)^From\s*:\s*([A-Z]{3})\b", 1)],
        ),
        route_to: FieldLandmarks::new(
            InvoiceField::Route,
            vec![Landmark::group("to-label", r"(?m)^To\s*:\s*([A-Z]{3})\b", 1)],
        ),
    }
}

/// Extractor for IndiGo documents.
pub struct IndiGoExtractor;

impl InvoiceExtractor for IndiGoExtractor {
    fn airline(&self) -> Airline {
        Airline::IndiGo
    }

    fn extract(
        &self,
        doc: &RawDocument,
        classification: DocumentClassification,
    ) -> Result<InvoiceRecord, DocumentError> {
        extract_with(&LANDMARKS, doc, classification)
    }
}
