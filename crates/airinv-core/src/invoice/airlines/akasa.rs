//! Akasa Air (SNV Aviation) tax invoices.
//!
//! The "Grand Total" row carries eight amounts:
//! gross, non-taxable, discount, net total, CGST, SGST, IGST, total.

use lazy_static::lazy_static;
use regex::Regex;

use super::{extract_with, no_pass_through_charges, second_gstin_landmark, AirlineLandmarks};
use crate::error::DocumentError;
use crate::invoice::normalize::RawDocument;
use crate::invoice::rules::amounts::parse_amount;
use crate::invoice::rules::landmarks::{FieldLandmarks, Landmark};
use crate::invoice::rules::patterns::{landmark, AMOUNT, GSTIN};
use crate::invoice::InvoiceExtractor;
use crate::models::invoice::{Airline, DocumentClassification, InvoiceField, InvoiceRecord};

fn grand_total_row() -> String {
    let a = format!(r"({AMOUNT})");
    format!(r"(?i)Grand\s*Total\s+{a}\s+{a}\s+{a}\s+{a}\s+{a}\s+{a}\s+{a}\s+{a}")
}

lazy_static! {
    static ref LANDMARKS: AirlineLandmarks = landmarks();
    static ref GRAND_TOTAL_ROW: Regex = landmark(&grand_total_row());
}

/// Taxable value is the net total less the non-taxable column.
fn grand_total_taxable(text: &str) -> Option<String> {
    let caps = GRAND_TOTAL_ROW.captures(text)?;
    let non_taxable = parse_amount(&caps[2])?;
    let net_total = parse_amount(&caps[4])?;
    (net_total >= non_taxable).then(|| (net_total - non_taxable).to_string())
}

fn landmarks() -> AirlineLandmarks {
    let grand_total = grand_total_row();
    let sac_row = format!(r"996425\s+{AMOUNT}\s+{AMOUNT}\s+{AMOUNT}\s+({AMOUNT})");
    let split_tax = format!(r"2\.5\s*%\s+({AMOUNT})\s+2\.5\s*%\s+({AMOUNT})");
    let integrated_tax = format!(r"(?:^|\s)(5|12|18)\s*%\s+({AMOUNT})");
    let date = r"\d{1,2}[\s./\-]+[A-Za-z]{3,9}[\s./\-]+\d{4}|\d{1,2}[/.\-]\d{1,2}[/.\-]\d{4}";

    AirlineLandmarks {
        invoice_number: FieldLandmarks::new(
            InvoiceField::InvoiceNumber,
            vec![
                Landmark::group(
                    "debit-note-number",
                    r"(?i:Debit\s*Note\s*(?:Number|No\.?))\s*[:\s]*([A-Z0-9]+)",
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
            vec![
                Landmark::group(
                    "debit-note-date",
                    &format!(r"(?i:Debit\s*Note\s*Date)\s*[:\s]*({date})"),
                    1,
                ),
                Landmark::group(
                    "invoice-date",
                    &format!(r"(?i:Invoice\s*Date)\s*[:\s]*({date})"),
                    1,
                ),
            ],
        ),
        customer_gstin: FieldLandmarks::new(
            InvoiceField::CustomerGstin,
            vec![
                Landmark::group(
                    "gstin-unique-id-of-customer",
                    &format!(r"(?i:GSTIN\s*/?\s*Unique\s*ID\s*of\s*Customer)\s*[:\s]*({GSTIN})"),
                    1,
                ),
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
                "name-of-customer",
                r"(?i:Name\s*of\s*Customer)[ \t]*:?[ \t]*([^\n]+)",
                1,
            )],
        ),
        taxable_value: FieldLandmarks::new(
            InvoiceField::TaxableValue,
            vec![
                Landmark::derived("grand-total-row", grand_total_taxable),
                Landmark::group("sac-row-net-total", &sac_row, 1),
            ],
        ),
        non_taxable_value: FieldLandmarks::new(
            InvoiceField::NonTaxableValue,
            vec![
                Landmark::group("grand-total-row", &grand_total, 2),
                Landmark::group(
                    "airport-charges-row",
                    &format!(r"(?i)Airport\s*Charges\s+{AMOUNT}\s+({AMOUNT})"),
                    1,
                ),
                no_pass_through_charges(),
            ],
        ),
        cgst: FieldLandmarks::new(
            InvoiceField::Cgst,
            vec![
                Landmark::group("grand-total-row", &grand_total, 5),
                Landmark::group("split-tax-pair", &split_tax, 1),
            ],
        ),
        sgst: FieldLandmarks::new(
            InvoiceField::Sgst,
            vec![
                Landmark::group("grand-total-row", &grand_total, 6),
                Landmark::group("split-tax-pair", &split_tax, 2),
            ],
        ),
        igst: FieldLandmarks::new(
            InvoiceField::Igst,
            vec![
                Landmark::group("grand-total-row", &grand_total, 7),
                Landmark::group("integrated-tax-rate", &integrated_tax, 2),
            ],
        ),
        igst_rate: FieldLandmarks::new(
            InvoiceField::IgstRate,
            vec![Landmark::group("integrated-tax-rate", &integrated_tax, 1)],
        ),
        total_amount: FieldLandmarks::new(
            InvoiceField::TotalAmount,
            vec![
                Landmark::group("grand-total-row", &grand_total, 8),
                Landmark::last_amount("sac-row-total", r"996425[^\n]*"),
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
            vec![Landmark::group("flight-from", r"(?i:Flight\s*From)\s*[:\s]*([A-Z]{3})\b", 1)],
        ),
        route_to: FieldLandmarks::new(
            InvoiceField::Route,
            vec![Landmark::group("flight-to", r"(?i:Flight\s*To)\s*[:\s]*([A-Z]{3})\b", 1)],
        ),
    }
}

/// Extractor for Akasa Air documents.
pub struct AkasaExtractor;

impl InvoiceExtractor for AkasaExtractor {
    fn airline(&self) -> Airline {
        Airline::Akasa
    }

    fn extract(
        &self,
        doc: &RawDocument,
        classification: DocumentClassification,
    ) -> Result<InvoiceRecord, DocumentError> {
        extract_with(&LANDMARKS, doc, classification)
    }
}
