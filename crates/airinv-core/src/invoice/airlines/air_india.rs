//! Air India tax invoices and debit notes.
//!
//! The fare table prints one SAC row and a tax row of the form
//! `<taxable> <rate> % <cgst> <sgst> <igst> <total>`.

use lazy_static::lazy_static;

use super::{extract_with, no_pass_through_charges, second_gstin_landmark, AirlineLandmarks};
use crate::error::DocumentError;
use crate::invoice::normalize::RawDocument;
use crate::invoice::rules::landmarks::{FieldLandmarks, Landmark};
use crate::invoice::rules::patterns::{AMOUNT, GSTIN};
use crate::invoice::InvoiceExtractor;
use crate::models::invoice::{Airline, DocumentClassification, InvoiceField, InvoiceRecord};

lazy_static! {
    static ref LANDMARKS: AirlineLandmarks = landmarks();
}

fn tax_row() -> String {
    format!(r"({AMOUNT})\s+\d+(?:\.\d+)?\s*%\s+({AMOUNT})\s+({AMOUNT})\s+({AMOUNT})\s+({AMOUNT})")
}

fn landmarks() -> AirlineLandmarks {
    let tax_row = tax_row();

    AirlineLandmarks {
        invoice_number: FieldLandmarks::new(
            InvoiceField::InvoiceNumber,
            vec![Landmark::group(
                "invoice-or-debit-note-number",
                r"(?i:(?:Invoice|Debit\s*Note)\s*(?:Number|No\.?))\s*[:\s]*([A-Z0-9]+)",
                1,
            )],
        ),
        invoice_date: FieldLandmarks::new(
            InvoiceField::InvoiceDate,
            vec![Landmark::group(
                "invoice-or-debit-note-date",
                r"(?i:(?:Invoice|Debit\s*Note)\s*Date)\s*[:\s]*(\d{1,2}[/.\-]\d{1,2}[/.\-]\d{4})",
                1,
            )],
        ),
        customer_gstin: FieldLandmarks::new(
            InvoiceField::CustomerGstin,
            vec![
                Landmark::group(
                    "customer-gstin-label",
                    &format!(r"(?i:Customer\s*GSTIN)\s*[:\s]*({GSTIN})"),
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
            vec![Landmark::group("customer-label", r"(?m)^Customer[ \t]*:[ \t]*([^\n]+)", 1)],
        ),
        taxable_value: FieldLandmarks::new(
            InvoiceField::TaxableValue,
            vec![
                Landmark::group("tax-row", &tax_row, 1),
                Landmark::group("sac-row-first-amount", &format!(r"996425[^\n]*?({AMOUNT})"), 1),
            ],
        ),
        non_taxable_value: FieldLandmarks::new(
            InvoiceField::NonTaxableValue,
            vec![
                Landmark::group(
                    "sac-row-non-taxable-column",
                    &format!(
                        r"996425[^\n]*?{AMOUNT}\s+{AMOUNT}\s+({AMOUNT})\s+{AMOUNT}\s+{AMOUNT}\s+\d+(?:\.\d+)?\s*%"
                    ),
                    1,
                ),
                Landmark::sum_of_amounts(
                    "non-taxable-fare-details",
                    r"(?i)Non[\s-]*taxable\s*fare\s*details\s*:?([^\n]*)",
                    1,
                ),
                no_pass_through_charges(),
            ],
        ),
        cgst: FieldLandmarks::new(InvoiceField::Cgst, vec![Landmark::group("tax-row", &tax_row, 2)]),
        sgst: FieldLandmarks::new(InvoiceField::Sgst, vec![Landmark::group("tax-row", &tax_row, 3)]),
        igst: FieldLandmarks::new(InvoiceField::Igst, vec![Landmark::group("tax-row", &tax_row, 4)]),
        igst_rate: FieldLandmarks::new(
            InvoiceField::IgstRate,
            vec![Landmark::group(
                "tax-row-rate",
                &format!(r"{AMOUNT}\s+(\d+(?:\.\d+)?)\s*%"),
                1,
            )],
        ),
        total_amount: FieldLandmarks::new(
            InvoiceField::TotalAmount,
            vec![
                Landmark::group("tax-row", &tax_row, 5),
                Landmark::group("total-line", &format!(r"(?m)^Total\s+({AMOUNT})\s*$"), 1),
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
            vec![Landmark::group("routing", r"(?i:Routing)\s*[:\s]*([A-Z]{3})([A-Z]{3})", 1)],
        ),
        route_to: FieldLandmarks::new(
            InvoiceField::Route,
            vec![Landmark::group("routing", r"(?i:Routing)\s*[:\s]*([A-Z]{3})([A-Z]{3})", 2)],
        ),
    }
}

/// Extractor for Air India documents.
pub struct AirIndiaExtractor;

impl InvoiceExtractor for AirIndiaExtractor {
    fn airline(&self) -> Airline {
        Airline::AirIndia
    }

    fn extract(
        &self,
        doc: &RawDocument,
        classification: DocumentClassification,
    ) -> Result<InvoiceRecord, DocumentError> {
        extract_with(&LANDMARKS, doc, classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::airlines::samples;
    use crate::models::invoice::DocumentType;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn extract(filename: &str, text: &str) -> Result<InvoiceRecord, DocumentError> {
        let doc = RawDocument::new(filename, text);
        let classification = DocumentClassification::new(Airline::AirIndia, DocumentType::TaxInvoice);
        AirIndiaExtractor.extract(&doc, classification)
    }

    #[test]
    fn test_extract_sample() {
        let record = extract("ai.pdf", samples::AIR_INDIA).unwrap();

        assert_eq!(record.invoice_number, "0982504MH00012345");
        assert_eq!(record.customer_gstin, "27AACCN5739J1Z4");
        assert_eq!(record.vendor_gstin.as_deref(), Some("27AABCA0522B1ZK"));
        assert_eq!(record.taxable_value, dec("3962.00"));
        assert_eq!(record.non_taxable_value, dec("236.00"));
        assert_eq!(record.cgst, dec("99.05"));
        assert_eq!(record.sgst, dec("99.05"));
        assert_eq!(record.igst, Decimal::ZERO);
        assert_eq!(record.igst_rate, None);
        assert_eq!(record.total_amount, dec("4396.10"));
        assert_eq!(record.invoice_date, NaiveDate::from_ymd_opt(2025, 5, 15));
        assert_eq!(record.pnr.as_deref(), Some("ABC123"));
        assert_eq!(record.passenger_name.as_deref(), Some("SHAH RAHUL MR"));
        assert_eq!(
            record.customer_name.as_deref(),
            Some("NAGARKOT FORWARDERS PRIVATE LIMITED")
        );
        assert_eq!(record.route.unwrap().describe(), "BOM TO DEL");
    }

    #[test]
    fn test_debit_note_number() {
        let text = "AIR INDIA LTD\nDEBIT NOTE\nDebit Note Number : DN98213\nCustomer GSTIN : 27AACCN5739J1Z4\n\
                    996425 Change fee 1,000.00 0.00 0.00 0.00 1,000.00 18 % 0.00 0.00 180.00 1,180.00";
        let record = extract("dn.pdf", text).unwrap();
        assert_eq!(record.invoice_number, "DN98213");
        assert_eq!(record.igst, dec("180.00"));
        assert_eq!(record.igst_rate, Some(dec("18.00")));
        assert_eq!(record.non_taxable_value, Decimal::ZERO);
        assert_eq!(record.total_amount, dec("1180.00"));
    }

    #[test]
    fn test_non_taxable_from_fare_details() {
        let text = "AIR INDIA LTD\nInvoice Number : 0982504MH1\nCustomer GSTIN : 27AACCN5739J1Z4\n\
                    3,962.00 5 % 99.05 99.05 0.00 4,396.10\n\
                    Non-taxable fare details: P2 = 149.00; IN = 87.00";
        let record = extract("ai.pdf", text).unwrap();
        assert_eq!(record.non_taxable_value, dec("236.00"));
    }

    #[test]
    fn test_missing_tax_row() {
        let text = "AIR INDIA LTD\nInvoice Number : 0982504MH1\nCustomer GSTIN : 27AACCN5739J1Z4\n\
                    996425 Fare 1,000.00\nCGST 25.00 SGST 25.00\nTotal 1,050.00";
        assert_eq!(
            extract("ai.pdf", text).unwrap_err(),
            DocumentError::FieldNotFound(InvoiceField::TaxAmounts)
        );
    }

    #[test]
    fn test_missing_invoice_number() {
        let err = extract("ai.pdf", "AIR INDIA LTD\nCustomer GSTIN : 27AACCN5739J1Z4").unwrap_err();
        assert_eq!(err.to_string(), "Invoice number not found");
    }
}
