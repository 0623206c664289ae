//! Air India Express tax invoices.

use lazy_static::lazy_static;

use super::{extract_with, no_pass_through_charges, second_gstin_landmark, AirlineLandmarks};
use crate::error::DocumentError;
use crate::invoice::normalize::RawDocument;
use crate::invoice::rules::landmarks::{FieldLandmarks, Landmark};
use crate::invoice::rules::patterns::{AMOUNT, AMOUNT_FIELD, GSTIN};
use crate::invoice::InvoiceExtractor;
use crate::models::invoice::{Airline, DocumentClassification, InvoiceField, InvoiceRecord};

lazy_static! {
    static ref LANDMARKS: AirlineLandmarks = landmarks();
}

fn landmarks() -> AirlineLandmarks {
    let sac_igst = format!(r"996425[^\n]*?(\d+(?:\.\d+)?)\s*%\s+({AMOUNT})");

    AirlineLandmarks {
        invoice_number: FieldLandmarks::new(
            InvoiceField::InvoiceNumber,
            vec![Landmark::group(
                "invoice-number",
                r"(?i:Invoice\s*(?:Number|No\.?))\s*[:\s]*([A-Z0-9]+)",
                1,
            )],
        ),
        invoice_date: FieldLandmarks::new(
            InvoiceField::InvoiceDate,
            vec![Landmark::group(
                "invoice-date",
                r"(?i:Invoice\s*Date)\s*[:\s]*(\d{1,2}[/.\-]\d{1,2}[/.\-]\d{4})",
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
            vec![Landmark::group("gstn-label", &format!(r"\bGSTN\s*[:\s]*({GSTIN})"), 1)],
        ),
        customer_name: FieldLandmarks::new(
            InvoiceField::CustomerName,
            vec![Landmark::group(
                "gstin-customer-name",
                r"(?i:GSTIN\s*Customer\s*Name)[ \t]*:?[ \t]*([^\n]+)",
                1,
            )],
        ),
        taxable_value: FieldLandmarks::new(
            InvoiceField::TaxableValue,
            vec![Landmark::group("sac-row", &format!(r"996425\s+({AMOUNT_FIELD})"), 1)],
        ),
        non_taxable_value: FieldLandmarks::new(
            InvoiceField::NonTaxableValue,
            vec![
                Landmark::group(
                    "airport-taxes-row",
                    &format!(r"(?i)Airport\s*Taxes[^\n]*?\s({AMOUNT})\s+({AMOUNT})"),
                    1,
                ),
                Landmark::group(
                    "non-taxable-label",
                    &format!(r"(?i)Non[\s-]*Taxable[^\d\n]*({AMOUNT_FIELD})"),
                    1,
                ),
                no_pass_through_charges(),
            ],
        ),
        cgst: FieldLandmarks::none(InvoiceField::Cgst),
        sgst: FieldLandmarks::none(InvoiceField::Sgst),
        igst: FieldLandmarks::new(InvoiceField::Igst, vec![Landmark::group("sac-row-igst", &sac_igst, 2)]),
        igst_rate: FieldLandmarks::new(
            InvoiceField::IgstRate,
            vec![Landmark::group("sac-row-igst", &sac_igst, 1)],
        ),
        total_amount: FieldLandmarks::new(
            InvoiceField::TotalAmount,
            vec![Landmark::last_amount("grand-total-line", r"(?i)Grand\s*Total[^\n]*")],
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

/// Extractor for Air India Express documents.
pub struct AirIndiaExpressExtractor;

impl InvoiceExtractor for AirIndiaExpressExtractor {
    fn airline(&self) -> Airline {
        Airline::AirIndiaExpress
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
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn extract(text: &str) -> Result<InvoiceRecord, DocumentError> {
        let doc = RawDocument::new("ix.pdf", text);
        let classification =
            DocumentClassification::new(Airline::AirIndiaExpress, DocumentType::TaxInvoice);
        AirIndiaExpressExtractor.extract(&doc, classification)
    }

    #[test]
    fn test_extract_sample() {
        let record = extract(samples::AIR_INDIA_EXPRESS).unwrap();

        assert_eq!(record.invoice_number, "KL2510000123");
        assert_eq!(record.customer_gstin, "33AACCN5739J1ZB");
        assert_eq!(record.vendor_gstin.as_deref(), Some("32AAGCA4231K1ZZ"));
        assert_eq!(record.taxable_value, dec("31451.42"));
        assert_eq!(record.non_taxable_value, dec("1772.00"));
        assert_eq!(record.igst, dec("1572.58"));
        assert_eq!(record.igst_rate, Some(dec("5")));
        assert_eq!(record.total_amount, dec("34796.00"));
        assert_eq!(record.pnr.as_deref(), Some("XYZ789"));
        assert_eq!(record.route.unwrap().describe(), "COK TO MAA");
    }

    #[test]
    fn test_non_taxable_label_fallback() {
        let text = "AIR INDIA EXPRESS\nInvoice Number : KL1\nGSTIN of Customer : 33AACCN5739J1ZB\n\
                    Description SAC Taxable Non-Taxable Total\n\
                    Air Ticket 996425 1,000.00 5 % 50.00\n\
                    Non Taxable Charges 300.00\n\
                    Grand Total 1,350.00";
        let record = extract(text).unwrap();
        assert_eq!(record.non_taxable_value, dec("300.00"));
        assert_eq!(record.total_amount, dec("1350.00"));
    }

    #[test]
    fn test_missing_total() {
        let text = "AIR INDIA EXPRESS\nInvoice Number : KL1\nGSTIN of Customer : 33AACCN5739J1ZB\n\
                    Air Ticket 996425 1,000.00 5 % 50.00";
        assert_eq!(extract(text).unwrap_err(), DocumentError::ZeroTotal);
    }
}
