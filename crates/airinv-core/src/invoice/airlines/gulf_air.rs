//! Gulf Air tax invoices.
//!
//! Labelled summary lines, amounts sometimes printed without decimals. Gulf
//! Air prints no PNR; the ticket number stands in for it.

use lazy_static::lazy_static;

use super::{extract_with, no_pass_through_charges, second_gstin_landmark, AirlineLandmarks};
use crate::error::DocumentError;
use crate::invoice::normalize::RawDocument;
use crate::invoice::rules::landmarks::{FieldLandmarks, Landmark};
use crate::invoice::rules::patterns::{AMOUNT_FIELD, GSTIN};
use crate::invoice::InvoiceExtractor;
use crate::models::invoice::{Airline, DocumentClassification, InvoiceField, InvoiceRecord};

lazy_static! {
    static ref LANDMARKS: AirlineLandmarks = landmarks();
}

fn tax_line(label: &str) -> String {
    format!(r"(?i:{label})\s*(?:@\s*)?(\d+(?:\.\d+)?)\s*%\s*({AMOUNT_FIELD})")
}

fn landmarks() -> AirlineLandmarks {
    let igst = tax_line(r"Integrated\s*Tax\s*\(IGST\)");
    let sector = r"(?i:Sector)\s*[:\s]*([A-Z]{3})\s*[-/]\s*([A-Z]{3})\b";

    AirlineLandmarks {
        invoice_number: FieldLandmarks::new(
            InvoiceField::InvoiceNumber,
            vec![Landmark::group(
                "invoice-no",
                r"(?i:Invoice\s*No\.?)\s*[:\s]*([A-Z0-9/\-]+)",
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
            vec![Landmark::group(
                "taxable-value-line",
                &format!(r"(?im)^Taxable\s*Value[^\d\n]*({AMOUNT_FIELD})"),
                1,
            )],
        ),
        non_taxable_value: FieldLandmarks::new(
            InvoiceField::NonTaxableValue,
            vec![
                Landmark::group(
                    "non-taxable-value-line",
                    &format!(r"(?i)Non[\s-]*Taxable\s*Value[^\d\n]*({AMOUNT_FIELD})"),
                    1,
                ),
                no_pass_through_charges(),
            ],
        ),
        cgst: FieldLandmarks::new(
            InvoiceField::Cgst,
            vec![Landmark::group("central-tax-line", &tax_line(r"Central\s*Tax\s*\(CGST\)"), 2)],
        ),
        sgst: FieldLandmarks::new(
            InvoiceField::Sgst,
            vec![Landmark::group(
                "state-tax-line",
                &tax_line(r"(?:State|Union\s*Territory)\s*Tax\s*\((?:SGST|UTGST)\)"),
                2,
            )],
        ),
        igst: FieldLandmarks::new(
            InvoiceField::Igst,
            vec![Landmark::group("integrated-tax-line", &igst, 2)],
        ),
        igst_rate: FieldLandmarks::new(
            InvoiceField::IgstRate,
            vec![Landmark::group("integrated-tax-line", &igst, 1)],
        ),
        total_amount: FieldLandmarks::new(
            InvoiceField::TotalAmount,
            vec![Landmark::group(
                "total-including-taxes",
                &format!(r"(?i:Total\s*\(including\s*taxes\))[^\d\n]*({AMOUNT_FIELD})"),
                1,
            )],
        ),
        pnr: FieldLandmarks::new(
            InvoiceField::Pnr,
            vec![Landmark::group(
                "ticket-document-no",
                r"(?i:Ticket\s*/\s*Document\s*No\.?)\s*[:\s]*(\d+)",
                1,
            )],
        ),
        passenger_name: FieldLandmarks::new(
            InvoiceField::PassengerName,
            vec![Landmark::group(
                "passenger-name-label",
                r"(?i:Passenger\s*Name)[ \t]*:?[ \t]*([^\n]+)",
                1,
            )],
        ),
        route_from: FieldLandmarks::new(InvoiceField::Route, vec![Landmark::group("sector", sector, 1)]),
        route_to: FieldLandmarks::new(InvoiceField::Route, vec![Landmark::group("sector", sector, 2)]),
    }
}

/// Extractor for Gulf Air documents.
pub struct GulfAirExtractor;

impl InvoiceExtractor for GulfAirExtractor {
    fn airline(&self) -> Airline {
        Airline::GulfAir
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

    fn extract(text: &str) -> Result<InvoiceRecord, DocumentError> {
        let doc = RawDocument::new("gf.pdf", text);
        let classification = DocumentClassification::new(Airline::GulfAir, DocumentType::TaxInvoice);
        GulfAirExtractor.extract(&doc, classification)
    }

    #[test]
    fn test_extract_sample() {
        let record = extract(samples::GULF_AIR).unwrap();

        assert_eq!(record.invoice_number, "TKMHP/2510/04496");
        assert_eq!(record.customer_gstin, "07AACCN5739J1Z6");
        assert_eq!(record.vendor_gstin.as_deref(), Some("27AAACG2368J1ZI"));
        assert_eq!(record.invoice_date, NaiveDate::from_ymd_opt(2025, 10, 21));
        assert_eq!(record.taxable_value, dec("25000.00"));
        assert_eq!(record.non_taxable_value, dec("3500.00"));
        assert_eq!(record.igst, dec("1250.00"));
        assert_eq!(record.igst_rate, Some(dec("5")));
        assert_eq!(record.total_amount, dec("29750.00"));
        assert_eq!(record.pnr.as_deref(), Some("0722412345678"));
        assert_eq!(record.route.unwrap().describe(), "BOM TO BAH");
    }

    #[test]
    fn test_amounts_without_decimals() {
        let text = "GULF AIR\nInvoice No : TK1\nGSTIN of Customer : 27AACCN5739J1Z4\n\
                    Taxable Value 10,000\nCentral Tax (CGST) 2.5% 250\nState Tax (SGST) 2.5% 250\n\
                    Total (including taxes) 10,500";
        let record = extract(text).unwrap();

        assert_eq!(record.taxable_value, dec("10000.00"));
        assert_eq!(record.non_taxable_value, Decimal::ZERO);
        assert_eq!(record.cgst, dec("250.00"));
        assert_eq!(record.sgst, dec("250.00"));
        assert_eq!(record.total_amount, dec("10500.00"));
    }

    #[test]
    fn test_missing_customer_gstin() {
        let text = "GULF AIR\nInvoice No : TK1\nTaxable Value 10,000\nTotal (including taxes) 10,500";
        assert_eq!(
            extract(text).unwrap_err().to_string(),
            "Customer GSTIN not found"
        );
    }

    #[test]
    fn test_malformed_amount_is_invalid_not_truncated() {
        let text = "GULF AIR\nInvoice No : TK1\nGSTIN of Customer : 27AACCN5739J1Z4\n\
                    Taxable Value 1O,000.00\nIntegrated Tax (IGST) 5% 500\n\
                    Total (including taxes) 10,500";
        assert_eq!(
            extract(text).unwrap_err(),
            DocumentError::InvalidAmount {
                field: InvoiceField::TaxableValue,
                value: "1O,000.00".to_string(),
            }
        );
    }

    #[test]
    fn test_rupee_suffix_is_accepted() {
        let text = "GULF AIR\nInvoice No : TK1\nGSTIN of Customer : 27AACCN5739J1Z4\n\
                    Taxable Value 10,000/-\nIntegrated Tax (IGST) 5% 500/-\n\
                    Total (including taxes) 10,500/-";
        let record = extract(text).unwrap();
        assert_eq!(record.taxable_value, dec("10000.00"));
        assert_eq!(record.igst, dec("500.00"));
        assert_eq!(record.total_amount, dec("10500.00"));
    }
}
