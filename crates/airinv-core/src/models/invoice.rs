//! Invoice data models for airline GST invoices.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::invoice::rules::gstin;

/// Airline families with a dedicated extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Airline {
    AirIndia,
    AirIndiaExpress,
    IndiGo,
    Akasa,
    GulfAir,
    /// No airline landmark matched.
    Unknown,
}

impl Airline {
    /// Every airline that has an extractor, in classification priority order.
    ///
    /// Air India Express must come before Air India: its letterhead also
    /// contains "AIR INDIA".
    pub const SUPPORTED: [Airline; 5] = [
        Airline::AirIndiaExpress,
        Airline::AirIndia,
        Airline::IndiGo,
        Airline::Akasa,
        Airline::GulfAir,
    ];

    /// Short name used in logs and narrations.
    pub fn display_name(&self) -> &'static str {
        match self {
            Airline::AirIndia => "AIR INDIA",
            Airline::AirIndiaExpress => "AIR INDIA EXPRESS",
            Airline::IndiGo => "INDIGO",
            Airline::Akasa => "AKASA AIR",
            Airline::GulfAir => "GULF AIR",
            Airline::Unknown => "UNKNOWN",
        }
    }

    /// Legal entity name as registered in the ERP vendor master.
    pub fn organization(&self) -> &'static str {
        match self {
            Airline::AirIndia => "AIR INDIA LTD",
            Airline::AirIndiaExpress => "AIR INDIA EXPRESS LIMITED",
            Airline::IndiGo => "InterGlobe Aviation Limited",
            Airline::Akasa => "SNV Aviation Private Limited",
            Airline::GulfAir => "Gulf Air B.S.C. (c)",
            Airline::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Airline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Type of airline document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Tax invoice.
    TaxInvoice,
    /// Debit note (supplementary charge against an earlier invoice).
    DebitNote,
    /// Credit note. Never processed.
    CreditNote,
    /// Missing or ambiguous type landmarks.
    Unknown,
}

impl Default for DocumentType {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Result of classifying a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentClassification {
    pub airline: Airline,
    pub doc_type: DocumentType,
}

impl DocumentClassification {
    pub fn new(airline: Airline, doc_type: DocumentType) -> Self {
        Self { airline, doc_type }
    }

    /// A credit note classification; the airline is irrelevant.
    pub fn credit_note() -> Self {
        Self::new(Airline::Unknown, DocumentType::CreditNote)
    }

    /// Whether the document may proceed to extraction.
    pub fn is_processable(&self) -> bool {
        self.airline != Airline::Unknown
            && matches!(self.doc_type, DocumentType::TaxInvoice | DocumentType::DebitNote)
    }
}

/// Fields the extractors look for. Used to name the landmark that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceField {
    InvoiceNumber,
    InvoiceDate,
    CustomerGstin,
    VendorGstin,
    CustomerName,
    TaxableValue,
    NonTaxableValue,
    Cgst,
    Sgst,
    Igst,
    /// At least one of CGST+SGST or IGST.
    TaxAmounts,
    IgstRate,
    TotalAmount,
    Pnr,
    PassengerName,
    Route,
}

impl InvoiceField {
    /// Human readable field name, used in failure messages.
    pub fn label(&self) -> &'static str {
        match self {
            InvoiceField::InvoiceNumber => "Invoice number",
            InvoiceField::InvoiceDate => "Invoice date",
            InvoiceField::CustomerGstin => "Customer GSTIN",
            InvoiceField::VendorGstin => "Vendor GSTIN",
            InvoiceField::CustomerName => "Customer name",
            InvoiceField::TaxableValue => "Taxable value",
            InvoiceField::NonTaxableValue => "Non-taxable value",
            InvoiceField::Cgst => "CGST amount",
            InvoiceField::Sgst => "SGST amount",
            InvoiceField::Igst => "IGST amount",
            InvoiceField::TaxAmounts => "Tax amounts",
            InvoiceField::IgstRate => "IGST rate",
            InvoiceField::TotalAmount => "Total amount",
            InvoiceField::Pnr => "PNR",
            InvoiceField::PassengerName => "Passenger name",
            InvoiceField::Route => "Route",
        }
    }
}

/// Flight sector, as three-letter airport codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl Route {
    /// Narration form: "BOM TO DEL", or just "BOM" when only the origin is known.
    pub fn describe(&self) -> String {
        match &self.to {
            Some(to) => format!("{} TO {}", self.from, to),
            None => self.from.clone(),
        }
    }
}

/// A fully extracted airline invoice.
///
/// All amounts are non-negative and carry two decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub airline: Airline,
    pub doc_type: DocumentType,

    /// Invoice or debit note number.
    pub invoice_number: String,

    /// GSTIN of the billed customer; decides the output group.
    pub customer_gstin: String,

    pub taxable_value: Decimal,
    pub non_taxable_value: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,

    /// Invoice total as printed on the document.
    pub total_amount: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<NaiveDate>,

    /// GSTIN of the airline's issuing registration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_gstin: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,

    /// IGST rate in percent, when printed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub igst_rate: Option<Decimal>,

    /// PNR, or ticket number for carriers that do not print one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnr: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub passenger_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,

    /// Source file name.
    pub filename: String,
}

impl InvoiceRecord {
    /// Two-digit GST state code of the customer registration.
    pub fn state_code(&self) -> &str {
        gstin::state_code(&self.customer_gstin).unwrap_or("")
    }

    /// State name of the customer registration, if the code is known.
    pub fn state_name(&self) -> Option<&'static str> {
        gstin::state_name(self.state_code())
    }

    /// Sum of all tax components.
    pub fn tax_total(&self) -> Decimal {
        self.cgst + self.sgst + self.igst
    }

    /// Total implied by the individual components.
    pub fn expected_total(&self) -> Decimal {
        self.taxable_value + self.non_taxable_value + self.tax_total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn record() -> InvoiceRecord {
        InvoiceRecord {
            airline: Airline::IndiGo,
            doc_type: DocumentType::TaxInvoice,
            invoice_number: "MH1252612AB12345".to_string(),
            customer_gstin: "27AACCN5739J1Z4".to_string(),
            taxable_value: Decimal::from_str("1000.00").unwrap(),
            non_taxable_value: Decimal::from_str("236.00").unwrap(),
            cgst: Decimal::ZERO,
            sgst: Decimal::ZERO,
            igst: Decimal::from_str("50.00").unwrap(),
            total_amount: Decimal::from_str("1286.00").unwrap(),
            invoice_date: None,
            vendor_gstin: None,
            customer_name: None,
            igst_rate: None,
            pnr: None,
            passenger_name: None,
            route: None,
            filename: "invoice.pdf".to_string(),
        }
    }

    #[test]
    fn test_expected_total() {
        assert_eq!(record().expected_total(), Decimal::from_str("1286.00").unwrap());
    }

    #[test]
    fn test_state_from_customer_gstin() {
        let r = record();
        assert_eq!(r.state_code(), "27");
        assert_eq!(r.state_name(), Some("MAHARASHTRA"));
    }

    #[test]
    fn test_classification_processable() {
        assert!(DocumentClassification::new(Airline::GulfAir, DocumentType::DebitNote).is_processable());
        assert!(!DocumentClassification::credit_note().is_processable());
        assert!(!DocumentClassification::new(Airline::Unknown, DocumentType::TaxInvoice).is_processable());
        assert!(!DocumentClassification::new(Airline::Akasa, DocumentType::Unknown).is_processable());
    }

    #[test]
    fn test_route_describe() {
        let route = Route { from: "BOM".to_string(), to: Some("DEL".to_string()) };
        assert_eq!(route.describe(), "BOM TO DEL");
        let route = Route { from: "BOM".to_string(), to: None };
        assert_eq!(route.describe(), "BOM");
    }
}
