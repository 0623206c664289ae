//! Per-document processing summary.
//!
//! Lists every document of a batch, flags records whose branches could not
//! be mapped, and repeats the reason for every document that was not
//! exported.

use serde::Serialize;

use super::row::RowContext;
use crate::error::ExportError;
use crate::invoice::rules::amounts::format_amount;
use crate::invoice::validator::ValidationStatus;
use crate::invoice::DocumentOutcome;

const NOT_APPLICABLE: &str = "N/A";

/// Header row of the summary file.
pub const SUMMARY_HEADERS: [&str; 11] = [
    "Status",
    "Issues",
    "File Name",
    "Invoice No",
    "Airline",
    "Vendor GSTIN",
    "Mapped Org Branch",
    "In Vendor Map?",
    "Customer GSTIN",
    "Mapped Cust Branch",
    "Amount",
];

/// One summary line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Issues")]
    pub issues: String,
    #[serde(rename = "File Name")]
    pub file_name: String,
    #[serde(rename = "Invoice No")]
    pub invoice_no: String,
    #[serde(rename = "Airline")]
    pub airline: String,
    #[serde(rename = "Vendor GSTIN")]
    pub vendor_gstin: String,
    #[serde(rename = "Mapped Org Branch")]
    pub mapped_org_branch: String,
    #[serde(rename = "In Vendor Map?")]
    pub in_vendor_map: String,
    #[serde(rename = "Customer GSTIN")]
    pub customer_gstin: String,
    #[serde(rename = "Mapped Cust Branch")]
    pub mapped_cust_branch: String,
    #[serde(rename = "Amount")]
    pub amount: String,
}

impl SummaryRow {
    /// Summarize one resolved document.
    pub fn from_outcome(outcome: &DocumentOutcome, ctx: &RowContext) -> Self {
        match outcome {
            DocumentOutcome::Succeeded { record, validation } => {
                let mut issues = Vec::new();
                let mut warning = validation.status == ValidationStatus::Warning;
                if warning {
                    issues.push(validation.message.clone());
                }

                let org_branch = ctx
                    .organization_branch(record.vendor_gstin.as_deref())
                    .unwrap_or_default();
                if org_branch.is_empty() {
                    warning = true;
                    issues.push("Org Branch Empty".to_string());
                }

                let in_map = match record.vendor_gstin.as_deref() {
                    Some(vendor) if !ctx.is_mapped_vendor(vendor) => {
                        warning = true;
                        issues.push("Vendor GSTIN not in Map (State Fallback used)".to_string());
                        "No"
                    }
                    _ => "Yes",
                };

                let cust_branch = ctx.customer_branch(&record.customer_gstin).unwrap_or_default();
                if cust_branch.is_empty() {
                    warning = true;
                    issues.push("Customer Branch Empty".to_string());
                }

                Self {
                    status: if warning { "Warning" } else { "Success" }.to_string(),
                    issues: issues.join("; "),
                    file_name: record.filename.clone(),
                    invoice_no: record.invoice_number.clone(),
                    airline: record.airline.display_name().to_string(),
                    vendor_gstin: record.vendor_gstin.clone().unwrap_or_default(),
                    mapped_org_branch: org_branch,
                    in_vendor_map: in_map.to_string(),
                    customer_gstin: record.customer_gstin.clone(),
                    mapped_cust_branch: cust_branch,
                    amount: format_amount(record.expected_total()),
                }
            }
            DocumentOutcome::Rejected {
                filename,
                airline,
                reason,
            }
            | DocumentOutcome::Failed {
                filename,
                airline,
                reason,
            } => Self {
                status: "Failure".to_string(),
                issues: reason.to_string(),
                file_name: filename.clone(),
                invoice_no: NOT_APPLICABLE.to_string(),
                airline: airline.display_name().to_string(),
                vendor_gstin: String::new(),
                mapped_org_branch: NOT_APPLICABLE.to_string(),
                in_vendor_map: NOT_APPLICABLE.to_string(),
                customer_gstin: String::new(),
                mapped_cust_branch: NOT_APPLICABLE.to_string(),
                amount: String::new(),
            },
        }
    }
}

/// Summary of a whole batch, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessingSummary {
    rows: Vec<SummaryRow>,
}

impl ProcessingSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: SummaryRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `Processing_Summary_<timestamp>.csv`
    pub fn file_name(timestamp: &str) -> String {
        format!("Processing_Summary_{timestamp}.csv")
    }

    /// Serialize the summary. The header row is written even when empty.
    pub fn to_csv(&self) -> Result<Vec<u8>, ExportError> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        wtr.write_record(SUMMARY_HEADERS)?;
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.into_inner()
            .map_err(|e| ExportError::Buffer(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocumentError;
    use crate::invoice::airlines::samples;
    use crate::invoice::{InvoicePipeline, RawDocument};
    use crate::models::invoice::Airline;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn ctx() -> RowContext {
        RowContext::new(NaiveDate::from_ymd_opt(2025, 11, 3).unwrap())
    }

    #[test]
    fn test_mapped_invoice_is_success() {
        let doc = RawDocument::new("AI_0982504MH00012345.pdf", samples::AIR_INDIA);
        let outcome = InvoicePipeline::default().process(&doc);
        let row = SummaryRow::from_outcome(&outcome, &ctx());

        assert_eq!(row.status, "Success");
        assert_eq!(row.issues, "");
        assert_eq!(row.mapped_org_branch, "MUMBAI");
        assert_eq!(row.in_vendor_map, "Yes");
        assert_eq!(row.mapped_cust_branch, "HO");
        assert_eq!(row.amount, "4396.10");
    }

    #[test]
    fn test_unmapped_vendor_is_warning() {
        let doc = RawDocument::new("IX_KL2510000123.pdf", samples::AIR_INDIA_EXPRESS);
        let outcome = InvoicePipeline::default().process(&doc);
        let row = SummaryRow::from_outcome(&outcome, &ctx());

        assert_eq!(row.status, "Warning");
        assert_eq!(row.in_vendor_map, "No");
        assert_eq!(row.mapped_org_branch, "KERALA");
        assert!(row.issues.contains("Vendor GSTIN not in Map"));
    }

    #[test]
    fn test_failure_row() {
        let outcome = DocumentOutcome::Rejected {
            filename: "CREDIT_1.pdf".to_string(),
            airline: Airline::Unknown,
            reason: DocumentError::UnsupportedDocumentType,
        };
        let row = SummaryRow::from_outcome(&outcome, &ctx());

        assert_eq!(row.status, "Failure");
        assert_eq!(row.issues, "Credit notes are not supported");
        assert_eq!(row.invoice_no, "N/A");
    }

    #[test]
    fn test_summary_csv_headers() {
        let mut summary = ProcessingSummary::new();
        let outcome = DocumentOutcome::Failed {
            filename: "scan.pdf".to_string(),
            airline: Airline::Unknown,
            reason: DocumentError::NoText,
        };
        summary.push(SummaryRow::from_outcome(&outcome, &ctx()));

        let text = String::from_utf8(summary.to_csv().unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Status,Issues,File Name,Invoice No,Airline,Vendor GSTIN,Mapped Org Branch,In Vendor Map?,Customer GSTIN,Mapped Cust Branch,Amount")
        );
        assert_eq!(
            lines.next(),
            Some("Failure,Could not extract text from PDF,scan.pdf,N/A,UNKNOWN,,N/A,N/A,,N/A,")
        );
        assert_eq!(ProcessingSummary::file_name("03Nov2025_1420"), "Processing_Summary_03Nov2025_1420.csv");
    }

    #[test]
    fn test_empty_summary_keeps_header() {
        let text = String::from_utf8(ProcessingSummary::new().to_csv().unwrap()).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("Status,Issues"));
    }
}
