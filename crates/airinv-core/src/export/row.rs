//! Mapping of one validated invoice onto the upload template.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::schema::{Column, HEADERS};
use crate::invoice::rules::amounts::format_amount;
use crate::invoice::rules::dates::format_date;
use crate::invoice::rules::gstin;
use crate::invoice::validator::ValidationOutcome;
use crate::models::config::{AirinvConfig, BranchConfig};
use crate::models::invoice::InvoiceRecord;

const CURRENCY: &str = "INR";
const EXCHANGE_RATE: &str = "1";
const DEBIT: &str = "Dr";
const BASE_FARE: &str = "BASE FARE";
const TAX_GROUP: &str = "GSTIN";
const TAXABLE: &str = "Taxable";
const ROUND_OFF: &str = "Yes";

const TRAVEL_HEAD: &str = "TRAVELLING EXPENSES";
const TRAVEL_SAC: &str = "996425";
const MISC_CHARGES_HEAD: &str = "TRAVELLING EXP. (AIRLINE MISC CHARGES)";
const MISC_CHARGES_SAC: &str = "996429";

/// Batch-wide inputs of the mapping.
///
/// Everything that is not on the record itself lives here, so synthesizing
/// the same record with the same context always yields the same row.
#[derive(Debug, Clone)]
pub struct RowContext {
    /// Entry, posting and due date of every row in the batch.
    pub entry_date: NaiveDate,

    /// chrono format for all date columns.
    pub date_format: String,

    pub branches: BranchConfig,
}

impl RowContext {
    pub fn new(entry_date: NaiveDate) -> Self {
        Self::from_config(entry_date, &AirinvConfig::default())
    }

    pub fn from_config(entry_date: NaiveDate, config: &AirinvConfig) -> Self {
        Self {
            entry_date,
            date_format: config.export.date_format.clone(),
            branches: config.branches.clone(),
        }
    }

    /// Branch for the airline registration, or its state name.
    pub fn organization_branch(&self, vendor_gstin: Option<&str>) -> Option<String> {
        let gstin = vendor_gstin?;
        branch_for(&self.branches.vendor, gstin)
    }

    /// Branch for our own registration, or its state name.
    pub fn customer_branch(&self, customer_gstin: &str) -> Option<String> {
        branch_for(&self.branches.customer, customer_gstin)
    }

    /// Whether the vendor GSTIN has its own entry in the directory.
    pub fn is_mapped_vendor(&self, vendor_gstin: &str) -> bool {
        self.branches.vendor.contains_key(vendor_gstin)
    }
}

fn branch_for(directory: &std::collections::BTreeMap<String, String>, gstin: &str) -> Option<String> {
    directory.get(gstin).cloned().or_else(|| {
        gstin::state_code(gstin)
            .and_then(gstin::state_name)
            .map(str::to_string)
    })
}

/// One template row. Always exactly 41 values, in header order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvRow {
    values: Vec<String>,
}

impl CsvRow {
    /// A row with every column blank.
    fn blank() -> Self {
        Self {
            values: vec![String::new(); HEADERS.len()],
        }
    }

    fn set(&mut self, column: Column, value: impl Into<String>) {
        self.values[column.index()] = value.into();
    }

    pub fn get(&self, column: Column) -> &str {
        &self.values[column.index()]
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Builds template rows from validated records.
#[derive(Debug, Clone)]
pub struct RowSynthesizer {
    context: RowContext,
}

impl RowSynthesizer {
    pub fn new(context: RowContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &RowContext {
        &self.context
    }

    /// Map a record onto the template.
    ///
    /// Columns without a source (cost center, LOB, reference and withholding
    /// columns, tax codes 3 and 4) are always blank.
    pub fn synthesize(&self, record: &InvoiceRecord, validation: &ValidationOutcome) -> CsvRow {
        let ctx = &self.context;
        let entry_date = format_date(ctx.entry_date, &ctx.date_format);
        let organization = record.airline.organization();
        let (head, sac) = expense_head(record);

        let mut row = CsvRow::blank();
        row.set(Column::EntryDate, entry_date.clone());
        row.set(Column::PostingDate, entry_date.clone());
        row.set(Column::Organization, organization);
        row.set(
            Column::OrganizationBranch,
            ctx.organization_branch(record.vendor_gstin.as_deref())
                .unwrap_or_default(),
        );
        row.set(Column::VendorInvNo, record.invoice_number.clone());
        row.set(
            Column::VendorInvDate,
            record
                .invoice_date
                .map(|d| format_date(d, &ctx.date_format))
                .unwrap_or_default(),
        );
        row.set(Column::Currency, CURRENCY);
        row.set(Column::ExchRate, EXCHANGE_RATE);
        row.set(Column::Narration, narration(record));
        row.set(Column::DueDate, entry_date);
        row.set(Column::ChargeOrGl, head);
        row.set(Column::ChargeOrGlName, head);
        row.set(Column::ChargeOrGlAmount, format_amount(charge_amount(record)));
        row.set(Column::DrOrCr, DEBIT);
        row.set(
            Column::Branch,
            ctx.customer_branch(&record.customer_gstin).unwrap_or_default(),
        );
        row.set(Column::ChargeNarration, BASE_FARE);
        row.set(Column::TaxGroup, TAX_GROUP);
        row.set(Column::TaxType, TAXABLE);
        row.set(Column::SacOrHsn, sac);

        for ((code_column, amount_column), (code, amount)) in [
            (Column::Taxcode1, Column::Taxcode1Amt),
            (Column::Taxcode2, Column::Taxcode2Amt),
        ]
        .into_iter()
        .zip(tax_codes(record))
        {
            row.set(code_column, code);
            row.set(amount_column, format_amount(amount));
        }

        row.set(Column::AvailTaxCredit, validation.avail_tax_credit.as_str());
        row.set(Column::Amount, format_amount(record.expected_total()));
        row.set(Column::RoundOff, ROUND_OFF);
        row
    }
}

/// "BEING AMOUNT PAYABLE TO <org> FROM <route> PNR:<pnr> PAX:<name>", with
/// absent parts left out.
pub fn narration(record: &InvoiceRecord) -> String {
    let mut text = format!("BEING AMOUNT PAYABLE TO {}", record.airline.organization());
    if let Some(route) = &record.route {
        text.push_str(" FROM ");
        text.push_str(&route.describe());
    }
    if let Some(pnr) = &record.pnr {
        text.push_str(" PNR:");
        text.push_str(pnr);
    }
    if let Some(pax) = &record.passenger_name {
        text.push_str(" PAX:");
        text.push_str(pax);
    }
    text
}

/// Invoices taxed at 18% IGST are ancillary charges, not fares.
fn expense_head(record: &InvoiceRecord) -> (&'static str, &'static str) {
    if record.igst_rate == Some(Decimal::from(18)) {
        (MISC_CHARGES_HEAD, MISC_CHARGES_SAC)
    } else {
        (TRAVEL_HEAD, TRAVEL_SAC)
    }
}

fn charge_amount(record: &InvoiceRecord) -> Decimal {
    if record.taxable_value > Decimal::ZERO {
        record.taxable_value
    } else {
        record.total_amount
    }
}

/// IGST alone, else CGST followed by SGST.
fn tax_codes(record: &InvoiceRecord) -> Vec<(&'static str, Decimal)> {
    if record.igst > Decimal::ZERO {
        return vec![("IGST", record.igst)];
    }

    let mut codes = Vec::with_capacity(2);
    if record.cgst > Decimal::ZERO {
        codes.push(("CGST", record.cgst));
    }
    if record.sgst > Decimal::ZERO {
        codes.push(("SGST", record.sgst));
    }
    codes
}
