//! Arithmetic cross-check of an extracted invoice.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::DocumentError;
use crate::models::config::ValidationConfig;
use crate::models::invoice::InvoiceRecord;

use super::rules::amounts::format_amount;

/// Outcome class of the cross-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    /// Components add up to the total within tolerance.
    Ok,
    /// Components disagree with the total; the record is still emitted.
    Warning,
    /// The record must not be emitted.
    Fail,
}

/// Input tax credit flag written to the "Avail Tax Credit" column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailTaxCredit {
    /// IGST was charged: full credit, written as "100".
    Full,
    /// Intra-state or untaxed: written as "Yes".
    Yes,
}

impl AvailTaxCredit {
    /// IGST > 0 means full credit; anything else means "Yes".
    pub fn for_igst(igst: Decimal) -> Self {
        if igst > Decimal::ZERO {
            AvailTaxCredit::Full
        } else {
            AvailTaxCredit::Yes
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AvailTaxCredit::Full => "100",
            AvailTaxCredit::Yes => "Yes",
        }
    }
}

/// Result of cross-validating one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub status: ValidationStatus,
    pub message: String,
    pub avail_tax_credit: AvailTaxCredit,
}

impl ValidationOutcome {
    pub fn is_emittable(&self) -> bool {
        self.status != ValidationStatus::Fail
    }
}

/// Compares the printed total with the sum of its components.
#[derive(Debug, Clone)]
pub struct CrossValidator {
    tolerance: Decimal,
}

impl CrossValidator {
    /// Create a validator with an absolute tolerance in rupees.
    pub fn new(tolerance: Decimal) -> Self {
        Self {
            tolerance: tolerance.abs(),
        }
    }

    pub fn from_config(config: &ValidationConfig) -> Self {
        Self::new(config.tolerance)
    }

    pub fn tolerance(&self) -> Decimal {
        self.tolerance
    }

    /// Cross-check a record.
    ///
    /// `|taxable + non-taxable + CGST + SGST + IGST - total| <= tolerance`
    /// is Ok, a larger difference is a Warning, and a zero total is a Fail.
    pub fn validate(&self, record: &InvoiceRecord) -> ValidationOutcome {
        let avail_tax_credit = AvailTaxCredit::for_igst(record.igst);

        if record.total_amount <= Decimal::ZERO {
            return ValidationOutcome {
                status: ValidationStatus::Fail,
                message: DocumentError::ZeroTotal.to_string(),
                avail_tax_credit,
            };
        }

        let expected = record.expected_total();
        let difference = (expected - record.total_amount).abs();

        if difference <= self.tolerance {
            return ValidationOutcome {
                status: ValidationStatus::Ok,
                message: "Totals match".to_string(),
                avail_tax_credit,
            };
        }

        warn!(
            file = %record.filename,
            invoice = %record.invoice_number,
            expected = %expected,
            total = %record.total_amount,
            "Invoice total does not match its components"
        );

        ValidationOutcome {
            status: ValidationStatus::Warning,
            message: format!(
                "Total mismatch: components sum to {} but invoice total is {} (difference {})",
                format_amount(expected),
                format_amount(record.total_amount),
                format_amount(difference)
            ),
            avail_tax_credit,
        }
    }
}

impl Default for CrossValidator {
    fn default() -> Self {
        Self::from_config(&ValidationConfig::default())
    }
}
