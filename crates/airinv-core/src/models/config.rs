//! Configuration structures for the invoice pipeline.

use chrono::format::{Item, StrftimeItems};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::AirinvError;

/// Main configuration for the airinv pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirinvConfig {
    /// Cross-validation configuration.
    pub validation: ValidationConfig,

    /// CSV output configuration.
    pub export: ExportConfig,

    /// GSTIN to ERP branch directories.
    pub branches: BranchConfig,

    /// PDF text extraction configuration.
    pub pdf: PdfConfig,
}

/// Cross-validation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Largest accepted absolute difference, in rupees, between the printed
    /// total and the sum of its components.
    pub tolerance: Decimal,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            tolerance: Decimal::ONE,
        }
    }
}

/// CSV output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Prefix of every generated group file.
    pub filename_prefix: String,

    /// One file per (state, GSTIN); when false, a single "ALL" group.
    pub group_by_gstin: bool,

    /// chrono format string for the file name timestamp.
    pub timestamp_format: String,

    /// chrono format string for entry, posting and due dates.
    pub date_format: String,

    /// Also write the per-document processing summary.
    pub write_summary: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename_prefix: "transport_expenses".to_string(),
            group_by_gstin: true,
            timestamp_format: "%d%b%Y_%H%M".to_string(),
            date_format: "%d-%b-%Y".to_string(),
            write_summary: true,
        }
    }
}

/// GSTIN to branch directories used for the "Organization Branch" and
/// "Branch" columns. GSTINs missing here fall back to their state name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchConfig {
    /// Airline (vendor) registrations.
    pub vendor: BTreeMap<String, String>,

    /// Own (customer) registrations.
    pub customer: BTreeMap<String, String>,
}

impl Default for BranchConfig {
    fn default() -> Self {
        let vendor = [
            ("27ABECS9580P1ZC", "MUMBAI"),
            ("29ABECS9580P1Z8", "KARNATAKA"),
            ("24AABCI2726B1Z8", "VADODRA"),
            ("27AABCI2726B1Z2", "SANTACRUZ"),
            ("32AABCI2726B1ZB", "COCHIN"),
            ("05AABCI2726B1Z8", "UTTARAKHAND"),
            ("03AABCI2726B1ZC", "PUNJAB"),
            ("07AABCI2726B1Z4", "NEW DELHI"),
            ("08AABCI2726B1Z2", "RAJASTHAN"),
            ("30AABCI2726B1ZF", "GOA"),
            ("36AABCI2726B1Z3", "TELANGANA"),
            ("29AABCI2726B1ZY", "KARNATAKA"),
            ("09AABCI2726B1Z0", "UTTAR PRADESH"),
            ("23AABCI2726B1ZA", "MADHYA PRADESH"),
            ("07AACCN6194P2ZQ", "NEW DELHI"),
            ("27AACCN6194P1ZP", "MUMBAI"),
            ("24AACCN6194P1ZV", "GUJARAT"),
            ("03AACCN6194P1ZZ", "PUNJAB"),
            ("08AACCN6194P1ZP", "RAJASTHAN"),
            ("30AACCN6194P1Z2", "GOA"),
            ("27AABCA0522B1ZK", "MUMBAI"),
            ("27AAACG2368J1ZI", "MAHARASHTRA"),
        ];
        let customer = [
            ("27AACCN5739J1Z4", "HO"),
            ("06AACCN5739J1Z8", "HARYANA"),
            ("33AACCN5739J1ZB", "CHENNAI"),
            ("24AACCN5739J1ZA", "GUJARAT"),
            ("27AACCN5739J2Z3", "ISD"),
        ];

        Self {
            vendor: vendor
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            customer: customer
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// PDF text extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum non-whitespace characters for a PDF to count as text-based.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            min_text_length: 50,
        }
    }
}

impl AirinvConfig {
    /// Reject settings that would only fail halfway through a batch.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.validation.tolerance < Decimal::ZERO {
            return Err(AirinvError::Config(format!(
                "validation.tolerance must not be negative, got {}",
                self.validation.tolerance
            )));
        }
        for (key, format) in [
            ("export.timestamp_format", &self.export.timestamp_format),
            ("export.date_format", &self.export.date_format),
        ] {
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(AirinvError::Config(format!("{key} is not a valid format: '{format}'")));
            }
        }
        if self.export.filename_prefix.trim().is_empty() {
            return Err(AirinvError::Config("export.filename_prefix must not be empty".to_string()));
        }
        Ok(())
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_default_tolerance() {
        assert_eq!(AirinvConfig::default().validation.tolerance, Decimal::ONE);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "validation": { "tolerance": "0.50" }, "export": { "group_by_gstin": false } }"#;
        let config: AirinvConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.validation.tolerance, Decimal::from_str("0.50").unwrap());
        assert!(!config.export.group_by_gstin);
        assert_eq!(config.export.filename_prefix, "transport_expenses");
        assert_eq!(config.branches.customer.get("27AACCN5739J1Z4").map(String::as_str), Some("HO"));
    }

    #[test]
    fn test_validate() {
        assert!(AirinvConfig::default().validate().is_ok());

        let mut config = AirinvConfig::default();
        config.export.timestamp_format = "%d%Q".to_string();
        assert!(config.validate().is_err());

        let mut config = AirinvConfig::default();
        config.validation.tolerance = Decimal::NEGATIVE_ONE;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AirinvConfig::default();
        config.export.filename_prefix = "flight_exp".to_string();
        config.save(&path).unwrap();

        let loaded = AirinvConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
