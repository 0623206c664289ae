//! Partitioning of template rows into one output file per registration.

use std::collections::BTreeMap;

use serde::Serialize;

use super::row::{CsvRow, RowSynthesizer};
use super::schema::HEADERS;
use crate::error::ExportError;
use crate::invoice::rules::gstin;
use crate::invoice::validator::ValidationOutcome;
use crate::models::invoice::InvoiceRecord;

/// Key used when grouping is disabled.
const ALL: &str = "ALL";

/// Output file key: customer state and GSTIN.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupKey {
    pub state: String,
    pub gstin: String,
}

impl GroupKey {
    /// Key of the group a record belongs to.
    ///
    /// The state is taken from the GSTIN's state code; codes outside the
    /// state table are kept as the bare code.
    pub fn for_record(record: &InvoiceRecord) -> Self {
        let code = record.state_code();
        let state = gstin::state_name(code).unwrap_or(code);
        Self {
            state: state.to_string(),
            gstin: record.customer_gstin.clone(),
        }
    }

    /// The single key used when grouping by GSTIN is turned off.
    pub fn all() -> Self {
        Self {
            state: ALL.to_string(),
            gstin: ALL.to_string(),
        }
    }

    /// `<prefix>_<State>_<GSTIN>_<timestamp>.csv`, with spaces removed from
    /// the state name.
    pub fn file_name(&self, prefix: &str, timestamp: &str) -> String {
        let state: String = self.state.chars().filter(|c| !c.is_whitespace()).collect();
        format!("{prefix}_{state}_{}_{timestamp}.csv", self.gstin)
    }
}

/// Rows destined for one output file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputGroup {
    pub key: GroupKey,
    rows: Vec<CsvRow>,
}

impl OutputGroup {
    pub fn rows(&self) -> &[CsvRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn file_name(&self, prefix: &str, timestamp: &str) -> String {
        self.key.file_name(prefix, timestamp)
    }

    /// Serialize the header row followed by every row.
    pub fn to_csv(&self) -> Result<Vec<u8>, ExportError> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(HEADERS)?;
        for row in &self.rows {
            wtr.write_record(row.values())?;
        }
        wtr.into_inner()
            .map_err(|e| ExportError::Buffer(e.to_string()))
    }
}

/// Synthesize and group rows for a set of validated records.
///
/// The result does not depend on the order of `records`: groups come out in
/// key order and rows within a group are ordered by invoice number, then
/// source file name.
pub fn partition<'a, I>(records: I, synthesizer: &RowSynthesizer, group_by_gstin: bool) -> Vec<OutputGroup>
where
    I: IntoIterator<Item = (&'a InvoiceRecord, &'a ValidationOutcome)>,
{
    let mut groups: BTreeMap<GroupKey, Vec<((String, String), CsvRow)>> = BTreeMap::new();

    for (record, validation) in records {
        if !validation.is_emittable() {
            continue;
        }
        let key = if group_by_gstin {
            GroupKey::for_record(record)
        } else {
            GroupKey::all()
        };
        let order = (record.invoice_number.clone(), record.filename.clone());
        groups
            .entry(key)
            .or_default()
            .push((order, synthesizer.synthesize(record, validation)));
    }

    groups
        .into_iter()
        .map(|(key, mut rows)| {
            rows.sort_by(|a, b| a.0.cmp(&b.0));
            OutputGroup {
                key,
                rows: rows.into_iter().map(|(_, row)| row).collect(),
            }
        })
        .collect()
}
