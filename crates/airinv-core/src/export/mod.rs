//! Logisys purchase upload CSV export.

pub mod group;
pub mod row;
pub mod schema;
pub mod summary;

pub use group::{partition, GroupKey, OutputGroup};
pub use row::{narration, CsvRow, RowContext, RowSynthesizer};
pub use schema::{Column, HEADERS};
pub use summary::{ProcessingSummary, SummaryRow, SUMMARY_HEADERS};
