//! Data models shared by the extraction pipeline and the exporters.

pub mod config;
pub mod invoice;

pub use config::AirinvConfig;
pub use invoice::{
    Airline, DocumentClassification, DocumentType, InvoiceField, InvoiceRecord, Route,
};
