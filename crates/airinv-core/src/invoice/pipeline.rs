//! Single document pipeline: classify, extract, validate.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::airlines::extractor_for;
use super::classifier::classify;
use super::normalize::RawDocument;
use super::validator::{CrossValidator, ValidationOutcome, ValidationStatus};
use crate::batch::{BatchEvent, BatchObserver, NoopObserver};
use crate::error::DocumentError;
use crate::models::config::AirinvConfig;
use crate::models::invoice::{Airline, DocumentType, InvoiceRecord};

/// Lifecycle of one document.
///
/// `Pending -> Classifying -> Extracting -> Validating`, ending in exactly
/// one of `Succeeded`, `Rejected` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum DocumentState {
    Pending,
    Classifying,
    Extracting,
    Validating,
    Succeeded,
    Rejected(String),
    Failed(String),
}

impl DocumentState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DocumentState::Succeeded | DocumentState::Rejected(_) | DocumentState::Failed(_)
        )
    }
}

/// Terminal result of running one document through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    /// Extracted and validated; validation is Ok or Warning.
    Succeeded {
        record: InvoiceRecord,
        validation: ValidationOutcome,
    },
    /// Deliberately not processed (credit note, unknown airline or type).
    Rejected {
        filename: String,
        airline: Airline,
        reason: DocumentError,
    },
    /// Could not be processed.
    Failed {
        filename: String,
        airline: Airline,
        reason: DocumentError,
    },
}

impl DocumentOutcome {
    pub fn filename(&self) -> &str {
        match self {
            DocumentOutcome::Succeeded { record, .. } => &record.filename,
            DocumentOutcome::Rejected { filename, .. } | DocumentOutcome::Failed { filename, .. } => {
                filename
            }
        }
    }

    pub fn state(&self) -> DocumentState {
        match self {
            DocumentOutcome::Succeeded { .. } => DocumentState::Succeeded,
            DocumentOutcome::Rejected { reason, .. } => DocumentState::Rejected(reason.to_string()),
            DocumentOutcome::Failed { reason, .. } => DocumentState::Failed(reason.to_string()),
        }
    }

    pub fn record(&self) -> Option<&InvoiceRecord> {
        match self {
            DocumentOutcome::Succeeded { record, .. } => Some(record),
            _ => None,
        }
    }

    /// Outcome of a document whose processing was cut short, for example by
    /// a crashed worker.
    pub fn aborted(filename: impl Into<String>, detail: impl Into<String>) -> Self {
        DocumentOutcome::Failed {
            filename: filename.into(),
            airline: Airline::Unknown,
            reason: DocumentError::Aborted(detail.into()),
        }
    }

    fn from_error(filename: &str, airline: Airline, reason: DocumentError) -> Self {
        if reason.is_rejection() {
            DocumentOutcome::Rejected {
                filename: filename.to_string(),
                airline,
                reason,
            }
        } else {
            DocumentOutcome::Failed {
                filename: filename.to_string(),
                airline,
                reason,
            }
        }
    }
}

/// Classifies, extracts and validates documents.
///
/// Holds no mutable state, so one pipeline can be shared between worker
/// threads.
#[derive(Debug, Clone, Default)]
pub struct InvoicePipeline {
    validator: CrossValidator,
}

impl InvoicePipeline {
    pub fn new(config: &AirinvConfig) -> Self {
        Self {
            validator: CrossValidator::from_config(&config.validation),
        }
    }

    /// Replace the cross validator.
    pub fn with_validator(mut self, validator: CrossValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn validator(&self) -> &CrossValidator {
        &self.validator
    }

    /// Process one document.
    pub fn process(&self, doc: &RawDocument) -> DocumentOutcome {
        self.process_observed(doc, &NoopObserver)
    }

    /// Process one document, reporting every state transition.
    #[instrument(skip_all, fields(file = %doc.filename))]
    pub fn process_observed(&self, doc: &RawDocument, observer: &dyn BatchObserver) -> DocumentOutcome {
        let notify = |state: DocumentState| {
            observer.on_event(BatchEvent::StateChanged {
                filename: doc.filename.clone(),
                state,
            });
        };

        let outcome = self.run(doc, &notify);
        debug!(state = ?outcome.state(), "Document resolved");
        notify(outcome.state());
        outcome
    }

    fn run(&self, doc: &RawDocument, notify: &dyn Fn(DocumentState)) -> DocumentOutcome {
        notify(DocumentState::Classifying);
        let classification = classify(doc);
        let airline = classification.airline;

        if classification.doc_type == DocumentType::CreditNote {
            return DocumentOutcome::from_error(
                &doc.filename,
                airline,
                DocumentError::UnsupportedDocumentType,
            );
        }
        if !doc.has_text() {
            return DocumentOutcome::from_error(&doc.filename, airline, DocumentError::NoText);
        }
        let Some(extractor) = extractor_for(airline) else {
            return DocumentOutcome::from_error(&doc.filename, airline, DocumentError::UnknownAirline);
        };
        if classification.doc_type == DocumentType::Unknown {
            return DocumentOutcome::from_error(
                &doc.filename,
                airline,
                DocumentError::UnknownDocumentType,
            );
        }

        notify(DocumentState::Extracting);
        let record = match extractor.extract(doc, classification) {
            Ok(record) => record,
            Err(reason) => return DocumentOutcome::from_error(&doc.filename, airline, reason),
        };

        notify(DocumentState::Validating);
        let validation = self.validator.validate(&record);
        if validation.status == ValidationStatus::Fail {
            return DocumentOutcome::from_error(&doc.filename, airline, DocumentError::ZeroTotal);
        }

        DocumentOutcome::Succeeded { record, validation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::airlines::samples;
    use std::sync::Mutex;

    #[test]
    fn test_indigo_sample_succeeds() {
        let doc = RawDocument::new("6E_MH1252612AB12345.pdf", samples::INDIGO);
        let outcome = InvoicePipeline::default().process(&doc);

        let DocumentOutcome::Succeeded { record, validation } = outcome else {
            panic!("expected success, got {outcome:?}");
        };
        assert_eq!(record.airline, Airline::IndiGo);
        assert_eq!(validation.status, ValidationStatus::Ok);
        assert_eq!(validation.avail_tax_credit.as_str(), "100");
    }

    #[test]
    fn test_credit_note_rejected_whatever_the_text() {
        let doc = RawDocument::new("CREDIT_NOTE_991.pdf", samples::INDIGO);
        let outcome = InvoicePipeline::default().process(&doc);
        assert_eq!(
            outcome.state(),
            DocumentState::Rejected("Credit notes are not supported".to_string())
        );
    }

    #[test]
    fn test_empty_text_fails() {
        let outcome = InvoicePipeline::default().process(&RawDocument::new("scan.pdf", "  \n "));
        assert_eq!(
            outcome.state(),
            DocumentState::Failed("Could not extract text from PDF".to_string())
        );
    }

    #[test]
    fn test_credit_note_file_without_text_is_still_rejected() {
        let outcome = InvoicePipeline::default().process(&RawDocument::new("Credit_77.pdf", ""));
        assert!(matches!(outcome, DocumentOutcome::Rejected { .. }));
    }

    #[test]
    fn test_unknown_airline_rejected() {
        let doc = RawDocument::new("x.pdf", "VISTARA\nTAX INVOICE\nInvoice Number : UK1");
        let outcome = InvoicePipeline::default().process(&doc);
        assert_eq!(outcome.state(), DocumentState::Rejected("Unknown invoice format".to_string()));
    }

    #[test]
    fn test_unknown_document_type_rejected() {
        let doc = RawDocument::new("x.pdf", "INDIGO\nTAX INVOICE\nDEBIT NOTE\nNumber : MH1AB1");
        let outcome = InvoicePipeline::default().process(&doc);
        assert_eq!(
            outcome.state(),
            DocumentState::Rejected("Unknown invoice format - document type not recognized".to_string())
        );
    }

    #[test]
    fn test_missing_gstin_fails_with_field_reason() {
        let doc = RawDocument::new(
            "x.pdf",
            "GULF AIR\nTAX INVOICE\nInvoice No : TK1\nTaxable Value 10,000\nTotal (including taxes) 10,500",
        );
        let outcome = InvoicePipeline::default().process(&doc);
        assert_eq!(outcome.state(), DocumentState::Failed("Customer GSTIN not found".to_string()));
    }

    #[test]
    fn test_zero_total_fails() {
        let doc = RawDocument::new(
            "x.pdf",
            "GULF AIR\nTAX INVOICE\nInvoice No : TK1\nGSTIN of Customer : 27AACCN5739J1Z4\n\
             Taxable Value 0\nIntegrated Tax (IGST) 5% 0\nTotal (including taxes) 0",
        );
        let outcome = InvoicePipeline::default().process(&doc);
        assert_eq!(
            outcome.state(),
            DocumentState::Failed("Total amount not found or is zero".to_string())
        );
    }

    #[test]
    fn test_aborted_outcome_is_a_failure() {
        let outcome = DocumentOutcome::aborted("6e.pdf", "worker panicked");
        assert_eq!(outcome.filename(), "6e.pdf");
        assert_eq!(
            outcome.state(),
            DocumentState::Failed("Processing aborted: worker panicked".to_string())
        );
        assert!(outcome.record().is_none());
    }

    #[test]
    fn test_state_transitions_reported_in_order() {
        let seen = Mutex::new(Vec::new());
        let observer = |event: BatchEvent| {
            if let BatchEvent::StateChanged { state, .. } = event {
                seen.lock().unwrap().push(state);
            }
        };

        let doc = RawDocument::new("6e.pdf", samples::INDIGO);
        InvoicePipeline::default().process_observed(&doc, &observer);

        assert_eq!(
            seen.into_inner().unwrap(),
            vec![
                DocumentState::Classifying,
                DocumentState::Extracting,
                DocumentState::Validating,
                DocumentState::Succeeded,
            ]
        );
    }
}
