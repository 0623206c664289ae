//! Batch orchestration.
//!
//! Documents are resolved one at a time by [`InvoicePipeline`]; the
//! [`BatchCollector`] keeps the processing log in completion order and, once
//! the batch is over, partitions every successful record into output groups.
//! Progress leaves the engine only through a [`BatchObserver`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{AirinvError, Result};
use crate::export::{partition, OutputGroup, ProcessingSummary, RowContext, RowSynthesizer, SummaryRow};
use crate::invoice::validator::ValidationStatus;
use crate::invoice::{DocumentOutcome, DocumentState, InvoicePipeline, RawDocument};
use crate::models::config::{AirinvConfig, ExportConfig};
use crate::models::invoice::Airline;

/// Status column of the processing log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogStatus {
    Success,
    Warning,
    Failure,
}

impl std::fmt::Display for LogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogStatus::Success => "Success",
            LogStatus::Warning => "Warning",
            LogStatus::Failure => "Failure",
        };
        f.write_str(s)
    }
}

/// One line of the processing log, written when a document resolves.
///
/// Successes carry the invoice number and amount; everything else carries a
/// reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub status: LogStatus,
    pub filename: String,
    pub airline: Airline,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl LogEntry {
    pub fn from_outcome(outcome: &DocumentOutcome) -> Self {
        match outcome {
            DocumentOutcome::Succeeded { record, validation } => {
                let warning = validation.status == ValidationStatus::Warning;
                Self {
                    status: if warning {
                        LogStatus::Warning
                    } else {
                        LogStatus::Success
                    },
                    filename: record.filename.clone(),
                    airline: record.airline,
                    invoice_number: Some(record.invoice_number.clone()),
                    amount: Some(record.total_amount),
                    reason: warning.then(|| validation.message.clone()),
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
                status: LogStatus::Failure,
                filename: filename.clone(),
                airline: *airline,
                invoice_number: None,
                amount: None,
                reason: Some(reason.to_string()),
            },
        }
    }
}

/// Messages sent from the engine to its caller.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    /// A document moved to a new state.
    StateChanged {
        filename: String,
        state: DocumentState,
    },
    /// A document reached a terminal state.
    Resolved(LogEntry),
    /// The batch was cancelled with documents still pending.
    Cancelled { pending: usize },
}

/// Receives batch events. Must not block for long; it is called from the
/// thread processing the document.
pub trait BatchObserver: Send + Sync {
    fn on_event(&self, event: BatchEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {
    fn on_event(&self, _event: BatchEvent) {}
}

impl BatchEvent {
    /// A document was accepted into the batch and waits for processing.
    pub fn queued(filename: impl Into<String>) -> Self {
        BatchEvent::StateChanged {
            filename: filename.into(),
            state: DocumentState::Pending,
        }
    }
}

impl<F> BatchObserver for F
where
    F: Fn(BatchEvent) + Send + Sync,
{
    fn on_event(&self, event: BatchEvent) {
        self(event)
    }
}

/// Shared flag a caller sets to stop a running batch.
///
/// Documents already being processed finish; no new document starts.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Accumulates outcomes as documents resolve.
#[derive(Debug, Default)]
pub struct BatchCollector {
    outcomes: Vec<DocumentOutcome>,
    log: Vec<LogEntry>,
    cancelled: bool,
}

impl BatchCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolved document and return its log line.
    pub fn record(&mut self, outcome: DocumentOutcome) -> LogEntry {
        let entry = LogEntry::from_outcome(&outcome);
        debug!(file = %entry.filename, status = %entry.status, "Document logged");
        self.log.push(entry.clone());
        self.outcomes.push(outcome);
        entry
    }

    /// Mark the batch as cancelled.
    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Close the batch: group successful records and build the summary.
    pub fn finish(self, ctx: RowContext, export: &ExportConfig) -> BatchResult {
        let synthesizer = RowSynthesizer::new(ctx);

        let groups = partition(
            self.outcomes.iter().filter_map(|outcome| match outcome {
                DocumentOutcome::Succeeded { record, validation } => Some((record, validation)),
                _ => None,
            }),
            &synthesizer,
            export.group_by_gstin,
        );

        let mut summary = ProcessingSummary::new();
        for outcome in &self.outcomes {
            summary.push(SummaryRow::from_outcome(outcome, synthesizer.context()));
        }

        let result = BatchResult {
            log: self.log,
            groups,
            summary,
            cancelled: self.cancelled,
        };
        info!(
            documents = result.log.len(),
            succeeded = result.succeeded(),
            groups = result.groups.len(),
            cancelled = result.cancelled,
            "Batch finished"
        );
        result
    }
}

/// Everything a finished (or cancelled) batch produced.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Processing log in completion order.
    pub log: Vec<LogEntry>,
    /// Output groups in key order.
    pub groups: Vec<OutputGroup>,
    pub summary: ProcessingSummary,
    pub cancelled: bool,
}

impl BatchResult {
    /// Documents that produced a row.
    pub fn succeeded(&self) -> usize {
        self.log
            .iter()
            .filter(|e| e.status != LogStatus::Failure)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.log.len() - self.succeeded()
    }

    /// Write every group file, plus the summary when enabled, into `dir`.
    /// Returns the written paths.
    pub fn write_all(&self, dir: &Path, export: &ExportConfig, at: NaiveDateTime) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let timestamp = format_timestamp(at, &export.timestamp_format)?;
        let mut written = Vec::with_capacity(self.groups.len() + 1);

        for group in &self.groups {
            let path = dir.join(group.file_name(&export.filename_prefix, &timestamp));
            std::fs::write(&path, group.to_csv()?)?;
            debug!(path = %path.display(), rows = group.len(), "Wrote group file");
            written.push(path);
        }

        if export.write_summary {
            let path = dir.join(ProcessingSummary::file_name(&timestamp));
            std::fs::write(&path, self.summary.to_csv()?)?;
            written.push(path);
        }

        Ok(written)
    }
}

fn format_timestamp(at: NaiveDateTime, format: &str) -> Result<String> {
    use std::fmt::Write;

    let mut out = String::new();
    write!(out, "{}", at.format(format))
        .map_err(|_| AirinvError::Config(format!("invalid timestamp format '{format}'")))?;
    Ok(out)
}

/// Runs a batch serially on the calling thread.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    pipeline: InvoicePipeline,
    config: AirinvConfig,
    cancel: CancellationFlag,
}

impl BatchProcessor {
    pub fn new(config: AirinvConfig) -> Self {
        Self {
            pipeline: InvoicePipeline::new(&config),
            config,
            cancel: CancellationFlag::new(),
        }
    }

    /// Use a caller-owned cancellation flag.
    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancel
    }

    pub fn pipeline(&self) -> &InvoicePipeline {
        &self.pipeline
    }

    /// Process `documents` in order and close the batch.
    ///
    /// Every document is reported `Pending` before the first one starts.
    /// Cancellation is checked before each document. Documents resolved
    /// before the cancel still produce their groups.
    pub fn run<I>(&self, documents: I, entry_date: NaiveDate, observer: &dyn BatchObserver) -> BatchResult
    where
        I: IntoIterator<Item = RawDocument>,
    {
        let documents: Vec<RawDocument> = documents.into_iter().collect();
        for doc in &documents {
            observer.on_event(BatchEvent::queued(doc.filename.clone()));
        }

        let mut collector = BatchCollector::new();
        let total = documents.len();

        for (done, doc) in documents.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                let pending = total - done;
                warn!(pending, "Batch cancelled");
                collector.mark_cancelled();
                observer.on_event(BatchEvent::Cancelled { pending });
                break;
            }

            let outcome = self.pipeline.process_observed(&doc, observer);
            let entry = collector.record(outcome);
            observer.on_event(BatchEvent::Resolved(entry));
        }

        collector.finish(RowContext::from_config(entry_date, &self.config), &self.config.export)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::airlines::samples;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn entry_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()
    }

    fn sample_documents() -> Vec<RawDocument> {
        let mut docs: Vec<_> = samples::all()
            .into_iter()
            .map(|(_, filename, text)| RawDocument::new(filename, text))
            .collect();
        docs.push(RawDocument::new("6E_CREDIT_NOTE_1.pdf", samples::INDIGO));
        docs.push(RawDocument::new("scan.pdf", ""));
        docs
    }

    #[test]
    fn test_log_entry_for_success_and_failure() {
        let pipeline = InvoicePipeline::default();

        let ok = LogEntry::from_outcome(&pipeline.process(&RawDocument::new("6e.pdf", samples::INDIGO)));
        assert_eq!(ok.status, LogStatus::Success);
        assert_eq!(ok.invoice_number.as_deref(), Some("MH1252612AB12345"));
        assert_eq!(ok.amount, Some(Decimal::from(1180)));
        assert_eq!(ok.reason, None);

        let failed = LogEntry::from_outcome(&pipeline.process(&RawDocument::new("scan.pdf", "")));
        assert_eq!(failed.status, LogStatus::Failure);
        assert_eq!(failed.reason.as_deref(), Some("Could not extract text from PDF"));
        assert_eq!(failed.invoice_number, None);
    }

    #[test]
    fn test_batch_run() {
        let processor = BatchProcessor::new(AirinvConfig::default());
        let result = processor.run(sample_documents(), entry_date(), &NoopObserver);

        assert_eq!(result.log.len(), 7);
        assert_eq!(result.succeeded(), 5);
        assert_eq!(result.failed(), 2);
        assert!(!result.cancelled);

        let rows: usize = result.groups.iter().map(OutputGroup::len).sum();
        assert_eq!(rows, 5);
        assert_eq!(result.summary.len(), 7);
    }

    #[test]
    fn test_resolved_events_in_completion_order() {
        let resolved = Mutex::new(Vec::new());
        let observer = |event: BatchEvent| {
            if let BatchEvent::Resolved(entry) = event {
                resolved.lock().unwrap().push(entry.filename);
            }
        };

        let docs = sample_documents();
        let expected: Vec<_> = docs.iter().map(|d| d.filename.clone()).collect();
        BatchProcessor::new(AirinvConfig::default()).run(docs, entry_date(), &observer);

        assert_eq!(resolved.into_inner().unwrap(), expected);
    }

    #[test]
    fn test_documents_reported_pending_before_processing() {
        let states = Mutex::new(Vec::new());
        let observer = |event: BatchEvent| {
            if let BatchEvent::StateChanged { filename, state } = event {
                states.lock().unwrap().push((filename, state));
            }
        };

        let docs = sample_documents();
        let filenames: Vec<_> = docs.iter().map(|d| d.filename.clone()).collect();
        BatchProcessor::new(AirinvConfig::default()).run(docs, entry_date(), &observer);

        let states = states.into_inner().unwrap();
        let queued: Vec<_> = states[..filenames.len()]
            .iter()
            .map(|(filename, state)| {
                assert_eq!(*state, DocumentState::Pending);
                filename.clone()
            })
            .collect();
        assert_eq!(queued, filenames);
        assert_eq!(states[filenames.len()].1, DocumentState::Classifying);
        assert_eq!(
            states.iter().filter(|(_, s)| *s == DocumentState::Pending).count(),
            filenames.len()
        );
    }

    #[test]
    fn test_cancelled_batch_keeps_finished_groups() {
        let cancel = CancellationFlag::new();
        let processor = BatchProcessor::new(AirinvConfig::default()).with_cancellation(cancel.clone());

        let pending = Mutex::new(None);
        let observer = |event: BatchEvent| match event {
            BatchEvent::Resolved(_) => cancel.cancel(),
            BatchEvent::Cancelled { pending: n } => *pending.lock().unwrap() = Some(n),
            _ => {}
        };

        let result = processor.run(sample_documents(), entry_date(), &observer);

        assert!(result.cancelled);
        assert_eq!(result.log.len(), 1);
        assert_eq!(result.groups.len(), 1);
        assert_eq!(pending.into_inner().unwrap(), Some(6));
    }

    #[test]
    fn test_write_all() {
        let dir = tempfile::tempdir().unwrap();
        let config = AirinvConfig::default();
        let docs = vec![RawDocument::new("6E_MH1252612AB12345.pdf", samples::INDIGO)];
        let result = BatchProcessor::new(config.clone()).run(docs, entry_date(), &NoopObserver);

        let at = entry_date().and_hms_opt(14, 20, 0).unwrap();
        let written = result.write_all(dir.path(), &config.export, at).unwrap();

        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "transport_expenses_KARNATAKA_29AACCN5739J1Z0_03Nov2025_1420.csv".to_string(),
                "Processing_Summary_03Nov2025_1420.csv".to_string(),
            ]
        );
    }
}
