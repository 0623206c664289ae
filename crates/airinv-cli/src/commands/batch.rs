//! Batch processing command for multiple invoice files.
//!
//! Documents are read and processed on blocking worker threads, at most
//! `--jobs` at a time. Workers report back over a channel; only this task
//! touches the collector and the progress bars.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinError;
use tracing::{debug, warn};

use airinv_core::export::RowContext;
use airinv_core::{
    BatchCollector, BatchEvent, CancellationFlag, DocumentOutcome, DocumentState, InvoicePipeline,
    LogStatus,
};

use super::{is_supported, load_config, read_document};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory for the group CSVs and the summary
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Entry date for every row, YYYY-MM-DD (default: today)
    #[arg(long)]
    entry_date: Option<NaiveDate>,

    /// Write a single file instead of one per customer GSTIN
    #[arg(long)]
    no_grouping: bool,

    /// Skip the processing summary
    #[arg(long)]
    no_summary: bool,
}

/// Messages from workers to the collecting task.
enum WorkerMessage {
    Event(BatchEvent),
    Done(DocumentOutcome),
    Skipped(PathBuf),
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.no_grouping {
        config.export.group_by_gstin = false;
    }
    if args.no_summary {
        config.export.write_summary = false;
    }

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_supported(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let multi_progress = MultiProgress::new();
    let overall_pb = multi_progress.add(ProgressBar::new(files.len() as u64));
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let config = Arc::new(config);
    let pipeline = Arc::new(InvoicePipeline::new(&config));
    let cancel = CancellationFlag::new();
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let (tx, mut rx) = mpsc::unbounded_channel::<WorkerMessage>();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, finishing documents in progress");
                cancel.cancel();
            }
        });
    }

    let total = files.len();
    for path in files {
        let filename = file_name(&path);
        send(&tx, WorkerMessage::Event(BatchEvent::queued(filename.clone())));

        let semaphore = Arc::clone(&semaphore);
        let pipeline = Arc::clone(&pipeline);
        let config = Arc::clone(&config);
        let cancel = cancel.clone();
        let tx = tx.clone();

        tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return;
            };
            if cancel.is_cancelled() {
                send(&tx, WorkerMessage::Skipped(path));
                return;
            }

            let worker_tx = tx.clone();
            let worker_filename = filename.clone();
            let message = tokio::task::spawn_blocking(move || {
                let doc = match read_document(&path, &config) {
                    Ok(doc) => doc,
                    Err(e) => {
                        warn!("Failed to read {}: {}", path.display(), e);
                        airinv_core::RawDocument::new(worker_filename, "")
                    }
                };
                let observer = move |event: BatchEvent| {
                    send(&worker_tx, WorkerMessage::Event(event));
                };
                WorkerMessage::Done(pipeline.process_observed(&doc, &observer))
            })
            .await;

            let message = message.unwrap_or_else(|e| worker_failure(filename, &e));
            send(&tx, message);
        });
    }
    drop(tx);

    let mut collector = BatchCollector::new();
    let mut skipped = 0usize;

    while let Some(message) = rx.recv().await {
        match message {
            WorkerMessage::Event(BatchEvent::StateChanged { filename, state }) => {
                if !state.is_terminal() {
                    overall_pb.set_message(format!("{} ({})", filename, state_label(&state)));
                }
            }
            WorkerMessage::Event(_) => {}
            WorkerMessage::Done(outcome) => {
                let entry = collector.record(outcome);
                if entry.status == LogStatus::Failure {
                    overall_pb.println(format!(
                        "{} {}: {}",
                        style("✗").red(),
                        entry.filename,
                        entry.reason.as_deref().unwrap_or("unknown error")
                    ));
                }
                overall_pb.inc(1);
            }
            WorkerMessage::Skipped(path) => {
                debug!("Skipped {}", path.display());
                skipped += 1;
                overall_pb.inc(1);
            }
        }
    }

    if cancel.is_cancelled() {
        collector.mark_cancelled();
        overall_pb.abandon_with_message("Cancelled");
    } else {
        overall_pb.finish_with_message("Complete");
    }

    let entry_date = args.entry_date.unwrap_or_else(|| Local::now().date_naive());
    let result = collector.finish(RowContext::from_config(entry_date, &config), &config.export);
    let written = result.write_all(&args.output_dir, &config.export, Local::now().naive_local())?;

    println!();
    println!(
        "{} Processed {} of {} files in {:?}",
        style("✓").green(),
        result.log.len(),
        total,
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(result.succeeded()).green(),
        style(result.failed()).red()
    );
    if skipped > 0 {
        println!("   {} skipped after cancel", style(skipped).yellow());
    }

    if !written.is_empty() {
        println!();
        println!("{}", style("Written files:").bold());
        for path in &written {
            println!("  - {}", path.display());
        }
    }

    let warnings: Vec<_> = result
        .log
        .iter()
        .filter(|e| e.status == LogStatus::Warning)
        .collect();
    if !warnings.is_empty() {
        println!();
        println!("{}", style("Warnings:").yellow());
        for entry in warnings {
            println!(
                "  - {}: {}",
                entry.filename,
                entry.reason.as_deref().unwrap_or("")
            );
        }
    }

    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Report a worker that died before resolving its document, so the document
/// still shows up in the log and the summary.
fn worker_failure(filename: String, error: &JoinError) -> WorkerMessage {
    warn!("Worker for {} panicked: {}", filename, error);
    WorkerMessage::Done(DocumentOutcome::aborted(filename, "worker panicked"))
}

fn send(tx: &mpsc::UnboundedSender<WorkerMessage>, message: WorkerMessage) {
    if tx.send(message).is_err() {
        debug!("Collector gone, dropping worker message");
    }
}

fn state_label(state: &DocumentState) -> &'static str {
    match state {
        DocumentState::Pending => "pending",
        DocumentState::Classifying => "classifying",
        DocumentState::Extracting => "extracting",
        DocumentState::Validating => "validating",
        DocumentState::Succeeded => "done",
        DocumentState::Rejected(_) => "rejected",
        DocumentState::Failed(_) => "failed",
    }
}
