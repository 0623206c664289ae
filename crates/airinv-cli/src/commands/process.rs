//! Process command - run one invoice file through the pipeline.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info};

use airinv_core::export::{RowContext, RowSynthesizer, HEADERS};
use airinv_core::invoice::validator::{ValidationOutcome, ValidationStatus};
use airinv_core::models::config::AirinvConfig;
use airinv_core::{BatchEvent, DocumentOutcome, InvoicePipeline, InvoiceRecord};

use super::{load_config, read_document};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, or extracted text as .txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Entry date for the CSV row, YYYY-MM-DD (default: today)
    #[arg(long)]
    entry_date: Option<NaiveDate>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Upload template row with header
    Csv,
    /// Plain text summary
    Text,
}

#[derive(Serialize)]
struct ProcessOutput<'a> {
    record: &'a InvoiceRecord,
    validation: &'a ValidationOutcome,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.set_message("Reading document...");

    let doc = read_document(&args.input, &config)?;

    let pipeline = InvoicePipeline::new(&config);
    let spinner = pb.clone();
    let observer = move |event: BatchEvent| {
        if let BatchEvent::StateChanged { state, .. } = event {
            spinner.set_message(format!("{:?}", state));
        }
    };
    let outcome = pipeline.process_observed(&doc, &observer);
    pb.finish_and_clear();

    let (record, validation) = match &outcome {
        DocumentOutcome::Succeeded { record, validation } => (record, validation),
        DocumentOutcome::Rejected { reason, .. } => {
            anyhow::bail!("Rejected {}: {}", doc.filename, reason)
        }
        DocumentOutcome::Failed { reason, .. } => {
            anyhow::bail!("Failed {}: {}", doc.filename, reason)
        }
    };

    if validation.status == ValidationStatus::Warning {
        eprintln!("{} {}", style("⚠").yellow(), validation.message);
    }

    let entry_date = args.entry_date.unwrap_or_else(|| Local::now().date_naive());
    let output = format_outcome(record, validation, args.format, entry_date, &config)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_outcome(
    record: &InvoiceRecord,
    validation: &ValidationOutcome,
    format: OutputFormat,
    entry_date: NaiveDate,
    config: &AirinvConfig,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&ProcessOutput { record, validation })?),
        OutputFormat::Csv => format_csv(record, validation, entry_date, config),
        OutputFormat::Text => Ok(format_text(record, validation)),
    }
}

fn format_csv(
    record: &InvoiceRecord,
    validation: &ValidationOutcome,
    entry_date: NaiveDate,
    config: &AirinvConfig,
) -> anyhow::Result<String> {
    let synthesizer = RowSynthesizer::new(RowContext::from_config(entry_date, config));
    let row = synthesizer.synthesize(record, validation);

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(HEADERS)?;
    wtr.write_record(row.values())?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &InvoiceRecord, validation: &ValidationOutcome) -> String {
    let mut output = String::new();

    output.push_str(&format!("Airline: {}\n", record.airline));
    output.push_str(&format!("Invoice: {}\n", record.invoice_number));
    if let Some(date) = record.invoice_date {
        output.push_str(&format!("Date: {}\n", date));
    }
    output.push_str(&format!("Customer GSTIN: {}\n", record.customer_gstin));
    if let Some(vendor) = &record.vendor_gstin {
        output.push_str(&format!("Vendor GSTIN: {}\n", vendor));
    }
    output.push('\n');

    output.push_str("Amounts:\n");
    output.push_str(&format!("  Taxable:     {}\n", record.taxable_value));
    output.push_str(&format!("  Non-taxable: {}\n", record.non_taxable_value));
    output.push_str(&format!("  CGST:        {}\n", record.cgst));
    output.push_str(&format!("  SGST:        {}\n", record.sgst));
    output.push_str(&format!("  IGST:        {}\n", record.igst));
    output.push_str(&format!("  Total:       {}\n", record.total_amount));
    output.push('\n');

    output.push_str(&format!("Validation: {:?} ({})\n", validation.status, validation.message));
    output.push_str(&format!("Avail Tax Credit: {}\n", validation.avail_tax_credit.as_str()));

    output
}
