use std::collections::BTreeSet;
use std::path::Path;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

use airinv_core::export::{Column, GroupKey};
use airinv_core::{
    AirinvConfig, Airline, BatchProcessor, DocumentOutcome, DocumentState, DocumentType, InvoicePipeline,
    LogStatus, NoopObserver, RawDocument, RowContext, RowSynthesizer, ValidationStatus,
};

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(path).unwrap()
}

fn entry_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()
}

fn fixtures() -> Vec<RawDocument> {
    [
        ("AI_0982504MH00012345.pdf", "air_india_tax_invoice.txt"),
        ("IX_KL2510000123.pdf", "air_india_express_tax_invoice.txt"),
        ("6E_MH1252612AB12345.pdf", "indigo_tax_invoice.txt"),
        ("QP_QP2510000456.pdf", "akasa_tax_invoice.txt"),
        ("GF_TKMHP_2510_04496.pdf", "gulf_air_tax_invoice.txt"),
    ]
    .into_iter()
    .map(|(filename, fixture_name)| RawDocument::new(filename, &fixture(fixture_name)))
    .collect()
}

#[test]
fn test_indigo_invoice_end_to_end() {
    let doc = RawDocument::new("6E_MH1252612AB12345.pdf", &fixture("indigo_tax_invoice.txt"));
    let outcome = InvoicePipeline::default().process(&doc);

    let DocumentOutcome::Succeeded { record, validation } = &outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(record.airline, Airline::IndiGo);
    assert_eq!(record.taxable_value, Decimal::new(100000, 2));
    assert_eq!(record.igst, Decimal::new(18000, 2));
    assert_eq!(record.total_amount, Decimal::new(118000, 2));
    assert_eq!(validation.status, ValidationStatus::Ok);
    assert_eq!(validation.avail_tax_credit.as_str(), "100");

    let result = BatchProcessor::new(AirinvConfig::default()).run(vec![doc], entry_date(), &NoopObserver);
    assert_eq!(result.groups.len(), 1);
    assert_eq!(
        result.groups[0].key,
        GroupKey {
            state: "KARNATAKA".to_string(),
            gstin: "29AACCN5739J1Z0".to_string(),
        }
    );
    assert_eq!(result.groups[0].len(), 1);
}

#[test]
fn test_credit_filename_rejected_for_every_airline() {
    for doc in fixtures() {
        let credit = RawDocument::new(format!("CREDIT_{}", doc.filename), &doc.text);
        let outcome = InvoicePipeline::default().process(&credit);

        assert_eq!(
            outcome.state(),
            DocumentState::Rejected("Credit notes are not supported".to_string()),
            "{}",
            doc.filename
        );
        assert!(outcome.record().is_none());
    }
}

#[test]
fn test_missing_customer_gstin_is_reported() {
    let text = fixture("gulf_air_tax_invoice.txt")
        .lines()
        .filter(|line| !line.contains("AACCN5739"))
        .collect::<Vec<_>>()
        .join("\n");
    let outcome = InvoicePipeline::default().process(&RawDocument::new("GF_1.pdf", &text));

    assert_eq!(outcome.state(), DocumentState::Failed("Customer GSTIN not found".to_string()));
}

#[test]
fn test_grouping_is_a_partition() {
    let docs = fixtures();
    let result = BatchProcessor::new(AirinvConfig::default()).run(docs, entry_date(), &NoopObserver);

    let succeeded = result.log.iter().filter(|e| e.status != LogStatus::Failure).count();
    let rows: usize = result.groups.iter().map(|g| g.len()).sum();
    assert_eq!(succeeded, 5);
    assert_eq!(rows, succeeded);

    let keys: BTreeSet<_> = result.groups.iter().map(|g| g.key.clone()).collect();
    assert_eq!(keys.len(), result.groups.len());

    let mut exported: Vec<_> = result
        .groups
        .iter()
        .flat_map(|g| g.rows().iter().map(|row| row.get(Column::VendorInvNo).to_string()))
        .collect();
    exported.sort();
    let mut logged: Vec<_> = result
        .log
        .iter()
        .filter_map(|e| e.invoice_number.clone())
        .collect();
    logged.sort();
    assert_eq!(exported, logged);
}

#[test]
fn test_grouping_independent_of_order() {
    let forward = BatchProcessor::new(AirinvConfig::default()).run(fixtures(), entry_date(), &NoopObserver);
    let mut reversed_docs = fixtures();
    reversed_docs.reverse();
    let reversed = BatchProcessor::new(AirinvConfig::default()).run(reversed_docs, entry_date(), &NoopObserver);

    assert_eq!(forward.groups, reversed.groups);

    let forward_log: Vec<_> = forward.log.iter().map(|e| e.filename.clone()).collect();
    let mut reversed_log: Vec<_> = reversed.log.iter().map(|e| e.filename.clone()).collect();
    reversed_log.reverse();
    assert_eq!(forward_log, reversed_log);
}

#[test]
fn test_row_synthesis_is_byte_identical() {
    let config = AirinvConfig::default();
    let synthesizer = RowSynthesizer::new(RowContext::from_config(entry_date(), &config));

    for doc in fixtures() {
        let DocumentOutcome::Succeeded { record, validation } = InvoicePipeline::new(&config).process(&doc) else {
            panic!("{} did not succeed", doc.filename);
        };
        let first = synthesizer.synthesize(&record, &validation);
        let second = synthesizer.synthesize(&record, &validation);

        assert_eq!(first.len(), 41);
        assert_eq!(first, second);
    }
}

#[test]
fn test_total_mismatch_still_exported() {
    let text = fixture("indigo_tax_invoice.txt").replace(
        "Grand Total 1,000.00 0.00 1,000.00 180.00 0.00 0.00 1,180.00",
        "Grand Total 1,000.00 0.00 1,000.00 180.00 0.00 0.00 1,250.00",
    );
    let doc = RawDocument::new("6E_MISMATCH.pdf", &text);
    let result = BatchProcessor::new(AirinvConfig::default()).run(vec![doc], entry_date(), &NoopObserver);

    assert_eq!(result.log[0].status, LogStatus::Warning);
    assert_eq!(result.groups.len(), 1);
}

#[test]
fn test_malformed_amount_fails_the_document() {
    let text = fixture("gulf_air_tax_invoice.txt").replace("Taxable Value 25,000.00", "Taxable Value 25,OOO.00");
    let doc = RawDocument::new("GF_MALFORMED.pdf", &text);
    let result = BatchProcessor::new(AirinvConfig::default()).run(vec![doc], entry_date(), &NoopObserver);

    assert_eq!(result.log[0].status, LogStatus::Failure);
    assert!(
        result.log[0].reason.as_deref().unwrap_or("").contains("invalid amount '25,OOO.00'"),
        "{:?}",
        result.log[0].reason
    );
    assert!(result.groups.is_empty());
}

#[test]
fn test_akasa_debit_note_end_to_end() {
    let doc = RawDocument::new("QP_QPDN2510000789.pdf", &fixture("debit_notes/akasa_debit_note.txt"));
    let outcome = InvoicePipeline::default().process(&doc);

    let DocumentOutcome::Succeeded { record, validation } = &outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(record.airline, Airline::Akasa);
    assert_eq!(record.doc_type, DocumentType::DebitNote);
    assert_eq!(record.invoice_number, "QPDN2510000789");
    assert_eq!(record.invoice_date, NaiveDate::from_ymd_opt(2025, 10, 28));
    assert_eq!(record.cgst, Decimal::new(3750, 2));
    assert_eq!(record.sgst, Decimal::new(3750, 2));
    assert_eq!(record.total_amount, Decimal::new(157500, 2));
    assert_eq!(validation.status, ValidationStatus::Ok);
}
