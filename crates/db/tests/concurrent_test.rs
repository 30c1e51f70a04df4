//! Concurrent posting tests.
//!
//! These tests verify that:
//! - Concurrent postings in one tenant and year receive distinct, gap-free references
//! - Every concurrent posting lands and the ledger stays balanced
//! - A transaction reversed concurrently is reversed exactly once

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use common::{connect, date, journal, setup_ledger};
use futures::future::join_all;
use ledgerline_core::invoice::{InvoiceCategory, NewInvoice};
use ledgerline_core::ledger::LedgerError;
use ledgerline_db::{InvoiceRepository, ReportRepository, TransactionRepository};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::Barrier;

#[tokio::test]
async fn test_concurrent_journals_get_contiguous_references() {
    let Some(db) = connect().await else { return };
    let ledger = Arc::new(setup_ledger(&db).await);
    let repo = TransactionRepository::new(db.clone());

    const NUM_POSTINGS: usize = 20;
    let barrier = Arc::new(Barrier::new(NUM_POSTINGS));

    let handles = (0..NUM_POSTINGS).map(|_| {
        let repo = repo.clone();
        let ledger = Arc::clone(&ledger);
        let barrier = Arc::clone(&barrier);
        tokio::spawn(async move {
            barrier.wait().await;
            repo.post_transaction(journal(
                ledger.tenant_id,
                date(2026, 8, 14),
                ledger.expense,
                ledger.cash,
                dec!(10.00),
            ))
            .await
        })
    });

    let results = join_all(handles).await;
    let references: BTreeSet<String> = results
        .into_iter()
        .map(|joined| joined.unwrap().unwrap().reference)
        .collect();

    let expected: BTreeSet<String> = (1..=NUM_POSTINGS)
        .map(|n| format!("JV-2026-{n:04}"))
        .collect();
    assert_eq!(references, expected);

    let trial = ReportRepository::new(db.clone())
        .trial_balance(ledger.tenant_id, date(2026, 8, 31))
        .await
        .unwrap();
    assert_eq!(trial.total_debit, trial.total_credit);
    assert_eq!(trial.total_debit, Decimal::from(NUM_POSTINGS as u32) * dec!(10.00));
}

#[tokio::test]
async fn test_concurrent_invoices_get_distinct_numbers() {
    let Some(db) = connect().await else { return };
    let ledger = setup_ledger(&db).await;
    let repo = InvoiceRepository::new(db.clone());

    const NUM_INVOICES: usize = 10;
    let barrier = Arc::new(Barrier::new(NUM_INVOICES));

    let handles = (0..NUM_INVOICES).map(|i| {
        let repo = repo.clone();
        let barrier = Arc::clone(&barrier);
        let tenant_id = ledger.tenant_id;
        tokio::spawn(async move {
            barrier.wait().await;
            repo.create_invoice(NewInvoice {
                tenant_id,
                category: InvoiceCategory::Freight,
                job_id: None,
                customer_name: format!("Customer {}", i),
                date: date(2026, 9, 1),
            })
            .await
        })
    });

    let numbers: BTreeSet<String> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap().invoice_number)
        .collect();

    let expected: BTreeSet<String> = (1..=NUM_INVOICES)
        .map(|n| format!("FIN-2026-{n:04}"))
        .collect();
    assert_eq!(numbers, expected);
}

#[tokio::test]
async fn test_concurrent_reversals_reverse_once() {
    let Some(db) = connect().await else { return };
    let ledger = setup_ledger(&db).await;
    let repo = TransactionRepository::new(db.clone());

    let original = repo
        .post_transaction(journal(
            ledger.tenant_id,
            date(2026, 10, 5),
            ledger.expense,
            ledger.cash,
            dec!(75),
        ))
        .await
        .unwrap();

    const NUM_ATTEMPTS: usize = 5;
    let barrier = Arc::new(Barrier::new(NUM_ATTEMPTS));

    let handles = (0..NUM_ATTEMPTS).map(|_| {
        let repo = repo.clone();
        let barrier = Arc::clone(&barrier);
        let tenant_id = ledger.tenant_id;
        let id = original.id;
        tokio::spawn(async move {
            barrier.wait().await;
            repo.reverse_transaction(tenant_id, id, date(2026, 10, 6), "Duplicate entry")
                .await
        })
    });

    let results: Vec<Result<_, LedgerError>> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1, "{:?}", results);
    for result in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(*result, LedgerError::AlreadyReversed(original.id.into_inner()));
    }
}
