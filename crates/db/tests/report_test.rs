//! Report integration tests.
//!
//! One tenant goes through a small month of trading; every report is then
//! checked against hand-computed figures.

mod common;

use common::{TestLedger, connect, date, journal, setup_ledger};
use ledgerline_core::ledger::{
    EntryInput, OpeningStockInput, PaymentInput, PaymentMode, PaymentParty, PostingRequest,
    PurchaseInput, PurchaseLine, StockLine, TransactionType,
};
use ledgerline_core::reports::{FinancialStatement, ReportError, StatementType};
use ledgerline_db::{ReportRepository, TemplateRepository, TransactionRepository};
use ledgerline_shared::types::AccountId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;

async fn trade(db: &DatabaseConnection, ledger: &TestLedger) {
    let templates = TemplateRepository::new(db.clone());
    let transactions = TransactionRepository::new(db.clone());

    templates
        .record_opening_stock(&OpeningStockInput {
            tenant_id: ledger.tenant_id,
            date: date(2026, 1, 5),
            lines: vec![StockLine {
                description: "Spare tyres".to_string(),
                quantity: dec!(4),
                unit_cost: dec!(250),
            }],
        })
        .await
        .unwrap();
    templates
        .record_purchase(&PurchaseInput {
            tenant_id: ledger.tenant_id,
            vendor_name: "Dockside Supplies".to_string(),
            bill_reference: None,
            date: date(2026, 1, 10),
            lines: vec![PurchaseLine {
                description: "Pallets".to_string(),
                quantity: dec!(2),
                unit_price: dec!(200),
                tax_percent: dec!(10),
            }],
        })
        .await
        .unwrap();
    transactions
        .post_transaction(PostingRequest {
            tenant_id: ledger.tenant_id,
            reference: None,
            prefix: None,
            date: date(2026, 1, 15),
            description: "Haulage".to_string(),
            transaction_type: TransactionType::Invoice,
            entries: vec![
                EntryInput::debit(ledger.receivable, dec!(600)),
                EntryInput::credit(ledger.revenue, dec!(600)),
            ],
        })
        .await
        .unwrap();
    templates
        .record_payment(&PaymentInput {
            tenant_id: ledger.tenant_id,
            party: PaymentParty::Customer,
            party_name: "Harbour Traders".to_string(),
            amount: dec!(600),
            mode: PaymentMode::Bank,
            cash_account: None,
            external_reference: None,
            date: date(2026, 1, 20),
        })
        .await
        .unwrap();
    templates
        .record_payment(&PaymentInput {
            tenant_id: ledger.tenant_id,
            party: PaymentParty::Vendor,
            party_name: "Dockside Supplies".to_string(),
            amount: dec!(440),
            mode: PaymentMode::Cash,
            cash_account: None,
            external_reference: None,
            date: date(2026, 1, 25),
        })
        .await
        .unwrap();
    transactions
        .post_transaction(journal(
            ledger.tenant_id,
            date(2026, 2, 3),
            ledger.expense,
            ledger.cash,
            dec!(100),
        ))
        .await
        .unwrap();
}

fn row(trial: &ledgerline_core::reports::TrialBalance, account: AccountId) -> (Decimal, Decimal) {
    trial
        .rows
        .iter()
        .find(|r| r.account_id == account)
        .map_or((Decimal::ZERO, Decimal::ZERO), |r| (r.debit, r.credit))
}

#[tokio::test]
async fn test_trial_balance_as_of_month_end() {
    let Some(db) = connect().await else { return };
    let ledger = setup_ledger(&db).await;
    trade(&db, &ledger).await;
    let reports = ReportRepository::new(db.clone());

    let trial = reports
        .trial_balance(ledger.tenant_id, date(2026, 1, 31))
        .await
        .unwrap();

    assert!(trial.is_balanced);
    assert_eq!(trial.total_debit, dec!(1600));
    assert_eq!(trial.total_credit, dec!(1600));
    assert_eq!(row(&trial, ledger.cash), (dec!(160), Decimal::ZERO));
    assert_eq!(row(&trial, ledger.inventory), (dec!(1400), Decimal::ZERO));
    assert_eq!(row(&trial, ledger.input_tax), (dec!(40), Decimal::ZERO));
    assert_eq!(row(&trial, ledger.opening_equity), (Decimal::ZERO, dec!(1000)));
    assert_eq!(row(&trial, ledger.revenue), (Decimal::ZERO, dec!(600)));
    // Settled accounts drop out.
    assert!(trial.rows.iter().all(|r| r.account_id != ledger.receivable));
    assert!(trial.rows.iter().all(|r| r.account_id != ledger.payable));
}

#[tokio::test]
async fn test_profit_and_loss_and_balance_sheet() {
    let Some(db) = connect().await else { return };
    let ledger = setup_ledger(&db).await;
    trade(&db, &ledger).await;
    let reports = ReportRepository::new(db.clone());

    let january = reports
        .profit_and_loss(ledger.tenant_id, date(2026, 1, 31))
        .await
        .unwrap();
    assert_eq!(january.total_revenue, dec!(600));
    assert_eq!(january.total_expenses, Decimal::ZERO);
    assert_eq!(january.net_profit, dec!(600));

    let february = reports
        .profit_and_loss(ledger.tenant_id, date(2026, 2, 28))
        .await
        .unwrap();
    assert_eq!(february.total_expenses, dec!(100));
    assert_eq!(february.net_profit, dec!(500));

    let sheet = reports
        .balance_sheet(ledger.tenant_id, date(2026, 2, 28))
        .await
        .unwrap();
    assert!(sheet.is_balanced);
    assert_eq!(sheet.total_assets, dec!(1500));
    assert_eq!(sheet.total_liabilities, Decimal::ZERO);
    assert_eq!(sheet.retained_earnings, dec!(500));

    let statement = reports
        .statement(ledger.tenant_id, StatementType::BalanceSheet, date(2026, 2, 28))
        .await
        .unwrap();
    assert_eq!(statement, FinancialStatement::BalanceSheet(sheet));
}

#[tokio::test]
async fn test_account_ledger_running_balance() {
    let Some(db) = connect().await else { return };
    let ledger = setup_ledger(&db).await;
    trade(&db, &ledger).await;
    let reports = ReportRepository::new(db.clone());

    let january = reports
        .account_ledger(ledger.tenant_id, ledger.cash, date(2026, 1, 1), date(2026, 1, 31))
        .await
        .unwrap();
    assert_eq!(january.opening_balance, Decimal::ZERO);
    let running: Vec<Decimal> = january.lines.iter().map(|l| l.running_balance).collect();
    assert_eq!(running, [dec!(600), dec!(160)]);
    assert_eq!(january.closing_balance, dec!(160));

    let february = reports
        .account_ledger(ledger.tenant_id, ledger.cash, date(2026, 2, 1), date(2026, 2, 28))
        .await
        .unwrap();
    assert_eq!(february.opening_balance, dec!(160));
    assert_eq!(february.lines.len(), 1);
    assert_eq!(february.closing_balance, dec!(60));
}

#[tokio::test]
async fn test_account_ledger_rejects_bad_input() {
    let Some(db) = connect().await else { return };
    let ledger = setup_ledger(&db).await;
    let reports = ReportRepository::new(db.clone());

    let err = reports
        .account_ledger(ledger.tenant_id, ledger.cash, date(2026, 2, 1), date(2026, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::InvalidDateRange { .. }));

    let other = setup_ledger(&db).await;
    let err = reports
        .account_ledger(ledger.tenant_id, other.cash, date(2026, 1, 1), date(2026, 1, 31))
        .await
        .unwrap_err();
    assert_eq!(err, ReportError::AccountNotFound(other.cash.into_inner()));
}
