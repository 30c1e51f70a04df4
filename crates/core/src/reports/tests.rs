//! Tests for report derivation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use ledgerline_shared::types::{AccountEntryId, AccountId, TransactionId};

use super::error::ReportError;
use super::service::ReportService;
use super::types::{AccountBalance, FinancialStatement, LedgerMovement, StatementType};
use crate::coa::AccountType;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
}

fn balance(code: &str, account_type: AccountType, balance: Decimal) -> AccountBalance {
    AccountBalance {
        account_id: AccountId::new(),
        code: code.to_string(),
        name: format!("Account {code}"),
        account_type,
        balance,
    }
}

fn movement(day: u32, debit: Decimal, credit: Decimal) -> LedgerMovement {
    LedgerMovement {
        entry_id: AccountEntryId::new(),
        transaction_id: TransactionId::new(),
        reference: format!("JV-2026-{day:04}"),
        date: date(day),
        description: None,
        debit,
        credit,
    }
}

/// Books where owner capital funds cash, part of which is spent, and a sale is made on credit.
fn sample_books() -> Vec<AccountBalance> {
    vec![
        balance("1110", AccountType::Asset, dec!(700)),
        balance("1130", AccountType::Asset, dec!(500)),
        balance("3000", AccountType::Equity, dec!(-1000)),
        balance("4100", AccountType::Revenue, dec!(-500)),
        balance("5100", AccountType::Expense, dec!(300)),
        balance("1200", AccountType::Asset, Decimal::ZERO),
    ]
}

#[test]
fn test_account_ledger_running_balance() {
    let movements = vec![
        movement(10, Decimal::ZERO, dec!(200)),
        movement(5, dec!(1000), Decimal::ZERO),
        movement(20, dec!(50), Decimal::ZERO),
        movement(31, dec!(999), Decimal::ZERO),
    ];

    let ledger =
        ReportService::account_ledger(AccountId::new(), date(1), date(30), dec!(100), movements)
            .unwrap();

    assert_eq!(ledger.opening_balance, dec!(100));
    assert_eq!(ledger.lines.len(), 3);
    assert_eq!(ledger.lines[0].date, date(5));
    assert_eq!(ledger.lines[0].running_balance, dec!(1100));
    assert_eq!(ledger.lines[1].running_balance, dec!(900));
    assert_eq!(ledger.lines[2].running_balance, dec!(950));
    assert_eq!(ledger.closing_balance, dec!(950));
}

#[test]
fn test_account_ledger_empty_range_keeps_opening() {
    let ledger =
        ReportService::account_ledger(AccountId::new(), date(1), date(1), dec!(42), vec![])
            .unwrap();
    assert!(ledger.lines.is_empty());
    assert_eq!(ledger.closing_balance, dec!(42));
}

#[test]
fn test_account_ledger_rejects_inverted_range() {
    assert!(matches!(
        ReportService::account_ledger(AccountId::new(), date(10), date(1), Decimal::ZERO, vec![]),
        Err(ReportError::InvalidDateRange { .. })
    ));
}

#[test]
fn test_trial_balance_columns() {
    let report = ReportService::trial_balance(date(31), sample_books());

    assert_eq!(report.rows.len(), 5);
    assert_eq!(report.rows[0].code, "1110");
    assert_eq!(report.rows[0].debit, dec!(700));
    let equity = report.rows.iter().find(|r| r.code == "3000").unwrap();
    assert_eq!(equity.credit, dec!(1000));
    assert_eq!(equity.debit, Decimal::ZERO);
    assert_eq!(report.total_debit, dec!(1500));
    assert_eq!(report.total_credit, dec!(1500));
    assert!(report.is_balanced);
}

#[test]
fn test_trial_balance_detects_imbalance() {
    let report = ReportService::trial_balance(
        date(31),
        vec![
            balance("1110", AccountType::Asset, dec!(100)),
            balance("3000", AccountType::Equity, dec!(-99.98)),
        ],
    );
    assert!(!report.is_balanced);
}

#[test]
fn test_profit_and_loss() {
    let report = ReportService::profit_and_loss(date(31), &sample_books());
    assert_eq!(report.total_revenue, dec!(500));
    assert_eq!(report.total_expenses, dec!(300));
    assert_eq!(report.net_profit, dec!(200));
    assert_eq!(report.revenue.lines[0].amount, dec!(500));
}

#[test]
fn test_balance_sheet_folds_profit_into_equity() {
    let report = ReportService::balance_sheet(date(31), &sample_books());
    assert_eq!(report.total_assets, dec!(1200));
    assert_eq!(report.total_liabilities, Decimal::ZERO);
    assert_eq!(report.retained_earnings, dec!(200));
    assert_eq!(report.total_equity, dec!(1200));
    assert!(report.is_balanced);
    assert_eq!(report.assets.lines.len(), 2);
}

#[test]
fn test_statement_dispatch() {
    let kind: StatementType = "PL".parse().unwrap();
    assert!(matches!(
        ReportService::statement(kind, date(31), sample_books()),
        FinancialStatement::ProfitAndLoss(_)
    ));
    assert!("INCOME".parse::<StatementType>().is_err());
}

/// Strategy to generate signed amounts (-10,000.00 to 10,000.00).
fn signed_amount() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a non-negative amount (0.00 to 10,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn account_type() -> impl Strategy<Value = AccountType> {
    prop_oneof![
        Just(AccountType::Asset),
        Just(AccountType::Liability),
        Just(AccountType::Equity),
        Just(AccountType::Revenue),
        Just(AccountType::Expense),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* account and range, the closing balance equals the opening
    /// balance plus Σ(debit − credit) over the range.
    #[test]
    fn prop_ledger_closing_balance(
        opening in signed_amount(),
        moves in prop::collection::vec((1u32..=28, amount(), amount()), 0..30),
        from in 1u32..=14,
        span in 0u32..=14,
    ) {
        let to = from + span;
        let movements: Vec<LedgerMovement> = moves
            .iter()
            .map(|(day, debit, credit)| movement(*day, *debit, *credit))
            .collect();
        let expected: Decimal = moves
            .iter()
            .filter(|(day, _, _)| *day >= from && *day <= to)
            .map(|(_, d, c)| d - c)
            .sum();

        let ledger = ReportService::account_ledger(
            AccountId::new(), date(from), date(to), opening, movements,
        ).unwrap();

        prop_assert_eq!(ledger.closing_balance, opening + expected);
        if let Some(last) = ledger.lines.last() {
            prop_assert_eq!(last.running_balance, ledger.closing_balance);
        }
        prop_assert!(ledger.lines.windows(2).all(|w| w[0].date <= w[1].date));
    }

    /// *For any* set of balances summing to zero (every posting balanced), the
    /// trial balance is balanced and the balance sheet equation holds.
    #[test]
    fn prop_balanced_books_balance(
        accounts in prop::collection::vec((account_type(), signed_amount()), 1..20),
        plug_type in account_type(),
    ) {
        let mut balances: Vec<AccountBalance> = accounts
            .iter()
            .enumerate()
            .map(|(i, (t, b))| balance(&format!("{}", 1000 + i), *t, *b))
            .collect();
        let sum: Decimal = balances.iter().map(|b| b.balance).sum();
        balances.push(balance("9999", plug_type, -sum));

        let tb = ReportService::trial_balance(date(31), balances.clone());
        prop_assert!(tb.is_balanced);
        prop_assert_eq!(tb.total_debit, tb.total_credit);
        prop_assert!(tb.rows.iter().all(|r| r.debit.is_zero() != r.credit.is_zero()));

        let bs = ReportService::balance_sheet(date(31), &balances);
        prop_assert!(bs.is_balanced);
    }
}
