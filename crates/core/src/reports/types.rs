//! Report types.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use ledgerline_shared::types::{AccountEntryId, AccountId, TransactionId};

use super::error::ReportError;
use crate::coa::AccountType;

/// Net position of one account as of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountBalance {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// `Σ(debit − credit)` over entries dated on or before the report date.
    pub balance: Decimal,
}

/// One posted entry touching an account, as read from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerMovement {
    /// Entry ID; orders entries within a day.
    pub entry_id: AccountEntryId,
    /// Owning transaction.
    pub transaction_id: TransactionId,
    /// Transaction reference.
    pub reference: String,
    /// Transaction date.
    pub date: NaiveDate,
    /// Entry or transaction description.
    pub description: Option<String>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

/// A ledger row with its running balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerLine {
    /// Entry ID.
    pub entry_id: AccountEntryId,
    /// Owning transaction.
    pub transaction_id: TransactionId,
    /// Transaction reference.
    pub reference: String,
    /// Transaction date.
    pub date: NaiveDate,
    /// Description.
    pub description: Option<String>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Opening balance plus every `debit − credit` up to and including this row.
    pub running_balance: Decimal,
}

/// Ledger of one account over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountLedger {
    /// Account ID.
    pub account_id: AccountId,
    /// First date, inclusive.
    pub from: NaiveDate,
    /// Last date, inclusive.
    pub to: NaiveDate,
    /// Balance of entries dated strictly before `from`.
    pub opening_balance: Decimal,
    /// Rows in date order.
    pub lines: Vec<LedgerLine>,
    /// Balance after the last row.
    pub closing_balance: Decimal,
}

/// One trial balance row. Exactly one of `debit`/`credit` is non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBalanceRow {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Positive balance.
    pub debit: Decimal,
    /// Negated negative balance.
    pub credit: Decimal,
}

/// Trial balance as of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBalance {
    /// Report date.
    pub as_of: NaiveDate,
    /// Accounts with a non-zero balance, by code.
    pub rows: Vec<TrialBalanceRow>,
    /// Sum of the debit column.
    pub total_debit: Decimal,
    /// Sum of the credit column.
    pub total_credit: Decimal,
    /// `|total_debit − total_credit| < 0.01`.
    pub is_balanced: bool,
}

/// An account amount presented on its natural side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementLine {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Amount, positive when the account sits on its normal side.
    pub amount: Decimal,
}

/// A group of statement lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatementSection {
    /// Lines by code.
    pub lines: Vec<StatementLine>,
    /// Sum of the line amounts.
    pub total: Decimal,
}

/// Profit and loss as of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfitAndLoss {
    /// Report date.
    pub as_of: NaiveDate,
    /// Revenue accounts, credit balances shown positive.
    pub revenue: StatementSection,
    /// Expense accounts.
    pub expenses: StatementSection,
    /// Revenue total.
    pub total_revenue: Decimal,
    /// Expense total.
    pub total_expenses: Decimal,
    /// `total_revenue − total_expenses`.
    pub net_profit: Decimal,
}

/// Balance sheet as of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceSheet {
    /// Report date.
    pub as_of: NaiveDate,
    /// Asset accounts.
    pub assets: StatementSection,
    /// Liability accounts, credit balances shown positive.
    pub liabilities: StatementSection,
    /// Equity accounts, credit balances shown positive.
    pub equity: StatementSection,
    /// Unclosed profit folded into equity.
    pub retained_earnings: Decimal,
    /// Asset total.
    pub total_assets: Decimal,
    /// Liability total.
    pub total_liabilities: Decimal,
    /// Equity total including `retained_earnings`.
    pub total_equity: Decimal,
    /// `|assets − (liabilities + equity)| < 0.01`.
    pub is_balanced: bool,
}

/// Financial statement kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementType {
    /// Trial balance.
    TrialBalance,
    /// Profit and loss.
    #[serde(rename = "PL")]
    ProfitAndLoss,
    /// Balance sheet.
    BalanceSheet,
}

impl FromStr for StatementType {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRIAL_BALANCE" => Ok(Self::TrialBalance),
            "PL" => Ok(Self::ProfitAndLoss),
            "BALANCE_SHEET" => Ok(Self::BalanceSheet),
            other => Err(ReportError::UnknownStatementType(other.to_string())),
        }
    }
}

/// A generated financial statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinancialStatement {
    /// Trial balance.
    TrialBalance(TrialBalance),
    /// Profit and loss.
    #[serde(rename = "PL")]
    ProfitAndLoss(ProfitAndLoss),
    /// Balance sheet.
    BalanceSheet(BalanceSheet),
}
