//! Report generation service.
//!
//! Every report is derived from raw balances or movements supplied by the
//! caller; nothing here touches storage.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use ledgerline_shared::types::{AccountId, within_tolerance};

use super::error::ReportError;
use super::types::{
    AccountBalance, AccountLedger, BalanceSheet, FinancialStatement, LedgerLine, LedgerMovement,
    ProfitAndLoss, StatementLine, StatementSection, StatementType, TrialBalance, TrialBalanceRow,
};
use crate::coa::code::compare_codes;
use crate::coa::{AccountType, NormalBalance};

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Validates a report date range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `from` is after `to`.
    pub fn validate_range(from: NaiveDate, to: NaiveDate) -> Result<(), ReportError> {
        if from > to {
            return Err(ReportError::InvalidDateRange {
                start: from,
                end: to,
            });
        }
        Ok(())
    }

    /// Builds an account ledger with running balances.
    ///
    /// Movements outside `[from, to]` are ignored. Rows are ordered by date,
    /// then by entry ID.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `from` is after `to`.
    pub fn account_ledger(
        account_id: AccountId,
        from: NaiveDate,
        to: NaiveDate,
        opening_balance: Decimal,
        mut movements: Vec<LedgerMovement>,
    ) -> Result<AccountLedger, ReportError> {
        Self::validate_range(from, to)?;

        movements.retain(|m| m.date >= from && m.date <= to);
        movements.sort_by_key(|m| (m.date, m.entry_id));

        let mut running = opening_balance;
        let lines = movements
            .into_iter()
            .map(|m| {
                running += m.debit - m.credit;
                LedgerLine {
                    entry_id: m.entry_id,
                    transaction_id: m.transaction_id,
                    reference: m.reference,
                    date: m.date,
                    description: m.description,
                    debit: m.debit,
                    credit: m.credit,
                    running_balance: running,
                }
            })
            .collect();

        Ok(AccountLedger {
            account_id,
            from,
            to,
            opening_balance,
            lines,
            closing_balance: running,
        })
    }

    /// Generates a trial balance. Zero-balance accounts are left out.
    #[must_use]
    pub fn trial_balance(as_of: NaiveDate, balances: Vec<AccountBalance>) -> TrialBalance {
        let mut rows: Vec<TrialBalanceRow> = balances
            .into_iter()
            .filter(|b| !b.balance.is_zero())
            .map(|b| {
                let (debit, credit) = if b.balance > Decimal::ZERO {
                    (b.balance, Decimal::ZERO)
                } else {
                    (Decimal::ZERO, -b.balance)
                };
                TrialBalanceRow {
                    account_id: b.account_id,
                    code: b.code,
                    name: b.name,
                    account_type: b.account_type,
                    debit,
                    credit,
                }
            })
            .collect();
        rows.sort_by(|a, b| compare_codes(&a.code, &b.code));

        let total_debit: Decimal = rows.iter().map(|r| r.debit).sum();
        let total_credit: Decimal = rows.iter().map(|r| r.credit).sum();

        TrialBalance {
            as_of,
            rows,
            total_debit,
            total_credit,
            is_balanced: within_tolerance(total_debit, total_credit),
        }
    }

    /// Generates a profit and loss statement.
    #[must_use]
    pub fn profit_and_loss(as_of: NaiveDate, balances: &[AccountBalance]) -> ProfitAndLoss {
        let revenue = Self::section(balances, AccountType::Revenue);
        let expenses = Self::section(balances, AccountType::Expense);
        let total_revenue = revenue.total;
        let total_expenses = expenses.total;

        ProfitAndLoss {
            as_of,
            revenue,
            expenses,
            total_revenue,
            total_expenses,
            net_profit: total_revenue - total_expenses,
        }
    }

    /// Generates a balance sheet with net profit folded into equity.
    #[must_use]
    pub fn balance_sheet(as_of: NaiveDate, balances: &[AccountBalance]) -> BalanceSheet {
        let assets = Self::section(balances, AccountType::Asset);
        let liabilities = Self::section(balances, AccountType::Liability);
        let equity = Self::section(balances, AccountType::Equity);
        let retained_earnings = Self::profit_and_loss(as_of, balances).net_profit;

        let total_assets = assets.total;
        let total_liabilities = liabilities.total;
        let total_equity = equity.total + retained_earnings;

        BalanceSheet {
            as_of,
            assets,
            liabilities,
            equity,
            retained_earnings,
            total_assets,
            total_liabilities,
            total_equity,
            is_balanced: within_tolerance(total_assets, total_liabilities + total_equity),
        }
    }

    /// Generates the requested statement.
    #[must_use]
    pub fn statement(
        kind: StatementType,
        as_of: NaiveDate,
        balances: Vec<AccountBalance>,
    ) -> FinancialStatement {
        match kind {
            StatementType::TrialBalance => {
                FinancialStatement::TrialBalance(Self::trial_balance(as_of, balances))
            }
            StatementType::ProfitAndLoss => {
                FinancialStatement::ProfitAndLoss(Self::profit_and_loss(as_of, &balances))
            }
            StatementType::BalanceSheet => {
                FinancialStatement::BalanceSheet(Self::balance_sheet(as_of, &balances))
            }
        }
    }

    /// Collects non-zero accounts of one type, signed to their normal side.
    fn section(balances: &[AccountBalance], account_type: AccountType) -> StatementSection {
        let sign = match account_type.normal_balance() {
            NormalBalance::Debit => Decimal::ONE,
            NormalBalance::Credit => Decimal::NEGATIVE_ONE,
        };

        let mut lines: Vec<StatementLine> = balances
            .iter()
            .filter(|b| b.account_type == account_type && !b.balance.is_zero())
            .map(|b| StatementLine {
                account_id: b.account_id,
                code: b.code.clone(),
                name: b.name.clone(),
                amount: b.balance * sign,
            })
            .collect();
        lines.sort_by(|a, b| compare_codes(&a.code, &b.code));

        let total = lines.iter().map(|l| l.amount).sum();
        StatementSection { lines, total }
    }
}
