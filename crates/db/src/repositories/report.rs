//! Report repository.
//!
//! Balances are derived from posted entries on every call; nothing is
//! cached or stored. Each report reads its inputs with one aggregate query,
//! or one read-only snapshot when it needs several, and hands them to
//! [`ReportService`].

use chrono::NaiveDate;
use ledgerline_core::coa::AccountType;
use ledgerline_core::ledger::LedgerError;
use ledgerline_core::reports::{
    AccountBalance, AccountLedger, BalanceSheet, FinancialStatement, LedgerMovement,
    ProfitAndLoss, ReportError, ReportService, StatementType, TrialBalance,
};
use ledgerline_shared::types::{AccountEntryId, AccountId, TenantId, TransactionId};
use rust_decimal::Decimal;
use sea_orm::{
    AccessMode, ColumnTrait, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult,
    IsolationLevel, QueryFilter, Statement, TransactionTrait,
};
use uuid::Uuid;

use super::error::report_error;
use crate::entities::accounts;

const BALANCES_SQL: &str = r"
SELECT a.id AS account_id,
       a.code,
       a.name,
       a.account_type::text AS account_type,
       COALESCE(SUM(e.debit - e.credit), 0) AS balance
FROM accounts a
LEFT JOIN (account_entries e
           JOIN transactions t
             ON t.id = e.transaction_id
            AND t.transaction_date <= $2)
       ON e.account_id = a.id
WHERE a.tenant_id = $1
GROUP BY a.id, a.code, a.name, a.account_type
";

const OPENING_SQL: &str = r"
SELECT COALESCE(SUM(e.debit - e.credit), 0) AS balance
FROM account_entries e
JOIN transactions t ON t.id = e.transaction_id
WHERE e.account_id = $1
  AND t.tenant_id = $2
  AND t.transaction_date < $3
";

const MOVEMENTS_SQL: &str = r"
SELECT e.id AS entry_id,
       t.id AS transaction_id,
       t.reference,
       t.transaction_date,
       COALESCE(e.description, t.description) AS description,
       e.debit,
       e.credit
FROM account_entries e
JOIN transactions t ON t.id = e.transaction_id
WHERE e.account_id = $1
  AND t.tenant_id = $2
  AND t.transaction_date BETWEEN $3 AND $4
ORDER BY t.transaction_date, e.id
";

#[derive(Debug, FromQueryResult)]
struct BalanceRow {
    account_id: Uuid,
    code: String,
    name: String,
    account_type: String,
    balance: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct OpeningRow {
    balance: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct MovementRow {
    entry_id: Uuid,
    transaction_id: Uuid,
    reference: String,
    transaction_date: NaiveDate,
    description: Option<String>,
    debit: Decimal,
    credit: Decimal,
}

impl TryFrom<BalanceRow> for AccountBalance {
    type Error = ReportError;

    fn try_from(row: BalanceRow) -> Result<Self, Self::Error> {
        let account_type: AccountType = row
            .account_type
            .parse()
            .map_err(|e: LedgerError| ReportError::Database(e.to_string()))?;
        Ok(Self {
            account_id: AccountId::from_uuid(row.account_id),
            code: row.code,
            name: row.name,
            account_type,
            balance: row.balance,
        })
    }
}

impl From<MovementRow> for LedgerMovement {
    fn from(row: MovementRow) -> Self {
        Self {
            entry_id: AccountEntryId::from_uuid(row.entry_id),
            transaction_id: TransactionId::from_uuid(row.transaction_id),
            reference: row.reference,
            date: row.transaction_date,
            description: row.description,
            debit: row.debit,
            credit: row.credit,
        }
    }
}

/// Repository for ledger reports and financial statements.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the balance of every account of the tenant as of `as_of`.
    ///
    /// Accounts without entries are included with a zero balance.
    pub async fn account_balances(
        &self,
        tenant_id: TenantId,
        as_of: NaiveDate,
    ) -> Result<Vec<AccountBalance>, ReportError> {
        let rows = BalanceRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            BALANCES_SQL,
            [tenant_id.into_inner().into(), as_of.into()],
        ))
        .all(&self.db)
        .await
        .map_err(report_error)?;

        rows.into_iter().map(AccountBalance::try_from).collect()
    }

    /// Builds the ledger of one account over `[from, to]`.
    ///
    /// The opening balance sums every entry dated before `from`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `from` is after `to` and
    /// `AccountNotFound` for an account outside the tenant.
    pub async fn account_ledger(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<AccountLedger, ReportError> {
        ReportService::validate_range(from, to)?;

        // One snapshot, so a posting dated before `from` that commits between
        // the two queries cannot skew the opening balance.
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::RepeatableRead), Some(AccessMode::ReadOnly))
            .await
            .map_err(report_error)?;

        let exists = accounts::Entity::find_by_id(account_id.into_inner())
            .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
            .one(&txn)
            .await
            .map_err(report_error)?;
        if exists.is_none() {
            return Err(ReportError::AccountNotFound(account_id.into_inner()));
        }

        let opening = OpeningRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            OPENING_SQL,
            [
                account_id.into_inner().into(),
                tenant_id.into_inner().into(),
                from.into(),
            ],
        ))
        .one(&txn)
        .await
        .map_err(report_error)?
        .map_or(Decimal::ZERO, |row| row.balance);

        let movements = MovementRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            MOVEMENTS_SQL,
            [
                account_id.into_inner().into(),
                tenant_id.into_inner().into(),
                from.into(),
                to.into(),
            ],
        ))
        .all(&txn)
        .await
        .map_err(report_error)?
        .into_iter()
        .map(LedgerMovement::from)
        .collect();

        txn.commit().await.map_err(report_error)?;

        ReportService::account_ledger(account_id, from, to, opening, movements)
    }

    /// Trial balance as of `as_of`.
    pub async fn trial_balance(
        &self,
        tenant_id: TenantId,
        as_of: NaiveDate,
    ) -> Result<TrialBalance, ReportError> {
        let balances = self.account_balances(tenant_id, as_of).await?;
        Ok(ReportService::trial_balance(as_of, balances))
    }

    /// Profit and loss as of `as_of`.
    pub async fn profit_and_loss(
        &self,
        tenant_id: TenantId,
        as_of: NaiveDate,
    ) -> Result<ProfitAndLoss, ReportError> {
        let balances = self.account_balances(tenant_id, as_of).await?;
        Ok(ReportService::profit_and_loss(as_of, &balances))
    }

    /// Balance sheet as of `as_of`.
    pub async fn balance_sheet(
        &self,
        tenant_id: TenantId,
        as_of: NaiveDate,
    ) -> Result<BalanceSheet, ReportError> {
        let balances = self.account_balances(tenant_id, as_of).await?;
        Ok(ReportService::balance_sheet(as_of, &balances))
    }

    /// Generates the statement of the requested kind.
    pub async fn statement(
        &self,
        tenant_id: TenantId,
        kind: StatementType,
        as_of: NaiveDate,
    ) -> Result<FinancialStatement, ReportError> {
        let balances = self.account_balances(tenant_id, as_of).await?;
        Ok(ReportService::statement(kind, as_of, balances))
    }
}
