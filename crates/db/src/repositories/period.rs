//! Financial period repository.
//!
//! Periods are stored sparsely: a month without a row is open.

use chrono::{NaiveDate, Utc};
use ledgerline_core::auth::Actor;
use ledgerline_core::fiscal::{
    FinancialPeriod, PeriodAction, PeriodKey, apply_action, validate_toggle,
};
use ledgerline_core::ledger::LedgerError;
use ledgerline_shared::types::{TenantId, UserId};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, QueryFilter,
    QueryOrder, Set, Statement, TransactionTrait,
};
use tracing::info;

use super::error::classify;
use crate::entities::financial_periods;

fn month_column(month: u32) -> Result<i32, LedgerError> {
    i32::try_from(month).map_err(|_| LedgerError::Validation(format!("invalid month {month}")))
}

fn to_period(model: financial_periods::Model) -> Result<FinancialPeriod, LedgerError> {
    let month = u32::try_from(model.month)
        .map_err(|_| LedgerError::Internal(format!("stored month {} is invalid", model.month)))?;
    Ok(FinancialPeriod {
        tenant_id: TenantId::from_uuid(model.tenant_id),
        key: PeriodKey::new(model.year, month)?,
        is_closed: model.is_closed,
        closed_by: model.closed_by.map(UserId::from_uuid),
        closed_at: model.closed_at.map(|at| at.with_timezone(&Utc)),
    })
}

const SHARED_LOCK_SQL: &str = "SELECT pg_advisory_xact_lock_shared(hashtextextended($1, 0))";
const EXCLUSIVE_LOCK_SQL: &str = "SELECT pg_advisory_xact_lock(hashtextextended($1, 0))";

/// Takes the transaction-scoped advisory lock of one period.
///
/// The lock exists whether or not the period has a row, so it also covers
/// a first close racing a posting into a never-touched month.
async fn lock_period<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    key: PeriodKey,
    exclusive: bool,
) -> Result<(), LedgerError> {
    let sql = if exclusive { EXCLUSIVE_LOCK_SQL } else { SHARED_LOCK_SQL };
    let lock_key = format!("{tenant_id}:period:{key}");
    conn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        sql,
        [lock_key.into()],
    ))
    .await
    .map_err(classify)?;
    Ok(())
}

/// Returns true when the period containing `date` is closed.
///
/// Takes the period's shared advisory lock until `conn` ends, so a close
/// waits for in-flight postings and a posting waits for an in-flight close.
/// `conn` must be an open database transaction.
pub(crate) async fn period_is_closed<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    date: NaiveDate,
) -> Result<bool, LedgerError> {
    let key = PeriodKey::from_date(date);
    lock_period(conn, tenant_id, key, false).await?;

    let period = financial_periods::Entity::find_by_id((
        tenant_id.into_inner(),
        key.year,
        month_column(key.month)?,
    ))
    .one(conn)
    .await
    .map_err(classify)?;

    Ok(period.is_some_and(|p| p.is_closed))
}

/// Repository for financial period locks.
#[derive(Debug, Clone)]
pub struct PeriodRepository {
    db: DatabaseConnection,
}

impl PeriodRepository {
    /// Creates a new period repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns true when postings dated `date` are refused.
    pub async fn is_closed(&self, tenant_id: TenantId, date: NaiveDate) -> Result<bool, LedgerError> {
        let key = PeriodKey::from_date(date);
        let period = financial_periods::Entity::find_by_id((
            tenant_id.into_inner(),
            key.year,
            month_column(key.month)?,
        ))
        .one(&self.db)
        .await
        .map_err(classify)?;

        Ok(period.is_some_and(|p| p.is_closed))
    }

    /// Returns one period, open by default when no row exists.
    pub async fn get_period(
        &self,
        tenant_id: TenantId,
        year: i32,
        month: u32,
    ) -> Result<FinancialPeriod, LedgerError> {
        let key = PeriodKey::new(year, month)?;
        let model = financial_periods::Entity::find_by_id((
            tenant_id.into_inner(),
            year,
            month_column(month)?,
        ))
        .one(&self.db)
        .await
        .map_err(classify)?;

        match model {
            Some(model) => to_period(model),
            None => Ok(FinancialPeriod::open(tenant_id, key)),
        }
    }

    /// Lists the stored periods of a tenant, oldest first.
    pub async fn list_periods(&self, tenant_id: TenantId) -> Result<Vec<FinancialPeriod>, LedgerError> {
        financial_periods::Entity::find()
            .filter(financial_periods::Column::TenantId.eq(tenant_id.into_inner()))
            .order_by_asc(financial_periods::Column::Year)
            .order_by_asc(financial_periods::Column::Month)
            .all(&self.db)
            .await
            .map_err(classify)?
            .into_iter()
            .map(to_period)
            .collect()
    }

    /// Closes or reopens a period.
    ///
    /// Closing records the actor and time; opening clears them. The toggle
    /// takes the period's exclusive advisory lock, so it waits for postings
    /// that already passed the period check.
    ///
    /// # Errors
    ///
    /// Returns `Permission` unless the actor is an admin, and `Validation`
    /// for a month outside 1..=12.
    pub async fn set_period(
        &self,
        tenant_id: TenantId,
        year: i32,
        month: u32,
        action: PeriodAction,
        actor: &Actor,
    ) -> Result<FinancialPeriod, LedgerError> {
        let key = validate_toggle(actor, year, month)?;
        let now = Utc::now();

        let mut period = FinancialPeriod::open(tenant_id, key);
        apply_action(&mut period, action, actor, now);

        let model = financial_periods::ActiveModel {
            tenant_id: Set(tenant_id.into_inner()),
            year: Set(key.year),
            month: Set(month_column(key.month)?),
            is_closed: Set(period.is_closed),
            closed_by: Set(period.closed_by.map(UserId::into_inner)),
            closed_at: Set(period.closed_at.map(Into::into)),
            updated_at: Set(now.into()),
        };

        let txn = self.db.begin().await.map_err(classify)?;
        lock_period(&txn, tenant_id, key, true).await?;

        financial_periods::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    financial_periods::Column::TenantId,
                    financial_periods::Column::Year,
                    financial_periods::Column::Month,
                ])
                .update_columns([
                    financial_periods::Column::IsClosed,
                    financial_periods::Column::ClosedBy,
                    financial_periods::Column::ClosedAt,
                    financial_periods::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(&txn)
            .await
            .map_err(classify)?;
        txn.commit().await.map_err(classify)?;

        info!(
            %tenant_id,
            period = %key,
            ?action,
            actor = %actor.user_id,
            "financial period updated"
        );

        Ok(period)
    }
}
