//! Reference number allocation.
//!
//! A reference is allocated inside the transaction that inserts the row that
//! consumes it. The allocation takes a transaction-scoped advisory lock on
//! `(tenant, prefix, year)`, so concurrent allocators for the same sequence
//! queue up and each one reads the previous winner's committed reference.
//! The unique constraints on `transactions` and `invoices` remain the final
//! guard.

use ledgerline_core::ledger::LedgerError;
use ledgerline_core::sequence::{ReferencePrefix, next_reference};
use ledgerline_shared::types::TenantId;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, FromQueryResult, Statement};
use tracing::debug;

use super::error::classify;

const LOCK_SQL: &str = "SELECT pg_advisory_xact_lock(hashtextextended($1, 0))";

#[derive(Debug, FromQueryResult)]
struct LatestReference {
    reference: String,
}

/// Table and column holding the references of one prefix family.
const fn target(prefix: ReferencePrefix) -> (&'static str, &'static str) {
    match prefix {
        ReferencePrefix::Sin | ReferencePrefix::Fin => ("invoices", "invoice_number"),
        _ => ("transactions", "reference"),
    }
}

/// Returns the greatest well-formed reference of a sequence, by counter.
async fn latest_reference<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    prefix: ReferencePrefix,
    year: i32,
) -> Result<Option<String>, LedgerError> {
    let (table, column) = target(prefix);
    let sql = format!(
        "SELECT {column} AS reference FROM {table} \
         WHERE tenant_id = $1 AND {column} ~ $2 \
         ORDER BY char_length({column}) DESC, {column} DESC \
         LIMIT 1"
    );
    let pattern = format!("^{}[0-9]{{4,}}$", prefix.stem(year));

    let row = LatestReference::find_by_statement(Statement::from_sql_and_values(
        DbBackend::Postgres,
        sql,
        [tenant_id.into_inner().into(), pattern.into()],
    ))
    .one(conn)
    .await
    .map_err(classify)?;

    Ok(row.map(|r| r.reference))
}

/// Allocates the next reference of a sequence.
///
/// `conn` must be an open database transaction: the advisory lock is held
/// until it commits or rolls back.
pub(crate) async fn allocate<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    prefix: ReferencePrefix,
    year: i32,
) -> Result<String, LedgerError> {
    let key = format!("{tenant_id}:{}", prefix.stem(year));
    conn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        LOCK_SQL,
        [key.into()],
    ))
    .await
    .map_err(classify)?;

    let latest = latest_reference(conn, tenant_id, prefix, year).await?;
    let reference = next_reference(prefix, year, latest.as_deref())?;
    debug!(%tenant_id, %reference, "allocated reference");
    Ok(reference)
}

/// Read-only access to reference sequences.
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    db: DatabaseConnection,
}

impl SequenceRepository {
    /// Creates a new sequence repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the reference the next allocation would produce.
    ///
    /// This is a preview: nothing is reserved, and a concurrent posting may
    /// take the number first.
    pub async fn next_reference(
        &self,
        tenant_id: TenantId,
        prefix: ReferencePrefix,
        year: i32,
    ) -> Result<String, LedgerError> {
        let latest = latest_reference(&self.db, tenant_id, prefix, year).await?;
        next_reference(prefix, year, latest.as_deref())
    }
}
