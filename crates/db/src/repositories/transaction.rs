//! Transaction repository: the ledger posting engine.
//!
//! A posting is one database transaction that
//! 1. checks every entry account belongs to the tenant,
//! 2. checks the period of the posting date is open,
//! 3. allocates the reference when the caller did not supply one,
//! 4. inserts the header and all entry lines.
//!
//! Any failure rolls the whole unit back. Transient write conflicts are
//! retried under the repository's [`RetryPolicy`]; everything else surfaces
//! on the first attempt.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{Datelike, NaiveDate, Utc};
use ledgerline_core::fiscal::ensure_open;
use ledgerline_core::ledger::{
    LedgerError, LedgerService, PostedEntry, PostedTransaction, PostingOptions, PostingRequest,
    ReversalService, TransactionFilter, validate_entries,
};
use ledgerline_core::retry::{RetryPolicy, retry_with_policy};
use ledgerline_shared::types::{AccountEntryId, AccountId, TenantId, TransactionId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::account::existing_accounts;
use super::error::classify;
use super::period::period_is_closed;
use super::sequence;
use crate::entities::{account_entries, sea_orm_active_enums::TransactionType, transactions};

fn to_posted(
    header: transactions::Model,
    mut entries: Vec<account_entries::Model>,
) -> PostedTransaction {
    entries.sort_by_key(|e| e.line_no);
    PostedTransaction {
        id: TransactionId::from_uuid(header.id),
        tenant_id: TenantId::from_uuid(header.tenant_id),
        reference: header.reference,
        date: header.transaction_date,
        description: header.description,
        transaction_type: header.transaction_type.into(),
        entries: entries
            .into_iter()
            .map(|e| PostedEntry {
                id: AccountEntryId::from_uuid(e.id),
                account_id: AccountId::from_uuid(e.account_id),
                debit: e.debit,
                credit: e.credit,
                description: e.description,
            })
            .collect(),
    }
}

/// Opens a database transaction whose lock waits are bounded.
///
/// Lock waits get half of the attempt timeout so that contention surfaces as
/// a retryable `lock_not_available` rather than an attempt timeout.
pub(crate) async fn begin_atomic(
    db: &DatabaseConnection,
    policy: &RetryPolicy,
) -> Result<DatabaseTransaction, LedgerError> {
    let lock_timeout: Duration = policy.attempt_timeout / 2;
    let txn = db.begin().await.map_err(classify)?;
    txn.execute_unprepared(&format!(
        "SET LOCAL lock_timeout = '{}ms'",
        lock_timeout.as_millis().max(1)
    ))
    .await
    .map_err(classify)?;
    Ok(txn)
}

/// Inserts one posting inside `conn`, which must be an open transaction.
///
/// `reverses` links the new transaction to the one it offsets.
pub(crate) async fn insert_posting<C: ConnectionTrait>(
    conn: &C,
    request: &PostingRequest,
    reverses: Option<TransactionId>,
) -> Result<PostedTransaction, LedgerError> {
    let ids: Vec<AccountId> = request.entries.iter().map(|e| e.account_id).collect();
    let known: HashSet<AccountId> = existing_accounts(conn, request.tenant_id, &ids)
        .await?
        .into_iter()
        .collect();
    LedgerService::validate_posting(request, |id| {
        if known.contains(&id) {
            Ok(())
        } else {
            Err(LedgerError::AccountNotFound(id.into_inner()))
        }
    })?;

    ensure_open(
        request.date,
        period_is_closed(conn, request.tenant_id, request.date).await?,
    )?;

    let reference = if request.needs_allocation() {
        sequence::allocate(
            conn,
            request.tenant_id,
            request.allocation_prefix(),
            request.date.year(),
        )
        .await?
    } else {
        request.reference.clone().unwrap_or_default()
    };

    let id = TransactionId::new();
    let header = transactions::ActiveModel {
        id: Set(id.into_inner()),
        tenant_id: Set(request.tenant_id.into_inner()),
        reference: Set(reference.clone()),
        transaction_date: Set(request.date),
        description: Set(request.description.clone()),
        transaction_type: Set(TransactionType::from(request.transaction_type)),
        reverses_id: Set(reverses.map(TransactionId::into_inner)),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await
    .map_err(|e| match classify(e) {
        LedgerError::DuplicateReference(constraint)
            if constraint == "transactions_reverses_key" =>
        {
            LedgerError::AlreadyReversed(reverses.map_or(Uuid::nil(), TransactionId::into_inner))
        }
        LedgerError::DuplicateReference(_) => LedgerError::DuplicateReference(reference.clone()),
        other => other,
    })?;

    let mut lines = Vec::with_capacity(request.entries.len());
    let mut models = Vec::with_capacity(request.entries.len());
    for (index, entry) in request.entries.iter().enumerate() {
        let line_no = i32::try_from(index + 1)
            .map_err(|_| LedgerError::Validation("too many entry lines".into()))?;
        let entry_id = AccountEntryId::new();
        models.push(account_entries::ActiveModel {
            id: Set(entry_id.into_inner()),
            transaction_id: Set(id.into_inner()),
            account_id: Set(entry.account_id.into_inner()),
            line_no: Set(line_no),
            debit: Set(entry.debit),
            credit: Set(entry.credit),
            description: Set(entry.description.clone()),
        });
        lines.push(PostedEntry {
            id: entry_id,
            account_id: entry.account_id,
            debit: entry.debit,
            credit: entry.credit,
            description: entry.description.clone(),
        });
    }
    account_entries::Entity::insert_many(models)
        .exec(conn)
        .await
        .map_err(classify)?;

    debug!(
        tenant_id = %request.tenant_id,
        %reference,
        entries = lines.len(),
        "transaction inserted"
    );

    Ok(PostedTransaction {
        id,
        tenant_id: request.tenant_id,
        reference: header.reference,
        date: header.transaction_date,
        description: header.description,
        transaction_type: request.transaction_type,
        entries: lines,
    })
}

/// Loads a transaction with its entries, optionally locking the header row.
pub(crate) async fn load_posted<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    transaction_id: TransactionId,
    lock: bool,
) -> Result<PostedTransaction, LedgerError> {
    let mut query = transactions::Entity::find_by_id(transaction_id.into_inner())
        .filter(transactions::Column::TenantId.eq(tenant_id.into_inner()));
    if lock {
        query = query.lock_exclusive();
    }
    let header = query
        .one(conn)
        .await
        .map_err(classify)?
        .ok_or(LedgerError::TransactionNotFound(transaction_id.into_inner()))?;

    let entries = account_entries::Entity::find()
        .filter(account_entries::Column::TransactionId.eq(header.id))
        .order_by_asc(account_entries::Column::LineNo)
        .all(conn)
        .await
        .map_err(classify)?;

    Ok(to_posted(header, entries))
}

/// Posts the offsetting journal for `transaction_id` inside `conn`.
///
/// The original header is locked for the rest of the unit, so two
/// concurrent reversals of the same transaction cannot both succeed.
pub(crate) async fn reverse_in<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    transaction_id: TransactionId,
    date: NaiveDate,
    reason: &str,
) -> Result<PostedTransaction, LedgerError> {
    let original = load_posted(conn, tenant_id, transaction_id, true).await?;

    let already = transactions::Entity::find()
        .filter(transactions::Column::ReversesId.eq(transaction_id.into_inner()))
        .one(conn)
        .await
        .map_err(classify)?;
    if already.is_some() {
        return Err(LedgerError::AlreadyReversed(transaction_id.into_inner()));
    }

    let request = ReversalService::build_reversal(&original, date, reason)?;
    insert_posting(conn, &request, Some(transaction_id)).await
}

/// Repository for posting and reading ledger transactions.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
    retry: RetryPolicy,
}

impl TransactionRepository {
    /// Creates a new transaction repository with the default retry policy.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_retry_policy(db, RetryPolicy::default())
    }

    /// Creates a new transaction repository with an explicit retry policy.
    #[must_use]
    pub const fn with_retry_policy(db: DatabaseConnection, retry: RetryPolicy) -> Self {
        Self { db, retry }
    }

    /// Posts a balanced transaction atomically.
    ///
    /// # Errors
    ///
    /// - `InsufficientEntries`, `NegativeAmount`, `ImbalancedEntries` and
    ///   `Validation` for malformed requests, before touching the database
    /// - `AccountNotFound` for an entry account outside the tenant
    /// - `PeriodClosed` when the posting date falls in a closed period
    /// - `DuplicateReference` when a supplied reference is taken
    /// - `RetriesExhausted` or `Timeout` when the store keeps conflicting
    pub async fn post_transaction(
        &self,
        request: PostingRequest,
    ) -> Result<PostedTransaction, LedgerError> {
        self.post_transaction_with(request, PostingOptions::default())
            .await
    }

    /// Posts a transaction with caller-controlled options.
    ///
    /// With `regenerate_on_duplicate`, a reference collision is retried once
    /// under a freshly allocated reference. A caller-supplied reference is
    /// dropped in favour of the allocated one.
    ///
    /// # Errors
    ///
    /// The errors of [`TransactionRepository::post_transaction`].
    pub async fn post_transaction_with(
        &self,
        request: PostingRequest,
        options: PostingOptions,
    ) -> Result<PostedTransaction, LedgerError> {
        validate_entries(&request.entries)?;

        let posted = match self.post_with_retry(&request).await {
            Err(LedgerError::DuplicateReference(taken)) if options.regenerate_on_duplicate => {
                warn!(
                    tenant_id = %request.tenant_id,
                    reference = %taken,
                    "reference collision, allocating a fresh reference"
                );
                let fresh = PostingRequest {
                    reference: None,
                    ..request
                };
                self.post_with_retry(&fresh).await?
            }
            other => other?,
        };

        info!(
            tenant_id = %posted.tenant_id,
            reference = %posted.reference,
            transaction_type = %posted.transaction_type,
            "transaction posted"
        );
        Ok(posted)
    }

    async fn post_with_retry(
        &self,
        request: &PostingRequest,
    ) -> Result<PostedTransaction, LedgerError> {
        let posted = retry_with_policy(&self.retry, LedgerError::is_retryable, |attempt| {
            self.post_attempt(request, attempt)
        })
        .await?;
        Ok(posted)
    }

    async fn post_attempt(
        &self,
        request: &PostingRequest,
        attempt: u32,
    ) -> Result<PostedTransaction, LedgerError> {
        debug!(attempt, tenant_id = %request.tenant_id, "posting attempt");
        let txn = begin_atomic(&self.db, &self.retry).await?;
        let posted = insert_posting(&txn, request, None).await?;
        txn.commit().await.map_err(classify)?;
        Ok(posted)
    }

    /// Reverses a posted transaction with an offsetting journal.
    ///
    /// The original stays untouched. The reversal is subject to the period
    /// lock of `date`.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound`, `AlreadyReversed`, `Validation` for a
    /// blank reason, and the posting errors of
    /// [`TransactionRepository::post_transaction`].
    pub async fn reverse_transaction(
        &self,
        tenant_id: TenantId,
        transaction_id: TransactionId,
        date: NaiveDate,
        reason: &str,
    ) -> Result<PostedTransaction, LedgerError> {
        let reversal = retry_with_policy(&self.retry, LedgerError::is_retryable, |_| async move {
            let txn = begin_atomic(&self.db, &self.retry).await?;
            let reversal = reverse_in(&txn, tenant_id, transaction_id, date, reason).await?;
            txn.commit().await.map_err(classify)?;
            Ok::<_, LedgerError>(reversal)
        })
        .await?;

        info!(
            %tenant_id,
            original = %transaction_id,
            reference = %reversal.reference,
            "transaction reversed"
        );
        Ok(reversal)
    }

    /// Fetches a transaction with its entries.
    pub async fn get_transaction(
        &self,
        tenant_id: TenantId,
        transaction_id: TransactionId,
    ) -> Result<PostedTransaction, LedgerError> {
        load_posted(&self.db, tenant_id, transaction_id, false).await
    }

    /// Lists transactions by date, then reference.
    pub async fn list_transactions(
        &self,
        tenant_id: TenantId,
        filter: &TransactionFilter,
    ) -> Result<Vec<PostedTransaction>, LedgerError> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::TenantId.eq(tenant_id.into_inner()));

        if let Some(transaction_type) = filter.transaction_type {
            query = query.filter(
                transactions::Column::TransactionType.eq(TransactionType::from(transaction_type)),
            );
        }
        if let Some(from) = filter.from {
            query = query.filter(transactions::Column::TransactionDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(transactions::Column::TransactionDate.lte(to));
        }

        let rows = query
            .order_by_asc(transactions::Column::TransactionDate)
            .order_by_asc(transactions::Column::Reference)
            .find_with_related(account_entries::Entity)
            .all(&self.db)
            .await
            .map_err(classify)?;

        Ok(rows
            .into_iter()
            .map(|(header, entries)| to_posted(header, entries))
            .collect())
    }
}
