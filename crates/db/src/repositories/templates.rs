//! Business postings built on the posting engine.
//!
//! Each operation resolves the tenant's account-role map once, lets
//! [`PostingTemplates`] build the entries, and posts through
//! [`TransactionRepository`]. A role the tenant has not mapped fails the call
//! with `MissingAccountRole`; there is no fallback account.

use ledgerline_core::ledger::{
    LedgerError, OpeningStockInput, PaymentInput, PostedTransaction, PostingTemplates,
    PurchaseInput,
};
use ledgerline_core::retry::RetryPolicy;
use sea_orm::DatabaseConnection;
use tracing::info;

use super::account_role::load_role_map;
use super::transaction::TransactionRepository;

/// Repository for purchase, payment and opening stock postings.
#[derive(Debug, Clone)]
pub struct TemplateRepository {
    db: DatabaseConnection,
    transactions: TransactionRepository,
}

impl TemplateRepository {
    /// Creates a new template repository with the default retry policy.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_retry_policy(db, RetryPolicy::default())
    }

    /// Creates a new template repository with an explicit retry policy.
    #[must_use]
    pub fn with_retry_policy(db: DatabaseConnection, retry: RetryPolicy) -> Self {
        Self {
            transactions: TransactionRepository::with_retry_policy(db.clone(), retry),
            db,
        }
    }

    /// Records a vendor bill: Inventory and Input Tax debits, Accounts
    /// Payable credit.
    pub async fn record_purchase(
        &self,
        input: &PurchaseInput,
    ) -> Result<PostedTransaction, LedgerError> {
        let roles = load_role_map(&self.db, input.tenant_id).await?;
        let request = PostingTemplates::purchase(input, &roles)?;
        let posted = self.transactions.post_transaction(request).await?;
        info!(
            tenant_id = %input.tenant_id,
            vendor = %input.vendor_name,
            reference = %posted.reference,
            "purchase recorded"
        );
        Ok(posted)
    }

    /// Records a customer receipt or a vendor payment.
    ///
    /// Customer receipts debit the bank/cash account and credit Accounts
    /// Receivable under an `RV` reference; vendor payments debit Accounts
    /// Payable and credit the bank/cash account under a `PV` reference.
    pub async fn record_payment(
        &self,
        input: &PaymentInput,
    ) -> Result<PostedTransaction, LedgerError> {
        let roles = load_role_map(&self.db, input.tenant_id).await?;
        let request = PostingTemplates::payment(input, &roles)?;
        let posted = self.transactions.post_transaction(request).await?;
        info!(
            tenant_id = %input.tenant_id,
            party = %input.party_name,
            amount = %input.amount,
            reference = %posted.reference,
            "payment recorded"
        );
        Ok(posted)
    }

    /// Records opening stock: Inventory debit, Opening Balance Equity credit.
    pub async fn record_opening_stock(
        &self,
        input: &OpeningStockInput,
    ) -> Result<PostedTransaction, LedgerError> {
        let roles = load_role_map(&self.db, input.tenant_id).await?;
        let request = PostingTemplates::opening_stock(input, &roles)?;
        self.transactions.post_transaction(request).await
    }
}
