//! Invoice repository.
//!
//! Every mutating operation locks the invoice row first, so a sync, an issue
//! and an approval of the same invoice are serialised. Sync, re-posting and
//! item replacement happen in one atomic unit: either the invoice, its items
//! and its ledger link all change, or none of them do.

use chrono::{Datelike, Utc};
use ledgerline_core::invoice::{
    Invoice, InvoiceLine, InvoiceSync, InvoiceTotals, LedgerFollowUp, NewInvoice,
    ServiceChargePolicy,
};
use ledgerline_core::ledger::{LedgerError, PostedTransaction, PostingTemplates};
use ledgerline_core::retry::{RetryPolicy, retry_with_policy};
use ledgerline_shared::types::{ExpenseId, InvoiceId, InvoiceItemId, JobId, TenantId, TransactionId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use tracing::{debug, info};

use super::account_role::load_role_map;
use super::error::classify;
use super::job::{load_expenses, load_job};
use super::sequence;
use super::transaction::{begin_atomic, insert_posting, reverse_in};
use crate::entities::{invoice_items, invoices, sea_orm_active_enums};

/// An invoice with its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceDetail {
    /// Invoice header.
    pub invoice: Invoice,
    /// Line items in line order.
    pub lines: Vec<InvoiceLine>,
}

fn to_invoice(model: &invoices::Model) -> Invoice {
    Invoice {
        id: InvoiceId::from_uuid(model.id),
        tenant_id: TenantId::from_uuid(model.tenant_id),
        invoice_number: model.invoice_number.clone(),
        category: model.category.into(),
        job_id: model.job_id.map(JobId::from_uuid),
        customer_name: model.customer_name.clone(),
        date: model.invoice_date,
        totals: InvoiceTotals {
            total_amount: model.total_amount,
            tax_amount: model.tax_amount,
            grand_total: model.grand_total,
        },
        is_approved: model.is_approved,
        transaction_id: model.transaction_id.map(TransactionId::from_uuid),
    }
}

fn to_line(model: invoice_items::Model) -> InvoiceLine {
    InvoiceLine {
        expense_id: model.expense_id.map(ExpenseId::from_uuid),
        description: model.description,
        quantity: model.quantity,
        rate: model.rate,
        amount: model.amount,
        tax_percent: model.tax_percent,
        tax_amount: model.tax_amount,
        total: model.total,
    }
}

async fn find_invoice<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    invoice_id: InvoiceId,
    lock: bool,
) -> Result<invoices::Model, LedgerError> {
    let mut query = invoices::Entity::find_by_id(invoice_id.into_inner())
        .filter(invoices::Column::TenantId.eq(tenant_id.into_inner()));
    if lock {
        query = query.lock_exclusive();
    }
    query
        .one(conn)
        .await
        .map_err(classify)?
        .ok_or(LedgerError::InvoiceNotFound(invoice_id.into_inner()))
}

async fn load_lines<C: ConnectionTrait>(
    conn: &C,
    invoice_id: InvoiceId,
) -> Result<Vec<InvoiceLine>, LedgerError> {
    Ok(invoice_items::Entity::find()
        .filter(invoice_items::Column::InvoiceId.eq(invoice_id.into_inner()))
        .order_by_asc(invoice_items::Column::LineNo)
        .all(conn)
        .await
        .map_err(classify)?
        .into_iter()
        .map(to_line)
        .collect())
}

async fn replace_lines<C: ConnectionTrait>(
    conn: &C,
    invoice_id: InvoiceId,
    lines: &[InvoiceLine],
) -> Result<(), LedgerError> {
    invoice_items::Entity::delete_many()
        .filter(invoice_items::Column::InvoiceId.eq(invoice_id.into_inner()))
        .exec(conn)
        .await
        .map_err(classify)?;

    if lines.is_empty() {
        return Ok(());
    }

    let mut rows = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        let line_no = i32::try_from(index + 1)
            .map_err(|_| LedgerError::Validation("too many invoice lines".into()))?;
        rows.push(invoice_items::ActiveModel {
            id: Set(InvoiceItemId::new().into_inner()),
            invoice_id: Set(invoice_id.into_inner()),
            expense_id: Set(line.expense_id.map(ExpenseId::into_inner)),
            line_no: Set(line_no),
            description: Set(line.description.clone()),
            quantity: Set(line.quantity),
            rate: Set(line.rate),
            amount: Set(line.amount),
            tax_percent: Set(line.tax_percent),
            tax_amount: Set(line.tax_amount),
            total: Set(line.total),
        });
    }

    invoice_items::Entity::insert_many(rows)
        .exec(conn)
        .await
        .map_err(classify)?;
    Ok(())
}

/// Posts AR/Revenue for the invoice's grand total inside `conn`.
async fn post_invoice<C: ConnectionTrait>(
    conn: &C,
    invoice: &Invoice,
    grand_total: Decimal,
) -> Result<PostedTransaction, LedgerError> {
    let roles = load_role_map(conn, invoice.tenant_id).await?;
    let request = PostingTemplates::invoice(
        invoice.tenant_id,
        &invoice.invoice_number,
        invoice.date,
        grand_total,
        &roles,
    )?;
    insert_posting(conn, &request, None).await
}

/// Repository for invoices and their ledger link.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
    retry: RetryPolicy,
    service_charge: ServiceChargePolicy,
}

impl InvoiceRepository {
    /// Creates a new invoice repository with the default retry policy and no
    /// service charge.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_policies(db, RetryPolicy::default(), ServiceChargePolicy::default())
    }

    /// Creates a new invoice repository with explicit policies.
    #[must_use]
    pub const fn with_policies(
        db: DatabaseConnection,
        retry: RetryPolicy,
        service_charge: ServiceChargePolicy,
    ) -> Self {
        Self {
            db,
            retry,
            service_charge,
        }
    }

    /// Creates a draft invoice with a freshly allocated `SIN`/`FIN` number.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank customer and `JobNotFound` for a job
    /// outside the tenant.
    pub async fn create_invoice(&self, input: NewInvoice) -> Result<Invoice, LedgerError> {
        if input.customer_name.trim().is_empty() {
            return Err(LedgerError::Validation("customer name is required".into()));
        }
        let input = &input;

        let invoice = retry_with_policy(
            &self.retry,
            |err: &LedgerError| {
                err.is_retryable() || matches!(err, LedgerError::DuplicateReference(_))
            },
            |_| async move {
                let txn = begin_atomic(&self.db, &self.retry).await?;
                if let Some(job_id) = input.job_id {
                    load_job(&txn, input.tenant_id, job_id).await?;
                }
                let number = sequence::allocate(
                    &txn,
                    input.tenant_id,
                    input.category.prefix(),
                    input.date.year(),
                )
                .await?;

                let now = Utc::now();
                let model = invoices::ActiveModel {
                    id: Set(InvoiceId::new().into_inner()),
                    tenant_id: Set(input.tenant_id.into_inner()),
                    invoice_number: Set(number),
                    category: Set(sea_orm_active_enums::InvoiceCategory::from(input.category)),
                    job_id: Set(input.job_id.map(JobId::into_inner)),
                    customer_name: Set(input.customer_name.clone()),
                    invoice_date: Set(input.date),
                    total_amount: Set(Decimal::ZERO),
                    tax_amount: Set(Decimal::ZERO),
                    grand_total: Set(Decimal::ZERO),
                    is_approved: Set(false),
                    transaction_id: Set(None),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                }
                .insert(&txn)
                .await
                .map_err(classify)?;

                txn.commit().await.map_err(classify)?;
                Ok::<_, LedgerError>(to_invoice(&model))
            },
        )
        .await?;

        info!(
            tenant_id = %invoice.tenant_id,
            invoice_number = %invoice.invoice_number,
            category = %invoice.category.as_str(),
            "invoice created"
        );
        Ok(invoice)
    }

    /// Fetches an invoice with its line items.
    pub async fn get_invoice(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
    ) -> Result<InvoiceDetail, LedgerError> {
        let model = find_invoice(&self.db, tenant_id, invoice_id, false).await?;
        let lines = load_lines(&self.db, invoice_id).await?;
        Ok(InvoiceDetail {
            invoice: to_invoice(&model),
            lines,
        })
    }

    /// Rebuilds the invoice's items from its job's expenses.
    ///
    /// When the invoice is already issued and the grand total changed, the
    /// linked transaction is reversed and a new one is posted and linked (or
    /// the link is cleared when the new total is zero). Running it again over
    /// unchanged expenses yields the same items and totals and leaves the
    /// ledger untouched.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceNotFound`, `InvoiceApproved`, `JobNotFound`, and the
    /// posting errors of the reversal and re-posting (`PeriodClosed`,
    /// `MissingAccountRole`, ...).
    pub async fn sync_invoice(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
    ) -> Result<InvoiceDetail, LedgerError> {
        let detail = retry_with_policy(&self.retry, LedgerError::is_retryable, |_| async move {
            let txn = begin_atomic(&self.db, &self.retry).await?;
            let model = find_invoice(&txn, tenant_id, invoice_id, true).await?;
            let invoice = to_invoice(&model);

            let job_id = InvoiceSync::ensure_syncable(&invoice)?;
            let job = load_job(&txn, tenant_id, job_id).await?;
            let expenses = load_expenses(&txn, job_id).await?;
            let plan = InvoiceSync::plan(&invoice, &job, &expenses, &self.service_charge)?;

            replace_lines(&txn, invoice_id, &plan.lines).await?;

            let mut transaction_id = invoice.transaction_id;
            if let LedgerFollowUp::Repost(previous) = plan.ledger {
                let reason = format!("Invoice {} recalculated", invoice.invoice_number);
                reverse_in(&txn, tenant_id, previous, invoice.date, &reason).await?;
                transaction_id = if plan.totals.grand_total > Decimal::ZERO {
                    Some(post_invoice(&txn, &invoice, plan.totals.grand_total).await?.id)
                } else {
                    None
                };
                debug!(
                    invoice_number = %invoice.invoice_number,
                    reversed = %previous,
                    "invoice re-posted"
                );
            }

            let mut active: invoices::ActiveModel = model.into();
            active.total_amount = Set(plan.totals.total_amount);
            active.tax_amount = Set(plan.totals.tax_amount);
            active.grand_total = Set(plan.totals.grand_total);
            active.transaction_id = Set(transaction_id.map(TransactionId::into_inner));
            active.updated_at = Set(Utc::now().into());
            let updated = active.update(&txn).await.map_err(classify)?;

            txn.commit().await.map_err(classify)?;
            Ok::<_, LedgerError>(InvoiceDetail {
                invoice: to_invoice(&updated),
                lines: plan.lines,
            })
        })
        .await?;

        info!(
            %tenant_id,
            invoice_number = %detail.invoice.invoice_number,
            lines = detail.lines.len(),
            grand_total = %detail.invoice.totals.grand_total,
            "invoice synced"
        );
        Ok(detail)
    }

    /// Posts Accounts Receivable / Revenue for the grand total and links the
    /// transaction to the invoice.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceAlreadyIssued` if a transaction is already linked,
    /// `InvoiceApproved` for approved invoices, `Validation` for a zero
    /// grand total, and the posting errors.
    pub async fn issue_invoice(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
    ) -> Result<Invoice, LedgerError> {
        let invoice = retry_with_policy(&self.retry, LedgerError::is_retryable, |_| async move {
            let txn = begin_atomic(&self.db, &self.retry).await?;
            let model = find_invoice(&txn, tenant_id, invoice_id, true).await?;
            let invoice = to_invoice(&model);
            if invoice.is_issued() {
                return Err(LedgerError::InvoiceAlreadyIssued(invoice_id.into_inner()));
            }
            if invoice.is_approved {
                return Err(LedgerError::InvoiceApproved(invoice_id.into_inner()));
            }

            let posted = post_invoice(&txn, &invoice, invoice.totals.grand_total).await?;
            let mut active: invoices::ActiveModel = model.into();
            active.transaction_id = Set(Some(posted.id.into_inner()));
            active.updated_at = Set(Utc::now().into());
            let updated = active.update(&txn).await.map_err(classify)?;

            txn.commit().await.map_err(classify)?;
            Ok::<_, LedgerError>(to_invoice(&updated))
        })
        .await?;

        info!(
            %tenant_id,
            invoice_number = %invoice.invoice_number,
            grand_total = %invoice.totals.grand_total,
            "invoice issued"
        );
        Ok(invoice)
    }

    /// Approves an invoice, issuing it first when it has a positive grand
    /// total and no ledger transaction yet. Approval is terminal.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceApproved` if the invoice is already approved, and the
    /// posting errors of the implicit issue.
    pub async fn approve_invoice(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
    ) -> Result<Invoice, LedgerError> {
        let invoice = retry_with_policy(&self.retry, LedgerError::is_retryable, |_| async move {
            let txn = begin_atomic(&self.db, &self.retry).await?;
            let model = find_invoice(&txn, tenant_id, invoice_id, true).await?;
            let invoice = to_invoice(&model);
            if invoice.is_approved {
                return Err(LedgerError::InvoiceApproved(invoice_id.into_inner()));
            }

            let mut active: invoices::ActiveModel = model.into();
            if !invoice.is_issued() && invoice.totals.grand_total > Decimal::ZERO {
                let posted = post_invoice(&txn, &invoice, invoice.totals.grand_total).await?;
                active.transaction_id = Set(Some(posted.id.into_inner()));
            }
            active.is_approved = Set(true);
            active.updated_at = Set(Utc::now().into());
            let updated = active.update(&txn).await.map_err(classify)?;

            txn.commit().await.map_err(classify)?;
            Ok::<_, LedgerError>(to_invoice(&updated))
        })
        .await?;

        info!(
            %tenant_id,
            invoice_number = %invoice.invoice_number,
            "invoice approved"
        );
        Ok(invoice)
    }
}
