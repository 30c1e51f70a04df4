//! Job and job expense repository.
//!
//! Jobs are the billing source for invoices: their expenses become invoice
//! lines, and their container count drives the service charge.

use chrono::Utc;
use ledgerline_core::invoice::{ExpenseRecord, InvoiceCategory, InvoiceLine, JobSummary};
use ledgerline_core::ledger::LedgerError;
use ledgerline_shared::types::{ExpenseId, JobId, MONEY_SCALE, TenantId, fits_money_column};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use super::error::classify;
use crate::entities::{job_expenses, jobs, sea_orm_active_enums};

/// Input for recording a job expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// Line description.
    pub description: String,
    /// Category to bill the expense under, if billable.
    pub invoice_category: Option<InvoiceCategory>,
    /// Quantity.
    pub quantity: Decimal,
    /// Rate per unit.
    pub rate: Decimal,
    /// Tax percentage.
    pub tax_percent: Decimal,
}

fn to_summary(model: &jobs::Model) -> Result<JobSummary, LedgerError> {
    let container_count = u32::try_from(model.container_count).map_err(|_| {
        LedgerError::Internal(format!(
            "job {} has a negative container count",
            model.job_number
        ))
    })?;
    Ok(JobSummary {
        id: JobId::from_uuid(model.id),
        container_count,
    })
}

fn to_expense(model: job_expenses::Model) -> ExpenseRecord {
    ExpenseRecord {
        id: ExpenseId::from_uuid(model.id),
        description: model.description,
        invoice_category: model.invoice_category.map(Into::into),
        quantity: model.quantity,
        rate: model.rate,
        tax_percent: model.tax_percent,
    }
}

/// Loads a job of `tenant_id`.
pub(crate) async fn load_job<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    job_id: JobId,
) -> Result<JobSummary, LedgerError> {
    let model = jobs::Entity::find_by_id(job_id.into_inner())
        .filter(jobs::Column::TenantId.eq(tenant_id.into_inner()))
        .one(conn)
        .await
        .map_err(classify)?
        .ok_or(LedgerError::JobNotFound(job_id.into_inner()))?;
    to_summary(&model)
}

/// Loads the expenses of a job in creation order.
pub(crate) async fn load_expenses<C: ConnectionTrait>(
    conn: &C,
    job_id: JobId,
) -> Result<Vec<ExpenseRecord>, LedgerError> {
    Ok(job_expenses::Entity::find()
        .filter(job_expenses::Column::JobId.eq(job_id.into_inner()))
        .order_by_asc(job_expenses::Column::Id)
        .all(conn)
        .await
        .map_err(classify)?
        .into_iter()
        .map(to_expense)
        .collect())
}

/// Repository for jobs and their expenses.
#[derive(Debug, Clone)]
pub struct JobRepository {
    db: DatabaseConnection,
}

impl JobRepository {
    /// Creates a new job repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a job.
    pub async fn create_job(
        &self,
        tenant_id: TenantId,
        job_number: &str,
        container_count: u32,
    ) -> Result<JobSummary, LedgerError> {
        if job_number.trim().is_empty() {
            return Err(LedgerError::Validation("job number is required".into()));
        }
        let container_count = i32::try_from(container_count)
            .map_err(|_| LedgerError::Validation("container count is too large".into()))?;

        let model = jobs::ActiveModel {
            id: Set(JobId::new().into_inner()),
            tenant_id: Set(tenant_id.into_inner()),
            job_number: Set(job_number.to_string()),
            container_count: Set(container_count),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(classify)?;

        to_summary(&model)
    }

    /// Fetches a job.
    pub async fn get_job(&self, tenant_id: TenantId, job_id: JobId) -> Result<JobSummary, LedgerError> {
        load_job(&self.db, tenant_id, job_id).await
    }

    /// Records an expense against a job.
    ///
    /// # Errors
    ///
    /// Returns `JobNotFound` for a job outside the tenant and `Validation`
    /// for a blank description, negative figures, or figures that would not
    /// fit a stored invoice line.
    pub async fn add_expense(
        &self,
        tenant_id: TenantId,
        job_id: JobId,
        input: CreateExpenseInput,
    ) -> Result<ExpenseRecord, LedgerError> {
        if input.description.trim().is_empty() {
            return Err(LedgerError::Validation("expense description is required".into()));
        }
        if input.quantity.is_sign_negative()
            || input.rate.is_sign_negative()
            || input.tax_percent.is_sign_negative()
        {
            return Err(LedgerError::Validation(
                "expense quantity, rate and tax must not be negative".into(),
            ));
        }
        if !fits_money_column(input.quantity) || !fits_money_column(input.rate) {
            return Err(LedgerError::Validation(
                "expense quantity and rate must fit the money column".into(),
            ));
        }
        if input.tax_percent > Decimal::ONE_HUNDRED
            || input.tax_percent.normalize().scale() > MONEY_SCALE
        {
            return Err(LedgerError::Validation(
                "expense tax must be a percentage with at most four decimal places".into(),
            ));
        }
        // The line it will bill must be storable too.
        InvoiceLine::compute(
            None,
            input.description.as_str(),
            input.quantity,
            input.rate,
            input.tax_percent,
        )?;

        load_job(&self.db, tenant_id, job_id).await?;

        let model = job_expenses::ActiveModel {
            id: Set(ExpenseId::new().into_inner()),
            job_id: Set(job_id.into_inner()),
            description: Set(input.description),
            invoice_category: Set(input
                .invoice_category
                .map(sea_orm_active_enums::InvoiceCategory::from)),
            quantity: Set(input.quantity),
            rate: Set(input.rate),
            tax_percent: Set(input.tax_percent),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(classify)?;

        Ok(to_expense(model))
    }

    /// Lists the expenses of a job in creation order.
    pub async fn list_expenses(
        &self,
        tenant_id: TenantId,
        job_id: JobId,
    ) -> Result<Vec<ExpenseRecord>, LedgerError> {
        load_job(&self.db, tenant_id, job_id).await?;
        load_expenses(&self.db, job_id).await
    }
}
