//! Invoice recalculation from job expenses.
//!
//! The rebuild is a pure function of the job's expenses, the invoice category
//! and the service charge policy, so running it twice over unchanged inputs
//! yields identical lines and totals.

use rust_decimal::Decimal;

use ledgerline_shared::types::{JobId, TransactionId};

use super::types::{
    ExpenseRecord, Invoice, InvoiceCategory, InvoiceLine, InvoiceTotals, JobSummary,
    ServiceChargePolicy,
};
use crate::ledger::LedgerError;

/// Description used for the computed service charge line.
pub const SERVICE_CHARGE_DESCRIPTION: &str = "Service charge";

/// What the ledger needs after a recalculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerFollowUp {
    /// Not issued yet, or the grand total is unchanged.
    None,
    /// Reverse this transaction and post the new grand total.
    Repost(TransactionId),
}

/// Result of recalculating an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    /// Replacement line set.
    pub lines: Vec<InvoiceLine>,
    /// Totals of the replacement lines.
    pub totals: InvoiceTotals,
    /// Required ledger action.
    pub ledger: LedgerFollowUp,
}

/// Stateless invoice recalculation.
pub struct InvoiceSync;

impl InvoiceSync {
    /// Checks that an invoice may be recalculated and returns its job.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceApproved` for approved invoices and `JobNotFound` when
    /// the invoice has no job.
    pub fn ensure_syncable(invoice: &Invoice) -> Result<JobId, LedgerError> {
        if invoice.is_approved {
            return Err(LedgerError::InvoiceApproved(invoice.id.into_inner()));
        }
        invoice
            .job_id
            .ok_or(LedgerError::JobNotFound(invoice.id.into_inner()))
    }

    /// Builds the line set for `category` from the job's expenses.
    ///
    /// Expenses tagged with another category, or untagged, are skipped. Lines
    /// follow expense creation order. Service invoices get a trailing
    /// `containers × rate` line when both are positive.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if a line does not fit a money column.
    pub fn rebuild_lines(
        category: InvoiceCategory,
        job: &JobSummary,
        expenses: &[ExpenseRecord],
        policy: &ServiceChargePolicy,
    ) -> Result<Vec<InvoiceLine>, LedgerError> {
        let mut billable: Vec<&ExpenseRecord> = expenses
            .iter()
            .filter(|e| e.invoice_category == Some(category))
            .collect();
        billable.sort_by_key(|e| e.id);

        let mut lines: Vec<InvoiceLine> = billable
            .into_iter()
            .map(|e| {
                InvoiceLine::compute(
                    Some(e.id),
                    e.description.clone(),
                    e.quantity,
                    e.rate,
                    e.tax_percent,
                )
            })
            .collect::<Result<_, _>>()?;

        if category.requires_service_charge()
            && job.container_count > 0
            && policy.rate > Decimal::ZERO
        {
            lines.push(InvoiceLine::compute(
                None,
                SERVICE_CHARGE_DESCRIPTION,
                Decimal::from(job.container_count),
                policy.rate,
                policy.tax_percent,
            )?);
        }

        Ok(lines)
    }

    /// Recalculates an invoice and decides the ledger follow-up.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`InvoiceSync::ensure_syncable`], or
    /// `Validation` if `job` is not the invoice's job or the rebuilt lines
    /// do not fit a money column.
    pub fn plan(
        invoice: &Invoice,
        job: &JobSummary,
        expenses: &[ExpenseRecord],
        policy: &ServiceChargePolicy,
    ) -> Result<SyncPlan, LedgerError> {
        let job_id = Self::ensure_syncable(invoice)?;
        if job_id != job.id {
            return Err(LedgerError::Validation(format!(
                "job {} does not belong to invoice {}",
                job.id, invoice.invoice_number
            )));
        }

        let lines = Self::rebuild_lines(invoice.category, job, expenses, policy)?;
        let totals = InvoiceTotals::from_lines(&lines)?;
        let ledger = match invoice.transaction_id {
            Some(transaction_id) if totals.grand_total != invoice.totals.grand_total => {
                LedgerFollowUp::Repost(transaction_id)
            }
            _ => LedgerFollowUp::None,
        };

        Ok(SyncPlan {
            lines,
            totals,
            ledger,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ledgerline_shared::types::{ExpenseId, InvoiceId, TenantId};
    use rust_decimal_macros::dec;

    fn expense(category: Option<InvoiceCategory>, qty: Decimal, rate: Decimal) -> ExpenseRecord {
        ExpenseRecord {
            id: ExpenseId::new(),
            description: "Expense".into(),
            invoice_category: category,
            quantity: qty,
            rate,
            tax_percent: dec!(10),
        }
    }

    fn invoice(category: InvoiceCategory, job_id: JobId) -> Invoice {
        Invoice {
            id: InvoiceId::new(),
            tenant_id: TenantId::new(),
            invoice_number: "SIN-2026-0001".into(),
            category,
            job_id: Some(job_id),
            customer_name: "Globex".into(),
            date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            totals: InvoiceTotals::default(),
            is_approved: false,
            transaction_id: None,
        }
    }

    fn policy() -> ServiceChargePolicy {
        ServiceChargePolicy {
            rate: dec!(50),
            tax_percent: dec!(18),
        }
    }

    #[test]
    fn test_rebuild_filters_by_category() {
        let job = JobSummary {
            id: JobId::new(),
            container_count: 0,
        };
        let expenses = vec![
            expense(Some(InvoiceCategory::Service), dec!(1), dec!(100)),
            expense(Some(InvoiceCategory::Freight), dec!(1), dec!(999)),
            expense(None, dec!(1), dec!(5)),
            expense(Some(InvoiceCategory::Service), dec!(2), dec!(25)),
        ];

        let lines =
            InvoiceSync::rebuild_lines(InvoiceCategory::Service, &job, &expenses, &policy())
                .unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].expense_id, Some(expenses[0].id));
        assert_eq!(lines[1].expense_id, Some(expenses[3].id));
    }

    #[test]
    fn test_service_charge_line() {
        let job = JobSummary {
            id: JobId::new(),
            container_count: 4,
        };
        let lines =
            InvoiceSync::rebuild_lines(InvoiceCategory::Service, &job, &[], &policy()).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].description, SERVICE_CHARGE_DESCRIPTION);
        assert_eq!(lines[0].amount, dec!(200));
        assert_eq!(lines[0].tax_amount, dec!(36));

        let freight =
            InvoiceSync::rebuild_lines(InvoiceCategory::Freight, &job, &[], &policy()).unwrap();
        assert!(freight.is_empty());
    }

    #[test]
    fn test_plan_is_idempotent() {
        let job = JobSummary {
            id: JobId::new(),
            container_count: 2,
        };
        let expenses = vec![
            expense(Some(InvoiceCategory::Service), dec!(3), dec!(12.5)),
            expense(Some(InvoiceCategory::Service), dec!(1), dec!(80)),
        ];
        let mut inv = invoice(InvoiceCategory::Service, job.id);

        let first = InvoiceSync::plan(&inv, &job, &expenses, &policy()).unwrap();
        inv.totals = first.totals;
        let second = InvoiceSync::plan(&inv, &job, &expenses, &policy()).unwrap();

        assert_eq!(first.lines, second.lines);
        assert_eq!(first.totals, second.totals);
        assert_eq!(second.ledger, LedgerFollowUp::None);
    }

    #[test]
    fn test_plan_requests_repost_when_issued_total_changes() {
        let job = JobSummary {
            id: JobId::new(),
            container_count: 0,
        };
        let mut inv = invoice(InvoiceCategory::Freight, job.id);
        let tx = TransactionId::new();
        inv.transaction_id = Some(tx);
        inv.totals = InvoiceTotals {
            total_amount: dec!(100),
            tax_amount: dec!(10),
            grand_total: dec!(110),
        };

        let unchanged = vec![expense(Some(InvoiceCategory::Freight), dec!(1), dec!(100))];
        let plan = InvoiceSync::plan(&inv, &job, &unchanged, &policy()).unwrap();
        assert_eq!(plan.ledger, LedgerFollowUp::None);

        let changed = vec![expense(Some(InvoiceCategory::Freight), dec!(2), dec!(100))];
        let plan = InvoiceSync::plan(&inv, &job, &changed, &policy()).unwrap();
        assert_eq!(plan.ledger, LedgerFollowUp::Repost(tx));
        assert_eq!(plan.totals.grand_total, dec!(220));
    }

    #[test]
    fn test_plan_rejects_unstorable_totals() {
        let job = JobSummary {
            id: JobId::new(),
            container_count: 0,
        };
        let inv = invoice(InvoiceCategory::Freight, job.id);
        let expenses = vec![
            expense(Some(InvoiceCategory::Freight), dec!(1), dec!(6000000000000000)),
            expense(Some(InvoiceCategory::Freight), dec!(1), dec!(6000000000000000)),
        ];
        assert!(matches!(
            InvoiceSync::plan(&inv, &job, &expenses, &policy()),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_approved_invoice_rejected() {
        let job = JobSummary {
            id: JobId::new(),
            container_count: 0,
        };
        let mut inv = invoice(InvoiceCategory::Service, job.id);
        inv.is_approved = true;
        assert!(matches!(
            InvoiceSync::plan(&inv, &job, &[], &policy()),
            Err(LedgerError::InvoiceApproved(_))
        ));
    }

    #[test]
    fn test_invoice_without_job_rejected() {
        let mut inv = invoice(InvoiceCategory::Service, JobId::new());
        inv.job_id = None;
        assert!(matches!(
            InvoiceSync::ensure_syncable(&inv),
            Err(LedgerError::JobNotFound(_))
        ));
    }
}
