//! Invoice domain types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerline_shared::config::InvoicingConfig;
use ledgerline_shared::types::{
    ExpenseId, InvoiceId, JobId, TenantId, TransactionId, checked_extend, checked_percent,
    checked_sum, fits_money_column,
};

use crate::ledger::LedgerError;
use crate::sequence::ReferencePrefix;

/// Invoice category. Drives the number prefix and which expenses are billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceCategory {
    /// Handling and service charges.
    Service,
    /// Freight charges.
    Freight,
}

impl InvoiceCategory {
    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "SERVICE",
            Self::Freight => "FREIGHT",
        }
    }

    /// Prefix for invoice numbers of this category.
    #[must_use]
    pub const fn prefix(&self) -> ReferencePrefix {
        match self {
            Self::Service => ReferencePrefix::Sin,
            Self::Freight => ReferencePrefix::Fin,
        }
    }

    /// Returns true if invoices of this category carry a per-container
    /// service charge line.
    #[must_use]
    pub const fn requires_service_charge(&self) -> bool {
        matches!(self, Self::Service)
    }
}

impl fmt::Display for InvoiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceCategory {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SERVICE" => Ok(Self::Service),
            "FREIGHT" => Ok(Self::Freight),
            other => Err(LedgerError::Validation(format!(
                "unknown invoice category '{other}'"
            ))),
        }
    }
}

/// A billable expense recorded against a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRecord {
    /// Expense ID.
    pub id: ExpenseId,
    /// Line description.
    pub description: String,
    /// Category the expense is billed under; `None` is never billed.
    pub invoice_category: Option<InvoiceCategory>,
    /// Quantity.
    pub quantity: Decimal,
    /// Rate per unit.
    pub rate: Decimal,
    /// Tax percentage.
    pub tax_percent: Decimal,
}

/// The job facts the recalculation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobSummary {
    /// Job ID.
    pub id: JobId,
    /// Containers handled on the job.
    pub container_count: u32,
}

/// A computed invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceLine {
    /// Source expense, or `None` for the service charge line.
    pub expense_id: Option<ExpenseId>,
    /// Line description.
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Rate per unit.
    pub rate: Decimal,
    /// `quantity × rate`, rounded to cents.
    pub amount: Decimal,
    /// Tax percentage.
    pub tax_percent: Decimal,
    /// `amount × tax_percent / 100`, rounded to cents.
    pub tax_amount: Decimal,
    /// `amount + tax_amount`.
    pub total: Decimal,
}

impl InvoiceLine {
    /// Computes a line from quantity, rate and tax percentage.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the amount, tax or total overflows or does
    /// not fit a money column.
    pub fn compute(
        expense_id: Option<ExpenseId>,
        description: impl Into<String>,
        quantity: Decimal,
        rate: Decimal,
        tax_percent: Decimal,
    ) -> Result<Self, LedgerError> {
        let description = description.into();
        let out_of_range =
            || LedgerError::Validation(format!("invoice line '{description}' is too large"));

        let amount = checked_extend(quantity, rate).ok_or_else(out_of_range)?;
        let tax_amount = checked_percent(amount, tax_percent).ok_or_else(out_of_range)?;
        let total = amount.checked_add(tax_amount).ok_or_else(out_of_range)?;
        if !fits_money_column(total) {
            return Err(out_of_range());
        }

        Ok(Self {
            expense_id,
            description,
            quantity,
            rate,
            amount,
            tax_percent,
            tax_amount,
            total,
        })
    }
}

/// Invoice money totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InvoiceTotals {
    /// Sum of line amounts before tax.
    pub total_amount: Decimal,
    /// Sum of line taxes.
    pub tax_amount: Decimal,
    /// `total_amount + tax_amount`.
    pub grand_total: Decimal,
}

impl InvoiceTotals {
    /// Sums a set of lines.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if a total overflows or does not fit a money
    /// column.
    pub fn from_lines(lines: &[InvoiceLine]) -> Result<Self, LedgerError> {
        let overflow = || LedgerError::Validation("invoice totals are too large".into());
        let total_amount = checked_sum(lines.iter().map(|l| l.amount)).ok_or_else(overflow)?;
        let tax_amount = checked_sum(lines.iter().map(|l| l.tax_amount)).ok_or_else(overflow)?;
        let grand_total = total_amount.checked_add(tax_amount).ok_or_else(overflow)?;
        if !fits_money_column(grand_total) {
            return Err(overflow());
        }
        Ok(Self {
            total_amount,
            tax_amount,
            grand_total,
        })
    }
}

/// Per-container service charge applied to service invoices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceChargePolicy {
    /// Charge per container.
    pub rate: Decimal,
    /// Tax percentage on the charge.
    pub tax_percent: Decimal,
}

impl From<&InvoicingConfig> for ServiceChargePolicy {
    fn from(config: &InvoicingConfig) -> Self {
        Self {
            rate: config.service_charge_rate,
            tax_percent: config.service_charge_tax_percent,
        }
    }
}

/// An invoice header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invoice {
    /// Invoice ID.
    pub id: InvoiceId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// `SIN-YYYY-NNNN` or `FIN-YYYY-NNNN`.
    pub invoice_number: String,
    /// Category.
    pub category: InvoiceCategory,
    /// Job the invoice bills.
    pub job_id: Option<JobId>,
    /// Customer display name.
    pub customer_name: String,
    /// Invoice date.
    pub date: NaiveDate,
    /// Money totals.
    pub totals: InvoiceTotals,
    /// Terminal approval flag.
    pub is_approved: bool,
    /// Linked ledger transaction, once issued.
    pub transaction_id: Option<TransactionId>,
}

impl Invoice {
    /// Returns true once a ledger transaction has been posted for it.
    #[must_use]
    pub const fn is_issued(&self) -> bool {
        self.transaction_id.is_some()
    }
}

/// Input for creating an invoice.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Category.
    pub category: InvoiceCategory,
    /// Job to bill.
    pub job_id: Option<JobId>,
    /// Customer display name.
    pub customer_name: String,
    /// Invoice date; selects the number year.
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_category_prefix() {
        assert_eq!(InvoiceCategory::Service.prefix(), ReferencePrefix::Sin);
        assert_eq!(InvoiceCategory::Freight.prefix(), ReferencePrefix::Fin);
        assert!(InvoiceCategory::Service.requires_service_charge());
        assert!(!InvoiceCategory::Freight.requires_service_charge());
    }

    #[test]
    fn test_line_compute_rounds() {
        let line =
            InvoiceLine::compute(None, "Handling", dec!(3), dec!(33.335), dec!(18)).unwrap();
        assert_eq!(line.amount, dec!(100.01));
        assert_eq!(line.tax_amount, dec!(18.00));
        assert_eq!(line.total, dec!(118.01));
    }

    #[test]
    fn test_totals_from_lines() {
        let lines = vec![
            InvoiceLine::compute(None, "A", dec!(1), dec!(100), dec!(10)).unwrap(),
            InvoiceLine::compute(None, "B", dec!(2), dec!(50), Decimal::ZERO).unwrap(),
        ];
        let totals = InvoiceTotals::from_lines(&lines).unwrap();
        assert_eq!(totals.total_amount, dec!(200));
        assert_eq!(totals.tax_amount, dec!(10));
        assert_eq!(totals.grand_total, dec!(210));
    }

    #[test]
    fn test_line_overflow_is_a_validation_error() {
        let quadrillion = Decimal::from(1_000_000_000_000_000_i64);
        assert!(matches!(
            InvoiceLine::compute(None, "Crane hire", quadrillion, quadrillion, Decimal::ZERO),
            Err(LedgerError::Validation(_))
        ));
        // Representable, but too large for a stored line.
        assert!(matches!(
            InvoiceLine::compute(None, "Crane hire", dec!(10), quadrillion, Decimal::ZERO),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_totals_reject_unstorable_grand_total() {
        let line = InvoiceLine::compute(
            None,
            "Bulk",
            dec!(1),
            dec!(9000000000000000),
            Decimal::ZERO,
        )
        .unwrap();
        assert!(matches!(
            InvoiceTotals::from_lines(&[line.clone(), line]),
            Err(LedgerError::Validation(_))
        ));
    }
}
