//! Invoices billed from job expenses.
//!
//! Lifecycle: `DRAFT --sync*--> DRAFT --approve--> APPROVED`. Approval is
//! terminal; the lines and the linked ledger transaction are frozen from then on.

pub mod sync;
pub mod types;

pub use sync::{InvoiceSync, LedgerFollowUp, SyncPlan};
pub use types::{
    ExpenseRecord, Invoice, InvoiceCategory, InvoiceLine, InvoiceTotals, JobSummary, NewInvoice,
    ServiceChargePolicy,
};
