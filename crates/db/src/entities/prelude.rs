//! Entity re-exports.

pub use super::account_entries::Entity as AccountEntries;
pub use super::account_roles::Entity as AccountRoles;
pub use super::accounts::Entity as Accounts;
pub use super::financial_periods::Entity as FinancialPeriods;
pub use super::invoice_items::Entity as InvoiceItems;
pub use super::invoices::Entity as Invoices;
pub use super::job_expenses::Entity as JobExpenses;
pub use super::jobs::Entity as Jobs;
pub use super::transactions::Entity as Transactions;
