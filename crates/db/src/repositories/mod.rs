//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Mutating operations run as one database transaction each; the helpers
//! shared between repositories take any `ConnectionTrait` so they can join
//! an enclosing unit.

pub mod account;
pub mod account_role;
pub mod error;
pub mod invoice;
pub mod job;
pub mod period;
pub mod report;
pub mod sequence;
pub mod templates;
pub mod transaction;

pub use account::AccountRepository;
pub use account_role::AccountRoleRepository;
pub use invoice::{InvoiceDetail, InvoiceRepository};
pub use job::{CreateExpenseInput, JobRepository};
pub use period::PeriodRepository;
pub use report::ReportRepository;
pub use sequence::SequenceRepository;
pub use templates::TemplateRepository;
pub use transaction::TransactionRepository;
