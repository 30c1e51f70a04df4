//! `SeaORM` entity definitions.

pub mod prelude;

pub mod account_entries;
pub mod account_roles;
pub mod accounts;
pub mod financial_periods;
pub mod invoice_items;
pub mod invoices;
pub mod job_expenses;
pub mod jobs;
pub mod sea_orm_active_enums;
pub mod transactions;
