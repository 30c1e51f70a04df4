//! Financial report generation.
//!
//! This module provides pure business logic for generating financial reports:
//! - Account Ledger with running balances
//! - Trial Balance
//! - Profit and Loss
//! - Balance Sheet

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
