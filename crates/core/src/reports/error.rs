//! Report error types.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during report generation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// Account not found in the tenant.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Unknown statement type.
    #[error("Unknown statement type '{0}'; expected TRIAL_BALANCE, PL or BALANCE_SHEET")]
    UnknownStatementType(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}
