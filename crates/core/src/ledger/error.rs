//! Ledger error types.
//!
//! Every failure the posting engine, chart of accounts, period guard and
//! invoice recalculation can surface. [`ErrorKind`] groups the variants into
//! the categories callers branch on.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::templates::AccountRole;

/// Category of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input, detected before any mutation.
    Validation,
    /// Debits and credits do not balance.
    ImbalancedEntries,
    /// Unique code or reference collision.
    DuplicateReference,
    /// Store-level write conflict; safe to retry.
    TransientConflict,
    /// Missing account, transaction, invoice, job or system account role.
    NotFound,
    /// Role or tenant scope mismatch.
    Permission,
    /// Posting date falls inside a closed period.
    PeriodClosed,
    /// Operation conflicts with existing state.
    Conflict,
    /// Exhausted retries or unclassified failure.
    System,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Generic input validation failure.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Transaction must have at least 2 entries.
    #[error("Transaction must have at least 2 entries")]
    InsufficientEntries,

    /// An entry carries a negative debit or credit.
    #[error("Entry {line} has a negative amount")]
    NegativeAmount {
        /// Zero-based position of the offending entry.
        line: usize,
    },

    /// An entry amount does not fit a money column (at most 4 decimal
    /// places, magnitude below 10^16).
    #[error("Entry {line} has an amount outside the storable range")]
    AmountOutOfRange {
        /// Zero-based position of the offending entry.
        line: usize,
    },

    /// Re-parenting would make an account its own ancestor.
    #[error("Account {0} cannot be placed under its own descendant")]
    CyclicParent(Uuid),

    /// Transaction is not balanced (debits != credits).
    #[error("Transaction is not balanced. Debit: {debit}, Credit: {credit}")]
    ImbalancedEntries {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    // ========== Uniqueness Errors ==========
    /// Transaction or invoice reference already used within the tenant.
    #[error("Reference '{0}' already exists")]
    DuplicateReference(String),

    /// Account code already used within the tenant.
    #[error("Account code '{0}' already exists")]
    DuplicateAccountCode(String),

    // ========== Lookup Errors ==========
    /// Account not found in the tenant.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Parent account not found in the tenant.
    #[error("Parent account not found: {0}")]
    ParentNotFound(Uuid),

    /// Transaction not found in the tenant.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    /// Invoice not found in the tenant.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(Uuid),

    /// Invoice is not linked to a job, or the job is missing.
    #[error("Job not found for invoice {0}")]
    JobNotFound(Uuid),

    /// A system account role is not mapped for the tenant.
    #[error("No account mapped for role {0}")]
    MissingAccountRole(AccountRole),

    // ========== Permission Errors ==========
    /// Caller lacks the role or tenant scope for the operation.
    #[error("Permission denied: {0}")]
    Permission(String),

    // ========== Period Errors ==========
    /// Financial period is closed, no posting allowed.
    #[error("Financial period {year}-{month:02} is closed")]
    PeriodClosed {
        /// Calendar month (1-12).
        month: u32,
        /// Calendar year.
        year: i32,
    },

    // ========== State Conflicts ==========
    /// Account still has child accounts.
    #[error("Cannot delete account {0}: it has child accounts")]
    AccountHasChildren(Uuid),

    /// Account is referenced by ledger entries.
    #[error("Cannot delete account {account_id}: it has {count} ledger entries")]
    AccountHasEntries {
        /// The account ID.
        account_id: Uuid,
        /// Number of referencing entries.
        count: u64,
    },

    /// Account is mapped to a system role.
    #[error("Cannot delete account {account_id}: it is mapped to role {role}")]
    AccountMappedToRole {
        /// The account ID.
        account_id: Uuid,
        /// The role it serves.
        role: AccountRole,
    },

    /// Invoice is approved and therefore immutable.
    #[error("Cannot modify approved invoice {0}")]
    InvoiceApproved(Uuid),

    /// Invoice already has a ledger transaction.
    #[error("Invoice {0} has already been issued")]
    InvoiceAlreadyIssued(Uuid),

    /// Transaction already has a reversal.
    #[error("Transaction {0} has already been reversed")]
    AlreadyReversed(Uuid),

    // ========== Concurrency Errors ==========
    /// Serialization failure, deadlock or lock timeout reported by the store.
    #[error("Transient write conflict: {0}")]
    TransientConflict(String),

    /// All attempts hit transient conflicts.
    #[error("Posting failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Message of the last conflict.
        last: String,
    },

    /// An attempt exceeded its time bound; the outcome must be re-queried.
    #[error("Operation timed out after {0} ms; outcome unknown")]
    Timeout(u128),

    // ========== System Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_)
            | Self::InsufficientEntries
            | Self::NegativeAmount { .. }
            | Self::AmountOutOfRange { .. }
            | Self::CyclicParent(_) => ErrorKind::Validation,
            Self::ImbalancedEntries { .. } => ErrorKind::ImbalancedEntries,
            Self::DuplicateReference(_) | Self::DuplicateAccountCode(_) => {
                ErrorKind::DuplicateReference
            }
            Self::AccountNotFound(_)
            | Self::ParentNotFound(_)
            | Self::TransactionNotFound(_)
            | Self::InvoiceNotFound(_)
            | Self::JobNotFound(_)
            | Self::MissingAccountRole(_) => ErrorKind::NotFound,
            Self::Permission(_) => ErrorKind::Permission,
            Self::PeriodClosed { .. } => ErrorKind::PeriodClosed,
            Self::AccountHasChildren(_)
            | Self::AccountHasEntries { .. }
            | Self::AccountMappedToRole { .. }
            | Self::InvoiceApproved(_)
            | Self::InvoiceAlreadyIssued(_)
            | Self::AlreadyReversed(_) => ErrorKind::Conflict,
            Self::TransientConflict(_) => ErrorKind::TransientConflict,
            Self::RetriesExhausted { .. }
            | Self::Timeout(_)
            | Self::Database(_)
            | Self::Internal(_) => ErrorKind::System,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InsufficientEntries => "INSUFFICIENT_ENTRIES",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::AmountOutOfRange { .. } => "AMOUNT_OUT_OF_RANGE",
            Self::CyclicParent(_) => "CYCLIC_PARENT",
            Self::ImbalancedEntries { .. } => "IMBALANCED_ENTRIES",
            Self::DuplicateReference(_) => "DUPLICATE_REFERENCE",
            Self::DuplicateAccountCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::InvoiceNotFound(_) => "INVOICE_NOT_FOUND",
            Self::JobNotFound(_) => "JOB_NOT_FOUND",
            Self::MissingAccountRole(_) => "MISSING_ACCOUNT_ROLE",
            Self::Permission(_) => "PERMISSION_DENIED",
            Self::PeriodClosed { .. } => "PERIOD_CLOSED",
            Self::AccountHasChildren(_) => "ACCOUNT_HAS_CHILDREN",
            Self::AccountHasEntries { .. } => "ACCOUNT_HAS_ENTRIES",
            Self::AccountMappedToRole { .. } => "ACCOUNT_MAPPED_TO_ROLE",
            Self::InvoiceApproved(_) => "INVOICE_APPROVED",
            Self::InvoiceAlreadyIssued(_) => "INVOICE_ALREADY_ISSUED",
            Self::AlreadyReversed(_) => "ALREADY_REVERSED",
            Self::TransientConflict(_) => "TRANSIENT_CONFLICT",
            Self::RetriesExhausted { .. } => "RETRIES_EXHAUSTED",
            Self::Timeout(_) => "TIMEOUT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::ImbalancedEntries => 400,
            ErrorKind::Permission => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::DuplicateReference | ErrorKind::Conflict | ErrorKind::TransientConflict => {
                409
            }
            ErrorKind::PeriodClosed => 422,
            ErrorKind::System => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::TransientConflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::InsufficientEntries.error_code(), "INSUFFICIENT_ENTRIES");
        assert_eq!(
            LedgerError::ImbalancedEntries {
                debit: Decimal::new(100, 2),
                credit: Decimal::new(50, 2),
            }
            .error_code(),
            "IMBALANCED_ENTRIES"
        );
        assert_eq!(
            LedgerError::PeriodClosed { month: 1, year: 2026 }.error_code(),
            "PERIOD_CLOSED"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            LedgerError::NegativeAmount { line: 0 }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            LedgerError::DuplicateAccountCode("1000".into()).kind(),
            ErrorKind::DuplicateReference
        );
        assert_eq!(
            LedgerError::MissingAccountRole(AccountRole::AccountsReceivable).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            LedgerError::AccountHasEntries {
                account_id: Uuid::nil(),
                count: 1
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            LedgerError::AccountMappedToRole {
                account_id: Uuid::nil(),
                role: AccountRole::Inventory,
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            LedgerError::AmountOutOfRange { line: 2 }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            LedgerError::RetriesExhausted {
                attempts: 3,
                last: "x".into()
            }
            .kind(),
            ErrorKind::System
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::InsufficientEntries.http_status_code(), 400);
        assert_eq!(LedgerError::Permission("x".into()).http_status_code(), 403);
        assert_eq!(
            LedgerError::AccountNotFound(Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(
            LedgerError::DuplicateReference("JV-2026-0001".into()).http_status_code(),
            409
        );
        assert_eq!(
            LedgerError::Database("test".to_string()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(LedgerError::TransientConflict("40001".into()).is_retryable());
        assert!(!LedgerError::DuplicateReference("JV-2026-0001".into()).is_retryable());
        assert!(!LedgerError::Timeout(5000).is_retryable());
        assert!(!LedgerError::InsufficientEntries.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::ImbalancedEntries {
            debit: Decimal::new(100_000, 2),
            credit: Decimal::new(90_000, 2),
        };
        assert_eq!(
            err.to_string(),
            "Transaction is not balanced. Debit: 1000.00, Credit: 900.00"
        );

        let err = LedgerError::PeriodClosed { month: 3, year: 2026 };
        assert_eq!(err.to_string(), "Financial period 2026-03 is closed");
    }
}
