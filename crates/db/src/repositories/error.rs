//! Mapping of database failures onto the ledger error taxonomy.

use ledgerline_core::ledger::LedgerError;
use ledgerline_core::reports::ReportError;
use sea_orm::{DbErr, RuntimeErr};

/// Postgres `serialization_failure`.
pub const SERIALIZATION_FAILURE: &str = "40001";
/// Postgres `deadlock_detected`.
pub const DEADLOCK_DETECTED: &str = "40P01";
/// Postgres `lock_not_available`, raised when `lock_timeout` expires.
pub const LOCK_NOT_AVAILABLE: &str = "55P03";
/// Postgres `unique_violation`.
pub const UNIQUE_VIOLATION: &str = "23505";
/// Postgres `foreign_key_violation`.
pub const FOREIGN_KEY_VIOLATION: &str = "23503";
/// Postgres `check_violation`.
pub const CHECK_VIOLATION: &str = "23514";

fn database_error(err: &DbErr) -> Option<&(dyn sqlx::error::DatabaseError + 'static)> {
    let runtime = match err {
        DbErr::Query(runtime) | DbErr::Exec(runtime) | DbErr::Conn(runtime) => runtime,
        _ => return None,
    };
    match runtime {
        RuntimeErr::SqlxError(sqlx::Error::Database(db)) => Some(db.as_ref()),
        _ => None,
    }
}

/// Converts a database error into a [`LedgerError`].
///
/// Write conflicts become `TransientConflict`, unique violations become
/// `DuplicateReference` (naming the violated constraint) and integrity
/// violations become `Validation`. Anything else is a `Database` error.
pub fn classify(err: DbErr) -> LedgerError {
    match database_error(&err) {
        Some(db) => from_sqlstate(
            db.code().as_deref(),
            db.message(),
            db.constraint(),
            || err.to_string(),
        ),
        None => LedgerError::Database(err.to_string()),
    }
}

fn from_sqlstate(
    code: Option<&str>,
    message: &str,
    constraint: Option<&str>,
    fallback: impl FnOnce() -> String,
) -> LedgerError {
    match code {
        Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED | LOCK_NOT_AVAILABLE) => {
            LedgerError::TransientConflict(message.to_string())
        }
        Some(UNIQUE_VIOLATION) => {
            LedgerError::DuplicateReference(constraint.unwrap_or(message).to_string())
        }
        Some(FOREIGN_KEY_VIOLATION | CHECK_VIOLATION) => {
            LedgerError::Validation(constraint.unwrap_or(message).to_string())
        }
        _ => LedgerError::Database(fallback()),
    }
}

/// Converts a database error into a [`ReportError`].
pub fn report_error(err: DbErr) -> ReportError {
    ReportError::Database(err.to_string())
}
