//! Period lock rules.

use chrono::{DateTime, NaiveDate, Utc};

use super::period::{FinancialPeriod, PeriodAction, PeriodKey};
use crate::auth::Actor;
use crate::ledger::LedgerError;

/// Fails if postings dated `date` are refused.
///
/// `is_closed` is the stored flag for the date's period (`false` when no row
/// exists).
///
/// # Errors
///
/// Returns `PeriodClosed` when the period is closed.
pub fn ensure_open(date: NaiveDate, is_closed: bool) -> Result<(), LedgerError> {
    if is_closed {
        let key = PeriodKey::from_date(date);
        return Err(LedgerError::PeriodClosed {
            month: key.month,
            year: key.year,
        });
    }
    Ok(())
}

/// Validates an open/close request.
///
/// # Errors
///
/// Returns `Permission` unless the actor may manage periods, and
/// `Validation` for a month outside 1..=12.
pub fn validate_toggle(actor: &Actor, year: i32, month: u32) -> Result<PeriodKey, LedgerError> {
    if !actor.role.can_manage_periods() {
        return Err(LedgerError::Permission(format!(
            "role {} cannot close or open financial periods",
            actor.role
        )));
    }
    PeriodKey::new(year, month)
}

/// Applies `action` to `period`, recording the actor when closing and
/// clearing the audit fields when opening.
pub fn apply_action(
    period: &mut FinancialPeriod,
    action: PeriodAction,
    actor: &Actor,
    now: DateTime<Utc>,
) {
    if action.is_close() {
        period.is_closed = true;
        period.closed_by = Some(actor.user_id);
        period.closed_at = Some(now);
    } else {
        period.is_closed = false;
        period.closed_by = None;
        period.closed_at = None;
    }
}
