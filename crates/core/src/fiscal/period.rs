//! Financial period types.

use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use ledgerline_shared::types::{TenantId, UserId};

use crate::ledger::LedgerError;

/// Calendar month bucket a date falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeriodKey {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
}

impl PeriodKey {
    /// Creates a key, validating the month.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `month` is outside 1..=12.
    pub fn new(year: i32, month: u32) -> Result<Self, LedgerError> {
        if !(1..=12).contains(&month) {
            return Err(LedgerError::Validation(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        Ok(Self { year, month })
    }

    /// Returns the period containing `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl std::fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// A tenant's open/closed flag for one month.
///
/// Months without a stored row are open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialPeriod {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Year and month.
    pub key: PeriodKey,
    /// Whether postings dated in this month are refused.
    pub is_closed: bool,
    /// Who closed the period.
    pub closed_by: Option<UserId>,
    /// When the period was closed.
    pub closed_at: Option<DateTime<Utc>>,
}

impl FinancialPeriod {
    /// An open period with no audit trail.
    #[must_use]
    pub const fn open(tenant_id: TenantId, key: PeriodKey) -> Self {
        Self {
            tenant_id,
            key,
            is_closed: false,
            closed_by: None,
            closed_at: None,
        }
    }
}

/// Admin toggle action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PeriodAction {
    /// Refuse postings in the period.
    Close,
    /// Accept postings in the period.
    Open,
}

impl PeriodAction {
    /// Returns true for [`PeriodAction::Close`].
    #[must_use]
    pub const fn is_close(&self) -> bool {
        matches!(self, Self::Close)
    }
}

impl FromStr for PeriodAction {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CLOSE" => Ok(Self::Close),
            "OPEN" => Ok(Self::Open),
            other => Err(LedgerError::Validation(format!(
                "action must be CLOSE or OPEN, got '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_key_from_date() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
        assert_eq!(PeriodKey::from_date(date), PeriodKey { year: 2026, month: 2 });
        assert_eq!(PeriodKey::from_date(date).to_string(), "2026-02");
    }

    #[test]
    fn test_period_key_month_range() {
        assert!(PeriodKey::new(2026, 0).is_err());
        assert!(PeriodKey::new(2026, 13).is_err());
        assert!(PeriodKey::new(2026, 12).is_ok());
    }

    #[test]
    fn test_action_parse() {
        assert_eq!("CLOSE".parse::<PeriodAction>().unwrap(), PeriodAction::Close);
        assert_eq!("OPEN".parse::<PeriodAction>().unwrap(), PeriodAction::Open);
        assert!("LOCK".parse::<PeriodAction>().is_err());
    }
}
