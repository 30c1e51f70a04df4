//! Financial period management.

pub mod lock;
pub mod period;

pub use lock::{apply_action, ensure_open, validate_toggle};
pub use period::{FinancialPeriod, PeriodAction, PeriodKey};
