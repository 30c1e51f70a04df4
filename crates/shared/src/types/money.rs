//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts are `rust_decimal::Decimal`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Tolerance used when comparing debit and credit totals (0.01).
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Rounds a monetary amount to 2 decimal places, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Decimal places kept by a stored money column (`NUMERIC(20, 4)`).
pub const MONEY_SCALE: u32 = 4;

/// Exclusive bound on the magnitude of a stored money value (10^16).
pub const MONEY_LIMIT: Decimal = Decimal::from_parts(0x6FC1_0000, 0x0023_86F2, 0, false, 0);

/// Returns true if `|a - b|` is strictly below [`BALANCE_TOLERANCE`].
///
/// A difference too large to represent is never within tolerance.
#[must_use]
pub fn within_tolerance(a: Decimal, b: Decimal) -> bool {
    a.checked_sub(b)
        .is_some_and(|diff| diff.abs() < BALANCE_TOLERANCE)
}

/// Returns true if `amount` fits a money column without rounding.
#[must_use]
pub fn fits_money_column(amount: Decimal) -> bool {
    amount.abs() < MONEY_LIMIT && amount.normalize().scale() <= MONEY_SCALE
}

/// Sums `amounts`, or `None` if the sum overflows.
#[must_use]
pub fn checked_sum<I>(amounts: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, Decimal::checked_add)
}

/// `quantity × rate` rounded to cents, or `None` if the product overflows.
#[must_use]
pub fn checked_extend(quantity: Decimal, rate: Decimal) -> Option<Decimal> {
    quantity.checked_mul(rate).map(round_money)
}

/// `amount × percent / 100` rounded to cents, or `None` on overflow.
#[must_use]
pub fn checked_percent(amount: Decimal, percent: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(percent)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .map(round_money)
}
