//! Common types used across the application.

pub mod id;
pub mod money;


pub use id::*;
pub use money::{
    BALANCE_TOLERANCE, MONEY_LIMIT, MONEY_SCALE, checked_extend, checked_percent, checked_sum,
    fits_money_column, round_money, within_tolerance,
};
