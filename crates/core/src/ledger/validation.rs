//! Business rule validation for ledger postings.

use rust_decimal::Decimal;

use ledgerline_shared::types::fits_money_column;

use super::error::LedgerError;
use super::types::{EntryInput, PostingTotals};

/// Validates that a set of entry lines can be posted.
///
/// Checks, in order:
/// - at least two lines
/// - no negative debit or credit
/// - every amount fits a money column (4 decimal places, below 10^16)
/// - debits equal credits within tolerance
///
/// A line may carry both a debit and a credit; it contributes to both
/// columns.
///
/// # Errors
///
/// Returns the first rule violated.
pub fn validate_entries(entries: &[EntryInput]) -> Result<PostingTotals, LedgerError> {
    if entries.len() < 2 {
        return Err(LedgerError::InsufficientEntries);
    }

    for (line, entry) in entries.iter().enumerate() {
        if entry.debit < Decimal::ZERO || entry.credit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount { line });
        }
        if !fits_money_column(entry.debit) || !fits_money_column(entry.credit) {
            return Err(LedgerError::AmountOutOfRange { line });
        }
    }

    let totals = PostingTotals::from_entries(entries)?;
    if !totals.is_balanced() {
        return Err(LedgerError::ImbalancedEntries {
            debit: totals.debit,
            credit: totals.credit,
        });
    }

    Ok(totals)
}
