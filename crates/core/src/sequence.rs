//! Reference and voucher numbering.
//!
//! References take the form `PREFIX-YYYY-NNNN`: a fixed prefix per document
//! kind, the calendar year, and a counter zero-padded to at least 4 digits.
//! This module only formats and parses; finding the current maximum and
//! inserting the consumer row must happen in one database transaction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// Minimum width of the counter segment.
pub const MIN_COUNTER_WIDTH: usize = 4;

/// Prefix identifying the kind of document a reference belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReferencePrefix {
    /// Journal voucher.
    Jv,
    /// Payment voucher (money out).
    Pv,
    /// Receipt voucher (money in).
    Rv,
    /// Contra voucher.
    Cv,
    /// Generic system-generated transaction.
    Tx,
    /// Service invoice number.
    Sin,
    /// Freight invoice number.
    Fin,
}

impl ReferencePrefix {
    /// Returns the literal prefix text.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Jv => "JV",
            Self::Pv => "PV",
            Self::Rv => "RV",
            Self::Cv => "CV",
            Self::Tx => "TX",
            Self::Sin => "SIN",
            Self::Fin => "FIN",
        }
    }

    /// Returns the `PREFIX-YYYY-` stem shared by every reference of a year.
    #[must_use]
    pub fn stem(&self, year: i32) -> String {
        format!("{}-{year:04}-", self.as_str())
    }
}

impl fmt::Display for ReferencePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferencePrefix {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JV" => Ok(Self::Jv),
            "PV" => Ok(Self::Pv),
            "RV" => Ok(Self::Rv),
            "CV" => Ok(Self::Cv),
            "TX" => Ok(Self::Tx),
            "SIN" => Ok(Self::Sin),
            "FIN" => Ok(Self::Fin),
            other => Err(LedgerError::Validation(format!(
                "unknown reference prefix '{other}'"
            ))),
        }
    }
}

/// Formats a reference, padding the counter to [`MIN_COUNTER_WIDTH`] digits.
#[must_use]
pub fn format_reference(prefix: ReferencePrefix, year: i32, counter: u64) -> String {
    format!(
        "{}{counter:0width$}",
        prefix.stem(year),
        width = MIN_COUNTER_WIDTH
    )
}

/// Extracts the counter from a reference of the given prefix and year.
///
/// # Errors
///
/// Returns `Validation` if the reference does not start with the stem or its
/// trailing segment is not a run of at least 4 digits.
pub fn parse_counter(prefix: ReferencePrefix, year: i32, reference: &str) -> Result<u64, LedgerError> {
    let stem = prefix.stem(year);
    let digits = reference.strip_prefix(&stem).ok_or_else(|| {
        LedgerError::Validation(format!("reference '{reference}' does not start with '{stem}'"))
    })?;

    if digits.len() < MIN_COUNTER_WIDTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LedgerError::Validation(format!(
            "reference '{reference}' has a malformed counter"
        )));
    }

    digits
        .parse::<u64>()
        .map_err(|e| LedgerError::Validation(format!("reference '{reference}': {e}")))
}

/// Computes the reference following `latest`, or the first of the year.
///
/// # Errors
///
/// Returns `Validation` if `latest` is malformed.
pub fn next_reference(
    prefix: ReferencePrefix,
    year: i32,
    latest: Option<&str>,
) -> Result<String, LedgerError> {
    let next = match latest {
        Some(reference) => parse_counter(prefix, year, reference)?
            .checked_add(1)
            .ok_or_else(|| LedgerError::Internal("reference counter overflow".into()))?,
        None => 1,
    };
    Ok(format_reference(prefix, year, next))
}
