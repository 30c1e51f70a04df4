//! Account code rules.

use std::cmp::Ordering;

use crate::ledger::LedgerError;

/// Maximum length of an account code.
pub const MAX_CODE_LEN: usize = 20;

/// Validates an account code before insert.
///
/// # Errors
///
/// Returns `Validation` for an empty or overlong code, or one containing
/// whitespace.
pub fn validate_code(code: &str) -> Result<(), LedgerError> {
    if code.is_empty() {
        return Err(LedgerError::Validation("account code is required".into()));
    }
    if code.len() > MAX_CODE_LEN {
        return Err(LedgerError::Validation(format!(
            "account code must be at most {MAX_CODE_LEN} characters"
        )));
    }
    if code.chars().any(char::is_whitespace) {
        return Err(LedgerError::Validation(format!(
            "account code '{code}' contains whitespace"
        )));
    }
    Ok(())
}

/// Orders numeric codes by magnitude: shorter first, then lexicographic.
#[must_use]
pub fn compare_codes(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Increment for the first child of `parent_code`.
///
/// `…000` steps by 100, `…00` by 10, anything else by 1.
#[must_use]
pub fn first_child_step(parent_code: &str) -> u64 {
    if parent_code.ends_with("000") {
        100
    } else if parent_code.ends_with("00") {
        10
    } else {
        1
    }
}

/// Suggests the next code for a child of `parent_code`.
///
/// With no children (a child equal to the parent's own code is a bootstrap
/// row and does not count), the first child is `parent + first_child_step`.
/// Otherwise it is the greatest numeric child code plus one. Zero padding is
/// preserved.
///
/// # Errors
///
/// Returns `Validation` if the parent code is not numeric, or `Internal` if
/// the suggestion overflows.
pub fn suggest_child_code<S: AsRef<str>>(
    parent_code: &str,
    children: &[S],
) -> Result<String, LedgerError> {
    let parent = parse_numeric(parent_code)?;

    let last_child = children
        .iter()
        .map(AsRef::as_ref)
        .filter(|code| *code != parent_code && is_numeric(code))
        .max_by(|a, b| compare_codes(a, b));

    let (base, width, step) = match last_child {
        Some(code) => (parse_numeric(code)?, code.len(), 1),
        None => (parent, parent_code.len(), first_child_step(parent_code)),
    };

    let next = base
        .checked_add(step)
        .ok_or_else(|| LedgerError::Internal("account code overflow".into()))?;
    Ok(format!("{next:0width$}"))
}

fn is_numeric(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit())
}

fn parse_numeric(code: &str) -> Result<u64, LedgerError> {
    if !is_numeric(code) {
        return Err(LedgerError::Validation(format!(
            "account code '{code}' is not numeric; cannot suggest a child code"
        )));
    }
    code.parse::<u64>()
        .map_err(|e| LedgerError::Validation(format!("account code '{code}': {e}")))
}
