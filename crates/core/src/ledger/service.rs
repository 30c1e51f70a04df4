//! Ledger service for posting validation.
//!
//! Pure business logic with no database dependencies. Repositories call into
//! this service before opening the atomic unit so that every validation error
//! surfaces without a partial write.

use std::collections::HashSet;

use ledgerline_shared::types::AccountId;

use super::error::LedgerError;
use super::types::{PostingRequest, PostingTotals};
use super::validation::validate_entries;

/// Ledger service for posting validation.
pub struct LedgerService;

impl LedgerService {
    /// Validates a posting request before persistence.
    ///
    /// 1. Validates the description and any caller-supplied reference
    /// 2. Validates the entry lines (count, sign, balance)
    /// 3. Validates each distinct account through `account_validator`
    ///
    /// # Errors
    ///
    /// Returns the first `LedgerError` encountered.
    pub fn validate_posting<A>(
        request: &PostingRequest,
        account_validator: A,
    ) -> Result<PostingTotals, LedgerError>
    where
        A: Fn(AccountId) -> Result<(), LedgerError>,
    {
        if request.description.trim().is_empty() {
            return Err(LedgerError::Validation("description is required".into()));
        }

        if !request.needs_allocation()
            && let Some(reference) = &request.reference
        {
            Self::validate_reference(reference)?;
        }

        let totals = validate_entries(&request.entries)?;

        let mut seen = HashSet::new();
        for entry in &request.entries {
            if seen.insert(entry.account_id) {
                account_validator(entry.account_id)?;
            }
        }

        Ok(totals)
    }

    /// Validates a caller-supplied reference.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the reference is too long or contains
    /// whitespace or control characters.
    pub fn validate_reference(reference: &str) -> Result<(), LedgerError> {
        if reference.len() > 50 {
            return Err(LedgerError::Validation(
                "reference must be at most 50 characters".into(),
            ));
        }
        if reference
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(LedgerError::Validation(format!(
                "reference '{reference}' contains whitespace"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::{EntryInput, TransactionType};
    use chrono::NaiveDate;
    use ledgerline_shared::types::TenantId;
    use rust_decimal_macros::dec;
    use std::cell::RefCell;

    fn make_request(entries: Vec<EntryInput>) -> PostingRequest {
        PostingRequest {
            tenant_id: TenantId::new(),
            reference: None,
            prefix: None,
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            description: "Owner capital".into(),
            transaction_type: TransactionType::Journal,
            entries,
        }
    }

    #[test]
    fn test_validate_balanced_posting() {
        let cash = AccountId::new();
        let capital = AccountId::new();
        let request = make_request(vec![
            EntryInput::debit(cash, dec!(1000)),
            EntryInput::credit(capital, dec!(1000)),
        ]);

        let totals = LedgerService::validate_posting(&request, |_| Ok(())).unwrap();
        assert_eq!(totals.debit, dec!(1000));
    }

    #[test]
    fn test_validate_rejects_unknown_account() {
        let cash = AccountId::new();
        let missing = AccountId::new();
        let request = make_request(vec![
            EntryInput::debit(cash, dec!(1000)),
            EntryInput::credit(missing, dec!(1000)),
        ]);

        let result = LedgerService::validate_posting(&request, |id| {
            if id == missing {
                Err(LedgerError::AccountNotFound(id.into_inner()))
            } else {
                Ok(())
            }
        });
        assert!(matches!(result, Err(LedgerError::AccountNotFound(_))));
    }

    #[test]
    fn test_validate_checks_each_account_once() {
        let cash = AccountId::new();
        let revenue = AccountId::new();
        let request = make_request(vec![
            EntryInput::debit(cash, dec!(60)),
            EntryInput::debit(cash, dec!(40)),
            EntryInput::credit(revenue, dec!(100)),
        ]);

        let calls = RefCell::new(0);
        LedgerService::validate_posting(&request, |_| {
            *calls.borrow_mut() += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn test_imbalance_detected_before_account_lookup() {
        let request = make_request(vec![
            EntryInput::debit(AccountId::new(), dec!(1000)),
            EntryInput::credit(AccountId::new(), dec!(900)),
        ]);

        let result = LedgerService::validate_posting(&request, |_| {
            panic!("accounts must not be resolved for an imbalanced posting")
        });
        assert!(matches!(result, Err(LedgerError::ImbalancedEntries { .. })));
    }

    #[test]
    fn test_blank_description_rejected() {
        let mut request = make_request(vec![
            EntryInput::debit(AccountId::new(), dec!(1)),
            EntryInput::credit(AccountId::new(), dec!(1)),
        ]);
        request.description = "   ".into();
        assert!(matches!(
            LedgerService::validate_posting(&request, |_| Ok(())),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_explicit_reference_validated() {
        let mut request = make_request(vec![
            EntryInput::debit(AccountId::new(), dec!(1)),
            EntryInput::credit(AccountId::new(), dec!(1)),
        ]);
        request.transaction_type = TransactionType::Receipt;
        request.reference = Some("BANK REF 1".into());
        assert!(LedgerService::validate_posting(&request, |_| Ok(())).is_err());

        request.reference = Some("BANK-REF-1".into());
        assert!(LedgerService::validate_posting(&request, |_| Ok(())).is_ok());
    }
}
