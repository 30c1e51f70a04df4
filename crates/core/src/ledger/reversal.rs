//! Reversal of posted transactions.
//!
//! Posted transactions are append-only. A correction is a new JOURNAL
//! transaction whose lines swap the debit and credit of the original.

use chrono::NaiveDate;

use super::error::LedgerError;
use super::types::{EntryInput, PostedTransaction, PostingRequest, TransactionType};

/// Stateless service for creating reversing postings.
pub struct ReversalService;

impl ReversalService {
    /// Builds the posting request that offsets `original`.
    ///
    /// Each line keeps its account, swaps debit and credit, and has its
    /// description prefixed with "Reversal: ".
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `reason` is blank.
    pub fn build_reversal(
        original: &PostedTransaction,
        date: NaiveDate,
        reason: &str,
    ) -> Result<PostingRequest, LedgerError> {
        if reason.trim().is_empty() {
            return Err(LedgerError::Validation("reversal reason is required".into()));
        }

        let entries = original
            .entries
            .iter()
            .map(|entry| EntryInput {
                account_id: entry.account_id,
                debit: entry.credit,
                credit: entry.debit,
                description: Some(format!(
                    "Reversal: {}",
                    entry.description.clone().unwrap_or_default()
                )),
            })
            .collect();

        Ok(PostingRequest {
            tenant_id: original.tenant_id,
            reference: None,
            prefix: None,
            date,
            description: format!("Reversal of {}. Reason: {reason}", original.reference),
            transaction_type: TransactionType::Journal,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::PostedEntry;
    use ledgerline_shared::types::{AccountEntryId, AccountId, TenantId, TransactionId};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn posted() -> PostedTransaction {
        PostedTransaction {
            id: TransactionId::new(),
            tenant_id: TenantId::new(),
            reference: "TX-2026-0007".into(),
            date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            description: "Invoice SIN-2026-0001".into(),
            transaction_type: TransactionType::Invoice,
            entries: vec![
                PostedEntry {
                    id: AccountEntryId::new(),
                    account_id: AccountId::new(),
                    debit: dec!(5000),
                    credit: Decimal::ZERO,
                    description: Some("AR".into()),
                },
                PostedEntry {
                    id: AccountEntryId::new(),
                    account_id: AccountId::new(),
                    debit: Decimal::ZERO,
                    credit: dec!(5000),
                    description: None,
                },
            ],
        }
    }

    #[test]
    fn test_reversal_swaps_sides() {
        let original = posted();
        let date = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        let request = ReversalService::build_reversal(&original, date, "wrong customer").unwrap();

        assert_eq!(request.transaction_type, TransactionType::Journal);
        assert_eq!(request.tenant_id, original.tenant_id);
        assert_eq!(request.date, date);
        assert_eq!(request.entries.len(), 2);
        assert_eq!(request.entries[0].account_id, original.entries[0].account_id);
        assert_eq!(request.entries[0].credit, dec!(5000));
        assert_eq!(request.entries[0].debit, Decimal::ZERO);
        assert_eq!(request.entries[1].debit, dec!(5000));
        assert_eq!(request.entries[0].description.as_deref(), Some("Reversal: AR"));
        assert_eq!(
            request.description,
            "Reversal of TX-2026-0007. Reason: wrong customer"
        );
    }

    #[test]
    fn test_reversal_cancels_original_per_account() {
        let original = posted();
        let date = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        let request = ReversalService::build_reversal(&original, date, "duplicate").unwrap();

        for (orig, rev) in original.entries.iter().zip(&request.entries) {
            assert_eq!(orig.debit - orig.credit + rev.debit - rev.credit, Decimal::ZERO);
        }
    }

    #[test]
    fn test_reversal_requires_reason() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        assert!(ReversalService::build_reversal(&posted(), date, " ").is_err());
    }
}
