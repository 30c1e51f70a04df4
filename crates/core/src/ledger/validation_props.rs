//! Property-based tests for posting validation.
//!
//! - Every accepted posting balances within 0.01
//! - Any imbalance of at least 0.01 is rejected
//! - Negative lines are rejected
//! - Reversals of accepted postings are accepted and net to zero

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use ledgerline_shared::types::{
    AccountEntryId, AccountId, BALANCE_TOLERANCE, TenantId, TransactionId,
};

use super::error::LedgerError;
use super::reversal::ReversalService;
use super::types::{EntryInput, PostedEntry, PostedTransaction, TransactionType};
use super::validation::validate_entries;

/// Strategy to generate positive amounts (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a balanced set of lines: N debits and one credit for the sum.
fn balanced_entries() -> impl Strategy<Value = Vec<EntryInput>> {
    prop::collection::vec(positive_amount(), 1..8).prop_map(|debits| {
        let total: Decimal = debits.iter().copied().sum();
        let mut entries: Vec<EntryInput> = debits
            .into_iter()
            .map(|amount| EntryInput::debit(AccountId::new(), amount))
            .collect();
        entries.push(EntryInput::credit(AccountId::new(), total));
        entries
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* accepted set of lines, `|Σdebit − Σcredit| < 0.01`.
    #[test]
    fn prop_accepted_postings_balance(entries in balanced_entries()) {
        let totals = validate_entries(&entries).unwrap();
        prop_assert!((totals.debit - totals.credit).abs() < BALANCE_TOLERANCE);
    }

    /// *For any* balanced set, skewing one credit by at least a cent is rejected.
    #[test]
    fn prop_imbalance_rejected(
        entries in balanced_entries(),
        skew in positive_amount(),
    ) {
        let mut entries = entries;
        if let Some(last) = entries.last_mut() {
            last.credit += skew;
        }
        let rejected = matches!(
            validate_entries(&entries),
            Err(LedgerError::ImbalancedEntries { .. })
        );
        prop_assert!(rejected);
    }

    /// *For any* line index, a negative debit on that line is rejected.
    #[test]
    fn prop_negative_line_rejected(
        entries in balanced_entries(),
        index in any::<prop::sample::Index>(),
        amount in positive_amount(),
    ) {
        let mut entries = entries;
        let line = index.index(entries.len());
        entries[line].debit = -amount;
        let rejected = matches!(
            validate_entries(&entries),
            Err(LedgerError::NegativeAmount { line: l }) if l == line
        );
        prop_assert!(rejected);
    }

    /// *For any* accepted posting, its reversal is accepted and each account nets to zero.
    #[test]
    fn prop_reversal_offsets(entries in balanced_entries()) {
        let posted = PostedTransaction {
            id: TransactionId::new(),
            tenant_id: TenantId::new(),
            reference: "JV-2026-0001".into(),
            date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            description: "original".into(),
            transaction_type: TransactionType::Journal,
            entries: entries
                .iter()
                .map(|e| PostedEntry {
                    id: AccountEntryId::new(),
                    account_id: e.account_id,
                    debit: e.debit,
                    credit: e.credit,
                    description: None,
                })
                .collect(),
        };

        let reversal = ReversalService::build_reversal(
            &posted,
            NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
            "correction",
        )
        .unwrap();

        prop_assert!(validate_entries(&reversal.entries).is_ok());
        for (orig, rev) in posted.entries.iter().zip(&reversal.entries) {
            prop_assert_eq!(orig.account_id, rev.account_id);
            prop_assert_eq!(orig.debit - orig.credit, rev.credit - rev.debit);
        }
    }
}
