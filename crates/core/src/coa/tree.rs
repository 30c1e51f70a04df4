//! Account tree checks.
//!
//! The tree is a flat set of accounts linked by `parent_id`. Walks are
//! iterative and bounded by a visited set, so corrupt data cannot loop forever.

use std::collections::HashSet;

use ledgerline_shared::types::AccountId;

use crate::ledger::LedgerError;

/// Verifies that placing `account` under `new_parent` keeps the tree acyclic.
///
/// `parent_of` returns the current parent of an account, or `None` for roots
/// and unknown accounts.
///
/// # Errors
///
/// Returns `CyclicParent` if `new_parent` is `account` itself or one of its
/// descendants.
pub fn ensure_acyclic<F>(
    account: AccountId,
    new_parent: AccountId,
    parent_of: F,
) -> Result<(), LedgerError>
where
    F: Fn(AccountId) -> Option<AccountId>,
{
    let mut visited = HashSet::new();
    let mut cursor = Some(new_parent);

    while let Some(current) = cursor {
        if current == account {
            return Err(LedgerError::CyclicParent(account.into_inner()));
        }
        if !visited.insert(current) {
            // Existing data already loops; refuse to extend it.
            return Err(LedgerError::CyclicParent(account.into_inner()));
        }
        cursor = parent_of(current);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn chain() -> (Vec<AccountId>, HashMap<AccountId, AccountId>) {
        // root <- a <- b <- c
        let ids: Vec<AccountId> = (0..4).map(|_| AccountId::new()).collect();
        let parents = HashMap::from([(ids[1], ids[0]), (ids[2], ids[1]), (ids[3], ids[2])]);
        (ids, parents)
    }

    #[test]
    fn test_reparent_to_unrelated_branch() {
        let (ids, parents) = chain();
        let other = AccountId::new();
        assert!(ensure_acyclic(ids[2], other, |id| parents.get(&id).copied()).is_ok());
        assert!(ensure_acyclic(ids[3], ids[0], |id| parents.get(&id).copied()).is_ok());
    }

    #[test]
    fn test_reparent_under_descendant_rejected() {
        let (ids, parents) = chain();
        assert!(matches!(
            ensure_acyclic(ids[1], ids[3], |id| parents.get(&id).copied()),
            Err(LedgerError::CyclicParent(_))
        ));
    }

    #[test]
    fn test_reparent_under_self_rejected() {
        let (ids, parents) = chain();
        assert!(ensure_acyclic(ids[2], ids[2], |id| parents.get(&id).copied()).is_err());
    }

    #[test]
    fn test_existing_loop_detected() {
        let a = AccountId::new();
        let b = AccountId::new();
        let parents = HashMap::from([(a, b), (b, a)]);
        let outsider = AccountId::new();
        assert!(ensure_acyclic(outsider, a, |id| parents.get(&id).copied()).is_err());
    }
}
