//! Property-based tests for reference sequencing.
//!
//! - Consecutive allocations are contiguous, strictly increasing and unique
//! - Formatted references parse back to their counter

use std::collections::HashSet;

use proptest::prelude::*;

use super::sequence::{ReferencePrefix, format_reference, next_reference, parse_counter};

fn prefix_strategy() -> impl Strategy<Value = ReferencePrefix> {
    prop_oneof![
        Just(ReferencePrefix::Jv),
        Just(ReferencePrefix::Pv),
        Just(ReferencePrefix::Rv),
        Just(ReferencePrefix::Cv),
        Just(ReferencePrefix::Tx),
        Just(ReferencePrefix::Sin),
        Just(ReferencePrefix::Fin),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* prefix, year and count N, allocating N references in series
    /// yields N contiguous counters with no duplicates.
    #[test]
    fn prop_serial_allocation_is_contiguous(
        prefix in prefix_strategy(),
        year in 2000i32..2100,
        start in 0u64..20_000,
        n in 1usize..50,
    ) {
        let mut latest = (start > 0).then(|| format_reference(prefix, year, start));
        let mut seen = HashSet::new();

        for i in 0..n {
            let next = next_reference(prefix, year, latest.as_deref()).unwrap();
            let counter = parse_counter(prefix, year, &next).unwrap();
            prop_assert_eq!(counter, start + 1 + i as u64);
            if let Some(prev) = &latest {
                prop_assert!(parse_counter(prefix, year, prev).unwrap() < counter);
            }
            prop_assert!(seen.insert(next.clone()), "duplicate reference {}", next);
            latest = Some(next);
        }
    }

    /// *For any* counter, the formatted reference parses back to it.
    #[test]
    fn prop_format_parse_agree(
        prefix in prefix_strategy(),
        year in 2000i32..2100,
        counter in 1u64..10_000_000,
    ) {
        let reference = format_reference(prefix, year, counter);
        prop_assert_eq!(parse_counter(prefix, year, &reference).unwrap(), counter);
    }
}
