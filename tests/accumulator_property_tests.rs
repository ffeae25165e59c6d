//! Property tests for the pack accumulator invariants: for every sequence of
//! add/remove operations, membership never exceeds the target quantity and
//! never contains a duplicate serial.

use std::collections::HashSet;

use proptest::prelude::*;
use shopfloor::{AccumulatorError, PackAccumulator};

const SERIALS: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

proptest! {
    #[test]
    fn members_never_exceed_target_and_never_duplicate(
        target in 0u32..8,
        ops in prop::collection::vec((0usize..SERIALS.len(), any::<bool>()), 0..48),
    ) {
        let mut acc = PackAccumulator::new(target);
        for (idx, is_add) in ops {
            let serial = SERIALS[idx];
            if is_add {
                let _ = acc.add(serial);
            } else {
                acc.remove(serial);
            }
            prop_assert!(acc.len() as u32 <= target);
            let mut seen = HashSet::new();
            prop_assert!(acc.members().iter().all(|s| seen.insert(s.as_str())));
        }
    }

    #[test]
    fn add_reports_duplicate_exactly_when_already_a_member(
        target in 1u32..8,
        ops in prop::collection::vec(0usize..SERIALS.len(), 1..48),
    ) {
        let mut acc = PackAccumulator::new(target);
        for idx in ops {
            let serial = SERIALS[idx];
            let was_member = acc.contains(serial);
            match acc.add(serial) {
                Err(AccumulatorError::Duplicate) => prop_assert!(was_member),
                Err(AccumulatorError::AtCapacity) => {
                    prop_assert!(!was_member);
                    prop_assert!(acc.is_full());
                }
                Ok(()) => prop_assert!(!was_member),
            }
        }
    }
}
