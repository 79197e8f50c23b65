//! Property-based tests for the premium queue.
//!
//! These tests drive [`PremiumQueue`] with random operation sequences
//! against a plain map model and verify the structural invariants that
//! the rotation protocol depends on.

use std::collections::HashMap;

use proptest::prelude::*;

use super::{PremiumQueue, QueueError};
use crate::claimant::ClaimantId;

/// Operations the model exercises, naming claimants from a small pool so
/// that duplicate inserts and absent removals actually occur.
#[derive(Debug, Clone)]
enum Op {
    Insert(usize, u64),
    RemoveByKey(usize),
    ExtractMax,
    IncreasePremium(usize, u64),
}

const POOL: usize = 16;

fn name(index: usize) -> ClaimantId {
    ClaimantId::new(format!("claimant-{index}"))
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..POOL, 0u64..1_000).prop_map(|(i, p)| Op::Insert(i, p)),
        (0..POOL).prop_map(Op::RemoveByKey),
        Just(Op::ExtractMax),
        (0..POOL, 0u64..500).prop_map(|(i, d)| Op::IncreasePremium(i, d)),
    ]
}

fn assert_heap_property(queue: &PremiumQueue) -> Result<(), TestCaseError> {
    let entries = queue.entries();
    for index in 1..entries.len() {
        let parent = (index - 1) / 2;
        prop_assert!(
            entries[parent].premium >= entries[index].premium,
            "heap order violated at index {}",
            index
        );
    }
    Ok(())
}

fn assert_index_matches_scan(queue: &PremiumQueue) -> Result<(), TestCaseError> {
    for entry in queue.entries() {
        let looked_up = queue
            .get_by_key(&entry.claimant)
            .expect("every array entry must be reachable through the index");
        let scanned = queue
            .entries()
            .iter()
            .find(|e| e.claimant == entry.claimant)
            .expect("entry vanished from its own array");
        prop_assert_eq!(looked_up, scanned);
    }
    Ok(())
}

proptest! {
    /// Property: heap order and index consistency hold after every
    /// operation, not just at rest.
    #[test]
    fn prop_invariants_hold_under_random_ops(
        ops in prop::collection::vec(op_strategy(), 0..64)
    ) {
        let mut queue = PremiumQueue::new();
        let mut model: HashMap<ClaimantId, u64> = HashMap::new();

        for op in ops {
            match op {
                Op::Insert(i, premium) => {
                    let claimant = name(i);
                    let result = queue.insert(claimant.clone(), premium);
                    if model.contains_key(&claimant) {
                        prop_assert!(
                            matches!(result, Err(QueueError::DuplicateKey { .. })),
                            "expected DuplicateKey, got {:?}",
                            result
                        );
                    } else {
                        prop_assert!(result.is_ok());
                        model.insert(claimant, premium);
                    }
                }
                Op::RemoveByKey(i) => {
                    let claimant = name(i);
                    let result = queue.remove_by_key(&claimant);
                    match model.remove(&claimant) {
                        Some(premium) => {
                            let entry = result.expect("model says the claimant is queued");
                            prop_assert_eq!(entry.premium, premium);
                        }
                        None => {
                            prop_assert!(
                                matches!(result, Err(QueueError::KeyNotFound { .. })),
                                "expected KeyNotFound, got {:?}",
                                result
                            );
                        }
                    }
                }
                Op::ExtractMax => {
                    let result = queue.extract_max();
                    if model.is_empty() {
                        prop_assert!(matches!(result, Err(QueueError::Empty)));
                    } else {
                        let entry = result.expect("model says the queue is non-empty");
                        let best = model.values().copied().max().unwrap();
                        prop_assert_eq!(entry.premium, best);
                        prop_assert_eq!(model.remove(&entry.claimant), Some(best));
                    }
                }
                Op::IncreasePremium(i, delta) => {
                    let claimant = name(i);
                    let result = queue.increase_premium(&claimant, delta);
                    match model.get_mut(&claimant) {
                        Some(premium) => {
                            *premium = premium.saturating_add(delta);
                            prop_assert_eq!(result.expect("claimant is queued"), *premium);
                        }
                        None => {
                            prop_assert!(
                                matches!(result, Err(QueueError::KeyNotFound { .. })),
                                "expected KeyNotFound, got {:?}",
                                result
                            );
                        }
                    }
                }
            }

            assert_heap_property(&queue)?;
            assert_index_matches_scan(&queue)?;

            // Size law and membership conservation against the model.
            prop_assert_eq!(queue.len(), model.len());
            for i in 0..POOL {
                let claimant = name(i);
                prop_assert_eq!(queue.contains(&claimant), model.contains_key(&claimant));
            }
            for (claimant, premium) in &model {
                prop_assert_eq!(queue.get_by_key(claimant).unwrap().premium, *premium);
            }
        }
    }

    /// Property: draining any queue yields premiums in non-increasing
    /// order.
    #[test]
    fn prop_extraction_order_is_non_increasing(
        premiums in prop::collection::vec(0u64..10_000, 0..128)
    ) {
        let mut queue = PremiumQueue::new();
        for (i, premium) in premiums.iter().enumerate() {
            queue.insert(ClaimantId::new(format!("c{i}")), *premium).unwrap();
        }

        let mut drained = Vec::new();
        while let Ok(entry) = queue.extract_max() {
            drained.push(entry.premium);
        }

        prop_assert_eq!(drained.len(), premiums.len());
        for pair in drained.windows(2) {
            prop_assert!(pair[0] >= pair[1], "extraction order regressed: {:?}", pair);
        }
    }

    /// Property: a raise never changes membership, and the raised entry is
    /// found at exactly its old premium plus the delta.
    #[test]
    fn prop_increase_premium_round_trip(
        base in prop::collection::vec(0u64..1_000, 1..32),
        target_index in 0usize..32,
        delta in 0u64..1_000,
    ) {
        let mut queue = PremiumQueue::new();
        for (i, premium) in base.iter().enumerate() {
            queue.insert(ClaimantId::new(format!("c{i}")), *premium).unwrap();
        }

        let target = target_index % base.len();
        let claimant = ClaimantId::new(format!("c{target}"));
        let before = queue.len();

        let new_premium = queue.increase_premium(&claimant, delta).unwrap();

        prop_assert_eq!(new_premium, base[target].saturating_add(delta));
        prop_assert_eq!(queue.len(), before);
        prop_assert_eq!(queue.get_by_key(&claimant).unwrap().premium, new_premium);
        assert_heap_property(&queue)?;
    }
}
