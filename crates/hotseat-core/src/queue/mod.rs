//! Premium-ordered queue of waiting claims.
//!
//! [`PremiumQueue`] is an indexed max-heap: a dense array holding the heap
//! plus a claimant → index map, giving O(log n) insert, extract-max, and
//! arbitrary-key removal with O(1) keyed lookup. Waiting claims are queue
//! entries; the entry with the highest premium is promoted first.
//!
//! # Ordering semantics
//!
//! The array order is load-bearing, not an implementation detail: promotion
//! order among equal premiums is decided by the exact sift rules below, so
//! hosts that persist a queue must preserve the array order byte for byte.
//!
//! - An entry sifts **up** only while strictly greater than its parent;
//!   on a tie the earlier entry keeps its position.
//! - Sifting **down** descends into the larger child; the right child is
//!   preferred over the left only when strictly greater. The entry stops
//!   as soon as it is greater than or equal to the larger child.
//!
//! Under these rules, of two equal-premium entries the one inserted first
//! reaches the root first.
//!
//! # Example
//!
//! ```rust
//! use hotseat_core::{ClaimantId, PremiumQueue};
//!
//! let mut queue = PremiumQueue::new();
//! queue.insert(ClaimantId::new("a"), 5).unwrap();
//! queue.insert(ClaimantId::new("b"), 9).unwrap();
//! queue.insert(ClaimantId::new("c"), 9).unwrap();
//!
//! // b and c bid the same premium; b was first in, so b is promoted first.
//! assert_eq!(queue.extract_max().unwrap().claimant.as_str(), "b");
//! assert_eq!(queue.extract_max().unwrap().claimant.as_str(), "c");
//! assert_eq!(queue.extract_max().unwrap().claimant.as_str(), "a");
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::claimant::ClaimantId;

#[cfg(test)]
mod proptest_queue;

/// Maximum number of entries accepted when loading a persisted queue.
///
/// This limit prevents denial-of-service through unbounded allocation when
/// deserializing snapshots from untrusted input. It is enforced only on
/// load; live queues grow without limit.
pub const MAX_PENDING_CLAIMS: usize = 4096;

/// Errors from queue operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QueueError {
    /// The queue has no entries.
    #[error("queue is empty")]
    Empty,

    /// No entry exists for the requested claimant.
    #[error("no queue entry for claimant {claimant}")]
    KeyNotFound {
        /// The claimant that was looked up.
        claimant: ClaimantId,
    },

    /// An entry already exists for the claimant.
    #[error("claimant {claimant} is already queued")]
    DuplicateKey {
        /// The claimant that was inserted twice.
        claimant: ClaimantId,
    },

    /// A persisted queue failed validation on load.
    #[error("corrupt queue snapshot: {detail}")]
    CorruptSnapshot {
        /// What the snapshot violated.
        detail: String,
    },
}

/// A waiting claim: who is waiting and what they bid for position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// The waiting claimant.
    pub claimant: ClaimantId,
    /// The premium bid for queue position.
    pub premium: u64,
}

/// Indexed max-heap of waiting claims, keyed by claimant.
///
/// Serializes as the bare heap array; the index map is rebuilt and the
/// heap order revalidated on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<QueueEntry>", into = "Vec<QueueEntry>")]
pub struct PremiumQueue {
    entries: Vec<QueueEntry>,
    index_of: HashMap<ClaimantId, usize>,
}

impl PremiumQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of waiting claims.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no claims are waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if the claimant has a queued entry.
    #[must_use]
    pub fn contains(&self, claimant: &ClaimantId) -> bool {
        self.index_of.contains_key(claimant)
    }

    /// The heap array in promotion-deterministic order.
    #[must_use]
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// Inserts a new waiting claim.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::DuplicateKey`] if the claimant is already
    /// queued.
    pub fn insert(&mut self, claimant: ClaimantId, premium: u64) -> Result<(), QueueError> {
        if self.index_of.contains_key(&claimant) {
            return Err(QueueError::DuplicateKey { claimant });
        }
        let index = self.entries.len();
        self.entries.push(QueueEntry {
            claimant: claimant.clone(),
            premium,
        });
        self.index_of.insert(claimant, index);
        self.sift_up_from(index);
        Ok(())
    }

    /// Returns the highest-premium entry without removing it.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Empty`] if no claims are waiting.
    pub fn peek_max(&self) -> Result<&QueueEntry, QueueError> {
        self.entries.first().ok_or(QueueError::Empty)
    }

    /// Removes and returns the highest-premium entry.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Empty`] if no claims are waiting.
    pub fn extract_max(&mut self) -> Result<QueueEntry, QueueError> {
        let root = self
            .entries
            .first()
            .ok_or(QueueError::Empty)?
            .claimant
            .clone();
        self.remove_by_key(&root)
    }

    /// Removes and returns the entry for an arbitrary claimant.
    ///
    /// The vacated position is refilled with the entry from the end of the
    /// array, which is then sifted up and down in turn: an interior
    /// replacement can violate heap order in either direction, unlike
    /// removing the root.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::KeyNotFound`] if the claimant is not queued.
    pub fn remove_by_key(&mut self, claimant: &ClaimantId) -> Result<QueueEntry, QueueError> {
        let index = *self
            .index_of
            .get(claimant)
            .ok_or_else(|| QueueError::KeyNotFound {
                claimant: claimant.clone(),
            })?;
        let removed = self.entries.swap_remove(index);
        self.index_of.remove(claimant);
        if index < self.entries.len() {
            self.index_of
                .insert(self.entries[index].claimant.clone(), index);
            let settled = self.sift_up_from(index);
            self.sift_down_from(settled);
        }
        Ok(removed)
    }

    /// Looks up a claimant's entry without removing it.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::KeyNotFound`] if the claimant is not queued.
    pub fn get_by_key(&self, claimant: &ClaimantId) -> Result<&QueueEntry, QueueError> {
        let index = *self
            .index_of
            .get(claimant)
            .ok_or_else(|| QueueError::KeyNotFound {
                claimant: claimant.clone(),
            })?;
        Ok(&self.entries[index])
    }

    /// Raises a queued claimant's premium by `delta` (saturating).
    ///
    /// The entry is removed and reinserted rather than adjusted in place,
    /// so the resulting array order is identical to a withdraw followed by
    /// a fresh submission at the higher premium. Membership never changes:
    /// the claimant is queued before and after.
    ///
    /// Returns the new premium.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::KeyNotFound`] if the claimant is not queued.
    pub fn increase_premium(
        &mut self,
        claimant: &ClaimantId,
        delta: u64,
    ) -> Result<u64, QueueError> {
        let entry = self.remove_by_key(claimant)?;
        let premium = entry.premium.saturating_add(delta);
        self.insert(entry.claimant, premium)?;
        Ok(premium)
    }

    /// Swaps two positions, keeping the index map in step with the array.
    /// The two must never be individually observable as out of sync.
    fn swap_positions(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        self.index_of.insert(self.entries[a].claimant.clone(), a);
        self.index_of.insert(self.entries[b].claimant.clone(), b);
    }

    /// Moves the entry at `start` toward the root while strictly greater
    /// than its parent. Ties stop: the incumbent parent keeps its position.
    /// Returns where the entry settled.
    fn sift_up_from(&mut self, start: usize) -> usize {
        let mut index = start;
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.entries[index].premium > self.entries[parent].premium {
                self.swap_positions(index, parent);
                index = parent;
            } else {
                break;
            }
        }
        index
    }

    /// Moves the entry at `start` toward the leaves while strictly smaller
    /// than its larger child. The right child outranks the left only when
    /// strictly greater. Returns where the entry settled.
    fn sift_down_from(&mut self, start: usize) -> usize {
        let mut index = start;
        loop {
            let left = 2 * index + 1;
            if left >= self.entries.len() {
                break;
            }
            let right = left + 1;
            let mut largest = left;
            if right < self.entries.len()
                && self.entries[right].premium > self.entries[left].premium
            {
                largest = right;
            }
            if self.entries[largest].premium > self.entries[index].premium {
                self.swap_positions(index, largest);
                index = largest;
            } else {
                break;
            }
        }
        index
    }
}

impl TryFrom<Vec<QueueEntry>> for PremiumQueue {
    type Error = QueueError;

    /// Rebuilds a queue from a persisted heap array, rejecting snapshots
    /// that are oversized, contain duplicate claimants, or violate heap
    /// order.
    fn try_from(entries: Vec<QueueEntry>) -> Result<Self, QueueError> {
        if entries.len() > MAX_PENDING_CLAIMS {
            return Err(QueueError::CorruptSnapshot {
                detail: format!(
                    "{} entries exceed the maximum of {MAX_PENDING_CLAIMS}",
                    entries.len()
                ),
            });
        }
        let mut index_of = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if index_of.insert(entry.claimant.clone(), index).is_some() {
                return Err(QueueError::CorruptSnapshot {
                    detail: format!("duplicate entry for claimant {}", entry.claimant),
                });
            }
            if index > 0 {
                let parent = (index - 1) / 2;
                if entries[parent].premium < entry.premium {
                    return Err(QueueError::CorruptSnapshot {
                        detail: format!(
                            "heap order violated at index {index}: parent premium {} < {}",
                            entries[parent].premium, entry.premium
                        ),
                    });
                }
            }
        }
        Ok(Self { entries, index_of })
    }
}

impl From<PremiumQueue> for Vec<QueueEntry> {
    fn from(queue: PremiumQueue) -> Self {
        queue.entries
    }
}
