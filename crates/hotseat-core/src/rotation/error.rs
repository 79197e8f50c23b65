//! Rotation-specific error types.

use thiserror::Error;

use crate::claimant::ClaimantId;
use crate::ledger::BalancePool;
use crate::queue::QueueError;

/// Errors that can occur during slot operations.
///
/// Every rejection is total: the slot and the ledger are left exactly as
/// the operation found them, except for lazy expiry, which is a completed
/// transition of the previous tenure and commits regardless of how the
/// triggering call ends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RotationError {
    /// The claimant already holds a live claim on this slot.
    #[error("claimant {claimant} already has a live claim on this slot")]
    DuplicateClaim {
        /// The claimant that submitted twice.
        claimant: ClaimantId,
    },

    /// The ledger declined a debit.
    #[error("ledger declined debit of {amount} from {claimant}'s {pool} pool")]
    InsufficientFunds {
        /// The claimant whose debit was declined.
        claimant: ClaimantId,
        /// The amount that could not be covered.
        amount: u64,
        /// The pool the debit was drawn against.
        pool: BalancePool,
    },

    /// The claimant demanded immediate seating but the slot is occupied.
    #[error("slot is occupied by {occupant}; exclusive claim by {claimant} cannot seat")]
    ExclusivityUnsatisfied {
        /// The claimant that refused to wait.
        claimant: ClaimantId,
        /// The current occupant.
        occupant: ClaimantId,
    },

    /// The occupant tried to change their queue premium, but the occupant
    /// has no queue entry.
    #[error("claimant {claimant} holds the seat and has no queue entry to raise")]
    CannotModifyActive {
        /// The occupying claimant.
        claimant: ClaimantId,
    },

    /// No live claim exists for the claimant.
    #[error("no live claim for claimant {claimant}")]
    ClaimNotFound {
        /// The claimant that was looked up.
        claimant: ClaimantId,
    },

    /// A timed occupant tried to vacate the seat before their deadline.
    #[error(
        "claimant {claimant} holds a timed tenure until {expires_at} and cannot vacate it early"
    )]
    CannotWithdrawTimedActive {
        /// The occupying claimant.
        claimant: ClaimantId,
        /// The tenure deadline.
        expires_at: u64,
    },

    /// Slot state violates its own invariants. Never produced by the
    /// operations themselves; surfaces corrupted snapshots or host-side
    /// tampering.
    #[error("corrupt slot state: {detail}")]
    CorruptState {
        /// The invariant that does not hold.
        detail: String,
    },

    /// An underlying queue operation failed.
    #[error(transparent)]
    Queue(#[from] QueueError),
}
