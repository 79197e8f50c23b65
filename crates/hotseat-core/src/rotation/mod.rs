//! Occupancy rotation for a single-occupant slot.
//!
//! This module implements the contention protocol over the premium queue:
//! exactly one claimant occupies a slot at a time, everyone else waits in
//! premium order, and when the occupant's tenure ends the highest-premium
//! waiter is promoted.
//!
//! # Architecture
//!
//! ```text
//! submit_claim (slot vacant) --> Occupied (usage_count = 1)
//!                                   |
//!        claims land on the slot    |   usage_count grows /
//!                                   v   clock reaches expires_at
//!                             tenure due
//!                                   |
//!               settle outgoing occupant (pay earnings, route fee)
//!                                   |
//!                 +-----------------+------------------+
//!                 v                                    v
//!        waiters queued:                       queue empty:
//!        promote max premium                   slot goes Vacant
//!        (usage_count = 0)
//! ```
//!
//! # Key Concepts
//!
//! - **Tenure**: one continuous occupancy, ended by usage count
//!   ([`TenureKind::Burst`]) or by the logical clock
//!   ([`TenureKind::Timed`])
//! - **Price**: paid once per claim, escrowed against it, and returned
//!   through settlement or withdrawal
//! - **Premium**: the bid for queue position; spent, never returned
//! - **Lazy expiry**: every mutating operation settles a due tenure first;
//!   there is no background timer, and determinism depends on expiry
//!   running synchronously against the caller's own clock value
//!
//! # Settlement
//!
//! When a tenure ends with `n = usage_count` and `price` as recorded at
//! submission:
//!
//! - `n == 0`: the price is refunded as withdrawable credits
//! - burst, `n >= 1`: the occupant is paid `price * n` as deposits
//! - timed, `n >= 1`: the occupant keeps their own deposit in full;
//!   earnings beyond it pay `(earned - price) * 9 / 10` to the occupant
//!   and `(earned - price) / 10` to the fee pool, with truncating
//!   division, multiplication first
//!
//! All amounts are unsigned and all arithmetic saturates.
//!
//! # Example
//!
//! ```rust
//! use hotseat_core::ledger::{BalanceLedger, BalancePool, MemoryLedger};
//! use hotseat_core::rotation::{ClaimOutcome, ClaimRequest, Slot, TenureKind};
//! use hotseat_core::ClaimantId;
//!
//! let mut ledger = MemoryLedger::new();
//! let alice = ClaimantId::new("alice");
//! ledger.credit(&alice, 1_000, BalancePool::Credits);
//!
//! let mut slot = Slot::new();
//! let outcome = slot
//!     .submit_claim(
//!         &mut ledger,
//!         ClaimRequest {
//!             claimant: alice.clone(),
//!             kind: TenureKind::Burst,
//!             funding: BalancePool::Credits,
//!             price: 100,
//!             premium: 0,
//!             exclusive_only: false,
//!         },
//!         1,  // logical clock
//!         50, // tenure length in ticks
//!     )
//!     .unwrap();
//!
//! assert!(matches!(outcome, ClaimOutcome::Seated { .. }));
//! assert_eq!(slot.status(1).occupant.unwrap().owner, alice);
//! ```

mod error;
mod slot;
mod state;


pub use error::RotationError;
pub use slot::Slot;
pub use state::{
    ActiveTenure, ClaimOutcome, ClaimRecord, ClaimRequest, ClaimStatus, OccupantStatus,
    SlotStatus, TenureKind, TenureSettlement, WithdrawOutcome, BURST_USAGE_LIMIT,
    MAX_TRACKED_CLAIMS, TIMED_PAYOUT_NUMERATOR, TIMED_ROYALTY_DIVISOR,
};
