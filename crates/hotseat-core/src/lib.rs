//! # hotseat-core
//!
//! Bid-ordered rotation of a single-occupant slot.
//!
//! A slot is a scarce resource exactly one claimant occupies at a time.
//! Everyone else waits in a premium-ordered queue, and when the occupant's
//! tenure ends (by usage count or by the logical clock) the
//! highest-premium waiter takes the seat and the outgoing occupant is paid
//! their accumulated earnings.
//!
//! ## Core Concepts
//!
//! - **Slot**: one contention domain with one seat and one queue
//!   ([`rotation::Slot`], many of them in a [`registry::SlotRegistry`])
//! - **Claim**: a priced request for the seat; waiting claims bid a
//!   premium for queue position ([`queue::PremiumQueue`])
//! - **Tenure**: one continuous occupancy, burst-limited or time-limited
//!   ([`rotation::TenureKind`])
//! - **Settlement**: the payout when a tenure ends, delegated to a
//!   host-supplied [`ledger::BalanceLedger`]
//!
//! The crate is strictly synchronous and single-writer per slot: every
//! operation takes the caller's logical clock and runs to completion.
//! Hosts own durability, value transfer, and access control.
//!
//! ## Example
//!
//! ```rust
//! use hotseat_core::prelude::*;
//!
//! let mut ledger = MemoryLedger::new();
//! let alice = ClaimantId::new("alice");
//! let bob = ClaimantId::new("bob");
//! ledger.credit(&alice, 500, BalancePool::Credits);
//! ledger.credit(&bob, 500, BalancePool::Credits);
//!
//! let mut slot = Slot::new();
//!
//! // alice seats the vacant slot; her own claim counts toward her
//! // earnings.
//! slot.submit_claim(
//!     &mut ledger,
//!     ClaimRequest {
//!         claimant: alice.clone(),
//!         kind: TenureKind::Burst,
//!         funding: BalancePool::Credits,
//!         price: 100,
//!         premium: 0,
//!         exclusive_only: false,
//!     },
//!     1,  // logical clock
//!     50, // tenure length in ticks
//! )
//! .unwrap();
//!
//! // bob's claim lands on alice's burst tenure and ends it: alice is
//! // paid price * 2 as deposits and bob takes the seat.
//! slot.submit_claim(
//!     &mut ledger,
//!     ClaimRequest {
//!         claimant: bob.clone(),
//!         kind: TenureKind::Burst,
//!         funding: BalancePool::Credits,
//!         price: 100,
//!         premium: 0,
//!         exclusive_only: false,
//!     },
//!     2,
//!     50,
//! )
//! .unwrap();
//!
//! assert_eq!(ledger.balance(&alice, BalancePool::Deposits), 200);
//! assert_eq!(slot.status(2).occupant.unwrap().owner, bob);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod claimant;
pub mod ledger;
pub mod queue;
pub mod registry;
pub mod rotation;

// Re-export main types at crate root for convenience
pub use claimant::ClaimantId;
pub use ledger::{AccountBalances, BalanceLedger, BalancePool, MemoryLedger};
pub use queue::{PremiumQueue, QueueEntry, QueueError, MAX_PENDING_CLAIMS};
pub use registry::{SlotKey, SlotRegistry};
pub use rotation::{
    ClaimOutcome, ClaimRequest, ClaimStatus, RotationError, Slot, SlotStatus, TenureKind,
    TenureSettlement, WithdrawOutcome,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::claimant::ClaimantId;
    pub use crate::ledger::{BalanceLedger, BalancePool, MemoryLedger};
    pub use crate::queue::{PremiumQueue, QueueEntry, QueueError};
    pub use crate::registry::{SlotKey, SlotRegistry};
    pub use crate::rotation::{
        ClaimOutcome, ClaimRequest, ClaimStatus, RotationError, Slot, SlotStatus, TenureKind,
        TenureSettlement, WithdrawOutcome,
    };
}
