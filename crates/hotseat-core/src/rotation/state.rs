//! Rotation state types.
//!
//! A slot's state splits into the immutable facts of each claim
//! ([`ClaimRecord`], kept for the occupant and every waiter) and the
//! mutable tenure of whoever currently occupies the seat
//! ([`ActiveTenure`]). The remaining types are call arguments, outcome
//! reports, and query snapshots.

use serde::{Deserialize, Serialize};

use crate::claimant::ClaimantId;
use crate::ledger::BalancePool;
use crate::queue::MAX_PENDING_CLAIMS;

/// Number of claims landing on a burst occupant (its own included) that
/// ends its tenure.
pub const BURST_USAGE_LIMIT: u64 = 2;

/// Divisor of the timed-tenure royalty split.
pub const TIMED_ROYALTY_DIVISOR: u64 = 10;

/// Numerator of the share the outgoing timed occupant keeps from earnings
/// beyond their own deposit. The remainder (one part in
/// [`TIMED_ROYALTY_DIVISOR`]) is routed to the fee pool.
pub const TIMED_PAYOUT_NUMERATOR: u64 = 9;

/// Maximum number of claim records accepted when loading a persisted
/// slot: every waiter plus at most one occupant.
pub const MAX_TRACKED_CLAIMS: usize = MAX_PENDING_CLAIMS + 1;

/// How a tenure ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenureKind {
    /// Ends once [`BURST_USAGE_LIMIT`] claims (the occupant's own
    /// included) have landed on the slot.
    Burst,
    /// Ends once the logical clock reaches the deadline fixed at seating.
    Timed,
}

impl TenureKind {
    /// Returns the kind name used in logs and messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Burst => "burst",
            Self::Timed => "timed",
        }
    }
}

impl std::fmt::Display for TenureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable facts of a claim, fixed at submission.
///
/// One record exists per live claim: the occupant's and one per waiter.
/// Records are deleted when their claim settles or is withdrawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// How the claimant's tenure will end once seated.
    pub kind: TenureKind,
    /// The pool the claim price was debited from. Decides nothing after
    /// submission; retained for queries and host audit.
    pub funding: BalancePool,
    /// The price paid at submission. Settlement earnings and withdrawal
    /// refunds are both computed from this amount.
    pub price: u64,
}

/// The mutable tenure of the current occupant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTenure {
    /// Who holds the seat.
    pub owner: ClaimantId,
    /// The occupant's claim record, copied at seating.
    pub record: ClaimRecord,
    /// Claims that have landed on the slot during this tenure. Starts at 1
    /// for a claimant who seated a vacant slot, 0 for a promoted waiter.
    pub usage_count: u64,
    /// Deadline fixed at seating. Only consulted for timed tenures.
    pub expires_at: u64,
}

impl ActiveTenure {
    /// Returns `true` if this tenure is due to end at `now`.
    #[must_use]
    pub const fn is_due(&self, now: u64) -> bool {
        match self.record.kind {
            TenureKind::Burst => self.usage_count >= BURST_USAGE_LIMIT,
            TenureKind::Timed => now >= self.expires_at,
        }
    }
}

/// Arguments of a claim submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequest {
    /// The submitting claimant. Must not already hold a live claim on the
    /// slot.
    pub claimant: ClaimantId,
    /// How the tenure ends once the claimant is seated.
    pub kind: TenureKind,
    /// The pool to debit the price from.
    pub funding: BalancePool,
    /// The price of slot access. Escrowed against the claim and paid back
    /// out at settlement or withdrawal.
    pub price: u64,
    /// The bid for queue position, debited from deposits and routed to the
    /// fee pool if the claim has to wait. Never refunded. A claim that
    /// seats immediately takes no queue position and is not charged.
    pub premium: u64,
    /// Refuse to wait: fail the submission unless the claimant can be
    /// seated immediately.
    pub exclusive_only: bool,
}

/// How a submission landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOutcome {
    /// The claimant occupies the seat.
    Seated {
        /// The tenure deadline (consulted only for timed tenures).
        expires_at: u64,
    },
    /// The claimant is waiting in the premium queue.
    Enqueued {
        /// Queue length after the insertion.
        pending: usize,
    },
}

/// How a withdrawal landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawOutcome {
    /// The claimant left the queue and their price came back as credits.
    LeftQueue {
        /// The refunded amount.
        refunded: u64,
    },
    /// The claimant was the occupant; their tenure settled immediately.
    VacatedSeat {
        /// The settlement that ended the tenure.
        settlement: TenureSettlement,
    },
}

/// Report of one tenure ending: who left, what the ledger recorded, and
/// who (if anyone) was promoted into the seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenureSettlement {
    /// The outgoing occupant.
    pub outgoing: ClaimantId,
    /// The outgoing tenure's kind.
    pub kind: TenureKind,
    /// Claims that landed during the tenure, including the occupant's own.
    pub usage_count: u64,
    /// Amount credited to the outgoing occupant as deposits.
    pub deposits_paid: u64,
    /// Amount credited to the outgoing occupant as withdrawable credits.
    /// Non-zero only for the zero-usage refund.
    pub credits_refunded: u64,
    /// Amount routed to the fee pool.
    pub fee_routed: u64,
    /// The waiter promoted into the seat, or `None` if the slot went
    /// vacant.
    pub promoted: Option<ClaimantId>,
}

/// Point-in-time view of a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotStatus {
    /// Number of waiting claims.
    pub pending_claims: usize,
    /// Premium of the next claim to be promoted, if any are waiting.
    pub front_premium: Option<u64>,
    /// The current occupant, or `None` if the slot is vacant.
    pub occupant: Option<OccupantStatus>,
}

/// Point-in-time view of the occupant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupantStatus {
    /// Who holds the seat.
    pub owner: ClaimantId,
    /// How the tenure ends.
    pub kind: TenureKind,
    /// Claims landed during this tenure.
    pub usage_count: u64,
    /// The tenure deadline (consulted only for timed tenures).
    pub expires_at: u64,
    /// Whether the tenure is due to end at the queried clock value. A due
    /// tenure settles on the next mutating call.
    pub expired: bool,
}

/// Point-in-time view of one claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimStatus {
    /// How the claimant's tenure ends once seated.
    pub kind: TenureKind,
    /// The pool the claim price was debited from.
    pub funding: BalancePool,
    /// Whether the claimant currently occupies the seat.
    pub is_active: bool,
    /// The claimant's queued premium, or `None` if they hold the seat.
    pub queued_premium: Option<u64>,
}
