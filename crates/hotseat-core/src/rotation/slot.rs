//! The slot state machine: seating, queueing, expiry, and settlement.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::claimant::ClaimantId;
use crate::ledger::{BalanceLedger, BalancePool};
use crate::queue::PremiumQueue;

use super::error::RotationError;
use super::state::{
    ActiveTenure, ClaimOutcome, ClaimRecord, ClaimRequest, ClaimStatus, OccupantStatus,
    SlotStatus, TenureKind, TenureSettlement, WithdrawOutcome, BURST_USAGE_LIMIT,
    MAX_TRACKED_CLAIMS, TIMED_PAYOUT_NUMERATOR, TIMED_ROYALTY_DIVISOR,
};

/// A single-occupant contention domain: one seat, a premium-ordered queue
/// of waiting claims, and the records backing both.
///
/// All operations are synchronous and run to completion. A slot is not
/// safe for concurrent mutation; hosts in concurrent environments must
/// serialize operations per slot. The logical clock (`now`) is supplied by
/// the caller on every mutating call and must be non-decreasing across
/// calls.
///
/// Expired tenures are settled lazily: every mutating operation first
/// checks whether the occupant's tenure is due and, if so, settles it and
/// promotes the highest-premium waiter before doing its own work. A due
/// tenure is therefore never observable through a mutating operation,
/// only through [`Slot::status`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SlotSnapshot", into = "SlotSnapshot")]
pub struct Slot {
    active: Option<ActiveTenure>,
    pending: PremiumQueue,
    records: HashMap<ClaimantId, ClaimRecord>,
}

impl Slot {
    /// Creates a vacant slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current occupant's tenure, if the slot is occupied.
    #[must_use]
    pub const fn occupant(&self) -> Option<&ActiveTenure> {
        self.active.as_ref()
    }

    /// The queue of waiting claims.
    #[must_use]
    pub const fn pending(&self) -> &PremiumQueue {
        &self.pending
    }

    /// The claim record for a claimant, if they hold a live claim.
    #[must_use]
    pub fn record(&self, claimant: &ClaimantId) -> Option<&ClaimRecord> {
        self.records.get(claimant)
    }

    /// Submits a claim on the slot.
    ///
    /// After lazy expiry of the current tenure, a claim on a vacant slot
    /// seats immediately with `usage_count` starting at 1: the seating
    /// claim counts toward the claimant's own earnings, since no
    /// predecessor was paid. A claim on an occupied slot lands on the
    /// occupant's tenure (incrementing its usage, which may itself end a
    /// burst tenure) and then joins the queue, unless the landing ended
    /// the tenure with nobody waiting, in which case the submitter seats
    /// directly at `usage_count` 0.
    ///
    /// The price is debited from `request.funding`. The premium is debited
    /// from deposits and routed to the fee pool only if the claim actually
    /// joins the queue; it buys queue position, not slot access, and is
    /// never refunded. If the premium debit is declined, the already-taken
    /// price debit is credited straight back to its funding pool, so a
    /// rejected submission leaves every balance as it found it.
    ///
    /// # Errors
    ///
    /// - [`RotationError::DuplicateClaim`] if the claimant already holds a
    ///   live claim here.
    /// - [`RotationError::ExclusivityUnsatisfied`] if
    ///   `request.exclusive_only` is set and the slot is occupied after
    ///   lazy expiry.
    /// - [`RotationError::InsufficientFunds`] if the ledger declines the
    ///   price or premium debit.
    pub fn submit_claim(
        &mut self,
        ledger: &mut dyn BalanceLedger,
        request: ClaimRequest,
        now: u64,
        tenure_ticks: u64,
    ) -> Result<ClaimOutcome, RotationError> {
        if self.records.contains_key(&request.claimant) {
            return Err(RotationError::DuplicateClaim {
                claimant: request.claimant,
            });
        }
        self.expire_if_due(ledger, now, tenure_ticks)?;

        let Some(tenure) = self.active.clone() else {
            if !ledger.debit(&request.claimant, request.price, request.funding) {
                return Err(RotationError::InsufficientFunds {
                    claimant: request.claimant,
                    amount: request.price,
                    pool: request.funding,
                });
            }
            let expires_at = now.saturating_add(tenure_ticks);
            let record = ClaimRecord {
                kind: request.kind,
                funding: request.funding,
                price: request.price,
            };
            self.records.insert(request.claimant.clone(), record.clone());
            self.active = Some(ActiveTenure {
                owner: request.claimant.clone(),
                record,
                usage_count: 1,
                expires_at,
            });
            debug!(
                claimant = %request.claimant,
                kind = %request.kind,
                expires_at,
                "seated vacant slot"
            );
            return Ok(ClaimOutcome::Seated { expires_at });
        };

        if request.exclusive_only {
            return Err(RotationError::ExclusivityUnsatisfied {
                claimant: request.claimant,
                occupant: tenure.owner,
            });
        }

        // The submission lands on the occupant's tenure before the
        // submitter is placed, so whether the claim queues or seats is
        // known here, before any ledger effect.
        let will_rotate = match tenure.record.kind {
            TenureKind::Burst => tenure.usage_count.saturating_add(1) >= BURST_USAGE_LIMIT,
            TenureKind::Timed => now >= tenure.expires_at,
        };
        let will_enqueue = !will_rotate || !self.pending.is_empty();

        if !ledger.debit(&request.claimant, request.price, request.funding) {
            return Err(RotationError::InsufficientFunds {
                claimant: request.claimant,
                amount: request.price,
                pool: request.funding,
            });
        }
        if will_enqueue && request.premium > 0 {
            if !ledger.debit(&request.claimant, request.premium, BalancePool::Deposits) {
                ledger.credit(&request.claimant, request.price, request.funding);
                return Err(RotationError::InsufficientFunds {
                    claimant: request.claimant,
                    amount: request.premium,
                    pool: BalancePool::Deposits,
                });
            }
            ledger.route_to_fee_pool(request.premium);
        }

        if let Some(active) = self.active.as_mut() {
            active.usage_count = active.usage_count.saturating_add(1);
        }
        self.expire_if_due(ledger, now, tenure_ticks)?;

        let record = ClaimRecord {
            kind: request.kind,
            funding: request.funding,
            price: request.price,
        };
        if self.active.is_some() {
            self.records.insert(request.claimant.clone(), record);
            self.pending.insert(request.claimant.clone(), request.premium)?;
            debug!(
                claimant = %request.claimant,
                premium = request.premium,
                pending = self.pending.len(),
                "claim enqueued"
            );
            Ok(ClaimOutcome::Enqueued {
                pending: self.pending.len(),
            })
        } else {
            // The landing ended the previous tenure with an empty queue.
            // The submitter seats directly, but at usage 0: their price
            // already paid the predecessor, so no seating claim counts
            // toward their own earnings.
            let expires_at = now.saturating_add(tenure_ticks);
            self.records.insert(request.claimant.clone(), record.clone());
            self.active = Some(ActiveTenure {
                owner: request.claimant.clone(),
                record,
                usage_count: 0,
                expires_at,
            });
            debug!(claimant = %request.claimant, expires_at, "seated after ending previous tenure");
            Ok(ClaimOutcome::Seated { expires_at })
        }
    }

    /// Raises a waiting claim's queue premium by `delta`.
    ///
    /// The raise is debited from deposits and routed to the fee pool, like
    /// the original premium. The queue entry is removed and reinserted at
    /// the higher premium, so a raise that lands on an existing premium
    /// queues behind it. Queue membership never changes. Returns the new
    /// premium.
    ///
    /// # Errors
    ///
    /// - [`RotationError::CannotModifyActive`] if the claimant occupies
    ///   the seat after lazy expiry (the occupant has no queue entry).
    /// - [`RotationError::ClaimNotFound`] if the claimant holds no live
    ///   claim.
    /// - [`RotationError::InsufficientFunds`] if the ledger declines the
    ///   deposit debit.
    pub fn increase_premium(
        &mut self,
        ledger: &mut dyn BalanceLedger,
        claimant: &ClaimantId,
        delta: u64,
        now: u64,
        tenure_ticks: u64,
    ) -> Result<u64, RotationError> {
        self.expire_if_due(ledger, now, tenure_ticks)?;
        if self.active.as_ref().is_some_and(|t| &t.owner == claimant) {
            return Err(RotationError::CannotModifyActive {
                claimant: claimant.clone(),
            });
        }
        if !self.records.contains_key(claimant) {
            return Err(RotationError::ClaimNotFound {
                claimant: claimant.clone(),
            });
        }
        // A live non-occupant claim is always queued; confirm before the
        // debit lands.
        self.pending.get_by_key(claimant)?;

        if !ledger.debit(claimant, delta, BalancePool::Deposits) {
            return Err(RotationError::InsufficientFunds {
                claimant: claimant.clone(),
                amount: delta,
                pool: BalancePool::Deposits,
            });
        }
        ledger.route_to_fee_pool(delta);

        let premium = self.pending.increase_premium(claimant, delta)?;
        debug!(claimant = %claimant, premium, "queue premium raised");
        Ok(premium)
    }

    /// Withdraws a claim.
    ///
    /// A waiting claimant leaves the queue and their price is refunded as
    /// withdrawable credits, whichever pool originally funded it; their
    /// premium stays with the fee pool. A burst occupant vacates the seat
    /// by settling their tenure immediately, exactly as if it had expired
    /// with no further usage. A timed occupant cannot vacate before their
    /// deadline.
    ///
    /// # Errors
    ///
    /// - [`RotationError::ClaimNotFound`] if the claimant holds no live
    ///   claim, or their tenure was settled by lazy expiry during this
    ///   very call.
    /// - [`RotationError::CannotWithdrawTimedActive`] if the claimant is a
    ///   timed occupant whose deadline has not passed.
    pub fn withdraw_claim(
        &mut self,
        ledger: &mut dyn BalanceLedger,
        claimant: &ClaimantId,
        now: u64,
        tenure_ticks: u64,
    ) -> Result<WithdrawOutcome, RotationError> {
        if !self.records.contains_key(claimant) {
            return Err(RotationError::ClaimNotFound {
                claimant: claimant.clone(),
            });
        }
        self.expire_if_due(ledger, now, tenure_ticks)?;

        // Lazy expiry may have settled this very claimant's tenure.
        let Some(record) = self.records.get(claimant).cloned() else {
            return Err(RotationError::ClaimNotFound {
                claimant: claimant.clone(),
            });
        };

        let occupied_until = self
            .active
            .as_ref()
            .filter(|t| &t.owner == claimant)
            .map(|t| t.expires_at);
        if let Some(expires_at) = occupied_until {
            if record.kind == TenureKind::Timed {
                return Err(RotationError::CannotWithdrawTimedActive {
                    claimant: claimant.clone(),
                    expires_at,
                });
            }
            let settlement = self.rotate(ledger, now, tenure_ticks)?;
            return Ok(WithdrawOutcome::VacatedSeat { settlement });
        }

        self.pending.remove_by_key(claimant)?;
        ledger.credit(claimant, record.price, BalancePool::Credits);
        self.records.remove(claimant);
        debug!(claimant = %claimant, refunded = record.price, "waiter withdrew");
        Ok(WithdrawOutcome::LeftQueue {
            refunded: record.price,
        })
    }

    /// Settles the occupant's tenure if it is due at `now`, promoting the
    /// highest-premium waiter (or leaving the slot vacant).
    ///
    /// Expiry is lazy: it normally runs at the start of every mutating
    /// operation. This entry point lets hosts settle a due tenure without
    /// waiting for the next claim to land. Calling it when nothing is due
    /// returns `Ok(None)` and changes nothing; a due tenure settles at
    /// most once.
    ///
    /// # Errors
    ///
    /// Returns [`RotationError::CorruptState`] (or a queue error) only if
    /// the slot's own invariants do not hold.
    pub fn settle_if_due(
        &mut self,
        ledger: &mut dyn BalanceLedger,
        now: u64,
        tenure_ticks: u64,
    ) -> Result<Option<TenureSettlement>, RotationError> {
        self.expire_if_due(ledger, now, tenure_ticks)
    }

    /// Point-in-time view of the slot at logical time `now`.
    ///
    /// Read-only: a due tenure is reported with `expired = true` but is
    /// not settled here.
    #[must_use]
    pub fn status(&self, now: u64) -> SlotStatus {
        SlotStatus {
            pending_claims: self.pending.len(),
            front_premium: self.pending.peek_max().ok().map(|entry| entry.premium),
            occupant: self.active.as_ref().map(|tenure| OccupantStatus {
                owner: tenure.owner.clone(),
                kind: tenure.record.kind,
                usage_count: tenure.usage_count,
                expires_at: tenure.expires_at,
                expired: tenure.is_due(now),
            }),
        }
    }

    /// Point-in-time view of one claim, or `None` if the claimant holds no
    /// live claim.
    #[must_use]
    pub fn claim_status(&self, claimant: &ClaimantId) -> Option<ClaimStatus> {
        let record = self.records.get(claimant)?;
        Some(ClaimStatus {
            kind: record.kind,
            funding: record.funding,
            is_active: self.active.as_ref().is_some_and(|t| &t.owner == claimant),
            queued_premium: self
                .pending
                .get_by_key(claimant)
                .ok()
                .map(|entry| entry.premium),
        })
    }

    /// Checks the slot's cross-field invariants.
    ///
    /// Runs automatically when a slot is deserialized; hosts can also call
    /// it after restoring state through other means.
    ///
    /// # Errors
    ///
    /// Returns [`RotationError::CorruptState`] naming the first violated
    /// invariant.
    pub fn verify_integrity(&self) -> Result<(), RotationError> {
        if let Some(tenure) = &self.active {
            match self.records.get(&tenure.owner) {
                Some(record) if *record == tenure.record => {}
                Some(_) => {
                    return Err(RotationError::CorruptState {
                        detail: format!(
                            "occupant {} has a claim record that disagrees with their tenure",
                            tenure.owner
                        ),
                    });
                }
                None => {
                    return Err(RotationError::CorruptState {
                        detail: format!("occupant {} has no claim record", tenure.owner),
                    });
                }
            }
            if self.pending.contains(&tenure.owner) {
                return Err(RotationError::CorruptState {
                    detail: format!("occupant {} is also queued", tenure.owner),
                });
            }
        } else if !self.pending.is_empty() {
            return Err(RotationError::CorruptState {
                detail: "slot is vacant but claims are waiting".to_owned(),
            });
        }

        for entry in self.pending.entries() {
            if !self.records.contains_key(&entry.claimant) {
                return Err(RotationError::CorruptState {
                    detail: format!("queued claimant {} has no claim record", entry.claimant),
                });
            }
        }

        let live = self.pending.len() + usize::from(self.active.is_some());
        if self.records.len() != live {
            return Err(RotationError::CorruptState {
                detail: format!(
                    "{} claim records for {live} live claims",
                    self.records.len()
                ),
            });
        }
        Ok(())
    }

    /// Settles the occupant's tenure if due. Returns the settlement, or
    /// `None` if nothing was due.
    fn expire_if_due(
        &mut self,
        ledger: &mut dyn BalanceLedger,
        now: u64,
        tenure_ticks: u64,
    ) -> Result<Option<TenureSettlement>, RotationError> {
        if self.active.as_ref().is_some_and(|tenure| tenure.is_due(now)) {
            return self.rotate(ledger, now, tenure_ticks).map(Some);
        }
        Ok(None)
    }

    /// Ends the current tenure unconditionally: pays the outgoing occupant
    /// per the settlement rules and seats the highest-premium waiter, or
    /// leaves the slot vacant if none are waiting.
    fn rotate(
        &mut self,
        ledger: &mut dyn BalanceLedger,
        now: u64,
        tenure_ticks: u64,
    ) -> Result<TenureSettlement, RotationError> {
        let Some(outgoing) = self.active.take() else {
            return Err(RotationError::CorruptState {
                detail: "rotation requested on a vacant slot".to_owned(),
            });
        };
        self.records.remove(&outgoing.owner);

        let price = outgoing.record.price;
        let usage = outgoing.usage_count;
        let mut deposits_paid = 0;
        let mut credits_refunded = 0;
        let mut fee_routed = 0;
        if usage == 0 {
            // No claim ever landed on this tenure; the price returns as
            // withdrawable credits.
            if outgoing.record.kind == TenureKind::Timed {
                warn!(owner = %outgoing.owner, "timed tenure settled with zero usage");
            }
            ledger.credit(&outgoing.owner, price, BalancePool::Credits);
            credits_refunded = price;
        } else {
            let earned = price.saturating_mul(usage);
            match outgoing.record.kind {
                TenureKind::Burst => {
                    ledger.credit(&outgoing.owner, earned, BalancePool::Deposits);
                    deposits_paid = earned;
                }
                TenureKind::Timed => {
                    // The occupant keeps their own deposit in full;
                    // earnings beyond it split 9:1 with the fee pool,
                    // truncating, multiplication first.
                    let beyond = earned.saturating_sub(price);
                    let fee = beyond / TIMED_ROYALTY_DIVISOR;
                    let payout = price.saturating_add(
                        beyond.saturating_mul(TIMED_PAYOUT_NUMERATOR) / TIMED_ROYALTY_DIVISOR,
                    );
                    ledger.credit(&outgoing.owner, payout, BalancePool::Deposits);
                    ledger.route_to_fee_pool(fee);
                    deposits_paid = payout;
                    fee_routed = fee;
                }
            }
        }

        let promoted = if self.pending.is_empty() {
            None
        } else {
            let next = self.pending.extract_max()?;
            let record = self.records.get(&next.claimant).cloned().ok_or_else(|| {
                RotationError::CorruptState {
                    detail: format!("promoted claimant {} has no claim record", next.claimant),
                }
            })?;
            self.active = Some(ActiveTenure {
                owner: next.claimant.clone(),
                record,
                usage_count: 0,
                expires_at: now.saturating_add(tenure_ticks),
            });
            Some(next.claimant)
        };

        let settlement = TenureSettlement {
            outgoing: outgoing.owner,
            kind: outgoing.record.kind,
            usage_count: usage,
            deposits_paid,
            credits_refunded,
            fee_routed,
            promoted,
        };
        debug!(
            outgoing = %settlement.outgoing,
            kind = %settlement.kind,
            usage = settlement.usage_count,
            deposits_paid = settlement.deposits_paid,
            credits_refunded = settlement.credits_refunded,
            fee_routed = settlement.fee_routed,
            promoted = ?settlement.promoted,
            "tenure settled"
        );
        Ok(settlement)
    }
}

/// Plain serialized form of a [`Slot`]. Loading runs the full integrity
/// check, so a snapshot only deserializes into states the operations
/// themselves could have produced.
#[derive(Serialize, Deserialize)]
struct SlotSnapshot {
    active: Option<ActiveTenure>,
    pending: PremiumQueue,
    records: HashMap<ClaimantId, ClaimRecord>,
}

impl TryFrom<SlotSnapshot> for Slot {
    type Error = RotationError;

    fn try_from(snapshot: SlotSnapshot) -> Result<Self, RotationError> {
        if snapshot.records.len() > MAX_TRACKED_CLAIMS {
            return Err(RotationError::CorruptState {
                detail: format!(
                    "{} claim records exceed the maximum of {MAX_TRACKED_CLAIMS}",
                    snapshot.records.len()
                ),
            });
        }
        let slot = Self {
            active: snapshot.active,
            pending: snapshot.pending,
            records: snapshot.records,
        };
        slot.verify_integrity()?;
        Ok(slot)
    }
}

impl From<Slot> for SlotSnapshot {
    fn from(slot: Slot) -> Self {
        Self {
            active: slot.active,
            pending: slot.pending,
            records: slot.records,
        }
    }
}
