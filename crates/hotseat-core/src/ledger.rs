//! Balance-accounting interface consumed by the rotation protocol.
//!
//! The protocol never holds funds itself: every debit, credit, and fee
//! routing is delegated to a host-supplied [`BalanceLedger`]. The ledger
//! tracks two pools per claimant:
//!
//! - **Credits**: withdrawable balance; refunds always land here
//! - **Deposits**: committed balance; settlements and premiums draw from
//!   and pay into this pool
//!
//! [`MemoryLedger`] is the in-process reference implementation, suitable
//! for tests and single-process hosts. Hosts backed by real value transfer
//! implement [`BalanceLedger`] over their own accounting.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::claimant::ClaimantId;

/// The two balance pools a claimant holds with the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancePool {
    /// Withdrawable balance. Refunds are always credited here.
    Credits,
    /// Committed balance. Premiums are always debited from here, and
    /// tenure settlements pay out here.
    Deposits,
}

impl BalancePool {
    /// Returns the pool name used in logs and messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Credits => "credits",
            Self::Deposits => "deposits",
        }
    }
}

impl std::fmt::Display for BalancePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host-supplied balance accounting.
///
/// Credits and fee routing are infallible from the protocol's point of
/// view: once all preconditions have passed, the host must be able to
/// record them. Debits are the only fallible operation, and the protocol
/// sequences every debit after all other checks that could still fail.
pub trait BalanceLedger {
    /// Adds `amount` to `owner`'s balance in `pool`.
    fn credit(&mut self, owner: &ClaimantId, amount: u64, pool: BalancePool);

    /// Removes `amount` from `owner`'s balance in `pool`.
    ///
    /// Returns `false` (and must leave the balance untouched) if the
    /// owner cannot cover the amount.
    #[must_use]
    fn debit(&mut self, owner: &ClaimantId, amount: u64, pool: BalancePool) -> bool;

    /// Routes `amount` to the protocol fee pool.
    ///
    /// Fee-pool funds belong to no claimant; the host decides what the
    /// pool ultimately pays for.
    fn route_to_fee_pool(&mut self, amount: u64);
}

/// Per-claimant balances held by [`MemoryLedger`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalances {
    /// Withdrawable balance.
    pub credits: u64,
    /// Committed balance.
    pub deposits: u64,
}

impl AccountBalances {
    fn pool_mut(&mut self, pool: BalancePool) -> &mut u64 {
        match pool {
            BalancePool::Credits => &mut self.credits,
            BalancePool::Deposits => &mut self.deposits,
        }
    }

    const fn pool(&self, pool: BalancePool) -> u64 {
        match pool {
            BalancePool::Credits => self.credits,
            BalancePool::Deposits => self.deposits,
        }
    }
}

/// In-memory [`BalanceLedger`] for tests and single-process hosts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryLedger {
    accounts: HashMap<ClaimantId, AccountBalances>,
    fee_pool: u64,
}

impl MemoryLedger {
    /// Creates an empty ledger with no accounts and an empty fee pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `owner`'s balance in `pool` (zero for unknown owners).
    #[must_use]
    pub fn balance(&self, owner: &ClaimantId, pool: BalancePool) -> u64 {
        self.accounts.get(owner).map_or(0, |b| b.pool(pool))
    }

    /// Returns the accumulated fee-pool balance.
    #[must_use]
    pub const fn fee_pool(&self) -> u64 {
        self.fee_pool
    }
}

impl BalanceLedger for MemoryLedger {
    fn credit(&mut self, owner: &ClaimantId, amount: u64, pool: BalancePool) {
        let balances = self.accounts.entry(owner.clone()).or_default();
        let slot = balances.pool_mut(pool);
        *slot = slot.saturating_add(amount);
    }

    fn debit(&mut self, owner: &ClaimantId, amount: u64, pool: BalancePool) -> bool {
        let Some(balances) = self.accounts.get_mut(owner) else {
            return amount == 0;
        };
        let slot = balances.pool_mut(pool);
        match slot.checked_sub(amount) {
            Some(remaining) => {
                *slot = remaining;
                true
            }
            None => false,
        }
    }

    fn route_to_fee_pool(&mut self, amount: u64) {
        self.fee_pool = self.fee_pool.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> ClaimantId {
        ClaimantId::new("alice")
    }

    #[test]
    fn test_credit_then_debit_round_trips() {
        let mut ledger = MemoryLedger::new();
        ledger.credit(&alice(), 500, BalancePool::Deposits);
        assert!(ledger.debit(&alice(), 200, BalancePool::Deposits));
        assert_eq!(ledger.balance(&alice(), BalancePool::Deposits), 300);
    }

    #[test]
    fn test_debit_declines_without_touching_balance() {
        let mut ledger = MemoryLedger::new();
        ledger.credit(&alice(), 100, BalancePool::Credits);
        assert!(!ledger.debit(&alice(), 101, BalancePool::Credits));
        assert_eq!(ledger.balance(&alice(), BalancePool::Credits), 100);
    }

    #[test]
    fn test_pools_are_independent() {
        let mut ledger = MemoryLedger::new();
        ledger.credit(&alice(), 100, BalancePool::Credits);
        assert!(!ledger.debit(&alice(), 1, BalancePool::Deposits));
        assert!(ledger.debit(&alice(), 100, BalancePool::Credits));
    }

    #[test]
    fn test_zero_debit_succeeds_for_unknown_owner() {
        let mut ledger = MemoryLedger::new();
        assert!(ledger.debit(&alice(), 0, BalancePool::Deposits));
        assert!(!ledger.debit(&alice(), 1, BalancePool::Deposits));
    }

    #[test]
    fn test_fee_pool_accumulates() {
        let mut ledger = MemoryLedger::new();
        ledger.route_to_fee_pool(30);
        ledger.route_to_fee_pool(12);
        assert_eq!(ledger.fee_pool(), 42);
    }
}
