//! Directory of slots keyed by an opaque host identifier.
//!
//! Hosts that manage many contention domains keep one [`Slot`] per key in
//! a [`SlotRegistry`]. How a key is derived from human-facing parameters
//! is the host's concern; the registry only requires that equal keys mean
//! the same slot.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rotation::Slot;

/// Opaque identifier for one contention domain.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotKey(String);

impl SlotKey {
    /// Creates a slot key from any string-like value.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SlotKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

impl From<String> for SlotKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// All slots a host manages, in stable key order.
///
/// Slots are created vacant on first use and never removed: a slot with
/// no occupant and no waiters holds no funds and is equivalent to one
/// that was never opened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotRegistry {
    slots: BTreeMap<SlotKey, Slot>,
}

impl SlotRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for `key`, creating it vacant if absent.
    pub fn open(&mut self, key: SlotKey) -> &mut Slot {
        self.slots.entry(key).or_default()
    }

    /// Returns the slot for `key`, if it was ever opened.
    #[must_use]
    pub fn get(&self, key: &SlotKey) -> Option<&Slot> {
        self.slots.get(key)
    }

    /// Returns the slot for `key` mutably, if it was ever opened.
    pub fn get_mut(&mut self, key: &SlotKey) -> Option<&mut Slot> {
        self.slots.get_mut(key)
    }

    /// Number of opened slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no slot was ever opened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates over all opened slots in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, &Slot)> {
        self.slots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_a_vacant_slot_once() {
        let mut registry = SlotRegistry::new();
        assert!(registry.get(&SlotKey::new("combo-1")).is_none());

        let slot = registry.open(SlotKey::new("combo-1"));
        assert!(slot.occupant().is_none());
        assert_eq!(registry.len(), 1);

        registry.open(SlotKey::new("combo-1"));
        assert_eq!(registry.len(), 1, "reopening must not create a second slot");
    }

    #[test]
    fn test_registry_iterates_in_key_order() {
        let mut registry = SlotRegistry::new();
        registry.open(SlotKey::new("b"));
        registry.open(SlotKey::new("a"));
        let keys: Vec<&str> = registry.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_registry_round_trips_through_serde() {
        let mut registry = SlotRegistry::new();
        registry.open(SlotKey::new("combo-1"));
        let json = serde_json::to_string(&registry).unwrap();
        let restored: SlotRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, registry);
    }
}
