//! Claimant identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier for a party competing for slot occupancy.
///
/// Claimant IDs are supplied by the host (an account address in typical
/// deployments) and are never interpreted by this crate beyond equality
/// and hashing. They must be stable for the lifetime of a claim: the same
/// ID funds the claim, waits in the queue, and receives the settlement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimantId(String);

impl ClaimantId {
    /// Creates a claimant ID from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClaimantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClaimantId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ClaimantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claimant_id_round_trips_through_serde() {
        let id = ClaimantId::new("wallet-7f3a");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"wallet-7f3a\"");
        let back: ClaimantId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_claimant_id_display_matches_inner() {
        let id = ClaimantId::from("alice");
        assert_eq!(id.to_string(), "alice");
        assert_eq!(id.as_str(), "alice");
    }
}
