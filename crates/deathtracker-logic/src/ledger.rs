//! Per-player death counters.
//!
//! Absence of an entry means zero deaths. Entries are created lazily on the
//! first death and only ever removed by a reset.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::player::PlayerId;

/// Authoritative death count per player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeathLedger {
    counts: BTreeMap<PlayerId, u64>,
}

impl DeathLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the player's counter and return the new value.
    pub fn record_death(&mut self, player: &PlayerId) -> u64 {
        let count = self.counts.entry(player.clone()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Current count; 0 for players never seen.
    pub fn death_count(&self, player: &str) -> u64 {
        self.counts.get(player).copied().unwrap_or(0)
    }

    /// Clear every counter.
    pub fn reset_all(&mut self) {
        self.counts.clear();
    }

    /// Clear one player's counter. Returns whether an entry existed.
    pub fn reset_player(&mut self, player: &str) -> bool {
        self.counts.remove(player).is_some()
    }

    /// Number of players with at least one recorded death.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unseen_player_has_zero_deaths() {
        let ledger = DeathLedger::new();
        assert_eq!(ledger.death_count("nobody"), 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_record_death_counts_calls() {
        let mut ledger = DeathLedger::new();
        let p = PlayerId::from("p");
        let mut last = 0;
        for expected in 1..=10 {
            let count = ledger.record_death(&p);
            assert_eq!(count, expected);
            assert!(count > last);
            last = count;
        }
        assert_eq!(ledger.death_count("p"), 10);
    }

    #[test]
    fn test_counters_are_per_player() {
        let mut ledger = DeathLedger::new();
        ledger.record_death(&PlayerId::from("a"));
        ledger.record_death(&PlayerId::from("a"));
        ledger.record_death(&PlayerId::from("b"));
        assert_eq!(ledger.death_count("a"), 2);
        assert_eq!(ledger.death_count("b"), 1);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_reset_all() {
        let mut ledger = DeathLedger::new();
        ledger.record_death(&PlayerId::from("a"));
        ledger.record_death(&PlayerId::from("b"));
        ledger.reset_all();
        assert_eq!(ledger.death_count("a"), 0);
        assert_eq!(ledger.death_count("b"), 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_reset_player_leaves_others() {
        let mut ledger = DeathLedger::new();
        ledger.record_death(&PlayerId::from("a"));
        ledger.record_death(&PlayerId::from("b"));
        assert!(ledger.reset_player("a"));
        assert!(!ledger.reset_player("a"));
        assert_eq!(ledger.death_count("a"), 0);
        assert_eq!(ledger.death_count("b"), 1);
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let mut ledger = DeathLedger::new();
        ledger.record_death(&PlayerId::from("x"));
        ledger.record_death(&PlayerId::from("x"));
        let json = serde_json::to_string(&ledger).unwrap();
        assert_eq!(json, r#"{"x":2}"#);
        let back: DeathLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ledger);
    }
}
