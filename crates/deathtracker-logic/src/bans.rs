//! Ban registry — the set of permanently excluded players.
//!
//! Membership is binary and idempotent. Iteration follows insertion order,
//! which is also the on-disk order.

use serde::{Deserialize, Serialize};

use crate::player::PlayerId;

/// Insertion-ordered set of banned player ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PlayerId>", into = "Vec<PlayerId>")]
pub struct BanRegistry {
    banned: Vec<PlayerId>,
}

impl BanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player. Returns `false` if they were already banned.
    pub fn ban(&mut self, player: &PlayerId) -> bool {
        if self.is_banned(player.as_str()) {
            return false;
        }
        self.banned.push(player.clone());
        true
    }

    /// Remove a player. Returns whether a removal occurred.
    pub fn unban(&mut self, player: &str) -> bool {
        match self.banned.iter().position(|id| id.as_str() == player) {
            Some(index) => {
                self.banned.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn is_banned(&self, player: &str) -> bool {
        self.banned.iter().any(|id| id.as_str() == player)
    }

    /// Banned ids in insertion order.
    pub fn list(&self) -> &[PlayerId] {
        &self.banned
    }

    pub fn clear(&mut self) {
        self.banned.clear();
    }

    pub fn len(&self) -> usize {
        self.banned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banned.is_empty()
    }
}

impl From<Vec<PlayerId>> for BanRegistry {
    /// Duplicates in stored data collapse to their first occurrence.
    fn from(ids: Vec<PlayerId>) -> Self {
        let mut registry = Self::new();
        for id in &ids {
            registry.ban(id);
        }
        registry
    }
}

impl From<BanRegistry> for Vec<PlayerId> {
    fn from(registry: BanRegistry) -> Self {
        registry.banned
    }
}
