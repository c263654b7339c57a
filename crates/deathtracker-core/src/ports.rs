//! Outbound collaborators the engine calls into.
//!
//! The host supplies implementations. Both traits are invoked while the
//! engine holds its state lock, so implementations must not call back into
//! the [`DeathTracker`](crate::engine::DeathTracker).

use deathtracker_logic::PlayerId;

/// Result of a withdrawal against the economy backend.
#[derive(Debug, Clone, PartialEq)]
pub enum WithdrawOutcome {
    /// Funds were taken.
    Completed,
    /// The player could not cover the amount.
    InsufficientFunds,
    /// The backend failed for another reason (unavailable, rejected, ...).
    Failed(String),
}

impl WithdrawOutcome {
    /// Both failure kinds count as a failed penalty.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl From<bool> for WithdrawOutcome {
    fn from(success: bool) -> Self {
        if success {
            Self::Completed
        } else {
            Self::InsufficientFunds
        }
    }
}

/// External economic ledger. Only withdrawals are needed.
pub trait EconomyLedger: Send + Sync {
    /// Withdraw `amount` from the player. Blocks until the backend answers.
    fn withdraw(&self, player: &PlayerId, amount: f64) -> WithdrawOutcome;
}

/// Player-facing side effects on the host.
pub trait PlayerSessions: Send + Sync {
    /// Deliver a text message to one player.
    fn message(&self, player: &PlayerId, text: &str);

    /// Forcibly end the player's session with a reason.
    fn kick(&self, player: &PlayerId, reason: &str);
}
