//! Threshold decision for death events.
//!
//! Every player gets `default_lives` free deaths. Starting with death number
//! `default_lives + 1`, each death triggers exactly one withdrawal attempt of
//! `penalty_amount`. A successful withdrawal keeps the player in play; a
//! failed one excludes them.
//!
//! ```
//! use deathtracker_logic::enforcement::{evaluate_death, resolve_withdrawal, Resolution, Verdict};
//! use deathtracker_logic::Config;
//!
//! let config = Config::default(); // 3 lives
//! assert_eq!(evaluate_death(3, false, &config), Verdict::Allow { lives_remaining: 0 });
//! assert_eq!(evaluate_death(4, false, &config), Verdict::Penalize { amount: 100.0 });
//! assert_eq!(resolve_withdrawal(false), Resolution::Excluded);
//! ```

use crate::config::Config;

/// What the engine must do after recording a death.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Within the allowance; no action.
    Allow { lives_remaining: u64 },
    /// Allowance exceeded; attempt one withdrawal of `amount`.
    Penalize { amount: f64 },
    /// Player is already banned; enforcement is skipped.
    AlreadyExcluded,
}

/// Outcome of a penalty once the ledger has answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Withdrawal succeeded; the player stays in play.
    Penalized,
    /// Withdrawal failed; the player is banned and disconnected.
    Excluded,
}

/// A player's position in the lives state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    /// Death count within the allowance.
    Alive,
    /// Allowance exhausted but not banned; every further death costs money.
    Penalized,
    /// Banned. Only an explicit unban leaves this state.
    Excluded,
}

/// `max(0, default_lives - death_count)`.
pub fn lives_remaining(death_count: u64, default_lives: u32) -> u64 {
    u64::from(default_lives).saturating_sub(death_count)
}

/// Whether a post-increment death count crosses the allowance.
///
/// The threshold is strict: with 3 lives, death #3 is free and death #4
/// is the first to be penalized.
pub fn exceeds_allowance(death_count: u64, default_lives: u32) -> bool {
    death_count > u64::from(default_lives)
}

/// Decide what to do for a death that brought the count to `death_count`.
pub fn evaluate_death(death_count: u64, already_banned: bool, config: &Config) -> Verdict {
    if already_banned {
        return Verdict::AlreadyExcluded;
    }
    if exceeds_allowance(death_count, config.default_lives) {
        Verdict::Penalize {
            amount: config.penalty_amount,
        }
    } else {
        Verdict::Allow {
            lives_remaining: lives_remaining(death_count, config.default_lives),
        }
    }
}

/// Map the ledger's success signal to the next state.
pub fn resolve_withdrawal(withdrawn: bool) -> Resolution {
    if withdrawn {
        Resolution::Penalized
    } else {
        Resolution::Excluded
    }
}

/// Current standing of a player.
pub fn standing(death_count: u64, banned: bool, default_lives: u32) -> Standing {
    if banned {
        Standing::Excluded
    } else if exceeds_allowance(death_count, default_lives) {
        Standing::Penalized
    } else {
        Standing::Alive
    }
}
