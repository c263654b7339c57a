//! DeathTracker engine - host-facing entry point for death events,
//! commands, and lifecycle hooks.
//!
//! All mutable state sits behind one mutex. Each entry point takes the lock,
//! mutates, calls out to the ports, and flushes before releasing it, so no
//! death event can overtake another's withdrawal or save.

use deathtracker_logic::enforcement::{
    self, evaluate_death, resolve_withdrawal, Resolution, Standing, Verdict,
};
use deathtracker_logic::{messages, BanRegistry, Config, DeathLedger, PlayerId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::commands::{self, Caller, Command};
use crate::persistence::PersistenceManager;
use crate::ports::{EconomyLedger, PlayerSessions, WithdrawOutcome};

/// Everything guarded by the engine lock.
#[derive(Debug, Default)]
pub(crate) struct TrackerState {
    pub config: Config,
    pub ledger: DeathLedger,
    pub bans: BanRegistry,
}

/// What happened in response to a death event.
#[derive(Debug, Clone, PartialEq)]
pub enum DeathOutcome {
    /// Within the allowance.
    Counted { death_count: u64, lives_remaining: u64 },
    /// Allowance exceeded and the penalty was paid.
    Penalized { death_count: u64, amount: f64 },
    /// Allowance exceeded, the penalty failed, and the player was banned.
    Excluded { death_count: u64 },
    /// The player was already banned; counted but not re-enforced.
    AlreadyExcluded { death_count: u64 },
}

impl DeathOutcome {
    pub fn death_count(&self) -> u64 {
        match self {
            DeathOutcome::Counted { death_count, .. }
            | DeathOutcome::Penalized { death_count, .. }
            | DeathOutcome::Excluded { death_count }
            | DeathOutcome::AlreadyExcluded { death_count } => *death_count,
        }
    }
}

/// Limited-lives enforcement engine
pub struct DeathTracker {
    state: Mutex<TrackerState>,
    persistence: PersistenceManager,
    economy: Arc<dyn EconomyLedger>,
    sessions: Arc<dyn PlayerSessions>,
}

impl DeathTracker {
    /// Create an engine with empty state. Call [`on_load`](Self::on_load)
    /// to restore persisted data.
    pub fn new(
        config: Config,
        persistence: PersistenceManager,
        economy: Arc<dyn EconomyLedger>,
        sessions: Arc<dyn PlayerSessions>,
    ) -> Self {
        Self {
            state: Mutex::new(TrackerState {
                config,
                ..TrackerState::default()
            }),
            persistence,
            economy,
            sessions,
        }
    }

    /// Create an engine and immediately load persisted data.
    pub fn start(
        config: Config,
        persistence: PersistenceManager,
        economy: Arc<dyn EconomyLedger>,
        sessions: Arc<dyn PlayerSessions>,
    ) -> Self {
        let tracker = Self::new(config, persistence, economy, sessions);
        tracker.on_load();
        tracker
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush(&self, state: &TrackerState) {
        if let Err(e) = self.persistence.save(&state.ledger, &state.bans) {
            log::error!(
                "Failed to save death tracker data to {}: {}",
                self.persistence.data_dir().display(),
                e
            );
        }
    }

    // ========================================================================
    // EVENTS
    // ========================================================================

    /// A player died.
    pub fn on_death(&self, player: &PlayerId) -> DeathOutcome {
        let mut state = self.lock();
        let death_count = state.ledger.record_death(player);
        let banned = state.bans.is_banned(player.as_str());

        let outcome = match evaluate_death(death_count, banned, &state.config) {
            Verdict::Allow { lives_remaining } => {
                log::debug!(
                    "Player {} died ({} deaths, {} lives left)",
                    player,
                    death_count,
                    lives_remaining
                );
                DeathOutcome::Counted {
                    death_count,
                    lives_remaining,
                }
            }
            Verdict::AlreadyExcluded => {
                log::warn!(
                    "Death recorded for banned player {} ({} deaths), skipping penalty",
                    player,
                    death_count
                );
                DeathOutcome::AlreadyExcluded { death_count }
            }
            Verdict::Penalize { amount } => {
                let withdrawal = self.economy.withdraw(player, amount);
                match &withdrawal {
                    WithdrawOutcome::Completed => {}
                    WithdrawOutcome::InsufficientFunds => log::warn!(
                        "Player {} cannot cover penalty of {}",
                        player,
                        amount
                    ),
                    WithdrawOutcome::Failed(reason) => log::error!(
                        "Economy withdrawal of {} from {} failed: {}",
                        amount,
                        player,
                        reason
                    ),
                }

                match resolve_withdrawal(withdrawal.is_success()) {
                    Resolution::Penalized => {
                        log::info!(
                            "Player {} penalized {} ({} deaths)",
                            player,
                            amount,
                            death_count
                        );
                        self.sessions.message(player, &messages::penalized(amount));
                        DeathOutcome::Penalized {
                            death_count,
                            amount,
                        }
                    }
                    Resolution::Excluded => {
                        state.bans.ban(player);
                        log::info!("Player {} banned ({} deaths)", player, death_count);
                        let ban_message = state.config.ban_message.as_str();
                        self.sessions.kick(player, ban_message);
                        self.sessions.message(player, ban_message);
                        DeathOutcome::Excluded { death_count }
                    }
                }
            }
        };

        self.flush(&state);
        outcome
    }

    /// Connection gate. Returns the refusal reason for banned players.
    pub fn can_user_login(&self, player: &str) -> Option<String> {
        let state = self.lock();
        if state.bans.is_banned(player) {
            log::info!("Refusing login for banned player {}", player);
            Some(state.config.ban_message.clone())
        } else {
            None
        }
    }

    /// Run a command. Returns the reply text for the host to deliver to the
    /// caller, or `None` when a privileged command was invoked without
    /// authorization. Replies are never sent through [`PlayerSessions`].
    pub fn on_command(&self, caller: &Caller, name: &str, args: &[&str]) -> Option<String> {
        let command = match Command::parse(name, args) {
            Ok(command) => command,
            Err(e) if e.requires_privilege() && !caller.authorized => return None,
            Err(e) => return Some(e.to_string()),
        };

        if command.requires_privilege() && !caller.authorized {
            log::debug!("Ignoring unauthorized {:?} from {:?}", command, caller.player);
            return None;
        }

        let mut state = self.lock();
        let executed = commands::execute(&mut state, self.sessions.as_ref(), caller, command);
        if executed.mutated {
            self.flush(&state);
        }
        Some(executed.reply)
    }

    /// The economy backend wiped its data; penalties no longer have matching
    /// funds history, so every death counter is cleared.
    pub fn on_economics_data_wiped(&self) {
        let mut state = self.lock();
        state.ledger.reset_all();
        log::info!("{}", messages::DEATHS_RESET_ECONOMICS_WIPE);
        self.flush(&state);
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Replace in-memory state with what is on disk.
    pub fn on_load(&self) {
        let loaded = self.persistence.load();
        let mut state = self.lock();
        log::info!(
            "Loaded {} death records and {} bans",
            loaded.ledger.len(),
            loaded.bans.len()
        );
        state.ledger = loaded.ledger;
        state.bans = loaded.bans;
    }

    /// Periodic host save.
    pub fn on_save(&self) {
        let state = self.lock();
        self.flush(&state);
    }

    pub fn on_shutdown(&self) {
        log::info!("Server shutting down, saving death tracker data");
        let state = self.lock();
        self.flush(&state);
    }

    pub fn on_unload(&self) {
        log::info!("Unloading, saving death tracker data");
        let state = self.lock();
        self.flush(&state);
    }

    /// Swap in a new configuration as a whole.
    pub fn reload_config(&self, config: Config) {
        let mut state = self.lock();
        log::info!(
            "Config reloaded: {} lives, penalty {}",
            config.default_lives,
            config.penalty_amount
        );
        state.config = config;
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn config(&self) -> Config {
        self.lock().config.clone()
    }

    pub fn death_count(&self, player: &str) -> u64 {
        self.lock().ledger.death_count(player)
    }

    pub fn lives_remaining(&self, player: &str) -> u64 {
        let state = self.lock();
        enforcement::lives_remaining(state.ledger.death_count(player), state.config.default_lives)
    }

    pub fn is_banned(&self, player: &str) -> bool {
        self.lock().bans.is_banned(player)
    }

    pub fn banned_players(&self) -> Vec<PlayerId> {
        self.lock().bans.list().to_vec()
    }

    pub fn standing(&self, player: &str) -> Standing {
        let state = self.lock();
        enforcement::standing(
            state.ledger.death_count(player),
            state.bans.is_banned(player),
            state.config.default_lives,
        )
    }

    /// Copies of the ledger and ban registry.
    pub fn snapshot(&self) -> (DeathLedger, BanRegistry) {
        let state = self.lock();
        (state.ledger.clone(), state.bans.clone())
    }
}

impl std::fmt::Debug for DeathTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeathTracker")
            .field("state", &self.state)
            .field("persistence", &self.persistence)
            .finish_non_exhaustive()
    }
}
