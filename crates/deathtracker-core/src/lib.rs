//! DeathTracker - limited-lives enforcement engine
//!
//! Counts player deaths, charges a penalty once a player's lives are used
//! up, and bans players who cannot pay. Death counts and bans are kept in
//! JSON files and survive restarts.
//!
//! The host runtime drives [`DeathTracker`] through its `on_*` entry points
//! and supplies the economy backend and player sessions as [`ports`].

pub mod commands;
pub mod engine;
pub mod persistence;
pub mod ports;

pub use commands::{Caller, Command, CommandError};
pub use deathtracker_logic as logic;
pub use engine::{DeathOutcome, DeathTracker};
pub use persistence::{load_config, save_config, LoadedData, PersistError, PersistenceManager};
pub use ports::{EconomyLedger, PlayerSessions, WithdrawOutcome};
