//! Pure death-accounting logic for DeathTracker.
//!
//! This crate contains the state and decision rules of the "limited lives"
//! policy, independent of any storage, hosting runtime, or economy backend.
//! Functions take plain data and return results, so the whole policy is
//! unit-testable without a server.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`bans`] | Ban registry: insertion-ordered set of excluded players |
//! | [`config`] | Policy configuration values, defaults, normalization |
//! | [`enforcement`] | Threshold decision and withdrawal resolution |
//! | [`ledger`] | Per-player death counters |
//! | [`messages`] | Player and operator reply texts |
//! | [`player`] | Opaque player identity |

pub mod bans;
pub mod config;
pub mod enforcement;
pub mod ledger;
pub mod messages;
pub mod player;

pub use bans::BanRegistry;
pub use config::Config;
pub use ledger::DeathLedger;
pub use player::PlayerId;
