//! Scripted fakes for the engine's ports.

#![allow(dead_code)]

use deathtracker_core::logic::{Config, PlayerId};
use deathtracker_core::{DeathTracker, EconomyLedger, PersistenceManager, PlayerSessions, WithdrawOutcome};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Economy that answers from a script, then falls back to a default.
#[derive(Default)]
pub struct ScriptedEconomy {
    script: Mutex<VecDeque<WithdrawOutcome>>,
    fallback: Mutex<Option<WithdrawOutcome>>,
    pub calls: Mutex<Vec<(PlayerId, f64)>>,
}

impl ScriptedEconomy {
    pub fn always(outcome: WithdrawOutcome) -> Arc<Self> {
        let economy = Self::default();
        *economy.fallback.lock().unwrap() = Some(outcome);
        Arc::new(economy)
    }

    pub fn push(&self, outcome: WithdrawOutcome) {
        self.script.lock().unwrap().push_back(outcome);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl EconomyLedger for ScriptedEconomy {
    fn withdraw(&self, player: &PlayerId, amount: f64) -> WithdrawOutcome {
        self.calls.lock().unwrap().push((player.clone(), amount));
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        self.fallback
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(WithdrawOutcome::Completed)
    }
}

/// Records every message and kick.
#[derive(Default)]
pub struct RecordingSessions {
    pub messages: Mutex<Vec<(PlayerId, String)>>,
    pub kicks: Mutex<Vec<(PlayerId, String)>>,
}

impl RecordingSessions {
    pub fn messages_for(&self, player: &str) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id.as_str() == player)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn kicks_for(&self, player: &str) -> Vec<String> {
        self.kicks
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id.as_str() == player)
            .map(|(_, reason)| reason.clone())
            .collect()
    }
}

impl PlayerSessions for RecordingSessions {
    fn message(&self, player: &PlayerId, text: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((player.clone(), text.to_string()));
    }

    fn kick(&self, player: &PlayerId, reason: &str) {
        self.kicks
            .lock()
            .unwrap()
            .push((player.clone(), reason.to_string()));
    }
}

pub fn config(lives: u32, penalty: f64) -> Config {
    Config {
        default_lives: lives,
        penalty_amount: penalty,
        ban_message: "You have been banned for exceeding death limits.".to_string(),
    }
}

pub struct Harness {
    pub tracker: DeathTracker,
    pub economy: Arc<ScriptedEconomy>,
    pub sessions: Arc<RecordingSessions>,
}

pub fn harness(data_dir: &Path, config: Config, economy: Arc<ScriptedEconomy>) -> Harness {
    let sessions = Arc::new(RecordingSessions::default());
    let tracker = DeathTracker::start(
        config,
        PersistenceManager::new(data_dir),
        economy.clone(),
        sessions.clone(),
    );
    Harness {
        tracker,
        economy,
        sessions,
    }
}
