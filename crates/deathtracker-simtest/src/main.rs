//! DeathTracker Headless Scenario Harness
//!
//! Drives the enforcement engine through the reference scenarios with a
//! scripted economy and recorded player sessions. Runs entirely in-process
//! against a scratch data directory — no host runtime, no real economy.
//!
//! Usage:
//!   cargo run -p deathtracker-simtest
//!   cargo run -p deathtracker-simtest -- --verbose

use deathtracker_core::{
    Caller, DeathOutcome, DeathTracker, EconomyLedger, PersistenceManager, PlayerSessions,
    WithdrawOutcome,
};
use deathtracker_logic::enforcement::Standing;
use deathtracker_logic::{Config, PlayerId};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tempfile::TempDir;

// ── Scripted ports ──────────────────────────────────────────────────────

/// Economy whose withdrawals succeed or fail according to a switch.
#[derive(Default)]
struct SwitchEconomy {
    solvent: AtomicBool,
    calls: AtomicUsize,
}

impl SwitchEconomy {
    fn new(solvent: bool) -> Arc<Self> {
        Arc::new(Self {
            solvent: AtomicBool::new(solvent),
            calls: AtomicUsize::new(0),
        })
    }

    fn set_solvent(&self, solvent: bool) {
        self.solvent.store(solvent, Ordering::SeqCst);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EconomyLedger for SwitchEconomy {
    fn withdraw(&self, _player: &PlayerId, _amount: f64) -> WithdrawOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.solvent.load(Ordering::SeqCst).into()
    }
}

#[derive(Default)]
struct Transcript {
    lines: Mutex<Vec<String>>,
}

impl Transcript {
    fn contains(&self, needle: &str) -> bool {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|l| l.contains(needle))
    }

    fn dump(&self) {
        for line in self.lines.lock().unwrap_or_else(PoisonError::into_inner).iter() {
            println!("    {}", line);
        }
    }
}

impl PlayerSessions for Transcript {
    fn message(&self, player: &PlayerId, text: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(format!("[msg  {}] {}", player, text));
    }

    fn kick(&self, player: &PlayerId, reason: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(format!("[kick {}] {}", player, reason));
    }
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct World {
    tracker: DeathTracker,
    economy: Arc<SwitchEconomy>,
    transcript: Arc<Transcript>,
}

fn world(data_dir: &Path, solvent: bool) -> World {
    let economy = SwitchEconomy::new(solvent);
    let transcript = Arc::new(Transcript::default());
    let tracker = DeathTracker::start(
        Config::default(),
        PersistenceManager::new(data_dir),
        economy.clone(),
        transcript.clone(),
    );
    World {
        tracker,
        economy,
        transcript,
    }
}

/// Scratch data directory, removed when dropped.
fn scratch_dir(name: &str) -> std::io::Result<TempDir> {
    tempfile::Builder::new()
        .prefix(&format!("deathtracker-simtest-{}-", name))
        .tempdir()
}

fn setup_failed(name: &str, e: std::io::Error) -> Vec<TestResult> {
    vec![TestResult {
        name: format!("{}_setup", name),
        passed: false,
        detail: format!("could not create scratch dir: {}", e),
    }]
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== DeathTracker Scenario Harness ===\n");

    let mut results = Vec::new();

    // A. Penalty paid
    results.extend(scenario_penalty_paid(verbose));

    // B. Penalty failed → exclusion
    results.extend(scenario_exclusion(verbose));

    // C. Unban keeps death count
    results.extend(scenario_unban(verbose));

    // D. Admin reset
    results.extend(scenario_admin_reset(verbose));

    // E. Economics data wipe
    results.extend(scenario_economics_wipe(verbose));

    // Restart durability
    results.extend(scenario_restart(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── A. Penalty paid ─────────────────────────────────────────────────────

fn scenario_penalty_paid(verbose: bool) -> Vec<TestResult> {
    println!("--- A: penalty paid ---");
    let dir = match scratch_dir("a") {
        Ok(dir) => dir,
        Err(e) => return setup_failed("a", e),
    };
    let w = world(dir.path(), true);
    let x = PlayerId::from("X");
    let mut results = Vec::new();

    let outcomes: Vec<DeathOutcome> = (0..4).map(|_| w.tracker.on_death(&x)).collect();

    results.push(TestResult {
        name: "a_first_three_free".into(),
        passed: outcomes[..3]
            .iter()
            .all(|o| matches!(o, DeathOutcome::Counted { .. })),
        detail: format!("{:?}", &outcomes[..3]),
    });
    results.push(TestResult {
        name: "a_fourth_penalized".into(),
        passed: matches!(outcomes[3], DeathOutcome::Penalized { death_count: 4, .. }),
        detail: format!("{:?}", outcomes[3]),
    });
    results.push(TestResult {
        name: "a_never_banned".into(),
        passed: !w.tracker.is_banned("X") && w.tracker.standing("X") == Standing::Penalized,
        detail: format!("standing {:?}", w.tracker.standing("X")),
    });
    results.push(TestResult {
        name: "a_penalty_notice".into(),
        passed: w.transcript.contains("You have been penalized 100"),
        detail: "penalty notice delivered on death #4".into(),
    });

    if verbose {
        w.transcript.dump();
    }
    results
}

// ── B. Exclusion ────────────────────────────────────────────────────────

fn scenario_exclusion(verbose: bool) -> Vec<TestResult> {
    println!("--- B: exclusion ---");
    let dir = match scratch_dir("b") {
        Ok(dir) => dir,
        Err(e) => return setup_failed("b", e),
    };
    let w = world(dir.path(), false);
    let y = PlayerId::from("Y");
    let mut results = Vec::new();

    let mut last = None;
    for _ in 0..4 {
        last = Some(w.tracker.on_death(&y));
    }
    let ban_message = w.tracker.config().ban_message;

    results.push(TestResult {
        name: "b_excluded".into(),
        passed: matches!(last, Some(DeathOutcome::Excluded { death_count: 4 })),
        detail: format!("{:?}", last),
    });
    results.push(TestResult {
        name: "b_in_ban_set".into(),
        passed: w.tracker.banned_players() == vec![y.clone()],
        detail: format!("{:?}", w.tracker.banned_players()),
    });
    results.push(TestResult {
        name: "b_kicked_with_message".into(),
        passed: w.transcript.contains(&format!("[kick Y] {}", ban_message))
            && w.transcript.contains(&format!("[msg  Y] {}", ban_message)),
        detail: "session ended and ban message delivered".into(),
    });
    results.push(TestResult {
        name: "b_login_refused".into(),
        passed: w.tracker.can_user_login("Y").as_deref() == Some(ban_message.as_str()),
        detail: "login gate returns ban message".into(),
    });

    if verbose {
        w.transcript.dump();
    }
    results
}

// ── C. Unban ────────────────────────────────────────────────────────────

fn scenario_unban(_verbose: bool) -> Vec<TestResult> {
    println!("--- C: unban ---");
    let dir = match scratch_dir("c") {
        Ok(dir) => dir,
        Err(e) => return setup_failed("c", e),
    };
    let w = world(dir.path(), false);
    let y = PlayerId::from("Y");
    let mut results = Vec::new();

    for _ in 0..4 {
        w.tracker.on_death(&y);
    }
    let reply = w
        .tracker
        .on_command(&Caller::console(), "unbanplayer", &["Y"]);

    results.push(TestResult {
        name: "c_unbanned".into(),
        passed: !w.tracker.is_banned("Y"),
        detail: format!("reply {:?}", reply),
    });
    results.push(TestResult {
        name: "c_count_kept".into(),
        passed: w.tracker.death_count("Y") == 4,
        detail: format!("{} deaths after unban", w.tracker.death_count("Y")),
    });

    let fifth = w.tracker.on_death(&y);
    results.push(TestResult {
        name: "c_fifth_death_rebans".into(),
        passed: matches!(fifth, DeathOutcome::Excluded { death_count: 5 })
            && w.tracker.is_banned("Y")
            && w.economy.calls() == 2,
        detail: format!("{:?}, {} withdrawals", fifth, w.economy.calls()),
    });

    results
}

// ── D. Admin reset ──────────────────────────────────────────────────────

fn scenario_admin_reset(_verbose: bool) -> Vec<TestResult> {
    println!("--- D: admin reset ---");
    let dir = match scratch_dir("d") {
        Ok(dir) => dir,
        Err(e) => return setup_failed("d", e),
    };
    let w = world(dir.path(), false);
    let mut results = Vec::new();

    for id in ["p1", "p2", "p3"] {
        for _ in 0..4 {
            w.tracker.on_death(&PlayerId::from(id));
        }
    }
    let bans_before = w.tracker.banned_players();

    let unauthorized = w
        .tracker
        .on_command(&Caller::player("p1", false), "resetdeaths", &[]);
    results.push(TestResult {
        name: "d_unauthorized_noop".into(),
        passed: unauthorized.is_none() && w.tracker.death_count("p1") == 4,
        detail: "non-admin reset ignored".into(),
    });

    w.tracker
        .on_command(&Caller::console(), "resetdeaths", &[]);
    results.push(TestResult {
        name: "d_counts_zero".into(),
        passed: ["p1", "p2", "p3"]
            .iter()
            .all(|id| w.tracker.death_count(id) == 0),
        detail: "all tracked players back to 0".into(),
    });
    results.push(TestResult {
        name: "d_bans_unchanged".into(),
        passed: w.tracker.banned_players() == bans_before,
        detail: format!("{} bans kept", bans_before.len()),
    });

    results
}

// ── E. Economics wipe ───────────────────────────────────────────────────

fn scenario_economics_wipe(_verbose: bool) -> Vec<TestResult> {
    println!("--- E: economics wipe ---");
    let dir = match scratch_dir("e") {
        Ok(dir) => dir,
        Err(e) => return setup_failed("e", e),
    };
    let w = world(dir.path(), true);
    let mut results = Vec::new();

    w.economy.set_solvent(false);
    for _ in 0..4 {
        w.tracker.on_death(&PlayerId::from("broke"));
    }
    w.economy.set_solvent(true);
    for _ in 0..2 {
        w.tracker.on_death(&PlayerId::from("rich"));
    }

    w.tracker.on_economics_data_wiped();

    results.push(TestResult {
        name: "e_counts_reset".into(),
        passed: w.tracker.death_count("broke") == 0 && w.tracker.death_count("rich") == 0,
        detail: "death counts cleared by economics wipe".into(),
    });
    results.push(TestResult {
        name: "e_bans_unchanged".into(),
        passed: w.tracker.is_banned("broke") && !w.tracker.is_banned("rich"),
        detail: format!("{:?}", w.tracker.banned_players()),
    });

    results
}

// ── Restart ─────────────────────────────────────────────────────────────

fn scenario_restart(verbose: bool) -> Vec<TestResult> {
    println!("--- Restart durability ---");
    let dir = match scratch_dir("restart") {
        Ok(dir) => dir,
        Err(e) => return setup_failed("restart", e),
    };
    let mut results = Vec::new();

    let before = {
        let w = world(dir.path(), false);
        for _ in 0..4 {
            w.tracker.on_death(&PlayerId::from("a"));
        }
        w.tracker.on_death(&PlayerId::from("b"));
        w.tracker.on_shutdown();
        w.tracker.snapshot()
    };

    let w = world(dir.path(), false);
    let after = w.tracker.snapshot();
    results.push(TestResult {
        name: "restart_roundtrip".into(),
        passed: before == after,
        detail: format!(
            "{} death records, {} bans restored",
            after.0.len(),
            after.1.len()
        ),
    });

    if verbose {
        let store = PersistenceManager::new(dir.path());
        match std::fs::read(store.deaths_path())
            .ok()
            .and_then(|b| serde_json::from_slice::<serde_json::Value>(&b).ok())
        {
            Some(json) => println!("  {}: {}", store.deaths_path().display(), json),
            None => println!("  {}: unreadable", store.deaths_path().display()),
        }
    }

    results
}
