//! Durable storage for death counts, bans, and configuration.
//!
//! Each structure lives in its own JSON file under the data directory.
//! Writes go to a sibling `.tmp` file that is synced and then renamed over
//! the target, so a crash mid-save leaves either the old or the new file,
//! never a torn one. The directory is synced after the rename.

use deathtracker_logic::config::{ConfigAdjustment, ConfigFile};
use deathtracker_logic::{BanRegistry, Config, DeathLedger};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Death counts: JSON object of player id to count.
pub const DEATHS_FILE: &str = "DeathTracker.json";

/// Banned players: JSON array of player ids in ban order.
pub const BANS_FILE: &str = "DeathTrackerBannedPlayers.json";

/// State rebuilt from disk at startup.
#[derive(Debug, Default)]
pub struct LoadedData {
    pub ledger: DeathLedger,
    pub bans: BanRegistry,
}

/// Reads and writes the two data files under one directory.
#[derive(Debug, Clone)]
pub struct PersistenceManager {
    data_dir: PathBuf,
}

impl PersistenceManager {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn deaths_path(&self) -> PathBuf {
        self.data_dir.join(DEATHS_FILE)
    }

    pub fn bans_path(&self) -> PathBuf {
        self.data_dir.join(BANS_FILE)
    }

    /// Load both structures. Never fails: a missing file is empty, and an
    /// unreadable or corrupt file is logged and treated as empty.
    pub fn load(&self) -> LoadedData {
        LoadedData {
            ledger: read_or_default(&self.deaths_path()),
            bans: read_or_default(&self.bans_path()),
        }
    }

    /// Write both structures, each atomically.
    pub fn save(&self, ledger: &DeathLedger, bans: &BanRegistry) -> Result<(), PersistError> {
        fs::create_dir_all(&self.data_dir)?;
        write_atomic(&self.deaths_path(), ledger)?;
        write_atomic(&self.bans_path(), bans)?;
        Ok(())
    }
}

/// Load the configuration file, normalize it, and write the normalized form
/// back.
///
/// Keys are read independently: a missing key takes its default, and a key
/// holding an unusable value is reported and defaulted without affecting the
/// others. The file is only rewritten when every present key was usable, so
/// an operator's file that fails to parse or holds a mistyped value is left
/// untouched on disk.
pub fn load_config(path: &Path) -> Config {
    let (file, preserve) = match read_json::<serde_json::Value>(path) {
        Ok(None) => (ConfigFile::default(), false),
        Ok(Some(value)) => {
            let (file, rejected) = config_file_from_value(&value);
            for key in &rejected {
                log::error!(
                    "Config key {} in {} has an unusable value, using default",
                    key,
                    path.display()
                );
            }
            (file, !rejected.is_empty())
        }
        Err(e) => {
            log::error!(
                "Could not parse config {} ({}), using defaults and leaving the file untouched",
                path.display(),
                e
            );
            (ConfigFile::default(), true)
        }
    };

    let (config, adjustments) = file.normalize();

    for adjustment in &adjustments {
        match adjustment {
            ConfigAdjustment::Defaulted { key } => {
                log::debug!("Config key {} missing, using default", key);
            }
            ConfigAdjustment::Clamped { key, from, to } => {
                log::warn!("Config key {} out of range ({}), using {}", key, from, to);
            }
        }
    }

    if !preserve {
        if let Err(e) = save_config(path, &config) {
            log::error!("Failed to write config {}: {}", path.display(), e);
        }
    }

    log::info!(
        "Config loaded: {} lives, penalty {}, ban message {:?}",
        config.default_lives,
        config.penalty_amount,
        config.ban_message
    );
    config
}

/// Pick the known keys out of a parsed config document. Returns the keys
/// that were present but unusable; those are left as `None`.
fn config_file_from_value(value: &serde_json::Value) -> (ConfigFile, Vec<&'static str>) {
    let mut file = ConfigFile::default();
    let mut rejected = Vec::new();

    let Some(object) = value.as_object() else {
        return (file, vec!["<root>"]);
    };

    if let Some(lives) = object.get("DefaultLives") {
        file.default_lives = lives.as_i64().or_else(|| integral_f64(lives));
        if file.default_lives.is_none() {
            rejected.push("DefaultLives");
        }
    }
    if let Some(amount) = object.get("PenaltyAmount") {
        file.penalty_amount = amount.as_f64();
        if file.penalty_amount.is_none() {
            rejected.push("PenaltyAmount");
        }
    }
    if let Some(message) = object.get("BanMessage") {
        file.ban_message = message.as_str().map(str::to_string);
        if file.ban_message.is_none() {
            rejected.push("BanMessage");
        }
    }

    (file, rejected)
}

/// `5.0` is accepted as 5; fractional or out-of-range numbers are not.
fn integral_f64(value: &serde_json::Value) -> Option<i64> {
    let n = value.as_f64()?;
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 {
        Some(n as i64)
    } else {
        None
    }
}

/// Write a configuration file in normalized form.
pub fn save_config(path: &Path, config: &Config) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    write_atomic(path, config)
}

fn read_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match read_json(path) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            log::warn!(
                "Could not load {} ({}), starting empty",
                path.display(),
                e
            );
            T::default()
        }
    }
}

/// `Ok(None)` when the file does not exist.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PersistError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

fn write_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PersistError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp_path = tmp_path_for(path);

    {
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(&bytes)?;
        tmp_file.sync_all()?;
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    if let Err(e) = sync_parent_dir(path) {
        log::debug!("Could not sync directory of {}: {}", path.display(), e);
    }
    Ok(())
}

/// fsync the directory holding `path` so a completed rename is durable.
fn sync_parent_dir(path: &Path) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Errors that can occur while reading or writing storage
#[derive(Debug)]
pub enum PersistError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl From<io::Error> for PersistError {
    fn from(e: io::Error) -> Self {
        PersistError::Io(e)
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(e: serde_json::Error) -> Self {
        PersistError::Json(e)
    }
}

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistError::Io(e) => write!(f, "IO error: {}", e),
            PersistError::Json(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistError::Io(e) => Some(e),
            PersistError::Json(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deathtracker_logic::PlayerId;
    use tempfile::TempDir;

    fn sample() -> (DeathLedger, BanRegistry) {
        let mut ledger = DeathLedger::new();
        let a = PlayerId::from("76561198000000001");
        let b = PlayerId::from("76561198000000002");
        for _ in 0..4 {
            ledger.record_death(&a);
        }
        ledger.record_death(&b);

        let mut bans = BanRegistry::new();
        bans.ban(&b);
        bans.ban(&a);
        (ledger, bans)
    }

    #[test]
    fn test_missing_storage_loads_empty() {
        let dir = TempDir::new().unwrap();
        let loaded = PersistenceManager::new(dir.path().join("absent")).load();
        assert!(loaded.ledger.is_empty());
        assert!(loaded.bans.is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = PersistenceManager::new(dir.path());
        let (ledger, bans) = sample();

        store.save(&ledger, &bans).expect("Save failed");
        let loaded = store.load();

        assert_eq!(loaded.ledger, ledger);
        assert_eq!(loaded.bans, bans);
        assert_eq!(loaded.bans.list(), bans.list());
    }

    #[test]
    fn test_save_creates_data_dir() {
        let dir = TempDir::new().unwrap();
        let store = PersistenceManager::new(dir.path().join("nested").join("data"));
        store
            .save(&DeathLedger::new(), &BanRegistry::new())
            .expect("Save failed");
        assert!(store.deaths_path().exists());
        assert!(store.bans_path().exists());
    }

    #[test]
    fn test_save_leaves_no_tmp_files() {
        let dir = TempDir::new().unwrap();
        let store = PersistenceManager::new(dir.path());
        let (ledger, bans) = sample();
        store.save(&ledger, &bans).unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let store = PersistenceManager::new(dir.path());
        let (ledger, bans) = sample();
        store.save(&ledger, &bans).unwrap();

        fs::write(store.deaths_path(), b"{not json").unwrap();
        let loaded = store.load();
        assert!(loaded.ledger.is_empty());
        // The other file is independent and still loads.
        assert_eq!(loaded.bans, bans);
    }

    #[test]
    fn test_on_disk_format() {
        let dir = TempDir::new().unwrap();
        let store = PersistenceManager::new(dir.path());
        let (ledger, bans) = sample();
        store.save(&ledger, &bans).unwrap();

        let deaths: serde_json::Value =
            serde_json::from_slice(&fs::read(store.deaths_path()).unwrap()).unwrap();
        assert_eq!(deaths["76561198000000001"], 4);
        let banned: Vec<String> =
            serde_json::from_slice(&fs::read(store.bans_path()).unwrap()).unwrap();
        assert_eq!(banned, vec!["76561198000000002", "76561198000000001"]);
    }

    #[test]
    fn test_save_fails_when_data_dir_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let store = PersistenceManager::new(&blocker);
        let result = store.save(&DeathLedger::new(), &BanRegistry::new());
        assert!(matches!(result, Err(PersistError::Io(_))));
    }

    #[test]
    fn test_load_config_writes_back_normalized() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config").join("DeathTracker.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, br#"{"DefaultLives": -1}"#).unwrap();

        let config = load_config(&path);
        assert_eq!(config.default_lives, 0);
        assert_eq!(config.ban_message, Config::default().ban_message);

        let written: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(written["DefaultLives"], 0);
        assert_eq!(written["PenaltyAmount"], 100.0);
        assert!(written["BanMessage"].is_string());
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("DeathTracker.json");
        assert_eq!(load_config(&path), Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_malformed_config_is_preserved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("DeathTracker.json");
        let original =
            r#"{"DefaultLives": 10, "PenaltyAmount": 500.0, "BanMessage": "Custom",}"#;
        fs::write(&path, original).unwrap();

        assert_eq!(load_config(&path), Config::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_integral_float_lives_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("DeathTracker.json");
        fs::write(&path, br#"{"DefaultLives": 5.0, "PenaltyAmount": 20}"#).unwrap();

        let config = load_config(&path);
        assert_eq!(config.default_lives, 5);
        assert!((config.penalty_amount - 20.0).abs() < f64::EPSILON);

        let written: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(written["DefaultLives"], 5);
    }

    #[test]
    fn test_mistyped_key_keeps_other_values_and_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("DeathTracker.json");
        let original = r#"{"DefaultLives": "ten", "PenaltyAmount": 20, "BanMessage": "Out"}"#;
        fs::write(&path, original).unwrap();

        let config = load_config(&path);
        assert_eq!(config.default_lives, Config::default().default_lives);
        assert!((config.penalty_amount - 20.0).abs() < f64::EPSILON);
        assert_eq!(config.ban_message, "Out");
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_fractional_lives_rejected() {
        let (file, rejected) =
            config_file_from_value(&serde_json::json!({"DefaultLives": 2.5}));
        assert_eq!(file.default_lives, None);
        assert_eq!(rejected, vec!["DefaultLives"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_parent_dir_sync() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEATHS_FILE);
        assert!(sync_parent_dir(&path).is_ok());
        assert!(sync_parent_dir(Path::new(DEATHS_FILE)).is_ok());
    }

    #[test]
    fn test_tmp_path_is_sibling() {
        let tmp = tmp_path_for(Path::new("/data/DeathTracker.json"));
        assert_eq!(tmp, PathBuf::from("/data/DeathTracker.json.tmp"));
    }
}
