//! Flat-file JSON persistence: the authoritative data file, the Q&A
//! interaction log, and the visitor counter.
//!
//! Durability model is "write the whole file again". Temporary players and
//! the transient draw state are never written.

pub mod mirror;

use crate::models::{Club, MatchRecord, Player, PlayerId, RotationRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the authoritative data file.
pub const DATA_FILE: &str = "badminton_data.json";
/// Name of the question/answer log file.
pub const QA_LOG_FILE: &str = "qa_log.json";
/// Name of the visitor counter file.
pub const VISITOR_FILE: &str = "visitor_count.json";

/// Storage layer errors.
#[derive(Debug)]
pub enum StorageError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {}", e),
            StorageError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Json(e)
    }
}

/// The durable subset of the club state, in the on-disk shape.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistedState {
    pub predefined_players: Vec<Player>,
    pub match_history: Vec<MatchRecord>,
    pub player_rotation_history: HashMap<PlayerId, RotationRecord>,
    pub admin_password_hash: String,
}

impl PersistedState {
    /// Snapshot the durable parts of a club.
    pub fn from_club(club: &Club) -> Self {
        Self {
            predefined_players: club.predefined_players.clone(),
            match_history: club.match_history.clone(),
            player_rotation_history: club.rotation_history.clone(),
            admin_password_hash: club.admin_password_hash.clone(),
        }
    }

    /// Rebuild a club from a snapshot. Transient state starts empty.
    pub fn into_club(self) -> Club {
        Club {
            predefined_players: self.predefined_players,
            temp_players: Vec::new(),
            match_history: self.match_history,
            rotation_history: self.player_rotation_history,
            admin_password_hash: self.admin_password_hash,
            current_teams: None,
            waiting_queue: Vec::new(),
        }
    }
}

/// One entry in the question/answer log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QaEntry {
    pub timestamp: String,
    pub question: String,
    pub answer: String,
}

/// On-disk shape of the visitor counter.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
struct VisitorCount {
    count: u64,
}

/// File-backed storage rooted at a data directory.
#[derive(Clone, Debug)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Data directory from the `DATA_DIR` env var, defaulting to the
    /// working directory.
    pub fn from_env() -> Self {
        Self::new(std::env::var("DATA_DIR").unwrap_or_else(|_| ".".to_string()))
    }

    pub fn data_path(&self) -> PathBuf {
        self.dir.join(DATA_FILE)
    }

    pub fn qa_log_path(&self) -> PathBuf {
        self.dir.join(QA_LOG_FILE)
    }

    pub fn visitor_path(&self) -> PathBuf {
        self.dir.join(VISITOR_FILE)
    }

    /// Load the persisted state, or None if no data file exists yet.
    pub fn load(&self) -> Result<Option<PersistedState>, StorageError> {
        read_json_opt(&self.data_path())
    }

    /// Write the whole data file.
    pub fn save(&self, state: &PersistedState) -> Result<(), StorageError> {
        write_json(&self.data_path(), state)
    }

    /// Append one question/answer pair to the interaction log.
    pub fn append_qa(&self, entry: QaEntry) -> Result<(), StorageError> {
        let mut log: Vec<QaEntry> = read_json_opt(&self.qa_log_path())?.unwrap_or_default();
        log.push(entry);
        write_json(&self.qa_log_path(), &log)
    }

    /// Most recent `n` entries of the interaction log, oldest first.
    pub fn recent_qa(&self, n: usize) -> Result<Vec<QaEntry>, StorageError> {
        let log: Vec<QaEntry> = read_json_opt(&self.qa_log_path())?.unwrap_or_default();
        let skip = log.len().saturating_sub(n);
        Ok(log.into_iter().skip(skip).collect())
    }

    /// Bump the visitor counter by one and return the new total.
    pub fn increment_visitors(&self) -> Result<u64, StorageError> {
        let mut counter: VisitorCount = read_json_opt(&self.visitor_path())?.unwrap_or_default();
        counter.count += 1;
        write_json(&self.visitor_path(), &counter)?;
        Ok(counter.count)
    }
}

fn read_json_opt<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string(value)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ist_timestamp;

    fn temp_storage(tag: &str) -> Storage {
        let dir = std::env::temp_dir().join(format!(
            "badminton_storage_{}_{}",
            tag,
            uuid::Uuid::new_v4()
        ));
        Storage::new(dir)
    }

    #[test]
    fn load_returns_none_without_data_file() {
        let storage = temp_storage("empty");
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips_durable_state() {
        let storage = temp_storage("roundtrip");
        let club = Club::new();
        storage.save(&PersistedState::from_club(&club)).unwrap();

        let loaded = storage.load().unwrap().unwrap().into_club();
        assert_eq!(loaded.predefined_players, club.predefined_players);
        assert_eq!(loaded.admin_password_hash, club.admin_password_hash);
        assert!(loaded.temp_players.is_empty());
        assert!(loaded.current_teams.is_none());
    }

    #[test]
    fn persisted_shape_has_expected_keys() {
        let club = Club::new();
        let json = serde_json::to_value(PersistedState::from_club(&club)).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("predefined_players"));
        assert!(obj.contains_key("match_history"));
        assert!(obj.contains_key("player_rotation_history"));
        assert!(obj.contains_key("admin_password_hash"));
        let player = &obj["predefined_players"][0];
        for key in ["id", "name", "skill_level", "games_played", "wins", "points_scored"] {
            assert!(player.get(key).is_some(), "missing player key {key}");
        }
    }

    #[test]
    fn secondary_files_carry_their_mirror_names() {
        // The mirror keys files by name, so the on-disk names must match
        // the published constants.
        let storage = temp_storage("names");
        assert_eq!(storage.data_path().file_name().unwrap(), DATA_FILE);
        assert_eq!(storage.qa_log_path().file_name().unwrap(), QA_LOG_FILE);
        assert_eq!(storage.visitor_path().file_name().unwrap(), VISITOR_FILE);
    }

    #[test]
    fn qa_log_appends_and_returns_recent() {
        let storage = temp_storage("qa");
        for i in 0..7 {
            storage
                .append_qa(QaEntry {
                    timestamp: ist_timestamp(),
                    question: format!("q{i}"),
                    answer: format!("a{i}"),
                })
                .unwrap();
        }
        let recent = storage.recent_qa(5).unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].question, "q2");
        assert_eq!(recent[4].question, "q6");
    }

    #[test]
    fn visitor_counter_increments() {
        let storage = temp_storage("visitors");
        assert_eq!(storage.increment_visitors().unwrap(), 1);
        assert_eq!(storage.increment_visitors().unwrap(), 2);
    }
}
