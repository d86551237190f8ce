//! Player and RotationRecord data structures.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in matches and lookups).
pub type PlayerId = Uuid;

/// Which roster pool a player belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerPool {
    /// Persisted across sessions.
    Permanent,
    /// Lives only for the current session; never written to disk.
    Temporary,
}

/// A player on the roster.
///
/// `games_played`, `wins`, and `points_scored` are a derived cache of the
/// match ledger: the replay in `logic::ledger` is the only writer.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Informational only (1-5); never influences team selection.
    pub skill_level: u8,
    pub games_played: u32,
    pub wins: u32,
    pub points_scored: u32,
}

impl Player {
    /// Create a new player with the given name and skill. Counters start at zero.
    pub fn new(name: impl Into<String>, skill_level: u8) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            skill_level,
            games_played: 0,
            wins: 0,
            points_scored: 0,
        }
    }

    /// Zero the derived counters (start of a ledger replay).
    pub fn reset_stats(&mut self) {
        self.games_played = 0;
        self.wins = 0;
        self.points_scored = 0;
    }
}

/// Per-player sit-out bookkeeping for fair team rotation.
///
/// Created lazily on a player's first draw; never deleted (a stale record
/// for a removed player is harmless).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RotationRecord {
    /// Rounds this player was excluded from (monotonic).
    pub sat_out_count: u32,
    /// Rounds played in a row; resets to 0 whenever the player sits out.
    pub consecutive_plays: u32,
}
