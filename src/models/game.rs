//! Match records, team side, and match mode for badminton games.

use crate::models::player::PlayerId;
use chrono::{FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a recorded match.
pub type MatchId = Uuid;

/// Which side of the net; also the winner designation in a match record.
/// Serializes as "A" / "B" (persisted format).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum TeamSide {
    A,
    B,
}

/// Singles (1v1) or doubles (2v2).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Singles,
    #[default]
    Doubles,
}

impl MatchMode {
    /// Players on each side of the net.
    pub fn players_per_side(self) -> usize {
        match self {
            MatchMode::Singles => 1,
            MatchMode::Doubles => 2,
        }
    }

    /// Minimum pool size for a draw (both sides filled).
    pub fn required_players(self) -> usize {
        self.players_per_side() * 2
    }
}

/// One entry in the match ledger. The ledger is the source of truth for
/// all derived player statistics.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    /// Local club time (IST), `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    pub team_a: Vec<PlayerId>,
    pub team_b: Vec<PlayerId>,
    pub score_a: u32,
    pub score_b: u32,
    /// Always `A` iff `score_a > score_b`, else `B`. No draws.
    pub winning_team: TeamSide,
    pub notes: String,
}

impl MatchRecord {
    /// Create a record with a fresh id and an IST timestamp. The winner is
    /// derived from the scores (ties fall to B, matching the record path's
    /// `score_a > score_b` comparison).
    pub fn new(
        team_a: Vec<PlayerId>,
        team_b: Vec<PlayerId>,
        score_a: u32,
        score_b: u32,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: ist_timestamp(),
            team_a,
            team_b,
            score_a,
            score_b,
            winning_team: winner_for(score_a, score_b),
            notes: notes.into(),
        }
    }
}

/// Winner as a function of the scores: A iff strictly ahead, otherwise B.
pub fn winner_for(score_a: u32, score_b: u32) -> TeamSide {
    if score_a > score_b {
        TeamSide::A
    } else {
        TeamSide::B
    }
}

/// IST is a fixed +05:30 offset (no DST).
const IST_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;

/// Current time in India Standard Time, `YYYY-MM-DD HH:MM:SS`, regardless
/// of the server's locale.
pub fn ist_timestamp() -> String {
    let ist = FixedOffset::east_opt(IST_OFFSET_SECONDS).expect("IST offset is in range");
    Utc::now()
        .with_timezone(&ist)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
