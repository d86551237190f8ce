//! Club: the whole application state, plus ClubError.

use crate::models::game::{MatchId, MatchRecord};
use crate::models::player::{Player, PlayerId, PlayerPool, RotationRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Errors that can occur during club operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ClubError {
    /// The operation requires the admin role.
    PermissionDenied,
    /// Not enough players in the pool for the requested match mode.
    InsufficientPlayers { required: usize, available: usize },
    /// Player name is empty after trimming.
    EmptyPlayerName,
    /// A player with this name already exists (names are unique, case-insensitive).
    DuplicatePlayerName,
    /// Skill level must be between 1 and 5.
    SkillOutOfRange,
    /// Player not found in the permanent or temporary pool.
    PlayerNotFound(PlayerId),
    /// The same player appears more than once in the draw pool.
    DuplicatePoolPlayer(PlayerId),
    /// No match with this id exists in the ledger.
    MatchNotFound(MatchId),
    /// No current teams: generate teams before recording a match.
    NoTeamsDrawn,
    /// The ledger is empty (nothing to rematch).
    EmptyLedger,
    /// Equal scores are not allowed: every match must have a winner.
    ScoresTied,
    /// The given winner contradicts the scores.
    WinnerScoreMismatch,
    /// Current admin password did not verify.
    IncorrectPassword,
    /// New password must be at least 6 characters.
    PasswordTooShort,
}

impl std::fmt::Display for ClubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClubError::PermissionDenied => write!(f, "Admin login required for this action"),
            ClubError::InsufficientPlayers { required, available } => {
                write!(f, "Need at least {} players ({} selected)", required, available)
            }
            ClubError::EmptyPlayerName => write!(f, "Please enter a player name"),
            ClubError::DuplicatePlayerName => write!(f, "A player with this name already exists"),
            ClubError::SkillOutOfRange => write!(f, "Skill level must be between 1 and 5"),
            ClubError::PlayerNotFound(_) => write!(f, "Player not found"),
            ClubError::DuplicatePoolPlayer(_) => {
                write!(f, "A player can only be selected once per draw")
            }
            ClubError::MatchNotFound(id) => write!(f, "No match with id {}", id),
            ClubError::NoTeamsDrawn => write!(f, "Generate teams before recording a match"),
            ClubError::EmptyLedger => write!(f, "No matches recorded yet"),
            ClubError::ScoresTied => write!(f, "Scores cannot be equal: every match needs a winner"),
            ClubError::WinnerScoreMismatch => {
                write!(f, "Winning team does not match the scores")
            }
            ClubError::IncorrectPassword => write!(f, "Current password is incorrect"),
            ClubError::PasswordTooShort => write!(f, "New password must be at least 6 characters"),
        }
    }
}

impl std::error::Error for ClubError {}

/// The two teams produced by a draw, held between "teams generated" and
/// "match recorded". Not persisted.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CurrentTeams {
    pub team_a: Vec<PlayerId>,
    pub team_b: Vec<PlayerId>,
}

/// Full club state: both player pools, the match ledger, rotation history,
/// and the transient draw state. Persistence serializes the durable subset
/// (see `storage::PersistedState`); temporary players and the current draw
/// never reach disk.
#[derive(Clone, Debug)]
pub struct Club {
    /// Players persisted across sessions.
    pub predefined_players: Vec<Player>,
    /// Session-scoped players; cleared at will, never persisted.
    pub temp_players: Vec<Player>,
    /// The ledger: source of truth for all derived statistics.
    pub match_history: Vec<MatchRecord>,
    /// Sit-out bookkeeping, lazily populated by team draws.
    pub rotation_history: HashMap<PlayerId, RotationRecord>,
    /// SHA-256 hex digest of the admin password.
    pub admin_password_hash: String,
    /// Working teams between a draw and a recorded match.
    pub current_teams: Option<CurrentTeams>,
    /// Players excluded from the current draw, for display only.
    pub waiting_queue: Vec<PlayerId>,
}

/// Default roster written on first run.
const DEFAULT_ROSTER: [(&str, u8); 5] = [
    ("Saurabh", 2),
    ("Golu", 4),
    ("Shraddha", 3),
    ("Pavan", 3),
    ("Lala", 3),
];

impl Club {
    /// A club with the default roster and the default admin password.
    pub fn new() -> Self {
        Self {
            predefined_players: DEFAULT_ROSTER
                .iter()
                .map(|&(name, skill)| Player::new(name, skill))
                .collect(),
            temp_players: Vec::new(),
            match_history: Vec::new(),
            rotation_history: HashMap::new(),
            admin_password_hash: crate::auth::hash_password(crate::auth::DEFAULT_ADMIN_PASSWORD),
            current_teams: None,
            waiting_queue: Vec::new(),
        }
    }

    /// Look up a player in either pool.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.predefined_players
            .iter()
            .chain(self.temp_players.iter())
            .find(|p| p.id == id)
    }

    /// Mutable lookup across both pools.
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.predefined_players
            .iter_mut()
            .find(|p| p.id == id)
            .or_else(|| self.temp_players.iter_mut().find(|p| p.id == id))
    }

    /// Display name for a player id, if the player still exists.
    pub fn player_name(&self, id: PlayerId) -> Option<&str> {
        self.player(id).map(|p| p.name.as_str())
    }

    /// All players, permanent first (the order the UI shows them in).
    pub fn all_players(&self) -> impl Iterator<Item = &Player> {
        self.predefined_players.iter().chain(self.temp_players.iter())
    }

    /// Add a player to the given pool. Admin only; names are trimmed,
    /// non-empty, and unique (case-insensitive) across both pools.
    pub fn add_player(
        &mut self,
        name: &str,
        skill_level: u8,
        pool: PlayerPool,
        is_admin: bool,
    ) -> Result<PlayerId, ClubError> {
        if !is_admin {
            return Err(ClubError::PermissionDenied);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(ClubError::EmptyPlayerName);
        }
        if !(1..=5).contains(&skill_level) {
            return Err(ClubError::SkillOutOfRange);
        }
        if self.all_players().any(|p| p.name.eq_ignore_ascii_case(name)) {
            return Err(ClubError::DuplicatePlayerName);
        }
        let player = Player::new(name, skill_level);
        let id = player.id;
        match pool {
            PlayerPool::Permanent => self.predefined_players.push(player),
            PlayerPool::Temporary => self.temp_players.push(player),
        }
        Ok(id)
    }

    /// Drop every temporary player. Admin only. Their rotation records stay
    /// behind (harmless), and the ledger keeps any matches they played.
    pub fn clear_temp_players(&mut self, is_admin: bool) -> Result<(), ClubError> {
        if !is_admin {
            return Err(ClubError::PermissionDenied);
        }
        self.temp_players.clear();
        Ok(())
    }
}

impl Default for Club {
    fn default() -> Self {
        Self::new()
    }
}
