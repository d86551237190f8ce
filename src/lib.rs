//! Badminton club web app: library with models and business logic.

pub mod auth;
pub mod llm;
pub mod logic;
pub mod models;
pub mod storage;

pub use logic::{
    compose_teams, delete_matches, edit_match, head_to_head, player_overview, player_trends,
    record_match, rematch_with_last_teams, replay_stats, team_combinations,
};
pub use models::{
    Club, ClubError, CurrentTeams, MatchId, MatchMode, MatchRecord, Player, PlayerId, PlayerPool,
    RotationRecord, TeamSide,
};
