//! Data structures for the badminton club: players, matches, club state.

mod club;
mod game;
mod player;

pub use club::{Club, ClubError, CurrentTeams};
pub use game::{ist_timestamp, winner_for, MatchId, MatchMode, MatchRecord, TeamSide};
pub use player::{Player, PlayerId, PlayerPool, RotationRecord};
