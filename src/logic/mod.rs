//! Club business logic: team composition, the match ledger, statistics.

mod ledger;
mod stats;
mod teams;

pub use ledger::{delete_matches, edit_match, record_match, replay_stats};
pub use stats::{
    head_to_head, player_overview, player_trends, team_combinations, HeadToHeadRow, PlayerStatRow,
    PlayerTrend, TeamComboRow, TrendPoint,
};
pub use teams::{compose_teams, rematch_with_last_teams};
