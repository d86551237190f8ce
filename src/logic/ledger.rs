//! Match ledger: record, edit, delete, and the full stats replay.
//!
//! The ledger is the source of truth. Player counters are rebuilt from it
//! by `replay_stats`, which is the only writer of those fields; record,
//! edit, and delete all finish with a replay so the counters can never
//! drift from the ledger.

use crate::models::{winner_for, Club, ClubError, MatchId, MatchRecord, PlayerId, TeamSide};

/// Record a finished match between the two given teams. Admin only.
///
/// Generates a fresh id and IST timestamp, derives the winner from the
/// scores (ties fall to B), appends to the ledger, and replays stats.
/// A 0-0 result is not forbidden here; rejecting it is a UI concern.
pub fn record_match(
    club: &mut Club,
    team_a: &[PlayerId],
    team_b: &[PlayerId],
    score_a: u32,
    score_b: u32,
    notes: &str,
    is_admin: bool,
) -> Result<MatchRecord, ClubError> {
    if !is_admin {
        return Err(ClubError::PermissionDenied);
    }
    for &id in team_a.iter().chain(team_b.iter()) {
        if club.player(id).is_none() {
            return Err(ClubError::PlayerNotFound(id));
        }
    }
    let record = MatchRecord::new(team_a.to_vec(), team_b.to_vec(), score_a, score_b, notes);
    club.match_history.push(record.clone());
    replay_stats(club);
    Ok(record)
}

/// Edit a match's scores, winner, and notes. Team composition is immutable.
/// Admin only. Equal scores are rejected outright (every match must have a
/// winner), and the given winner must agree with the score comparison.
/// No state changes until all validation passes; ends with a replay.
pub fn edit_match(
    club: &mut Club,
    id: MatchId,
    score_a: u32,
    score_b: u32,
    winner: TeamSide,
    notes: &str,
    is_admin: bool,
) -> Result<(), ClubError> {
    if !is_admin {
        return Err(ClubError::PermissionDenied);
    }
    if !club.match_history.iter().any(|m| m.id == id) {
        return Err(ClubError::MatchNotFound(id));
    }
    if score_a == score_b {
        return Err(ClubError::ScoresTied);
    }
    if winner != winner_for(score_a, score_b) {
        return Err(ClubError::WinnerScoreMismatch);
    }
    // Validation done; now mutate.
    let m = club
        .match_history
        .iter_mut()
        .find(|m| m.id == id)
        .ok_or(ClubError::MatchNotFound(id))?;
    m.score_a = score_a;
    m.score_b = score_b;
    m.winning_team = winner;
    m.notes = notes.to_string();
    replay_stats(club);
    Ok(())
}

/// Delete the given matches from the ledger. Admin only. All ids are
/// validated before any record is removed, so an unknown id leaves the
/// ledger untouched. Ends with a replay.
pub fn delete_matches(club: &mut Club, ids: &[MatchId], is_admin: bool) -> Result<(), ClubError> {
    if !is_admin {
        return Err(ClubError::PermissionDenied);
    }
    for &id in ids {
        if !club.match_history.iter().any(|m| m.id == id) {
            return Err(ClubError::MatchNotFound(id));
        }
    }
    club.match_history.retain(|m| !ids.contains(&m.id));
    replay_stats(club);
    Ok(())
}

/// Rebuild every player's derived counters from the ledger: zero them all,
/// then fold the matches in stored order. Participants that no longer
/// resolve (cleared temporary players) are skipped.
pub fn replay_stats(club: &mut Club) {
    for p in club
        .predefined_players
        .iter_mut()
        .chain(club.temp_players.iter_mut())
    {
        p.reset_stats();
    }
    let matches = club.match_history.clone();
    for m in &matches {
        apply_match(club, &m.team_a, m.score_a, m.winning_team == TeamSide::A);
        apply_match(club, &m.team_b, m.score_b, m.winning_team == TeamSide::B);
    }
}

/// Credit one match to one team's players.
fn apply_match(club: &mut Club, team: &[PlayerId], points: u32, won: bool) {
    for &id in team {
        if let Some(p) = club.player_mut(id) {
            p.games_played += 1;
            p.points_scored += points;
            if won {
                p.wins += 1;
            }
        }
    }
}
