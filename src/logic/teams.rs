//! Team composition: rotation-fair selection and random team split.

use crate::models::{Club, ClubError, CurrentTeams, MatchMode, PlayerId};
use rand::seq::SliceRandom;
use std::cmp::Reverse;
use std::collections::HashSet;

/// Draw teams from the given pool for the requested mode.
///
/// 1. Every pool id must resolve to a known player, and each player may
///    appear only once (the pool is a set).
/// 2. Sort the pool descending by `sat_out_count` (stable, so the pool's
///    own order breaks ties) and take the top N (4 doubles, 2 singles).
/// 3. Shuffle the selected subset and split it evenly into two teams.
/// 4. Selected players get `consecutive_plays += 1`; the remainder get
///    `sat_out_count += 1` and `consecutive_plays = 0`, and become the
///    waiting queue.
///
/// The result lands in `club.current_teams` / `club.waiting_queue`.
pub fn compose_teams(
    club: &mut Club,
    pool: &[PlayerId],
    mode: MatchMode,
) -> Result<CurrentTeams, ClubError> {
    let required = mode.required_players();
    if pool.len() < required {
        return Err(ClubError::InsufficientPlayers {
            required,
            available: pool.len(),
        });
    }
    let mut seen = HashSet::with_capacity(pool.len());
    for &id in pool {
        if club.player(id).is_none() {
            return Err(ClubError::PlayerNotFound(id));
        }
        if !seen.insert(id) {
            return Err(ClubError::DuplicatePoolPlayer(id));
        }
    }

    // Stable sort: equal sat_out_count keeps pool order.
    let mut by_priority: Vec<PlayerId> = pool.to_vec();
    by_priority.sort_by_key(|id| {
        Reverse(
            club.rotation_history
                .get(id)
                .map(|r| r.sat_out_count)
                .unwrap_or(0),
        )
    });

    let mut selected: Vec<PlayerId> = by_priority[..required].to_vec();
    let waiting: Vec<PlayerId> = by_priority[required..].to_vec();

    selected.shuffle(&mut rand::thread_rng());
    let per_side = mode.players_per_side();
    let teams = CurrentTeams {
        team_a: selected[..per_side].to_vec(),
        team_b: selected[per_side..].to_vec(),
    };

    for &id in &selected {
        let rec = club.rotation_history.entry(id).or_default();
        rec.consecutive_plays += 1;
    }
    for &id in &waiting {
        let rec = club.rotation_history.entry(id).or_default();
        rec.sat_out_count += 1;
        rec.consecutive_plays = 0;
    }

    club.current_teams = Some(teams.clone());
    club.waiting_queue = waiting;
    Ok(teams)
}

/// Reuse the most recent match's team composition verbatim, for when the
/// same two teams want to play again. No re-draw, no rotation updates.
pub fn rematch_with_last_teams(club: &mut Club) -> Result<CurrentTeams, ClubError> {
    let last = club.match_history.last().ok_or(ClubError::EmptyLedger)?;
    let teams = CurrentTeams {
        team_a: last.team_a.clone(),
        team_b: last.team_b.clone(),
    };
    club.current_teams = Some(teams.clone());
    Ok(teams)
}
