//! Integration tests for the match ledger: record, edit, delete, replay.

use badminton_club_web::{
    delete_matches, edit_match, record_match, replay_stats, Club, ClubError, Player, PlayerId,
    PlayerPool, TeamSide,
};

fn club_with_players(n: usize) -> (Club, Vec<PlayerId>) {
    let mut club = Club::new();
    club.predefined_players.clear();
    let ids = (1..=n)
        .map(|i| {
            club.add_player(&format!("P{i}"), 3, PlayerPool::Permanent, true)
                .unwrap()
        })
        .collect();
    (club, ids)
}

fn stats_of(club: &Club, id: PlayerId) -> (u32, u32, u32) {
    let p = club.player(id).unwrap();
    (p.games_played, p.wins, p.points_scored)
}

#[test]
fn record_requires_admin() {
    let (mut club, ids) = club_with_players(4);
    assert_eq!(
        record_match(&mut club, &ids[..2], &ids[2..], 21, 15, "", false),
        Err(ClubError::PermissionDenied)
    );
    assert!(club.match_history.is_empty());
}

#[test]
fn record_rejects_unknown_participants() {
    let (mut club, ids) = club_with_players(3);
    let ghost = uuid::Uuid::new_v4();
    let team_b = [ids[2], ghost];
    assert_eq!(
        record_match(&mut club, &ids[..2], &team_b, 21, 15, "", true),
        Err(ClubError::PlayerNotFound(ghost))
    );
    assert!(club.match_history.is_empty());
}

#[test]
fn record_21_15_credits_both_teams() {
    let (mut club, ids) = club_with_players(4);
    let record =
        record_match(&mut club, &ids[..2], &ids[2..], 21, 15, "good rally", true).unwrap();

    assert_eq!(record.winning_team, TeamSide::A);
    assert_eq!(record.notes, "good rally");
    for &id in &ids[..2] {
        assert_eq!(stats_of(&club, id), (1, 1, 21));
    }
    for &id in &ids[2..] {
        assert_eq!(stats_of(&club, id), (1, 0, 15));
    }
}

#[test]
fn tied_scores_at_record_time_fall_to_team_b() {
    let (mut club, ids) = club_with_players(2);
    let record = record_match(&mut club, &ids[..1], &ids[1..], 10, 10, "", true).unwrap();
    assert_eq!(record.winning_team, TeamSide::B);
}

#[test]
fn replay_is_idempotent() {
    let (mut club, ids) = club_with_players(4);
    record_match(&mut club, &ids[..2], &ids[2..], 21, 15, "", true).unwrap();
    record_match(&mut club, &[ids[0], ids[2]], &[ids[1], ids[3]], 18, 21, "", true).unwrap();

    let before: Vec<Player> = club.predefined_players.clone();
    replay_stats(&mut club);
    assert_eq!(club.predefined_players, before);
}

#[test]
fn delete_restores_pre_match_counters() {
    let (mut club, ids) = club_with_players(4);
    let first = record_match(&mut club, &ids[..2], &ids[2..], 21, 15, "", true).unwrap();
    let second =
        record_match(&mut club, &[ids[0], ids[2]], &[ids[1], ids[3]], 21, 19, "", true).unwrap();

    delete_matches(&mut club, &[second.id], true).unwrap();
    // Back to exactly the first match's contribution.
    for &id in &ids[..2] {
        assert_eq!(stats_of(&club, id), (1, 1, 21));
    }
    for &id in &ids[2..] {
        assert_eq!(stats_of(&club, id), (1, 0, 15));
    }

    delete_matches(&mut club, &[first.id], true).unwrap();
    for &id in &ids {
        assert_eq!(stats_of(&club, id), (0, 0, 0));
    }
    assert!(club.match_history.is_empty());
}

#[test]
fn delete_validates_every_id_before_removing_any() {
    let (mut club, ids) = club_with_players(4);
    let record = record_match(&mut club, &ids[..2], &ids[2..], 21, 15, "", true).unwrap();
    let ghost = uuid::Uuid::new_v4();

    assert_eq!(
        delete_matches(&mut club, &[record.id, ghost], true),
        Err(ClubError::MatchNotFound(ghost))
    );
    // Nothing was removed and stats are intact.
    assert_eq!(club.match_history.len(), 1);
    assert_eq!(stats_of(&club, ids[0]), (1, 1, 21));
}

#[test]
fn delete_requires_admin() {
    let (mut club, ids) = club_with_players(4);
    let record = record_match(&mut club, &ids[..2], &ids[2..], 21, 15, "", true).unwrap();
    assert_eq!(
        delete_matches(&mut club, &[record.id], false),
        Err(ClubError::PermissionDenied)
    );
    assert_eq!(club.match_history.len(), 1);
}

#[test]
fn edit_same_winner_only_moves_point_totals() {
    let (mut club, ids) = club_with_players(4);
    let record = record_match(&mut club, &ids[..2], &ids[2..], 21, 15, "", true).unwrap();

    edit_match(&mut club, record.id, 21, 18, TeamSide::A, "corrected", true).unwrap();

    for &id in &ids[..2] {
        assert_eq!(stats_of(&club, id), (1, 1, 21));
    }
    for &id in &ids[2..] {
        assert_eq!(stats_of(&club, id), (1, 0, 18));
    }
    let m = &club.match_history[0];
    assert_eq!(m.notes, "corrected");
    assert_eq!(m.team_a, ids[..2].to_vec());
    assert_eq!(m.team_b, ids[2..].to_vec());
}

#[test]
fn edit_flipping_winner_moves_the_win() {
    let (mut club, ids) = club_with_players(4);
    let record = record_match(&mut club, &ids[..2], &ids[2..], 21, 15, "", true).unwrap();

    edit_match(&mut club, record.id, 15, 21, TeamSide::B, "", true).unwrap();

    for &id in &ids[..2] {
        assert_eq!(stats_of(&club, id), (1, 0, 15));
    }
    for &id in &ids[2..] {
        assert_eq!(stats_of(&club, id), (1, 1, 21));
    }
}

#[test]
fn edit_rejects_ties_winner_mismatch_and_unknown_ids() {
    let (mut club, ids) = club_with_players(4);
    let record = record_match(&mut club, &ids[..2], &ids[2..], 21, 15, "", true).unwrap();
    let ghost = uuid::Uuid::new_v4();

    assert_eq!(
        edit_match(&mut club, ghost, 21, 15, TeamSide::A, "", true),
        Err(ClubError::MatchNotFound(ghost))
    );
    assert_eq!(
        edit_match(&mut club, record.id, 20, 20, TeamSide::A, "", true),
        Err(ClubError::ScoresTied)
    );
    assert_eq!(
        edit_match(&mut club, record.id, 21, 15, TeamSide::B, "", true),
        Err(ClubError::WinnerScoreMismatch)
    );
    assert_eq!(
        edit_match(&mut club, record.id, 21, 15, TeamSide::A, "", false),
        Err(ClubError::PermissionDenied)
    );
    // All rejected: the stored record is untouched.
    assert_eq!(club.match_history[0], record);
}

#[test]
fn replay_skips_cleared_temporary_players() {
    let mut club = Club::new();
    club.predefined_players.clear();
    let p1 = club.add_player("P1", 3, PlayerPool::Permanent, true).unwrap();
    let p2 = club.add_player("P2", 3, PlayerPool::Permanent, true).unwrap();
    let guest = club.add_player("Guest", 3, PlayerPool::Temporary, true).unwrap();
    let p3 = club.add_player("P3", 3, PlayerPool::Permanent, true).unwrap();

    record_match(&mut club, &[p1, p2], &[guest, p3], 21, 12, "", true).unwrap();
    club.clear_temp_players(true).unwrap();

    // A replay after the guest left must not fault and keeps the rest exact.
    replay_stats(&mut club);
    assert_eq!(stats_of(&club, p1), (1, 1, 21));
    assert_eq!(stats_of(&club, p3), (1, 0, 12));
}
