//! Integration tests for the derived statistics views.

use badminton_club_web::{
    head_to_head, player_overview, player_trends, record_match, team_combinations, Club, PlayerId,
    PlayerPool,
};

fn club_with_players(names: &[&str]) -> (Club, Vec<PlayerId>) {
    let mut club = Club::new();
    club.predefined_players.clear();
    let ids = names
        .iter()
        .map(|name| club.add_player(name, 3, PlayerPool::Permanent, true).unwrap())
        .collect();
    (club, ids)
}

#[test]
fn player_overview_guards_division_by_zero() {
    let (club, _) = club_with_players(&["Alice", "Bob"]);
    for row in player_overview(&club) {
        assert_eq!(row.games_played, 0);
        assert_eq!(row.win_rate, 0.0);
        assert_eq!(row.avg_points_per_game, 0.0);
    }
}

#[test]
fn player_overview_rates_round_to_one_decimal() {
    let (mut club, ids) = club_with_players(&["Alice", "Bob"]);
    // Alice wins 1 of 3 singles games: 33.3% win rate.
    record_match(&mut club, &ids[..1], &ids[1..], 21, 10, "", true).unwrap();
    record_match(&mut club, &ids[..1], &ids[1..], 11, 21, "", true).unwrap();
    record_match(&mut club, &ids[..1], &ids[1..], 12, 21, "", true).unwrap();

    let rows = player_overview(&club);
    let alice = rows.iter().find(|r| r.name == "Alice").unwrap();
    assert_eq!(alice.games_played, 3);
    assert_eq!(alice.win_rate, 33.3);
    // (21 + 11 + 12) / 3 = 14.666... -> 14.7
    assert_eq!(alice.avg_points_per_game, 14.7);

    let bob = rows.iter().find(|r| r.name == "Bob").unwrap();
    assert_eq!(bob.win_rate, 66.7);
    // Sorted by win rate descending.
    assert_eq!(rows[0].name, "Bob");
}

#[test]
fn team_combination_keys_are_order_independent() {
    let (mut club, ids) = club_with_players(&["Alice", "Bob", "Carol", "Dan"]);
    record_match(&mut club, &[ids[0], ids[1]], &[ids[2], ids[3]], 21, 15, "", true).unwrap();
    // Same pairs, listed in the opposite order.
    record_match(&mut club, &[ids[1], ids[0]], &[ids[3], ids[2]], 18, 21, "", true).unwrap();

    let rows = team_combinations(&club);
    assert_eq!(rows.len(), 2);
    let ab = rows.iter().find(|r| r.team == "Alice&Bob").unwrap();
    assert_eq!(ab.matches, 2);
    assert_eq!(ab.wins, 1);
    assert_eq!(ab.win_rate, 50.0);
    // (21 + 18) / 2
    assert_eq!(ab.avg_points, 19.5);
    let cd = rows.iter().find(|r| r.team == "Carol&Dan").unwrap();
    assert_eq!(cd.matches, 2);
    assert_eq!(cd.wins, 1);
}

#[test]
fn head_to_head_tracks_cross_team_pairs() {
    let (mut club, ids) = club_with_players(&["Alice", "Bob"]);
    record_match(&mut club, &ids[..1], &ids[1..], 21, 10, "", true).unwrap();
    record_match(&mut club, &ids[..1], &ids[1..], 21, 17, "", true).unwrap();
    // Sides swapped: Bob now on team A, and he wins.
    record_match(&mut club, &ids[1..], &ids[..1], 21, 8, "", true).unwrap();

    let rows = head_to_head(&club);
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!((row.player_a.as_str(), row.player_b.as_str()), ("Alice", "Bob"));
    assert_eq!(row.meetings, 3);
    assert_eq!(row.wins_a, 2);
    assert_eq!(row.wins_b, 1);
    assert_eq!(row.win_rate_a, 66.7);
    assert_eq!(row.win_rate_b, 33.3);
}

#[test]
fn head_to_head_covers_every_cross_pair_in_doubles() {
    let (mut club, ids) = club_with_players(&["Alice", "Bob", "Carol", "Dan"]);
    record_match(&mut club, &[ids[0], ids[1]], &[ids[2], ids[3]], 21, 15, "", true).unwrap();

    // 2 x 2 cross pairs; teammates never appear together.
    let rows = head_to_head(&club);
    assert_eq!(rows.len(), 4);
    assert!(rows
        .iter()
        .all(|r| !(r.player_a == "Alice" && r.player_b == "Bob")));
}

#[test]
fn trends_accumulate_in_ledger_order() {
    let (mut club, ids) = club_with_players(&["Alice", "Bob"]);
    record_match(&mut club, &ids[..1], &ids[1..], 21, 10, "", true).unwrap();
    record_match(&mut club, &ids[..1], &ids[1..], 15, 21, "", true).unwrap();
    record_match(&mut club, &ids[..1], &ids[1..], 21, 19, "", true).unwrap();

    let trends = player_trends(&club);
    let alice = trends.iter().find(|t| t.name == "Alice").unwrap();
    assert_eq!(alice.series.len(), 3);
    assert_eq!(
        alice
            .series
            .iter()
            .map(|p| (p.cumulative_wins, p.cumulative_points))
            .collect::<Vec<_>>(),
        vec![(1, 21), (1, 36), (2, 57)]
    );

    let bob = trends.iter().find(|t| t.name == "Bob").unwrap();
    assert_eq!(
        bob.series.last().map(|p| (p.cumulative_wins, p.cumulative_points)),
        Some((1, 50))
    );
}

#[test]
fn players_without_games_get_empty_series() {
    let (club, _) = club_with_players(&["Alice"]);
    let trends = player_trends(&club);
    assert_eq!(trends.len(), 1);
    assert!(trends[0].series.is_empty());
}
