//! Derived statistics: read-only views over the roster and the ledger.

use crate::models::{Club, TeamSide};
use serde::Serialize;
use std::collections::BTreeMap;

/// Round to one decimal place (display convention for rates and averages).
fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Percentage of `part` in `total`, one decimal, 0 when `total` is 0.
fn rate(part: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        round1(part as f64 / total as f64 * 100.0)
    }
}

/// One row of the player performance table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerStatRow {
    pub name: String,
    pub skill_level: u8,
    pub games_played: u32,
    pub wins: u32,
    pub win_rate: f64,
    pub points_scored: u32,
    pub avg_points_per_game: f64,
}

/// Per-player overview across both pools, sorted by win rate descending.
pub fn player_overview(club: &Club) -> Vec<PlayerStatRow> {
    let mut rows: Vec<PlayerStatRow> = club
        .all_players()
        .map(|p| PlayerStatRow {
            name: p.name.clone(),
            skill_level: p.skill_level,
            games_played: p.games_played,
            wins: p.wins,
            win_rate: rate(p.wins, p.games_played),
            points_scored: p.points_scored,
            avg_points_per_game: if p.games_played == 0 {
                0.0
            } else {
                round1(p.points_scored as f64 / p.games_played as f64)
            },
        })
        .collect();
    rows.sort_by(|a, b| {
        b.win_rate
            .partial_cmp(&a.win_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows
}

/// Aggregates for one team combination (order-independent name key).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TeamComboRow {
    /// Sorted participant names joined with "&".
    pub team: String,
    pub matches: u32,
    pub wins: u32,
    pub win_rate: f64,
    pub avg_points: f64,
}

/// Performance per team combination. "Alice & Bob" and "Bob & Alice"
/// collapse to one key. Sides whose players no longer all resolve are
/// skipped. Sorted by win rate descending.
pub fn team_combinations(club: &Club) -> Vec<TeamComboRow> {
    #[derive(Default)]
    struct Acc {
        matches: u32,
        wins: u32,
        total_points: u32,
    }
    let mut acc: BTreeMap<String, Acc> = BTreeMap::new();

    for m in &club.match_history {
        let sides = [
            (&m.team_a, m.score_a, m.winning_team == TeamSide::A),
            (&m.team_b, m.score_b, m.winning_team == TeamSide::B),
        ];
        for (team, score, won) in sides {
            let Some(key) = combo_key(club, team) else {
                continue;
            };
            let e = acc.entry(key).or_default();
            e.matches += 1;
            e.total_points += score;
            if won {
                e.wins += 1;
            }
        }
    }

    let mut rows: Vec<TeamComboRow> = acc
        .into_iter()
        .map(|(team, a)| TeamComboRow {
            team,
            matches: a.matches,
            wins: a.wins,
            win_rate: rate(a.wins, a.matches),
            avg_points: if a.matches == 0 {
                0.0
            } else {
                round1(a.total_points as f64 / a.matches as f64)
            },
        })
        .collect();
    rows.sort_by(|a, b| {
        b.win_rate
            .partial_cmp(&a.win_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows
}

/// Order-independent key for a team: sorted names joined with "&".
/// None if any participant no longer resolves.
fn combo_key(club: &Club, team: &[crate::models::PlayerId]) -> Option<String> {
    let mut names: Vec<&str> = Vec::with_capacity(team.len());
    for &id in team {
        names.push(club.player_name(id)?);
    }
    names.sort_unstable();
    Some(names.join("&"))
}

/// Head-to-head record for one cross-team player pair.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeadToHeadRow {
    /// First player of the pair (names sorted).
    pub player_a: String,
    /// Second player of the pair.
    pub player_b: String,
    pub meetings: u32,
    pub wins_a: u32,
    pub wins_b: u32,
    pub win_rate_a: f64,
    pub win_rate_b: f64,
}

/// Win rates for every pair of players who have been on opposite sides,
/// keyed by the pair's names in sorted order.
pub fn head_to_head(club: &Club) -> Vec<HeadToHeadRow> {
    // (first wins, second wins) per sorted name pair
    let mut acc: BTreeMap<(String, String), (u32, u32)> = BTreeMap::new();

    for m in &club.match_history {
        for &a in &m.team_a {
            let Some(name_a) = club.player_name(a) else {
                continue;
            };
            for &b in &m.team_b {
                let Some(name_b) = club.player_name(b) else {
                    continue;
                };
                let a_won = m.winning_team == TeamSide::A;
                let (key, first_won) = if name_a <= name_b {
                    ((name_a.to_string(), name_b.to_string()), a_won)
                } else {
                    ((name_b.to_string(), name_a.to_string()), !a_won)
                };
                let e = acc.entry(key).or_insert((0, 0));
                if first_won {
                    e.0 += 1;
                } else {
                    e.1 += 1;
                }
            }
        }
    }

    acc.into_iter()
        .map(|((player_a, player_b), (wins_a, wins_b))| {
            let meetings = wins_a + wins_b;
            HeadToHeadRow {
                player_a,
                player_b,
                meetings,
                wins_a,
                wins_b,
                win_rate_a: rate(wins_a, meetings),
                win_rate_b: rate(wins_b, meetings),
            }
        })
        .collect()
}

/// One point of a player's cumulative trend line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrendPoint {
    pub timestamp: String,
    pub cumulative_wins: u32,
    pub cumulative_points: u32,
}

/// A player's trend series over the matches they appeared in.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerTrend {
    pub name: String,
    pub series: Vec<TrendPoint>,
}

/// Time-ordered cumulative wins and points per player, for trend charts.
/// Matches are walked in ledger order; players with no appearances get an
/// empty series.
pub fn player_trends(club: &Club) -> Vec<PlayerTrend> {
    let mut trends: Vec<(crate::models::PlayerId, PlayerTrend)> = club
        .all_players()
        .map(|p| {
            (
                p.id,
                PlayerTrend {
                    name: p.name.clone(),
                    series: Vec::new(),
                },
            )
        })
        .collect();

    for m in &club.match_history {
        let sides = [
            (&m.team_a, m.score_a, m.winning_team == TeamSide::A),
            (&m.team_b, m.score_b, m.winning_team == TeamSide::B),
        ];
        for (team, score, won) in sides {
            for &id in team {
                let Some((_, trend)) = trends.iter_mut().find(|(pid, _)| *pid == id) else {
                    continue;
                };
                let (mut wins, mut points) = trend
                    .series
                    .last()
                    .map(|pt| (pt.cumulative_wins, pt.cumulative_points))
                    .unwrap_or((0, 0));
                if won {
                    wins += 1;
                }
                points += score;
                trend.series.push(TrendPoint {
                    timestamp: m.timestamp.clone(),
                    cumulative_wins: wins,
                    cumulative_points: points,
                });
            }
        }
    }

    trends.into_iter().map(|(_, t)| t).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_guards_division_by_zero() {
        assert_eq!(rate(0, 0), 0.0);
        assert_eq!(rate(1, 3), 33.3);
        assert_eq!(rate(2, 3), 66.7);
    }

    #[test]
    fn round1_rounds_half_up() {
        assert_eq!(round1(12.35), 12.4);
        assert_eq!(round1(12.34), 12.3);
    }
}
