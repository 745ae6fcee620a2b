//! Pure aggregations over a flat list of player-week records.
//!
//! Grouping keeps first-appearance order, sorting is stable, so equal totals
//! keep the order in which their teams first appeared in the input.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use indexmap::IndexMap;
use statrs::statistics::Statistics;

use crate::models::{
    Extremes, MatchupRecord, MatchupRow, PlayerWeekRecord, PositionTotal, RosterRow,
    TeamSeasonAggregate, TeamTotal, TeamWeeklyAggregate, TIE,
};

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Single pass max/min; ties keep the first occurrence.
pub fn extremes_by<T: Clone>(items: &[T], score: impl Fn(&T) -> f64) -> Extremes<T> {
    let mut iter = items.iter();
    let Some(first) = iter.next() else {
        return Extremes { highest: None, lowest: None };
    };

    let (mut highest, mut lowest) = (first, first);
    for item in iter {
        if score(item) > score(highest) {
            highest = item;
        }
        if score(item) < score(lowest) {
            lowest = item;
        }
    }

    Extremes {
        highest: Some(highest.clone()),
        lowest: Some(lowest.clone()),
    }
}

/// Team totals for one week, ranked by total points.
pub fn weekly_rankings(records: &[PlayerWeekRecord]) -> Vec<TeamWeeklyAggregate> {
    let mut teams: IndexMap<&str, (f64, usize)> = IndexMap::new();
    for record in records {
        let entry = teams.entry(record.team_name.as_str()).or_insert((0.0, 0));
        entry.0 += record.score_actual;
        entry.1 += 1;
    }

    let mut rankings: Vec<TeamWeeklyAggregate> = teams
        .into_iter()
        .map(|(team, (total, count))| TeamWeeklyAggregate {
            team_name: team.to_string(),
            total_points: total,
            player_count: count,
            average_points: total / count as f64,
            rank: 0,
        })
        .collect();

    rankings.sort_by(|a, b| descending(a.total_points, b.total_points));
    for (index, team) in rankings.iter_mut().enumerate() {
        team.rank = index + 1;
    }
    rankings
}

/// Total points per team, alphabetical by team name.
pub fn team_totals(records: &[PlayerWeekRecord]) -> Vec<TeamTotal> {
    let mut teams: BTreeMap<&str, f64> = BTreeMap::new();
    for record in records {
        *teams.entry(record.team_name.as_str()).or_insert(0.0) += record.score_actual;
    }

    teams
        .into_iter()
        .map(|(team, total_points)| TeamTotal {
            team: team.to_string(),
            total_points,
        })
        .collect()
}

/// Total points per roster slot, in order of first appearance.
pub fn position_totals(records: &[PlayerWeekRecord]) -> Vec<PositionTotal> {
    let mut positions: IndexMap<&str, f64> = IndexMap::new();
    for record in records {
        *positions.entry(record.roster_slot.as_str()).or_insert(0.0) += record.score_actual;
    }

    positions
        .into_iter()
        .map(|(position, points)| PositionTotal {
            position: position.to_string(),
            points,
        })
        .collect()
}

pub fn player_extremes(records: &[PlayerWeekRecord]) -> Extremes<PlayerWeekRecord> {
    extremes_by(records, |r| r.score_actual)
}

pub fn team_extremes(totals: &[TeamTotal]) -> Extremes<TeamTotal> {
    extremes_by(totals, |t| t.total_points)
}

/// Roster rows of one team, in input order.
pub fn team_roster(records: &[PlayerWeekRecord], team: &str) -> Vec<RosterRow> {
    records
        .iter()
        .filter(|r| r.team_name == team)
        .map(|r| RosterRow {
            player_name: r.player_name.clone(),
            score_actual: r.score_actual,
            score_projected: r.score_projected,
        })
        .collect()
}

/// Distinct team names, alphabetical.
pub fn team_names(records: &[PlayerWeekRecord]) -> Vec<String> {
    team_totals(records).into_iter().map(|t| t.team).collect()
}

#[derive(Default)]
struct SeasonAccumulator {
    total: f64,
    weekly: IndexMap<u32, f64>,
}

/// Season statistics from records spanning weeks 1..=`current_week`.
///
/// Records without a week are attributed to `current_week`.
pub fn season_rankings(records: &[PlayerWeekRecord], current_week: u32) -> Vec<TeamSeasonAggregate> {
    let mut teams: IndexMap<&str, SeasonAccumulator> = IndexMap::new();
    for record in records {
        let acc = teams.entry(record.team_name.as_str()).or_default();
        acc.total += record.score_actual;
        *acc.weekly.entry(record.week_or(current_week)).or_insert(0.0) += record.score_actual;
    }

    let mut rankings: Vec<TeamSeasonAggregate> = teams
        .into_iter()
        .map(|(team, acc)| {
            let weeks_played = acc.weekly.len();
            let totals: Vec<f64> = acc.weekly.values().copied().collect();

            let (average_points, standard_deviation) = if totals.is_empty() {
                (0.0, 0.0)
            } else {
                (acc.total / weeks_played as f64, totals.iter().population_std_dev())
            };

            TeamSeasonAggregate {
                team_name: team.to_string(),
                total_points: acc.total,
                weeks_played,
                average_points,
                best_week: totals.iter().copied().reduce(f64::max).unwrap_or(0.0),
                worst_week: totals.iter().copied().reduce(f64::min).unwrap_or(0.0),
                standard_deviation,
                rank: 0,
            }
        })
        .collect();

    rankings.sort_by(|a, b| descending(a.total_points, b.total_points));
    for (index, team) in rankings.iter_mut().enumerate() {
        team.rank = index + 1;
    }
    rankings
}

/// "Tie" unless one score is strictly greater.
pub fn winner<'a>(team_a: &'a str, score_a: f64, team_b: &'a str, score_b: f64) -> &'a str {
    if score_a > score_b {
        team_a
    } else if score_a < score_b {
        team_b
    } else {
        TIE
    }
}

pub fn matchup_row(matchup: &MatchupRecord) -> MatchupRow {
    MatchupRow {
        week: matchup.week,
        team_a: matchup.team_a.clone(),
        score_a: matchup.score_a,
        team_b: matchup.team_b.clone(),
        score_b: matchup.score_b,
        kind: matchup.kind.clone(),
        winner: winner(&matchup.team_a, matchup.score_a, &matchup.team_b, matchup.score_b)
            .to_string(),
    }
}

pub fn matchup_rows(matchups: &[MatchupRecord]) -> Vec<MatchupRow> {
    matchups.iter().map(matchup_row).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(team: &str, player: &str, slot: &str, score: f64, week: Option<u32>) -> PlayerWeekRecord {
        PlayerWeekRecord {
            player_name: player.to_string(),
            team_name: team.to_string(),
            roster_slot: slot.to_string(),
            score_actual: score,
            score_projected: score + 1.0,
            week,
        }
    }

    fn sample_week() -> Vec<PlayerWeekRecord> {
        vec![
            record("Sharks", "Hurts", "QB", 22.5, Some(1)),
            record("Bears", "Fields", "QB", 18.0, Some(1)),
            record("Sharks", "Kelce", "TE", 11.2, Some(1)),
            record("Bears", "Moore", "WR", 9.4, Some(1)),
            record("Eagles", "Tucker", "K", 0.0, Some(1)),
            record("Eagles", "Bench Guy", "Bench", 14.0, Some(1)),
        ]
    }

    #[test]
    fn test_weekly_rankings_example() {
        let records = vec![
            record("A", "a1", "QB", 10.0, None),
            record("A", "a2", "RB", 20.0, None),
            record("B", "b1", "QB", 5.0, None),
        ];
        let rankings = weekly_rankings(&records);

        assert_eq!(rankings.len(), 2);
        assert_eq!(rankings[0].team_name, "A");
        assert_eq!(rankings[0].total_points, 30.0);
        assert_eq!(rankings[0].player_count, 2);
        assert_eq!(rankings[0].average_points, 15.0);
        assert_eq!(rankings[0].rank, 1);
        assert_eq!(rankings[1].team_name, "B");
        assert_eq!(rankings[1].total_points, 5.0);
        assert_eq!(rankings[1].rank, 2);
    }

    #[test]
    fn test_weekly_totals_conserve_points() {
        let records = sample_week();
        let rankings = weekly_rankings(&records);

        let team_sum: f64 = rankings.iter().map(|t| t.total_points).sum();
        let record_sum: f64 = records.iter().map(|r| r.score_actual).sum();
        assert!((team_sum - record_sum).abs() < 1e-9);

        for team in &rankings {
            assert!((team.average_points - team.total_points / team.player_count as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ranks_are_dense_and_descending() {
        let rankings = weekly_rankings(&sample_week());
        let ranks: Vec<usize> = rankings.iter().map(|t| t.rank).collect();
        assert_eq!(ranks, (1..=rankings.len()).collect::<Vec<_>>());
        assert!(rankings.windows(2).all(|w| w[0].total_points >= w[1].total_points));
    }

    #[test]
    fn test_equal_totals_keep_first_appearance_order() {
        let records = vec![
            record("Zebras", "z", "QB", 10.0, None),
            record("Ants", "a", "QB", 10.0, None),
            record("Moles", "m", "QB", 12.0, None),
        ];
        let names: Vec<String> = weekly_rankings(&records).into_iter().map(|t| t.team_name).collect();
        assert_eq!(names, vec!["Moles", "Zebras", "Ants"]);
    }

    #[test]
    fn test_aggregations_are_idempotent() {
        let records = sample_week();
        assert_eq!(weekly_rankings(&records), weekly_rankings(&records));
        assert_eq!(season_rankings(&records, 1), season_rankings(&records, 1));
        assert_eq!(position_totals(&records), position_totals(&records));
    }

    #[test]
    fn test_team_totals_are_alphabetical() {
        let totals = team_totals(&sample_week());
        let names: Vec<&str> = totals.iter().map(|t| t.team.as_str()).collect();
        assert_eq!(names, vec!["Bears", "Eagles", "Sharks"]);
        assert!((totals[2].total_points - 33.7).abs() < 1e-9);
    }

    #[test]
    fn test_position_totals_group_by_slot() {
        let totals = position_totals(&sample_week());
        let positions: Vec<&str> = totals.iter().map(|p| p.position.as_str()).collect();
        assert_eq!(positions, vec!["QB", "TE", "WR", "K", "Bench"]);
        assert!((totals[0].points - 40.5).abs() < 1e-9);
    }

    #[test]
    fn test_player_extremes_first_occurrence_wins() {
        let records = vec![
            record("A", "first-high", "QB", 30.0, None),
            record("B", "second-high", "QB", 30.0, None),
            record("A", "first-low", "K", 1.0, None),
            record("B", "second-low", "K", 1.0, None),
        ];
        let extremes = player_extremes(&records);
        assert_eq!(extremes.highest.unwrap().player_name, "first-high");
        assert_eq!(extremes.lowest.unwrap().player_name, "first-low");
    }

    #[test]
    fn test_extremes_of_empty_input() {
        let extremes = player_extremes(&[]);
        assert!(extremes.highest.is_none());
        assert!(extremes.lowest.is_none());
        assert!(team_extremes(&[]).highest.is_none());
    }

    #[test]
    fn test_team_extremes() {
        let totals = team_totals(&sample_week());
        let extremes = team_extremes(&totals);
        assert_eq!(extremes.highest.unwrap().team, "Sharks");
        assert_eq!(extremes.lowest.unwrap().team, "Eagles");
    }

    #[test]
    fn test_team_roster_filters_by_team() {
        let roster = team_roster(&sample_week(), "Bears");
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].player_name, "Fields");
        assert!((roster[1].score_projected - 10.4).abs() < 1e-9);
    }

    #[test]
    fn test_season_rankings_statistics() {
        let records = vec![
            record("A", "a1", "QB", 100.0, Some(1)),
            record("A", "a1", "QB", 80.0, Some(2)),
            record("A", "a2", "RB", 20.0, Some(2)),
            record("B", "b1", "QB", 90.0, Some(1)),
            record("B", "b1", "QB", 90.0, Some(2)),
        ];
        let season = season_rankings(&records, 2);

        assert_eq!(season[0].team_name, "A");
        assert_eq!(season[0].total_points, 200.0);
        assert_eq!(season[0].weeks_played, 2);
        assert_eq!(season[0].average_points, 100.0);
        assert_eq!(season[0].best_week, 100.0);
        assert_eq!(season[0].worst_week, 100.0);
        assert_eq!(season[0].standard_deviation, 0.0);
        assert_eq!(season[0].rank, 1);

        assert_eq!(season[1].team_name, "B");
        assert_eq!(season[1].standard_deviation, 0.0);
        assert_eq!(season[1].rank, 2);
    }

    #[test]
    fn test_season_standard_deviation_is_population() {
        let records = vec![
            record("A", "p", "QB", 10.0, Some(1)),
            record("A", "p", "QB", 30.0, Some(2)),
        ];
        let season = season_rankings(&records, 2);
        assert!((season[0].standard_deviation - 10.0).abs() < 1e-9);
        assert_eq!(season[0].best_week, 30.0);
        assert_eq!(season[0].worst_week, 10.0);
        assert!(season[0].standard_deviation >= 0.0);
    }

    #[test]
    fn test_season_attributes_missing_week_to_current() {
        let records = vec![
            record("A", "p", "QB", 10.0, None),
            record("A", "q", "RB", 5.0, Some(4)),
        ];
        let season = season_rankings(&records, 4);
        assert_eq!(season[0].weeks_played, 1);
        assert_eq!(season[0].best_week, 15.0);
    }

    #[test]
    fn test_winner_resolution() {
        assert_eq!(winner("A", 100.0, "B", 90.0), "A");
        assert_eq!(winner("A", 80.0, "B", 95.5), "B");
        assert_eq!(winner("A", 80.0, "B", 80.0), TIE);
        assert_eq!(winner("A", f64::NAN, "B", 80.0), TIE);
    }

    #[test]
    fn test_matchup_rows_carry_fields() {
        let matchup = MatchupRecord {
            week: 14,
            team_a: "A".to_string(),
            score_a: 99.1,
            team_b: "B".to_string(),
            score_b: 120.0,
            kind: "Playoff".to_string(),
        };
        let rows = matchup_rows(&[matchup]);
        assert_eq!(rows[0].winner, "B");
        assert_eq!(rows[0].kind, "Playoff");
        assert_eq!(rows[0].week, 14);
    }
}
