use std::io::Write;

use serde::Serialize;
use strsim::jaro_winkler;

use crate::models::{TeamSeasonAggregate, TeamWeeklyAggregate};

/// Minimum Jaro-Winkler similarity for a fuzzy team-name match
const TEAM_MATCH_THRESHOLD: f64 = 0.8;

/// Round to 2 decimal places, for display only
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a score the way the tables show it ("12.5", "101.25", "0")
pub fn format_points(value: f64) -> String {
    let rounded = round2(value);
    let mut text = format!("{:.2}", rounded);
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

/// Resolve a user-typed team name against the known teams.
///
/// Exact match first, then case-insensitive, then the closest Jaro-Winkler match
/// above the threshold.
pub fn find_team<'a>(teams: &'a [String], query: &str) -> Option<&'a str> {
    let query = query.trim();
    if let Some(team) = teams.iter().find(|t| t.as_str() == query) {
        return Some(team.as_str());
    }

    let lowered = query.to_lowercase();
    if let Some(team) = teams.iter().find(|t| t.to_lowercase() == lowered) {
        return Some(team.as_str());
    }

    teams
        .iter()
        .map(|t| (t, jaro_winkler(&t.to_lowercase(), &lowered)))
        .filter(|(_, score)| *score >= TEAM_MATCH_THRESHOLD)
        .fold(None, |best: Option<(&String, f64)>, (team, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((team, score)),
        })
        .map(|(team, _)| team.as_str())
}

fn pad_line<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect();
    padded.join("  ").trim_end().to_string()
}

/// Render rows as a plain-text table with left-aligned, padded columns
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut out = String::new();
    out.push_str(&pad_line(headers, &widths));
    out.push('\n');
    out.push_str(&pad_line(&rule, &widths));
    out.push('\n');
    for row in rows {
        out.push_str(&pad_line(row, &widths));
        out.push('\n');
    }
    out
}

#[derive(Debug, Serialize)]
struct WeeklyCsvRow<'a> {
    rank: usize,
    team: &'a str,
    total_points: f64,
    average_points: f64,
    players: usize,
}

#[derive(Debug, Serialize)]
struct SeasonCsvRow<'a> {
    rank: usize,
    team: &'a str,
    total_points: f64,
    average_points: f64,
    weeks_played: usize,
    best_week: f64,
    worst_week: f64,
    std_dev: f64,
}

/// Write weekly rankings as CSV, values rounded to 2 decimals
pub fn write_weekly_csv<W: Write>(writer: W, rankings: &[TeamWeeklyAggregate]) -> anyhow::Result<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    for team in rankings {
        csv.serialize(WeeklyCsvRow {
            rank: team.rank,
            team: &team.team_name,
            total_points: round2(team.total_points),
            average_points: round2(team.average_points),
            players: team.player_count,
        })?;
    }
    csv.flush()?;
    Ok(rankings.len())
}

/// Write season rankings as CSV, values rounded to 2 decimals
pub fn write_season_csv<W: Write>(writer: W, rankings: &[TeamSeasonAggregate]) -> anyhow::Result<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    for team in rankings {
        csv.serialize(SeasonCsvRow {
            rank: team.rank,
            team: &team.team_name,
            total_points: round2(team.total_points),
            average_points: round2(team.average_points),
            weeks_played: team.weeks_played,
            best_week: round2(team.best_week),
            worst_week: round2(team.worst_week),
            std_dev: round2(team.standard_deviation),
        })?;
    }
    csv.flush()?;
    Ok(rankings.len())
}
