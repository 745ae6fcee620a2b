use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};

use crate::services::league_client::LeagueSource;
use crate::services::views::{
    load_league, load_matchups, load_rankings, LeagueView, MatchupView, RankingsView, TeamTab, ViewStatus,
};
use crate::utils::{find_team, format_points, render_table, write_season_csv, write_weekly_csv};

fn warn_if_degraded(status: ViewStatus) {
    if status == ViewStatus::Degraded {
        println!("⚠️  Some data could not be fetched; showing what was available.\n");
    }
}

pub fn render_league(view: &LeagueView) -> String {
    let mut out = format!("Week {} Winners and Losers\n\n", view.week);

    let player_line = |label: &str, player: Option<&crate::models::PlayerWeekRecord>| match player {
        Some(p) => format!("{}: {} ({}) - {}\n", label, p.player_name, format_points(p.score_actual), p.team_name),
        None => format!("{}: -\n", label),
    };
    let team_line = |label: &str, team: Option<&crate::models::TeamTotal>| match team {
        Some(t) => format!("{}: {} ({})\n", label, t.team, format_points(t.total_points)),
        None => format!("{}: -\n", label),
    };

    out.push_str(&player_line("Highest Scoring Player", view.highest_player.as_ref()));
    out.push_str(&player_line("Lowest Scoring Player", view.lowest_player.as_ref()));
    out.push_str(&team_line("Highest Scoring Team", view.highest_team.as_ref()));
    out.push_str(&team_line("Lowest Scoring Team", view.lowest_team.as_ref()));

    out.push_str("\nPoints Per Team\n");
    let team_rows: Vec<Vec<String>> = view
        .team_totals
        .iter()
        .map(|t| vec![t.team.clone(), format_points(t.total_points)])
        .collect();
    out.push_str(&render_table(&["Team", "Total Points"], &team_rows));

    out.push_str("\nPoints Per Position\n");
    let position_rows: Vec<Vec<String>> = view
        .positions
        .iter()
        .map(|p| vec![p.position.clone(), format_points(p.points)])
        .collect();
    out.push_str(&render_table(&["Position", "Total Points"], &position_rows));
    out
}

pub fn render_team_tab(tab: &TeamTab) -> String {
    let mut out = format!("{} (week {})\n\n", tab.team, tab.week);
    if let (Some(high), Some(low)) = (&tab.overall_highest, &tab.overall_lowest) {
        out.push_str(&format!(
            "Highest Scoring Player Overall: {} ({}) - {}\n",
            high.player_name,
            format_points(high.score_actual),
            high.team_name
        ));
        out.push_str(&format!(
            "Lowest Scoring Player Overall: {} ({}) - {}\n",
            low.player_name,
            format_points(low.score_actual),
            low.team_name
        ));
    }
    if let (Some(high), Some(low)) = (&tab.highest_player, &tab.lowest_player) {
        out.push_str(&format!("Highest Scoring Player: {} ({})\n", high.player_name, format_points(high.score_actual)));
        out.push_str(&format!("Lowest Scoring Player: {} ({})\n\n", low.player_name, format_points(low.score_actual)));
    }

    let rows: Vec<Vec<String>> = tab
        .roster
        .iter()
        .map(|r| vec![r.player_name.clone(), format_points(r.score_actual), format_points(r.score_projected)])
        .collect();
    out.push_str(&render_table(&["Player Name", "Actual Score", "Projected Score"], &rows));
    out
}

pub fn render_matchups(view: &MatchupView) -> String {
    let mut out = format!("Week {} Matchups\n\n", view.week);
    let rows: Vec<Vec<String>> = view
        .rows
        .iter()
        .map(|m| {
            vec![
                m.team_a.clone(),
                format_points(m.score_a),
                m.team_b.clone(),
                format_points(m.score_b),
                m.kind.clone(),
                m.winner.clone(),
            ]
        })
        .collect();
    out.push_str(&render_table(&["Team 1", "Score 1", "Team 2", "Score 2", "Type", "Winner"], &rows));
    out
}

pub fn render_weekly_rankings(view: &RankingsView) -> String {
    let mut out = format!("Week {} Team Performance\n\n", view.week);
    let rows: Vec<Vec<String>> = view
        .weekly
        .iter()
        .map(|t| {
            vec![
                t.rank.to_string(),
                t.team_name.clone(),
                format_points(t.total_points),
                format_points(t.average_points),
                t.player_count.to_string(),
            ]
        })
        .collect();
    out.push_str(&render_table(&["Rank", "Team", "Total Points", "Avg Points", "Players"], &rows));
    out
}

pub fn render_season_rankings(view: &RankingsView) -> String {
    let mut out = format!("Season Performance Through Week {}\n\n", view.week);
    let rows: Vec<Vec<String>> = view
        .season
        .iter()
        .map(|t| {
            vec![
                t.rank.to_string(),
                t.team_name.clone(),
                format_points(t.total_points),
                format_points(t.average_points),
                format_points(t.best_week),
                format_points(t.worst_week),
                format_points(t.standard_deviation),
            ]
        })
        .collect();
    out.push_str(&render_table(
        &["Rank", "Team", "Total Points", "Avg/Week", "Best Week", "Worst Week", "Std Dev"],
        &rows,
    ));
    if view.missing_weeks > 0 {
        out.push_str(&format!("\n({} week(s) could not be fetched and are not included)\n", view.missing_weeks));
    }
    out
}

pub async fn show_league<S: LeagueSource>(source: &S, week: u32) -> Result<()> {
    println!("📥 Fetching league data for week {}...\n", week);
    let (status, view) = load_league(source, week).await;
    warn_if_degraded(status);
    print!("{}", render_league(&view));
    Ok(())
}

pub async fn show_team<S: LeagueSource>(source: &S, week: u32, name: &str) -> Result<()> {
    let (status, view) = load_league(source, week).await;
    warn_if_degraded(status);

    let Some(team) = find_team(&view.teams, name) else {
        println!("❌ No team found matching '{}'", name);
        if !view.teams.is_empty() {
            println!("\n💡 Teams in week {}:", week);
            for team in &view.teams {
                println!("   • {}", team);
            }
        }
        return Ok(());
    };

    if let Some(tab) = view.team_tab(team) {
        print!("{}", render_team_tab(&tab));
    }
    Ok(())
}

pub async fn show_matchups<S: LeagueSource>(source: &S, week: u32) -> Result<()> {
    println!("📥 Fetching matchups for week {}...\n", week);
    let (status, view) = load_matchups(source, week).await;
    warn_if_degraded(status);

    if view.rows.is_empty() {
        println!("📭 No matchups for week {}", week);
        return Ok(());
    }
    print!("{}", render_matchups(&view));
    Ok(())
}

pub async fn show_rankings<S: LeagueSource>(source: &S, week: u32, season: bool) -> Result<()> {
    println!("📥 Fetching rankings through week {}...\n", week);
    let (status, view) = load_rankings(source, week).await;
    warn_if_degraded(status);

    if season {
        print!("{}", render_season_rankings(&view));
    } else {
        print!("{}", render_weekly_rankings(&view));
    }
    Ok(())
}

pub async fn export_rankings<S: LeagueSource>(source: &S, week: u32, season: bool, out: &Path) -> Result<()> {
    let (status, view) = load_rankings(source, week).await;
    warn_if_degraded(status);

    let file = File::create(out).with_context(|| format!("Failed to create {}", out.display()))?;
    let rows = if season {
        write_season_csv(file, &view.season)?
    } else {
        write_weekly_csv(file, &view.weekly)?
    };

    tracing::info!("Exported {} ranking rows to {}", rows, out.display());
    println!("✅ Wrote {} teams to {}", rows, out.display());
    Ok(())
}
