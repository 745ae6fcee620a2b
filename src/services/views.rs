//! View models for the dashboard tabs and the snapshots that hold them.
//!
//! A view is produced from an explicit week, never from ambient state. Fetch
//! failures do not propagate: they are logged and the view is built from
//! empty data with a `Degraded` status.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::models::{
    Extremes, MatchupRow, PlayerWeekRecord, PositionTotal, RosterRow, TeamSeasonAggregate,
    TeamTotal, TeamWeeklyAggregate,
};
use crate::services::aggregation::{
    extremes_by, matchup_rows, player_extremes, position_totals, season_rankings, team_extremes, team_names,
    team_roster, team_totals, weekly_rankings,
};
use crate::services::league_client::{league_season, LeagueSource};
use crate::services::week_state::{WeekState, WeekTicket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewStatus {
    Loading,
    Loaded,
    /// A fetch failed; the data shown is whatever could be built without it.
    Degraded,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeagueView {
    pub week: u32,
    pub highest_player: Option<PlayerWeekRecord>,
    pub lowest_player: Option<PlayerWeekRecord>,
    pub highest_team: Option<TeamTotal>,
    pub lowest_team: Option<TeamTotal>,
    pub team_totals: Vec<TeamTotal>,
    pub positions: Vec<PositionTotal>,
    /// Tab labels, alphabetical.
    pub teams: Vec<String>,
    #[serde(skip)]
    pub records: Vec<PlayerWeekRecord>,
}

/// One team's tab of the league view.
#[derive(Debug, Clone, Serialize)]
pub struct TeamTab {
    pub week: u32,
    pub team: String,
    /// League-wide extremes for the week, shown on every tab.
    pub overall_highest: Option<PlayerWeekRecord>,
    pub overall_lowest: Option<PlayerWeekRecord>,
    /// This team's own best and worst player.
    pub highest_player: Option<RosterRow>,
    pub lowest_player: Option<RosterRow>,
    pub roster: Vec<RosterRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchupView {
    pub week: u32,
    pub rows: Vec<MatchupRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingsView {
    pub week: u32,
    pub weekly: Vec<TeamWeeklyAggregate>,
    pub season: Vec<TeamSeasonAggregate>,
    /// Weeks in 1..=week whose fetch failed and were left out of `season`.
    pub missing_weeks: usize,
}

impl LeagueView {
    pub fn from_records(week: u32, records: Vec<PlayerWeekRecord>) -> Self {
        let totals = team_totals(&records);
        let Extremes { highest: highest_player, lowest: lowest_player } = player_extremes(&records);
        let Extremes { highest: highest_team, lowest: lowest_team } = team_extremes(&totals);

        Self {
            week,
            highest_player,
            lowest_player,
            highest_team,
            lowest_team,
            teams: team_names(&records),
            positions: position_totals(&records),
            team_totals: totals,
            records,
        }
    }

    /// The tab for `team`, or `None` when the team has no records this week.
    pub fn team_tab(&self, team: &str) -> Option<TeamTab> {
        if !self.teams.iter().any(|t| t == team) {
            return None;
        }

        let roster = team_roster(&self.records, team);
        let Extremes { highest, lowest } = extremes_by(&roster, |r| r.score_actual);

        Some(TeamTab {
            week: self.week,
            team: team.to_string(),
            overall_highest: self.highest_player.clone(),
            overall_lowest: self.lowest_player.clone(),
            highest_player: highest,
            lowest_player: lowest,
            roster,
        })
    }
}

fn status_of(failed: bool) -> ViewStatus {
    if failed {
        ViewStatus::Degraded
    } else {
        ViewStatus::Loaded
    }
}

pub async fn load_league<S: LeagueSource>(source: &S, week: u32) -> (ViewStatus, LeagueView) {
    let (records, failed) = match source.league_week(week).await {
        Ok(records) => (records, false),
        Err(e) => {
            tracing::error!("Error fetching league data for week {}: {}", week, e);
            (Vec::new(), true)
        }
    };
    (status_of(failed), LeagueView::from_records(week, records))
}

pub async fn load_matchups<S: LeagueSource>(source: &S, week: u32) -> (ViewStatus, MatchupView) {
    let (matchups, failed) = match source.matchup_week(week).await {
        Ok(matchups) => (matchups, false),
        Err(e) => {
            tracing::error!("Error fetching matchup data for week {}: {}", week, e);
            (Vec::new(), true)
        }
    };
    (
        status_of(failed),
        MatchupView {
            week,
            rows: matchup_rows(&matchups),
        },
    )
}

/// Weekly rankings for `week` and season rankings over 1..=`week`, fetched concurrently.
pub async fn load_rankings<S: LeagueSource>(source: &S, week: u32) -> (ViewStatus, RankingsView) {
    let (current, (history, missing_weeks)) = tokio::join!(source.league_week(week), league_season(source, week));

    let (current, weekly_failed) = match current {
        Ok(records) => (records, false),
        Err(e) => {
            tracing::error!("Error fetching weekly data for week {}: {}", week, e);
            (Vec::new(), true)
        }
    };

    (
        status_of(weekly_failed || missing_weeks > 0),
        RankingsView {
            week,
            weekly: weekly_rankings(&current),
            season: season_rankings(&history, week),
            missing_weeks,
        },
    )
}

// ── Snapshots ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<T> {
    pub status: ViewStatus,
    /// Week of the data currently held; lags the selection while loading.
    pub week: u32,
    pub data: Option<T>,
    pub updated_at: DateTime<Utc>,
}

/// Holds the latest snapshot of one view.
///
/// While a refresh runs the previous data stays readable; it is swapped out in
/// one step once the new data arrives.
#[derive(Debug)]
pub struct ViewSlot<T> {
    inner: RwLock<Snapshot<T>>,
}

impl<T: Clone> ViewSlot<T> {
    pub fn new(week: u32) -> Self {
        Self {
            inner: RwLock::new(Snapshot {
                status: ViewStatus::Loading,
                week,
                data: None,
                updated_at: Utc::now(),
            }),
        }
    }

    pub async fn snapshot(&self) -> Snapshot<T> {
        self.inner.read().await.clone()
    }

    async fn mark_loading(&self) {
        let mut snapshot = self.inner.write().await;
        snapshot.status = ViewStatus::Loading;
        snapshot.updated_at = Utc::now();
    }

    /// Store `data` unless `ticket` has been superseded. Returns whether it was stored.
    async fn publish(&self, state: &WeekState, ticket: WeekTicket, status: ViewStatus, data: T) -> bool {
        let mut snapshot = self.inner.write().await;
        if !state.is_current(&ticket) {
            tracing::debug!("Dropping stale result for week {} (generation {})", ticket.week, ticket.generation);
            return false;
        }
        *snapshot = Snapshot {
            status,
            week: ticket.week,
            data: Some(data),
            updated_at: Utc::now(),
        };
        true
    }
}

/// Shared week selection plus one snapshot per view.
pub struct Dashboard<S> {
    source: S,
    week: WeekState,
    league: ViewSlot<LeagueView>,
    matchups: ViewSlot<MatchupView>,
    rankings: ViewSlot<RankingsView>,
}

impl<S: LeagueSource> Dashboard<S> {
    pub fn new(source: S, week: u32) -> Self {
        Self {
            source,
            week: WeekState::new(week),
            league: ViewSlot::new(week),
            matchups: ViewSlot::new(week),
            rankings: ViewSlot::new(week),
        }
    }

    pub fn week_state(&self) -> &WeekState {
        &self.week
    }

    /// Change the selected week; every view goes back to loading.
    pub async fn select_week(&self, week: u32) -> WeekTicket {
        let ticket = self.week.set(week);
        tokio::join!(
            self.league.mark_loading(),
            self.matchups.mark_loading(),
            self.rankings.mark_loading(),
        );
        ticket
    }

    /// Re-fetch every view for `ticket`. Results of a superseded ticket are dropped.
    pub async fn refresh(&self, ticket: WeekTicket) {
        tokio::join!(
            self.refresh_league(ticket),
            self.refresh_matchups(ticket),
            self.refresh_rankings(ticket),
        );
    }

    pub async fn refresh_league(&self, ticket: WeekTicket) -> bool {
        let (status, view) = load_league(&self.source, ticket.week).await;
        self.league.publish(&self.week, ticket, status, view).await
    }

    pub async fn refresh_matchups(&self, ticket: WeekTicket) -> bool {
        let (status, view) = load_matchups(&self.source, ticket.week).await;
        self.matchups.publish(&self.week, ticket, status, view).await
    }

    pub async fn refresh_rankings(&self, ticket: WeekTicket) -> bool {
        let (status, view) = load_rankings(&self.source, ticket.week).await;
        self.rankings.publish(&self.week, ticket, status, view).await
    }

    pub async fn league(&self) -> Snapshot<LeagueView> {
        self.league.snapshot().await
    }

    pub async fn matchups(&self) -> Snapshot<MatchupView> {
        self.matchups.snapshot().await
    }

    pub async fn rankings(&self) -> Snapshot<RankingsView> {
        self.rankings.snapshot().await
    }
}
