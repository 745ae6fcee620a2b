use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One player's line for one week, as served by `/api/league`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerWeekRecord {
    #[serde(rename = "PlayerName")]
    pub player_name: String,
    #[serde(rename = "TeamName")]
    pub team_name: String,
    #[serde(rename = "PlayerRosterSlot")]
    pub roster_slot: String,
    #[serde(rename = "PlayerScoreActual")]
    pub score_actual: f64,
    #[serde(rename = "PlayerScoreProjected", default)]
    pub score_projected: f64,
    /// Missing on some backend builds; callers fall back to the requested week.
    #[serde(rename = "Week", default)]
    pub week: Option<u32>,
}

impl PlayerWeekRecord {
    /// The week this record belongs to, treating a missing or zero week as `requested`.
    pub fn week_or(&self, requested: u32) -> u32 {
        self.week.filter(|w| *w != 0).unwrap_or(requested)
    }
}

/// One head-to-head pairing, as served by `/api/matchup`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupRecord {
    #[serde(rename = "Week")]
    pub week: u32,
    #[serde(rename = "Name1")]
    pub team_a: String,
    #[serde(rename = "Score1")]
    pub score_a: f64,
    #[serde(rename = "Name2")]
    pub team_b: String,
    #[serde(rename = "Score2")]
    pub score_b: f64,
    #[serde(rename = "Type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamWeeklyAggregate {
    pub team_name: String,
    pub total_points: f64,
    pub player_count: usize,
    pub average_points: f64,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSeasonAggregate {
    pub team_name: String,
    pub total_points: f64,
    pub weeks_played: usize,
    pub average_points: f64,
    pub best_week: f64,
    /// 0.0 when the team has no weekly totals; indistinguishable from a zero-point week.
    pub worst_week: f64,
    pub standard_deviation: f64,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamTotal {
    pub team: String,
    pub total_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionTotal {
    pub position: String,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterRow {
    pub player_name: String,
    pub score_actual: f64,
    pub score_projected: f64,
}

/// Highest and lowest entries of a reduction. Both are `None` for empty input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extremes<T> {
    pub highest: Option<T>,
    pub lowest: Option<T>,
}

/// A matchup as displayed, with its winner resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupRow {
    pub week: u32,
    pub team_a: String,
    pub score_a: f64,
    pub team_b: String,
    pub score_b: f64,
    pub kind: String,
    pub winner: String,
}

pub const TIE: &str = "Tie";

// API Response types
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}
