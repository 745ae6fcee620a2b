use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::DashboardConfig;
use crate::models::ApiResponse;
use crate::services::league_client::{LeagueClient, LeagueSource};
use crate::services::views::{Dashboard, LeagueView, MatchupView, RankingsView, Snapshot, TeamTab};
use crate::services::week_state::{coerce_week, selectable_weeks, WeekTicket};
use crate::utils::find_team;

type SharedDashboard<S> = Arc<Dashboard<S>>;
type ApiError = (StatusCode, Json<ApiResponse<()>>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ApiResponse::error(message.into())))
}

pub async fn serve(config: &DashboardConfig, port: u16, week: u32) -> anyhow::Result<()> {
    let client = LeagueClient::new(config)?;
    tracing::info!("Using league backend at {}", client.base_url());

    let dashboard = Arc::new(Dashboard::new(client, week));
    spawn_refresh(dashboard.clone(), dashboard.week_state().ticket());

    let app = create_router(dashboard);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Dashboard API listening on port {}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

fn spawn_refresh<S: LeagueSource + 'static>(dashboard: SharedDashboard<S>, ticket: WeekTicket) {
    tokio::spawn(async move {
        tracing::info!("Refreshing views for week {}", ticket.week);
        dashboard.refresh(ticket).await;
    });
}

pub fn create_router<S: LeagueSource + 'static>(dashboard: SharedDashboard<S>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/week", get(get_week_handler::<S>).put(select_week_handler::<S>))
        .route("/league", get(get_league_handler::<S>))
        .route("/league/teams/{team}", get(get_team_tab_handler::<S>))
        .route("/matchups", get(get_matchups_handler::<S>))
        .route("/rankings", get(get_rankings_handler::<S>))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
        )
        .with_state(dashboard)
}

// Health check endpoint
async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("Dashboard API is running"))
}

#[derive(Debug, Serialize)]
struct WeekSelection {
    week: u32,
    generation: u64,
    weeks: Vec<u32>,
}

impl From<WeekTicket> for WeekSelection {
    fn from(ticket: WeekTicket) -> Self {
        Self {
            week: ticket.week,
            generation: ticket.generation,
            weeks: selectable_weeks().collect(),
        }
    }
}

// GET /week - Current week selection
async fn get_week_handler<S: LeagueSource + 'static>(
    State(dashboard): State<SharedDashboard<S>>,
) -> Json<ApiResponse<WeekSelection>> {
    Json(ApiResponse::success(dashboard.week_state().ticket().into()))
}

/// Selector values arrive either as numbers or as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WeekInput {
    Number(u32),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct SelectWeekRequest {
    week: WeekInput,
}

// PUT /week - Select a week; all views re-fetch in the background
async fn select_week_handler<S: LeagueSource + 'static>(
    State(dashboard): State<SharedDashboard<S>>,
    Json(request): Json<SelectWeekRequest>,
) -> Result<(StatusCode, Json<ApiResponse<WeekSelection>>), ApiError> {
    let week = match request.week {
        WeekInput::Number(week) => week,
        WeekInput::Text(raw) => coerce_week(&raw)
            .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, format!("Not a week number: {}", raw)))?,
    };

    let ticket = dashboard.select_week(week).await;
    spawn_refresh(dashboard.clone(), ticket);

    Ok((StatusCode::ACCEPTED, Json(ApiResponse::success(ticket.into()))))
}

// GET /league - Winners, losers, team totals and points per position
async fn get_league_handler<S: LeagueSource + 'static>(
    State(dashboard): State<SharedDashboard<S>>,
) -> Json<ApiResponse<Snapshot<LeagueView>>> {
    Json(ApiResponse::success(dashboard.league().await))
}

// GET /league/teams/{team} - One team's tab
async fn get_team_tab_handler<S: LeagueSource + 'static>(
    State(dashboard): State<SharedDashboard<S>>,
    Path(team): Path<String>,
) -> Result<Json<ApiResponse<TeamTab>>, ApiError> {
    let snapshot = dashboard.league().await;
    let view = snapshot
        .data
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "League data has not loaded yet"))?;

    let not_found = || api_error(StatusCode::NOT_FOUND, format!("No team matching '{}' in week {}", team, view.week));
    let name = find_team(&view.teams, &team).ok_or_else(not_found)?;
    view.team_tab(name)
        .map(|tab| Json(ApiResponse::success(tab)))
        .ok_or_else(not_found)
}

// GET /matchups - Matchups with winners
async fn get_matchups_handler<S: LeagueSource + 'static>(
    State(dashboard): State<SharedDashboard<S>>,
) -> Json<ApiResponse<Snapshot<MatchupView>>> {
    Json(ApiResponse::success(dashboard.matchups().await))
}

// GET /rankings - Weekly and season rankings
async fn get_rankings_handler<S: LeagueSource + 'static>(
    State(dashboard): State<SharedDashboard<S>>,
) -> Json<ApiResponse<Snapshot<RankingsView>>> {
    Json(ApiResponse::success(dashboard.rankings().await))
}
