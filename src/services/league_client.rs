use std::future::Future;

use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::{Credentials, DashboardConfig};
use crate::models::{MatchupRecord, PlayerWeekRecord};
use crate::services::week_state::{FIRST_WEEK, LAST_WEEK};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("could not decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// Where league and matchup records come from.
pub trait LeagueSource: Send + Sync {
    fn league_week(&self, week: u32) -> impl Future<Output = Result<Vec<PlayerWeekRecord>, FetchError>> + Send;

    fn matchup_week(&self, week: u32) -> impl Future<Output = Result<Vec<MatchupRecord>, FetchError>> + Send;
}

/// One request per week in 1..=`through`, concurrently. `through` is capped at
/// the last week of the season.
///
/// Results come back in week order. A failed week is logged and contributes
/// no records; the count of failed weeks is returned alongside.
pub async fn league_season<S: LeagueSource>(source: &S, through: u32) -> (Vec<PlayerWeekRecord>, usize) {
    let through = through.min(LAST_WEEK);
    let responses = join_all((FIRST_WEEK..=through).map(|week| async move { (week, source.league_week(week).await) })).await;

    let mut records = Vec::new();
    let mut failed = 0usize;
    for (week, response) in responses {
        match response {
            Ok(mut batch) => {
                for record in batch.iter_mut() {
                    record.week = Some(record.week_or(week));
                }
                records.append(&mut batch);
            }
            Err(e) => {
                tracing::error!("Error fetching league data for week {}: {}", week, e);
                failed += 1;
            }
        }
    }

    tracing::debug!("Fetched {} season records through week {} ({} weeks failed)", records.len(), through, failed);
    (records, failed)
}

// ── LeagueClient ─────────────────────────────────────────────────────────────

/// HTTP client for the league backend.
#[derive(Debug, Clone)]
pub struct LeagueClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl LeagueClient {
    pub fn new(config: &DashboardConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.api_url.clone(),
            credentials: config.credentials.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_week<T: DeserializeOwned>(&self, endpoint: &'static str, week: u32) -> Result<Vec<T>, FetchError> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!("GET {} week {}", url, week);

        let response = self.client
            .get(&url)
            .query(&self.credentials.query()[..])
            .query(&[("week", week)])
            .send().await
            .map_err(|source| FetchError::Transport { endpoint, source })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { endpoint, status, body });
        }

        let rows: Vec<T> = response
            .json()
            .await
            .map_err(|source| FetchError::Decode { endpoint, source })?;

        tracing::debug!("{} week {}: {} rows", endpoint, week, rows.len());
        Ok(rows)
    }
}

impl LeagueSource for LeagueClient {
    async fn league_week(&self, week: u32) -> Result<Vec<PlayerWeekRecord>, FetchError> {
        self.get_week("/api/league", week).await
    }

    async fn matchup_week(&self, week: u32) -> Result<Vec<MatchupRecord>, FetchError> {
        self.get_week("/api/matchup", week).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{extract::Query, http::StatusCode as AxumStatus, routing::get, Json, Router};
    use serde_json::{json, Value};

    async fn league_handler(Query(params): Query<HashMap<String, String>>) -> Result<Json<Value>, AxumStatus> {
        if params.get("league_id").map(String::as_str) != Some("42")
            || params.get("swid").map(String::as_str) != Some("{ABC}")
        {
            return Err(AxumStatus::UNAUTHORIZED);
        }
        match params.get("week").map(String::as_str) {
            Some("2") => Err(AxumStatus::INTERNAL_SERVER_ERROR),
            Some("9") => Ok(Json(json!({ "not": "an array" }))),
            Some(week) => {
                let week: u32 = week.parse().map_err(|_| AxumStatus::BAD_REQUEST)?;
                Ok(Json(json!([
                    {
                        "TeamName": "Sharks",
                        "PlayerName": format!("Player W{}", week),
                        "PlayerRosterSlot": "QB",
                        "PlayerScoreActual": 10.0 * week as f64,
                        "PlayerScoreProjected": 12.0
                    }
                ])))
            }
            None => Err(AxumStatus::BAD_REQUEST),
        }
    }

    async fn matchup_handler(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let week: u32 = params.get("week").and_then(|w| w.parse().ok()).unwrap_or(0);
        Json(json!([
            { "Week": week, "Name1": "Sharks", "Score1": 101.5, "Name2": "Bears", "Score2": 99.0, "Type": "Regular" }
        ]))
    }

    async fn spawn_backend() -> String {
        let app = Router::new()
            .route("/api/league", get(league_handler))
            .route("/api/matchup", get(matchup_handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(api_url: String, league_id: &str) -> LeagueClient {
        LeagueClient::new(&DashboardConfig {
            api_url,
            credentials: Credentials {
                league_id: league_id.to_string(),
                year: "2024".to_string(),
                espn_s2: "cookie".to_string(),
                swid: "{ABC}".to_string(),
            },
            timeout_secs: Some(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_league_week_sends_credentials() {
        let client = client_for(spawn_backend().await, "42");
        let records = client.league_week(3).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].player_name, "Player W3");
        assert_eq!(records[0].score_actual, 30.0);
    }

    #[tokio::test]
    async fn test_wrong_credentials_surface_status() {
        let client = client_for(spawn_backend().await, "7");
        let err = client.league_week(1).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status, .. } if status == StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let client = client_for(spawn_backend().await, "42");
        let err = client.league_week(9).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { endpoint: "/api/league", .. }));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{}", addr), "42");
        let err = client.matchup_week(1).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_matchup_week() {
        let client = client_for(spawn_backend().await, "42");
        let matchups = client.matchup_week(5).await.unwrap();
        assert_eq!(matchups[0].week, 5);
        assert_eq!(matchups[0].team_b, "Bears");
    }

    /// Answers every week with no records and counts the requests made.
    #[derive(Default)]
    struct CountingLeague {
        calls: AtomicUsize,
    }

    impl LeagueSource for CountingLeague {
        async fn league_week(&self, _week: u32) -> Result<Vec<PlayerWeekRecord>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn matchup_week(&self, _week: u32) -> Result<Vec<MatchupRecord>, FetchError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_season_range_is_capped_at_last_week() {
        let league = CountingLeague::default();
        let (records, failed) = league_season(&league, 200_000).await;
        assert!(records.is_empty());
        assert_eq!(failed, 0);
        assert_eq!(league.calls.load(Ordering::SeqCst), LAST_WEEK as usize);

        let league = CountingLeague::default();
        league_season(&league, 3).await;
        assert_eq!(league.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_season_skips_failed_weeks_in_order() {
        let client = client_for(spawn_backend().await, "42");
        let (records, failed) = league_season(&client, 4).await;

        assert_eq!(failed, 1);
        let weeks: Vec<Option<u32>> = records.iter().map(|r| r.week).collect();
        assert_eq!(weeks, vec![Some(1), Some(3), Some(4)]);
    }
}
