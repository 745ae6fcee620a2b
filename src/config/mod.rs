use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// League credentials, forwarded as query parameters on every backend request.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub league_id: String,
    pub year: String,
    pub espn_s2: String,
    pub swid: String,
}

impl Credentials {
    pub fn query(&self) -> [(&'static str, &str); 4] {
        [
            ("league_id", self.league_id.as_str()),
            ("year", self.year.as_str()),
            ("espn_s2", self.espn_s2.as_str()),
            ("swid", self.swid.as_str()),
        ]
    }
}

/// Configuration for the dashboard
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Base URL of the backend serving `/api/league` and `/api/matchup`
    pub api_url: String,

    pub credentials: Credentials,

    /// Per-request timeout; requests never time out when unset
    pub timeout_secs: Option<u64>,
}

impl DashboardConfig {
    /// Load configuration from environment variables (after `.env` has been read)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let timeout_secs = match lookup("FFDASH_TIMEOUT_SECS") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                name: "FFDASH_TIMEOUT_SECS",
                value: raw.clone(),
            })?),
            None => None,
        };

        let api_url = lookup("FFDASH_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_url,
            credentials: Credentials {
                league_id: required("LEAGUE_ID")?,
                year: required("YEAR")?,
                espn_s2: required("ESPN_S2")?,
                swid: required("SWID")?,
            },
            timeout_secs,
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
