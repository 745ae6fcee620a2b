mod api;
mod cli;
mod config;
mod models;
mod services;
mod utils;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::DashboardConfig;
use crate::services::league_client::LeagueClient;
use crate::services::week_state::{FIRST_WEEK, LAST_WEEK};

#[derive(Parser)]
#[command(name = "gridiron-dash")]
#[command(about = "Fantasy football league dashboard: scores, matchups and rankings")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

fn week_arg() -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(FIRST_WEEK as i64..=LAST_WEEK as i64)
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard API server
    Serve {
        #[arg(short, long, default_value = "3000")]
        port: u16,
        #[arg(short, long, default_value = "1", value_parser = week_arg())]
        week: u32,
    },
    /// Winners, losers and points per team/position for a week
    League {
        #[arg(short, long, default_value = "1", value_parser = week_arg())]
        week: u32,
    },
    /// One team's roster for a week
    Team {
        #[arg(short, long)]
        name: String,
        #[arg(short, long, default_value = "1", value_parser = week_arg())]
        week: u32,
    },
    /// Matchups and winners for a week
    Matchups {
        #[arg(short, long, default_value = "1", value_parser = week_arg())]
        week: u32,
    },
    /// Team rankings for a week, or for the season through that week
    Rankings {
        #[arg(short, long, default_value = "1", value_parser = week_arg())]
        week: u32,
        #[arg(long)]
        season: bool,
    },
    /// Export rankings as CSV
    Export {
        #[arg(short, long, default_value = "1", value_parser = week_arg())]
        week: u32,
        #[arg(long)]
        season: bool,
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = DashboardConfig::from_env().context("Failed to load dashboard configuration")?;

    match cli.command {
        Some(Commands::Serve { port, week }) => {
            tracing::info!("Starting dashboard API server on port {}", port);
            api::serve(&config, port, week).await?;
        }
        Some(Commands::League { week }) => {
            cli::show_league(&LeagueClient::new(&config)?, week).await?;
        }
        Some(Commands::Team { name, week }) => {
            tracing::info!("Querying team: {}", name);
            cli::show_team(&LeagueClient::new(&config)?, week, &name).await?;
        }
        Some(Commands::Matchups { week }) => {
            cli::show_matchups(&LeagueClient::new(&config)?, week).await?;
        }
        Some(Commands::Rankings { week, season }) => {
            cli::show_rankings(&LeagueClient::new(&config)?, week, season).await?;
        }
        Some(Commands::Export { week, season, out }) => {
            cli::export_rankings(&LeagueClient::new(&config)?, week, season, &out).await?;
        }
        None => {
            // Default to serving
            tracing::info!("Starting dashboard API server on port 3000");
            api::serve(&config, 3000, FIRST_WEEK).await?;
        }
    }

    Ok(())
}
