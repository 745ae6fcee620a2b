pub mod aggregation;
pub mod league_client;
pub mod views;
pub mod week_state;
