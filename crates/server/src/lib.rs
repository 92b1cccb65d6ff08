pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod reaper;
pub mod routes;
pub mod ws;

use config::Config;
use std::sync::Arc;

pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub config: Config,
    pub gateway: Arc<ws::gateway::GatewayState>,
}
