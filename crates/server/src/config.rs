use mingle_shared::constants;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Cadence of the background reaper sweep.
    pub reap_interval_secs: u64,
    /// Online users idle longer than this are flipped to offline.
    pub inactivity_threshold_secs: i64,
    /// Offline users stale longer than this are deleted with their messages.
    pub offline_retention_secs: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./mingle.db".into()),
            reap_interval_secs: env::var("REAP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(constants::DEFAULT_REAP_INTERVAL_SECS),
            inactivity_threshold_secs: env::var("INACTIVITY_THRESHOLD_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(constants::DEFAULT_INACTIVITY_THRESHOLD_SECS),
            offline_retention_secs: env::var("OFFLINE_RETENTION_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(constants::DEFAULT_OFFLINE_RETENTION_SECS),
        }
    }
}
