use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::models::User;
use crate::ws::events::ServerEvent;
use crate::ws::gateway::GatewayState;
use crate::AppState;

#[derive(Debug, Default, Clone, Copy)]
pub struct ReapStats {
    pub expired: usize,
    pub reaped: usize,
    pub failed: usize,
}

/// Run the sweep on a fixed interval. The cadence, the inactivity
/// threshold, and the offline retention window are independent settings.
pub fn spawn(state: Arc<AppState>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(state.config.reap_interval_secs));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match reap_once(
                &state.db,
                &state.gateway,
                Utc::now(),
                state.config.inactivity_threshold_secs,
                state.config.offline_retention_secs,
            )
            .await
            {
                Ok(stats) if stats.expired > 0 || stats.reaped > 0 || stats.failed > 0 => {
                    tracing::info!(
                        expired = stats.expired,
                        reaped = stats.reaped,
                        failed = stats.failed,
                        "Reaper sweep finished"
                    );
                }
                Ok(_) => {}
                Err(e) => tracing::error!("Reaper sweep failed: {}", e),
            }
        }
    })
}

/// One sweep, two stages: idle online users flip to offline, and users
/// offline past the retention window are deleted together with their
/// messages. Idling alone never destroys history.
pub async fn reap_once(
    db: &SqlitePool,
    gateway: &GatewayState,
    now: DateTime<Utc>,
    inactivity_threshold_secs: i64,
    offline_retention_secs: i64,
) -> Result<ReapStats, sqlx::Error> {
    let mut stats = ReapStats::default();

    let idle_cutoff = (now - Duration::seconds(inactivity_threshold_secs)).to_rfc3339();
    let expired = sqlx::query_as::<_, User>(
        "UPDATE users SET status = 'offline' WHERE status = 'online' AND last_seen < ? RETURNING *",
    )
    .bind(&idle_cutoff)
    .fetch_all(db)
    .await?;

    stats.expired = expired.len();
    for user in expired {
        gateway.broadcast_all(&ServerEvent::Presence { user }).await;
    }

    let reap_cutoff = (now - Duration::seconds(offline_retention_secs)).to_rfc3339();
    let stale: Vec<(String, String)> = sqlx::query_as(
        "SELECT id, username FROM users WHERE status = 'offline' AND last_seen < ?",
    )
    .bind(&reap_cutoff)
    .fetch_all(db)
    .await?;

    // One failure must not abort the rest of the sweep
    for (user_id, username) in stale {
        match delete_user_cascade(db, &user_id).await {
            Ok(()) => {
                stats.reaped += 1;
                gateway
                    .broadcast_all(&ServerEvent::UserRemoved { user_id })
                    .await;
            }
            Err(e) => {
                stats.failed += 1;
                tracing::error!(user = %username, "Failed to reap user: {}", e);
            }
        }
    }

    Ok(stats)
}

/// Deletes a user and every message they sent or received in one
/// transaction. A concurrent append either commits before this transaction
/// and is deleted with the rest, or fails its foreign-key check once the
/// user row is gone.
async fn delete_user_cascade(db: &SqlitePool, user_id: &str) -> Result<(), sqlx::Error> {
    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM messages WHERE sender_id = ? OR receiver_id = ?")
        .bind(user_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}
