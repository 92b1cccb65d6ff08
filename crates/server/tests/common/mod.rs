use axum::Router;
use mingle_server::{config::Config, routes, ws, AppState};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;

pub mod ws_helpers;

/// Create an in-memory SQLite pool with schema applied.
pub async fn setup_test_db() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create in-memory SQLite pool");

    mingle_server::db::run_schema(&pool).await.unwrap();

    pool
}

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 0,
        database_path: ":memory:".into(),
        reap_interval_secs: 300,
        inactivity_threshold_secs: 900,
        offline_retention_secs: 900,
    }
}

pub fn test_state(pool: SqlitePool) -> Arc<AppState> {
    Arc::new(AppState {
        db: pool,
        config: test_config(),
        gateway: Arc::new(ws::gateway::GatewayState::new()),
    })
}

/// Build a test Axum app with the given pool.
pub fn create_test_app(pool: SqlitePool) -> Router {
    routes::build_router(test_state(pool))
}

/// Create an online test user directly in the database.
/// Returns (user_id, session_token).
pub async fn create_test_user(
    pool: &SqlitePool,
    username: &str,
    age: i64,
    gender: &str,
    country: &str,
) -> (String, String) {
    let user_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let code = mingle_shared::country::code_for(country);

    sqlx::query(
        "INSERT INTO users (id, username, age, gender, country, country_code, status, last_seen, created_at)
         VALUES (?, ?, ?, ?, ?, ?, 'online', ?, ?)",
    )
    .bind(&user_id)
    .bind(username)
    .bind(age)
    .bind(gender)
    .bind(country)
    .bind(code)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .unwrap();

    let token = uuid::Uuid::new_v4().to_string();
    let expires_at = (chrono::Utc::now() + chrono::Duration::days(1)).to_rfc3339();

    sqlx::query(
        "INSERT INTO sessions (id, user_id, token, expires_at, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(&user_id)
    .bind(&token)
    .bind(&expires_at)
    .bind(&now)
    .execute(pool)
    .await
    .unwrap();

    (user_id, token)
}

/// Insert a message directly. Returns its id.
pub async fn insert_message(
    pool: &SqlitePool,
    sender_id: &str,
    receiver_id: &str,
    body: &str,
) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO messages (sender_id, receiver_id, body, created_at) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(sender_id)
    .bind(receiver_id)
    .bind(body)
    .bind(chrono::Utc::now().to_rfc3339())
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Backdate a user's last_seen by the given number of seconds.
pub async fn set_last_seen_secs_ago(pool: &SqlitePool, user_id: &str, secs: i64) {
    let then = (chrono::Utc::now() - chrono::Duration::seconds(secs)).to_rfc3339();
    sqlx::query("UPDATE users SET last_seen = ? WHERE id = ?")
        .bind(&then)
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn set_status(pool: &SqlitePool, user_id: &str, status: &str) {
    sqlx::query("UPDATE users SET status = ? WHERE id = ?")
        .bind(status)
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
}
