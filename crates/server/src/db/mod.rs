use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::future::Future;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const READ_RETRY_ATTEMPTS: u32 = 3;
const READ_RETRY_BASE_DELAY: Duration = Duration::from_millis(25);

pub async fn init_pool(database_path: &str) -> Result<SqlitePool, sqlx::Error> {
    // Ensure parent directory exists
    if let Some(parent) = Path::new(database_path).parent() {
        std::fs::create_dir_all(parent).ok();
    }

    // foreign_keys must hold on every pooled connection; the message
    // cascade on reap depends on it
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", database_path))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_schema(&pool).await?;

    tracing::info!("Database initialized at {}", database_path);
    Ok(pool)
}

/// Apply schema.sql statement by statement.
/// (SQLx doesn't support multi-statement queries directly)
pub async fn run_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let schema = include_str!("schema.sql");

    for statement in schema.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }

    Ok(())
}

/// Retry a read query a few times on transient store errors (busy
/// database, pool timeout, IO) with a growing delay before surfacing.
pub async fn retry_read<T, F, Fut>(mut op: F) -> Result<T, sqlx::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(e) if attempt < READ_RETRY_ATTEMPTS && is_transient(&e) => {
                attempt += 1;
                tracing::debug!("Transient store error (attempt {}): {}", attempt, e);
                tokio::time::sleep(READ_RETRY_BASE_DELAY * attempt).await;
            }
            other => return other,
        }
    }
}

fn is_transient(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => true,
        sqlx::Error::Database(db) => {
            let message = db.message();
            message.contains("locked") || message.contains("busy")
        }
        _ => false,
    }
}
