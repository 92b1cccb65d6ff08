use axum::{extract::State, http::StatusCode, Json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::db;
use crate::error::{self, ApiError};
use crate::models::{AuthUser, MarkSeenRequest, UnreadEntry};
use crate::AppState;

/// GET /api/notifications/unread
///
/// Recomputed from the message store plus the caller's per-peer watermark;
/// nothing is counted incrementally, so the result cannot drift. Every peer
/// the caller has ever exchanged messages with is listed, including those
/// with nothing unread.
pub async fn unread_counts(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<HashMap<String, UnreadEntry>>, ApiError> {
    let peers: Vec<(String, String)> = db::retry_read(|| {
        sqlx::query_as(
            "SELECT u.id, u.username FROM users u
             WHERE u.id IN (
                 SELECT CASE WHEN m.sender_id = ? THEN m.receiver_id ELSE m.sender_id END
                 FROM messages m
                 WHERE m.sender_id = ? OR m.receiver_id = ?
             )",
        )
        .bind(&user.id)
        .bind(&user.id)
        .bind(&user.id)
        .fetch_all(&state.db)
    })
    .await?;

    let unread: Vec<(String, i64)> = db::retry_read(|| {
        sqlx::query_as(
            "SELECT m.sender_id, COUNT(*) FROM messages m
             LEFT JOIN conversation_reads r ON r.user_id = ? AND r.peer_id = m.sender_id
             WHERE m.receiver_id = ? AND m.id > COALESCE(r.last_read_id, 0)
             GROUP BY m.sender_id",
        )
        .bind(&user.id)
        .bind(&user.id)
        .fetch_all(&state.db)
    })
    .await?;

    let counts: HashMap<String, i64> = unread.into_iter().collect();

    let mut result = HashMap::new();
    for (peer_id, peer_name) in peers {
        let count = counts.get(&peer_id).copied().unwrap_or(0);
        result.insert(peer_id, UnreadEntry { peer_name, count });
    }

    Ok(Json(result))
}

/// POST /api/notifications/mark-seen
///
/// Advances the watermark; never regresses it.
pub async fn mark_seen(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<MarkSeenRequest>,
) -> Result<StatusCode, ApiError> {
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO conversation_reads (user_id, peer_id, last_read_id, updated_at)
         VALUES (?, ?, ?, ?)
         ON CONFLICT(user_id, peer_id) DO UPDATE SET
             last_read_id = MAX(last_read_id, excluded.last_read_id),
             updated_at = excluded.updated_at",
    )
    .bind(&user.id)
    .bind(&req.peer_id)
    .bind(req.up_to)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| error::not_found_on_fk(e, "User"))?;

    Ok(StatusCode::NO_CONTENT)
}
