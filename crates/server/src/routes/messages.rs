use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use mingle_shared::validation;

use crate::db;
use crate::error::{self, ApiError, FieldError};
use crate::models::{AuthUser, HistoryQuery, Message, SendMessageRequest};
use crate::ws::events::ServerEvent;
use crate::ws::gateway::conversation_key;
use crate::AppState;

/// POST /api/messages
///
/// The AUTOINCREMENT id orders history deterministically; the insert's
/// foreign-key check rejects a receiver that was reaped in the meantime.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<Message>, ApiError> {
    let mut fields = Vec::new();

    let body = req.body.trim().to_string();
    if let Err(message) = validation::validate_message_body(&body) {
        fields.push(FieldError {
            field: "body",
            message,
        });
    }
    if req.receiver_id == user.id {
        fields.push(FieldError {
            field: "receiverId",
            message: "Cannot send a message to yourself".into(),
        });
    }
    if !fields.is_empty() {
        return Err(ApiError::Validation(fields));
    }

    let now = chrono::Utc::now().to_rfc3339();

    let message = sqlx::query_as::<_, Message>(
        "INSERT INTO messages (sender_id, receiver_id, body, created_at)
         VALUES (?, ?, ?, ?)
         RETURNING *",
    )
    .bind(&user.id)
    .bind(&req.receiver_id)
    .bind(&body)
    .bind(&now)
    .fetch_one(&state.db)
    .await
    .map_err(|e| error::not_found_on_fk(e, "User"))?;

    let event = ServerEvent::DirectMessage {
        message: message.clone(),
    };
    let key = conversation_key(&user.id, &req.receiver_id);

    state.gateway.broadcast_conversation(&key, &event).await;

    // The receiver still gets the event for badge updates even without an
    // open subscription to this conversation
    if !state
        .gateway
        .is_user_subscribed(&req.receiver_id, &key)
        .await
    {
        state.gateway.send_to_user(&req.receiver_id, &event).await;
    }

    Ok(Json(message))
}

/// GET /api/messages/:peerId
///
/// Full history of the unordered pair {caller, peer}, ascending by id.
pub async fn history(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(peer_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let since = query.since.unwrap_or(0);

    let items = db::retry_read(|| {
        sqlx::query_as::<_, Message>(
            "SELECT * FROM messages
             WHERE ((sender_id = ? AND receiver_id = ?) OR (sender_id = ? AND receiver_id = ?))
               AND id > ?
             ORDER BY id",
        )
        .bind(&user.id)
        .bind(&peer_id)
        .bind(&peer_id)
        .bind(&user.id)
        .bind(since)
        .fetch_all(&state.db)
    })
    .await?;

    Ok(Json(items))
}
