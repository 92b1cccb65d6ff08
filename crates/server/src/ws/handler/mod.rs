mod lifecycle;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;

use crate::middleware::auth::{lookup_session, token_from_cookie_header};
use crate::models::AuthUser;
use crate::ws::events::{ClientEvent, ServerEvent};
use crate::ws::gateway::{conversation_key, ClientId, GatewayState};
use crate::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    query: axum::extract::Query<std::collections::HashMap<String, String>>,
    headers: axum::http::HeaderMap,
) -> impl IntoResponse {
    let auth_user = extract_session(&state, &headers, &query).await;
    ws.on_upgrade(move |socket| handle_socket(socket, state, auth_user))
}

async fn extract_session(
    state: &AppState,
    headers: &axum::http::HeaderMap,
    query: &std::collections::HashMap<String, String>,
) -> Option<AuthUser> {
    let token_from_query = query.get("token").map(|t| t.to_string());

    let auth_header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.to_string());

    let token_from_cookie = headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(token_from_cookie_header)
        .map(|t| t.to_string());

    let token = token_from_query.or(auth_header).or(token_from_cookie)?;
    if token.is_empty() {
        return None;
    }

    lookup_session(&state.db, &token).await.ok().flatten()
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, auth_user: Option<AuthUser>) {
    let user = match auth_user {
        Some(u) => u,
        None => return,
    };

    let client_id = state.gateway.next_client_id().await;
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (tx, mut rx) = GatewayState::event_channel();

    state
        .gateway
        .register(client_id, user.id.clone(), user.username.clone(), tx)
        .await;

    lifecycle::send_initial_roster(&state, client_id).await;

    // Task to forward events from the queue to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_tx.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // Receive loop
    let state_clone = state.clone();
    let user_clone = user.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_rx.next().await {
            match msg {
                Message::Text(text) => {
                    let text_str: &str = &text;
                    match serde_json::from_str::<ClientEvent>(text_str) {
                        Ok(event) => {
                            handle_client_event(&state_clone, client_id, &user_clone, event).await;
                        }
                        Err(_) => {
                            state_clone
                                .gateway
                                .send_to(
                                    client_id,
                                    &ServerEvent::Error {
                                        message: "Unrecognized event".into(),
                                    },
                                )
                                .await;
                        }
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    // A dropped connection is not a sign-out; the reaper decides when the
    // session goes stale
    state.gateway.unregister(client_id).await;
}

async fn handle_client_event(
    state: &AppState,
    client_id: ClientId,
    user: &AuthUser,
    event: ClientEvent,
) {
    // Any client activity counts as a heartbeat
    touch_last_seen(state, &user.id).await;

    match event {
        ClientEvent::JoinConversation { peer_id } => {
            let key = conversation_key(&user.id, &peer_id);
            state.gateway.subscribe_conversation(client_id, &key).await;
        }
        ClientEvent::LeaveConversation { peer_id } => {
            let key = conversation_key(&user.id, &peer_id);
            state
                .gateway
                .unsubscribe_conversation(client_id, &key)
                .await;
        }
        ClientEvent::Ping => {}
    }
}

async fn touch_last_seen(state: &AppState, user_id: &str) {
    let now = chrono::Utc::now().to_rfc3339();
    if let Err(e) = sqlx::query("UPDATE users SET last_seen = ? WHERE id = ?")
        .bind(&now)
        .bind(user_id)
        .execute(&state.db)
        .await
    {
        tracing::warn!("Failed to refresh last_seen: {}", e);
    }
}
