pub mod messages;
pub mod notifications;
pub mod presence;

use crate::ws;
use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Presence
        .route("/presence/sign-in", post(presence::sign_in))
        .route("/presence/sign-out", post(presence::sign_out))
        .route("/presence/heartbeat", post(presence::heartbeat))
        .route("/presence/online", get(presence::list_online))
        // Messages
        .route("/messages", post(messages::send_message))
        .route("/messages/{peerId}", get(messages::history))
        // Notifications
        .route("/notifications/unread", get(notifications::unread_counts))
        .route("/notifications/mark-seen", post(notifications::mark_seen));

    Router::new()
        .nest("/api", api_routes)
        .route("/gateway", get(ws::handler::ws_handler))
        .with_state(state)
}
