use crate::models::User;
use crate::ws::events::ServerEvent;
use crate::ws::gateway::ClientId;
use crate::AppState;

/// Push the current online roster so a fresh client starts consistent
/// before any delta arrives.
pub async fn send_initial_roster(state: &AppState, client_id: ClientId) {
    let users = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE status = 'online' ORDER BY created_at",
    )
    .fetch_all(&state.db)
    .await
    .unwrap_or_default();

    for user in users {
        state
            .gateway
            .send_to(client_id, &ServerEvent::Presence { user })
            .await;
    }
}
