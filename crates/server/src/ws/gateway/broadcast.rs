use super::{ClientId, ConnectedClient, GatewayState};
use crate::ws::events::ServerEvent;
use tokio::sync::mpsc::error::TrySendError;

impl GatewayState {
    /// Non-blocking delivery; an event to a full queue is dropped and the
    /// client reconciles through the pull endpoints.
    fn deliver(client: &ConnectedClient, msg: String) {
        match client.tx.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(user = %client.user_id, "Event queue full, dropping event");
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }

    pub async fn broadcast_all(&self, event: &ServerEvent) {
        let msg = match serde_json::to_string(event) {
            Ok(m) => m,
            Err(_) => return,
        };

        let clients = self.clients.read().await;
        for client in clients.values() {
            Self::deliver(client, msg.clone());
        }
    }

    pub async fn broadcast_conversation(&self, key: &str, event: &ServerEvent) {
        let msg = match serde_json::to_string(event) {
            Ok(m) => m,
            Err(_) => return,
        };

        let subs = self.conversation_subs.read().await;
        let clients = self.clients.read().await;

        if let Some(subscriber_ids) = subs.get(key) {
            for &cid in subscriber_ids {
                if let Some(client) = clients.get(&cid) {
                    Self::deliver(client, msg.clone());
                }
            }
        }
    }

    pub async fn send_to(&self, client_id: ClientId, event: &ServerEvent) {
        let msg = match serde_json::to_string(event) {
            Ok(m) => m,
            Err(_) => return,
        };

        let clients = self.clients.read().await;
        if let Some(client) = clients.get(&client_id) {
            Self::deliver(client, msg);
        }
    }

    pub async fn send_to_user(&self, user_id: &str, event: &ServerEvent) {
        let msg = match serde_json::to_string(event) {
            Ok(m) => m,
            Err(_) => return,
        };

        let clients = self.clients.read().await;
        for client in clients.values() {
            if client.user_id == user_id {
                Self::deliver(client, msg.clone());
            }
        }
    }
}
