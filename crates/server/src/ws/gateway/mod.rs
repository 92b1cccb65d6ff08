mod broadcast;

use std::collections::{HashMap, HashSet};
use tokio::sync::{mpsc, RwLock};

use mingle_shared::constants::EVENT_QUEUE_CAPACITY;

pub type ClientId = u64;

/// Canonical key for the unordered participant pair. Subscriptions and
/// delivery filtering are both keyed on it, so a subscriber can only ever
/// receive events for conversations it is part of.
pub fn conversation_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{}:{}", a, b)
    } else {
        format!("{}:{}", b, a)
    }
}

pub struct ConnectedClient {
    pub user_id: String,
    pub username: String,
    pub tx: mpsc::Sender<String>,
    pub subscribed_conversations: HashSet<String>,
}

pub struct GatewayState {
    next_id: RwLock<u64>,
    pub clients: RwLock<HashMap<ClientId, ConnectedClient>>,
    pub conversation_subs: RwLock<HashMap<String, HashSet<ClientId>>>,
}

impl Default for GatewayState {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayState {
    pub fn new() -> Self {
        Self {
            next_id: RwLock::new(1),
            clients: RwLock::new(HashMap::new()),
            conversation_subs: RwLock::new(HashMap::new()),
        }
    }

    /// Bounded per-client event queue; a slow consumer drops events rather
    /// than backing up the sender.
    pub fn event_channel() -> (mpsc::Sender<String>, mpsc::Receiver<String>) {
        mpsc::channel(EVENT_QUEUE_CAPACITY)
    }

    pub async fn next_client_id(&self) -> ClientId {
        let mut id = self.next_id.write().await;
        let current = *id;
        *id += 1;
        current
    }

    pub async fn register(
        &self,
        client_id: ClientId,
        user_id: String,
        username: String,
        tx: mpsc::Sender<String>,
    ) {
        let client = ConnectedClient {
            user_id,
            username,
            tx,
            subscribed_conversations: HashSet::new(),
        };
        self.clients.write().await.insert(client_id, client);
    }

    pub async fn unregister(&self, client_id: ClientId) -> Option<ConnectedClient> {
        let client = self.clients.write().await.remove(&client_id)?;

        let mut subs = self.conversation_subs.write().await;
        for key in &client.subscribed_conversations {
            if let Some(set) = subs.get_mut(key) {
                set.remove(&client_id);
                if set.is_empty() {
                    subs.remove(key);
                }
            }
        }

        Some(client)
    }

    pub async fn subscribe_conversation(&self, client_id: ClientId, key: &str) {
        self.conversation_subs
            .write()
            .await
            .entry(key.to_string())
            .or_default()
            .insert(client_id);

        if let Some(client) = self.clients.write().await.get_mut(&client_id) {
            client.subscribed_conversations.insert(key.to_string());
        }
    }

    pub async fn unsubscribe_conversation(&self, client_id: ClientId, key: &str) {
        let mut subs = self.conversation_subs.write().await;
        if let Some(set) = subs.get_mut(key) {
            set.remove(&client_id);
            if set.is_empty() {
                subs.remove(key);
            }
        }

        if let Some(client) = self.clients.write().await.get_mut(&client_id) {
            client.subscribed_conversations.remove(key);
        }
    }

    pub async fn is_user_subscribed(&self, user_id: &str, key: &str) -> bool {
        let subs = self.conversation_subs.read().await;
        let clients = self.clients.read().await;
        if let Some(subscriber_ids) = subs.get(key) {
            for &cid in subscriber_ids {
                if let Some(client) = clients.get(&cid) {
                    if client.user_id == user_id {
                        return true;
                    }
                }
            }
        }
        false
    }
}
