mod server_event;

pub use server_event::ServerEvent;

use serde::Deserialize;

// ── Client → Server Events ──

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinConversation {
        #[serde(rename = "peerId")]
        peer_id: String,
    },
    LeaveConversation {
        #[serde(rename = "peerId")]
        peer_id: String,
    },
    Ping,
}
