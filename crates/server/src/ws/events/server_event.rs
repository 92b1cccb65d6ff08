use serde::Serialize;

use crate::models::{Message, User};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Roster delta: carries the full profile so subscribers can re-render
    /// without a fetch. Covers sign-in, sign-out, and inactivity expiry.
    Presence { user: User },
    /// The user was reaped; their messages are gone with them.
    UserRemoved {
        #[serde(rename = "userId")]
        user_id: String,
    },
    DirectMessage { message: Message },
    Error { message: String },
}
