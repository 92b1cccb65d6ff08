mod message;
mod user;

pub use message::*;
pub use user::*;

/// Resolved identity of an authenticated request, extracted from the
/// session token by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
}
