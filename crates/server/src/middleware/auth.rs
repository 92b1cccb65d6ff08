use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::models::AuthUser;
use crate::AppState;

pub const SESSION_COOKIE: &str = "mingle.session_token=";

/// Resolve a session token to its user, rejecting expired sessions.
/// Reaped users take their sessions with them (FK cascade), so a stale
/// token simply stops resolving.
pub async fn lookup_session(
    db: &sqlx::SqlitePool,
    token: &str,
) -> Result<Option<AuthUser>, sqlx::Error> {
    let row = sqlx::query_as::<_, (String, String, String)>(
        "SELECT u.id, u.username, s.expires_at
         FROM sessions s
         JOIN users u ON u.id = s.user_id
         WHERE s.token = ?",
    )
    .bind(token)
    .fetch_optional(db)
    .await?;

    let Some((id, username, expires_at)) = row else {
        return Ok(None);
    };

    let now = chrono::Utc::now().to_rfc3339();
    if expires_at < now {
        return Ok(None);
    }

    Ok(Some(AuthUser { id, username }))
}

pub fn token_from_cookie_header(cookie_header: &str) -> Option<&str> {
    cookie_header
        .split(';')
        .filter_map(|c| {
            let c = c.trim();
            c.strip_prefix(SESSION_COOKIE)
        })
        .next()
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        let cookie = parts
            .headers
            .get("cookie")
            .and_then(|v| v.to_str().ok())
            .and_then(token_from_cookie_header);

        let token = match bearer.or(cookie) {
            Some(t) if !t.is_empty() => t,
            _ => {
                return Err((
                    StatusCode::UNAUTHORIZED,
                    Json(serde_json::json!({"error": "Not authenticated"})),
                )
                    .into_response())
            }
        };

        let user = lookup_session(&state.db, token).await.map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Database error"})),
            )
                .into_response()
        })?;

        user.ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"error": "Invalid session"})),
            )
                .into_response()
        })
    }
}
