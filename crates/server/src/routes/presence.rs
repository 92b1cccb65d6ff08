use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use mingle_shared::{constants, country, validation};

use crate::db;
use crate::error::{ApiError, FieldError};
use crate::models::{AuthUser, RosterQuery, SessionResponse, SignInRequest, User};
use crate::ws::events::ServerEvent;
use crate::AppState;

/// POST /api/presence/sign-in
///
/// Upserts by username: signing in again while a row for the name exists
/// refreshes that row instead of creating a second one, and the user id
/// stays stable.
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignInRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let mut fields = Vec::new();

    let username = body.username.as_deref().unwrap_or("").trim().to_string();
    if let Err(message) = validation::validate_username(&username) {
        fields.push(FieldError {
            field: "username",
            message,
        });
    }

    // Missing age fails the same range check as an out-of-range one
    let age = body.age.unwrap_or(-1);
    if let Err(message) = validation::validate_age(age) {
        fields.push(FieldError {
            field: "age",
            message,
        });
    }

    let gender = body.gender.as_deref().unwrap_or("").trim().to_lowercase();
    if let Err(message) = validation::validate_gender(&gender) {
        fields.push(FieldError {
            field: "gender",
            message,
        });
    }

    let country_name = body.country.as_deref().unwrap_or("").trim().to_string();
    if let Err(message) = validation::validate_country(&country_name) {
        fields.push(FieldError {
            field: "country",
            message,
        });
    }

    if !fields.is_empty() {
        return Err(ApiError::Validation(fields));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let country_code = country::code_for(&country_name);

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (id, username, age, gender, country, country_code, status, last_seen, created_at)
         VALUES (?, ?, ?, ?, ?, ?, 'online', ?, ?)
         ON CONFLICT(username) DO UPDATE SET
             age = excluded.age,
             gender = excluded.gender,
             country = excluded.country,
             country_code = excluded.country_code,
             status = 'online',
             last_seen = excluded.last_seen
         RETURNING *",
    )
    .bind(&id)
    .bind(&username)
    .bind(age)
    .bind(&gender)
    .bind(&country_name)
    .bind(country_code)
    .bind(&now)
    .bind(&now)
    .fetch_one(&state.db)
    .await?;

    let token = uuid::Uuid::new_v4().to_string();
    let expires_at =
        (chrono::Utc::now() + chrono::Duration::hours(constants::SESSION_TTL_HOURS)).to_rfc3339();

    sqlx::query(
        "INSERT INTO sessions (id, user_id, token, expires_at, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(&user.id)
    .bind(&token)
    .bind(&expires_at)
    .bind(&now)
    .execute(&state.db)
    .await?;

    tracing::info!("{} signed in", user.username);

    state
        .gateway
        .broadcast_all(&ServerEvent::Presence { user: user.clone() })
        .await;

    Ok(Json(SessionResponse { user, token }))
}

/// POST /api/presence/sign-out
///
/// Idempotent: flips status to offline without revoking the session, so a
/// repeated call succeeds. last_seen is refreshed so the offline retention
/// window counts from the sign-out.
pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<StatusCode, ApiError> {
    let now = chrono::Utc::now().to_rfc3339();

    let updated = sqlx::query_as::<_, User>(
        "UPDATE users SET status = 'offline', last_seen = ? WHERE id = ? RETURNING *",
    )
    .bind(&now)
    .bind(&user.id)
    .fetch_optional(&state.db)
    .await?;

    if let Some(updated) = updated {
        state
            .gateway
            .broadcast_all(&ServerEvent::Presence { user: updated })
            .await;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/presence/heartbeat
pub async fn heartbeat(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<StatusCode, ApiError> {
    let now = chrono::Utc::now().to_rfc3339();

    let result = sqlx::query("UPDATE users SET last_seen = ? WHERE id = ?")
        .bind(&now)
        .bind(&user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("User"));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/presence/online
pub async fn list_online(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<RosterQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = db::retry_read(|| {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE status = 'online' ORDER BY created_at",
        )
        .fetch_all(&state.db)
    })
    .await?;

    let search = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let country = query
        .country
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && *c != "all");

    let users = users
        .into_iter()
        .filter(|u| {
            let matches_search = search
                .as_deref()
                .map_or(true, |s| u.username.to_lowercase().contains(s));
            let matches_min = query.min_age.map_or(true, |min| u.age >= min);
            let matches_max = query.max_age.map_or(true, |max| u.age <= max);
            let matches_country = country.map_or(true, |c| u.country_code == c);
            matches_search && matches_min && matches_max && matches_country
        })
        .collect();

    Ok(Json(users))
}
