use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad input; carries every failing field so callers can show them all at once.
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Maps a foreign-key violation on insert to NotFound: the referenced
/// user row is gone (reaped or never existed).
pub fn not_found_on_fk(err: sqlx::Error, what: &'static str) -> ApiError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => ApiError::NotFound(what),
        _ => ApiError::Database(err),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Validation failed", "fields": fields})),
            )
                .into_response(),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": format!("{} not found", what)})),
            )
                .into_response(),
            ApiError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"error": "Database error"})),
                )
                    .into_response()
            }
        }
    }
}
