use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub age: i64,
    pub gender: String,
    pub country: String,
    pub country_code: String,
    pub status: String,
    pub last_seen: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: User,
    pub token: String,
}

/// All fields optional so validation can report every missing or invalid
/// one in a single response.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub username: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterQuery {
    pub search: Option<String>,
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
    /// ISO country code; "all" or empty means no filter.
    pub country: Option<String>,
}
