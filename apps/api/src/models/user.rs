use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string. Never serialized.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
