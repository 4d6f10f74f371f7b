use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::auth::password::hash_password;
use crate::models::user::UserRow;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("username already exists")]
    UsernameTaken,

    #[error("email already exists")]
    EmailTaken,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub async fn find_user_by_id(pool: &SqlitePool, user_id: i64) -> Result<Option<UserRow>> {
    Ok(sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?)
}

pub async fn find_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<UserRow>> {
    Ok(sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?)
}

async fn email_exists(pool: &SqlitePool, email: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Creates the account and its empty stats row in one transaction.
///
/// Username is checked before email. A unique-constraint violation from a
/// concurrent registration is reported as `UsernameTaken` as well.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password: &str,
) -> Result<UserRow, RegistrationError> {
    if find_user_by_username(pool, username).await?.is_some() {
        return Err(RegistrationError::UsernameTaken);
    }
    if email_exists(pool, email).await? {
        return Err(RegistrationError::EmailTaken);
    }

    let password_hash =
        hash_password(password).map_err(|e| anyhow::anyhow!("Password hashing failed: {e}"))?;
    let now = Utc::now();

    let mut tx = pool.begin().await.map_err(anyhow::Error::from)?;

    let user = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (username, email, password_hash, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(&password_hash)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        let unique_violation = e
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation());
        if unique_violation {
            RegistrationError::UsernameTaken
        } else {
            RegistrationError::Other(e.into())
        }
    })?;

    sqlx::query("INSERT INTO user_stats (user_id, updated_at) VALUES (?, ?)")
        .bind(user.id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(anyhow::Error::from)?;

    tx.commit().await.map_err(anyhow::Error::from)?;

    info!("Registered user {} ({})", user.id, user.username);
    Ok(user)
}
