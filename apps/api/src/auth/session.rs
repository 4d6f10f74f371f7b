use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Name of the HttpOnly cookie that carries the session token.
pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub exp: usize,
}

/// Signs a session token for `user_id` valid for `ttl_hours`.
pub fn issue_token(
    secret: &str,
    user_id: i64,
    username: &str,
    ttl_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let expiry = Utc::now() + Duration::hours(ttl_hours);
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: expiry.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Checks signature and expiry.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
}
