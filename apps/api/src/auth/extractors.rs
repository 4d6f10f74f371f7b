use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::session::{verify_token, SESSION_COOKIE};
use crate::errors::AppError;
use crate::state::AppState;

/// The signed-in caller, taken from the `session` cookie or a Bearer header.
///
/// The cookie is tried first; a Bearer token is still accepted when the cookie
/// is stale or forged. Use `Option<AuthUser>` for routes where identity is optional.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = candidate_tokens(parts)
            .into_iter()
            .find_map(|token| match verify_token(&state.config.secret_key, &token) {
                Ok(claims) => Some(claims),
                Err(e) => {
                    tracing::debug!("Rejected session token: {e}");
                    None
                }
            })
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser {
            id: claims.sub,
            username: claims.username,
        })
    }
}

/// Session cookie first, then the Bearer header.
fn candidate_tokens(parts: &Parts) -> Vec<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    let cookie = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());

    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());

    cookie
        .into_iter()
        .chain(bearer)
        .filter(|token| !token.is_empty())
        .collect()
}
