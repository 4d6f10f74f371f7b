//! Axum route handlers for login, registration and logout.
//!
//! These keep the `{success, message}` body the browser client expects,
//! including on 400 and 401. Storage failures still go through `AppError`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::accounts::{create_user, find_user_by_username, RegistrationError};
use crate::auth::password::verify_password;
use crate::auth::session::{issue_token, SESSION_COOKIE};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// `None`, `null` and `""` all count as not filled in.
fn filled(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

#[derive(Debug, Serialize)]
pub struct AccountUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AccountUser>,
}

impl AccountResponse {
    fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            user: None,
        }
    }

    fn rejected(status: StatusCode, message: &str) -> Response {
        let body = Self {
            success: false,
            message: message.to_string(),
            user: None,
        };
        (status, Json(body)).into_response()
    }
}

/// POST /login
pub async fn handle_login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Response, AppError> {
    let (Some(username), Some(password)) = (filled(request.username), filled(request.password))
    else {
        return Ok(AccountResponse::rejected(
            StatusCode::BAD_REQUEST,
            "请填写用户名和密码",
        ));
    };

    let user = find_user_by_username(&state.db, &username).await?;
    let Some(user) = user.filter(|u| verify_password(&password, &u.password_hash)) else {
        return Ok(AccountResponse::rejected(
            StatusCode::UNAUTHORIZED,
            "用户名或密码错误",
        ));
    };

    let token = issue_token(
        &state.config.secret_key,
        user.id,
        &user.username,
        state.config.session_ttl_hours,
    )
    .map_err(|e| anyhow::anyhow!("Failed to sign session token: {e}"))?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    info!("User {} logged in", user.id);

    let body = AccountResponse {
        success: true,
        message: "登录成功".to_string(),
        user: Some(AccountUser {
            id: user.id,
            username: user.username,
            email: user.email,
        }),
    };
    Ok((jar.add(cookie), Json(body)).into_response())
}

/// POST /register
pub async fn handle_register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<Response, AppError> {
    let (Some(username), Some(email), Some(password)) = (
        filled(request.username),
        filled(request.email),
        filled(request.password),
    ) else {
        return Ok(AccountResponse::rejected(
            StatusCode::BAD_REQUEST,
            "请填写所有字段",
        ));
    };

    match create_user(&state.db, &username, &email, &password).await {
        Ok(_) => Ok(Json(AccountResponse::ok("注册成功")).into_response()),
        Err(RegistrationError::UsernameTaken) => Ok(AccountResponse::rejected(
            StatusCode::BAD_REQUEST,
            "用户名已存在",
        )),
        Err(RegistrationError::EmailTaken) => Ok(AccountResponse::rejected(
            StatusCode::BAD_REQUEST,
            "邮箱已存在",
        )),
        Err(RegistrationError::Other(e)) => Err(AppError::from(e)),
    }
}

/// GET /logout
pub async fn handle_logout(user: AuthUser, jar: CookieJar) -> (CookieJar, Json<AccountResponse>) {
    info!("User {} logged out", user.id);
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Json(AccountResponse::ok("已退出登录")))
}
