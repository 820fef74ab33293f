use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{IntoResponse, Json},
    Extension,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{self, SESSION_COOKIE};
use crate::config;
use crate::error::ApiError;
use crate::middleware::auth::AdminIdentity;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}

/// POST /auth/login - check credentials and set the session cookie
pub async fn login(Json(body): Json<LoginBody>) -> Result<impl IntoResponse, ApiError> {
    auth::verify_credentials(&body.username, &body.password)?;

    let token = auth::mint_session_token(&body.username)?;
    let max_age_secs = config::config().security.session_expiry_hours * 3600;
    let cookie = format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
        SESSION_COOKIE, token, max_age_secs
    );

    Ok(([(SET_COOKIE, cookie)], Json(json!({ "ok": true }))))
}

/// POST /auth/logout - revoke the presented session and clear the cookie
pub async fn logout(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
) -> Result<impl IntoResponse, ApiError> {
    state.revocations.revoke(&identity.token).await;

    let cookie = format!("{}=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax", SESSION_COOKIE);
    Ok(([(SET_COOKIE, cookie)], Json(json!({ "ok": true }))))
}

/// GET /auth/whoami - current admin identity
pub async fn whoami(
    Extension(identity): Extension<AdminIdentity>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(json!({ "ok": true, "username": identity.username })))
}
