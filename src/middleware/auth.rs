use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{self, AuthError, SESSION_COOKIE};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated admin context extracted from the session cookie
#[derive(Clone, Debug)]
pub struct AdminIdentity {
    pub username: String,
    /// Raw token, kept so logout can revoke exactly this session
    pub token: String,
}

/// Session-cookie authentication middleware. Verifies the signed claim and
/// checks it against the injected revocation store, then makes the admin
/// identity available to handlers via request extensions.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session_token_from_headers(request.headers()).ok_or_else(|| {
        ApiError::from(AuthError::MissingToken)
    })?;

    let claims = auth::verify_session_token(&token)?;

    if state.revocations.is_revoked(&token).await {
        return Err(AuthError::Revoked.into());
    }

    request.extensions_mut().insert(AdminIdentity {
        username: claims.sub,
        token,
    });

    Ok(next.run(request).await)
}

/// Pull the session token out of the Cookie header
fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, value.parse().unwrap());
        headers
    }

    #[test]
    fn finds_session_cookie_among_others() {
        let headers = headers_with_cookie("theme=dark; admin_session=tok123; lang=en");
        assert_eq!(session_token_from_headers(&headers).as_deref(), Some("tok123"));
    }

    #[test]
    fn missing_or_empty_cookie_yields_none() {
        assert!(session_token_from_headers(&HeaderMap::new()).is_none());
        let headers = headers_with_cookie("admin_session=");
        assert!(session_token_from_headers(&headers).is_none());
    }
}
