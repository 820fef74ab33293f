//! Admin session tokens and revocation.
//!
//! A single admin identity is configured through the environment; sessions
//! are signed claims carried in an HttpOnly cookie. Revoked tokens are held
//! in a [`RevocationStore`] that lives in app state and is passed to the
//! middleware explicitly, so its lifecycle is visible and tests can inject
//! their own.

use std::collections::HashSet;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config;

/// Name of the session cookie the admin frontend holds.
pub const SESSION_COOKIE: &str = "admin_session";

const ISSUER: &str = "menu-api";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no session token presented")]
    MissingToken,

    #[error("session token invalid or expired")]
    InvalidToken,

    #[error("session token has been revoked")]
    Revoked,

    #[error("invalid username or password")]
    BadCredentials,

    #[error("missing configuration: {0}")]
    ConfigMissing(&'static str),
}

/// Signed session claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Admin username
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
}

fn secret() -> Result<String, AuthError> {
    std::env::var("JWT_SECRET").map_err(|_| AuthError::ConfigMissing("JWT_SECRET"))
}

/// Mint a signed session token for an authenticated admin
pub fn mint_session_token(username: &str) -> Result<String, AuthError> {
    let now = Utc::now();
    let expiry_hours = config::config().security.session_expiry_hours as i64;
    let claims = Claims {
        sub: username.to_string(),
        exp: (now + Duration::hours(expiry_hours)).timestamp(),
        iat: now.timestamp(),
        iss: ISSUER.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret()?.as_ref()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Verify a session token's signature, expiry, and issuer
pub fn verify_session_token(token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::default();
    validation.set_issuer(&[ISSUER]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret()?.as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidToken)
}

/// Check submitted credentials against the configured admin account.
/// The password is compared as a SHA-256 digest against ADMIN_PASSWORD_SHA256.
pub fn verify_credentials(username: &str, password: &str) -> Result<(), AuthError> {
    let expected_user =
        std::env::var("ADMIN_USERNAME").map_err(|_| AuthError::ConfigMissing("ADMIN_USERNAME"))?;
    let expected_hash = std::env::var("ADMIN_PASSWORD_SHA256")
        .map_err(|_| AuthError::ConfigMissing("ADMIN_PASSWORD_SHA256"))?;

    let submitted_hash = hex_digest(password.as_bytes());
    if username == expected_user && submitted_hash.eq_ignore_ascii_case(&expected_hash) {
        Ok(())
    } else {
        Err(AuthError::BadCredentials)
    }
}

/// Revoked-token set keyed by token hash. Injected where needed rather than
/// kept as module state; logout inserts, the auth middleware consults.
#[derive(Debug, Default)]
pub struct RevocationStore {
    revoked: RwLock<HashSet<String>>,
}

impl RevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn revoke(&self, token: &str) {
        let mut revoked = self.revoked.write().await;
        revoked.insert(hex_digest(token.as_bytes()));
    }

    pub async fn is_revoked(&self, token: &str) -> bool {
        let revoked = self.revoked.read().await;
        revoked.contains(&hex_digest(token.as_bytes()))
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn revocation_store_tracks_tokens() {
        let store = RevocationStore::new();
        assert!(!store.is_revoked("abc").await);
        store.revoke("abc").await;
        assert!(store.is_revoked("abc").await);
        assert!(!store.is_revoked("other").await);
    }

    #[test]
    fn token_roundtrip() {
        std::env::set_var("JWT_SECRET", "test-secret");
        let token = mint_session_token("admin").unwrap();
        let claims = verify_session_token(&token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.iss, ISSUER);
    }

    #[test]
    fn tampered_token_is_rejected() {
        std::env::set_var("JWT_SECRET", "test-secret");
        let token = mint_session_token("admin").unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(verify_session_token(&tampered).is_err());
    }
}
