//! Cookie sessions carried as HS256 JWTs.
//!
//! The cookie holds the whole session, so nothing is stored server-side.
//! A token only proves who signed in; the user row is reloaded on every
//! request so deactivated or deleted accounts drop out immediately.

use chrono::Utc;
use filmhub_core::types::DbId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "filmhub_session";

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HMAC secret used for session tokens and flash cookies.
    pub secret: String,
    /// Session lifetime in hours.
    pub expiry_hours: i64,
    /// Add the `Secure` attribute to cookies.
    pub cookie_secure: bool,
}

impl SessionConfig {
    pub fn max_age_secs(&self) -> i64 {
        self.expiry_hours * 3600
    }
}

/// Claims embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject -- the user's id.
    pub sub: DbId,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
    /// Unique token identifier, logged on sign-in.
    pub jti: String,
}

/// Sign a session token for a user.
pub fn create_session_token(
    user_id: DbId,
    username: &str,
    config: &SessionConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        sub: user_id,
        username: username.to_string(),
        iat: now,
        exp: now + config.max_age_secs(),
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature and expiry, returning the claims.
pub fn verify_session_token(
    token: &str,
    config: &SessionConfig,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// `Set-Cookie` value that starts a session.
pub fn session_cookie(token: &str, config: &SessionConfig) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        config.max_age_secs(),
        secure_attr(config.cookie_secure)
    )
}

/// `Set-Cookie` value that ends a session.
pub fn clear_session_cookie(config: &SessionConfig) -> String {
    format!(
        "{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
        secure_attr(config.cookie_secure)
    )
}

pub(crate) fn secure_attr(secure: bool) -> &'static str {
    if secure {
        "; Secure"
    } else {
        ""
    }
}
