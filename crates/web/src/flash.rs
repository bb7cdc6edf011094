//! One-shot notices carried across a redirect in a signed cookie.
//!
//! The cookie value is `base64url(json(messages)).hex(hmac_sha256)`. A
//! [`Flash`] is extracted from the request with whatever messages are still
//! pending. Handlers that redirect push more onto it; handlers that render
//! a page [`take`](Flash::take) them for display. Returned as a response
//! part, it rewrites or clears the cookie to match what is left.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::SET_COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::response::{IntoResponseParts, ResponseParts};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::auth::session::secure_attr;
use crate::cookies::read_cookie;
use crate::state::AppState;

pub const FLASH_COOKIE: &str = "filmhub_flash";

type HmacSha256 = Hmac<Sha256>;

/// Severity. `success` is used as the alert style directly; `error` shows
/// as `danger`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: Level,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct Flash {
    messages: Vec<FlashMessage>,
    had_cookie: bool,
    changed: bool,
    secret: String,
    secure: bool,
}

impl Flash {
    /// A flash with no pending messages, signing with `secret`.
    pub fn new(secret: impl Into<String>, secure: bool) -> Self {
        Self {
            messages: Vec::new(),
            had_cookie: false,
            changed: false,
            secret: secret.into(),
            secure,
        }
    }

    fn push(mut self, level: Level, text: impl Into<String>) -> Self {
        self.messages.push(FlashMessage {
            level,
            text: text.into(),
        });
        self.changed = true;
        self
    }

    pub fn success(self, text: impl Into<String>) -> Self {
        self.push(Level::Success, text)
    }

    pub fn error(self, text: impl Into<String>) -> Self {
        self.push(Level::Error, text)
    }

    /// Remove and return every pending message for display.
    pub fn take(&mut self) -> Vec<FlashMessage> {
        if !self.messages.is_empty() {
            self.changed = true;
        }
        std::mem::take(&mut self.messages)
    }
}

impl FromRequestParts<AppState> for Flash {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = &state.config.session;
        let mut flash = Flash::new(session.secret.clone(), session.cookie_secure);
        if let Some(raw) = read_cookie(&parts.headers, FLASH_COOKIE) {
            flash.had_cookie = true;
            match decode(raw, &session.secret) {
                Some(messages) => flash.messages = messages,
                None => {
                    tracing::debug!("Ignoring flash cookie with a bad signature");
                    flash.changed = true;
                }
            }
        }
        Ok(flash)
    }
}

impl IntoResponseParts for Flash {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if !self.changed {
            return Ok(res);
        }
        let cookie = if self.messages.is_empty() {
            if !self.had_cookie {
                return Ok(res);
            }
            format!(
                "{FLASH_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
                secure_attr(self.secure)
            )
        } else {
            format!(
                "{FLASH_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax{}",
                encode(&self.messages, &self.secret),
                secure_attr(self.secure)
            )
        };
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                res.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Flash cookie is not a valid header value"),
        }
        Ok(res)
    }
}

fn mac(secret: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(b"filmhub-flash:");
    mac
}

/// Serialize and sign messages into a cookie value.
pub fn encode(messages: &[FlashMessage], secret: &str) -> String {
    let json = serde_json::to_vec(messages).unwrap_or_default();
    let payload = URL_SAFE_NO_PAD.encode(json);
    let mut mac = mac(secret);
    mac.update(payload.as_bytes());
    format!("{payload}.{:x}", mac.finalize().into_bytes())
}

/// Verify and deserialize a cookie value. `None` if tampered or malformed.
pub fn decode(value: &str, secret: &str) -> Option<Vec<FlashMessage>> {
    let (payload, signature) = value.split_once('.')?;
    let mut mac = mac(secret);
    mac.update(payload.as_bytes());
    mac.verify_slice(&decode_hex(signature)?).ok()?;
    let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&json).ok()
}

fn decode_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 || !hex.is_ascii() {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;

    use super::*;

    const SECRET: &str = "flash-test-secret";

    fn message(text: &str) -> FlashMessage {
        FlashMessage {
            level: Level::Success,
            text: text.to_string(),
        }
    }

    #[test]
    fn signed_cookie_round_trips() {
        let messages = vec![message("You have successfully logged in!")];
        let value = encode(&messages, SECRET);
        assert_eq!(decode(&value, SECRET), Some(messages));
    }

    #[test]
    fn tampering_is_detected() {
        let value = encode(&[message("hello")], SECRET);
        assert_eq!(decode(&value, "other-secret"), None);

        let forged_payload = URL_SAFE_NO_PAD.encode(br#"[{"level":"error","text":"forged"}]"#);
        let (_, signature) = value.split_once('.').unwrap();
        assert_eq!(decode(&format!("{forged_payload}.{signature}"), SECRET), None);
        assert_eq!(decode("no-dot-here", SECRET), None);
    }

    fn set_cookies(flash: Flash) -> Vec<String> {
        let response = (flash, "body").into_response();
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn untouched_flash_sets_no_cookie() {
        assert!(set_cookies(Flash::new(SECRET, false)).is_empty());
    }

    #[test]
    fn pushed_messages_are_written() {
        let cookies = set_cookies(Flash::new(SECRET, false).success("Profile updated!"));
        assert_eq!(cookies.len(), 1);
        let value = cookies[0]
            .strip_prefix("filmhub_flash=")
            .and_then(|rest| rest.split(';').next())
            .unwrap();
        assert_eq!(decode(value, SECRET).unwrap()[0].text, "Profile updated!");
    }

    #[test]
    fn messages_keep_their_level_in_order() {
        let mut flash = Flash::new(SECRET, false)
            .error("This film does not belong to you!")
            .success("You have successfully logged out!");
        let levels: Vec<Level> = flash.take().iter().map(|m| m.level).collect();
        assert_eq!(levels, [Level::Error, Level::Success]);

        let error = FlashMessage {
            level: Level::Error,
            text: "x".into(),
        };
        let value = encode(&[error], SECRET);
        let json = URL_SAFE_NO_PAD.decode(value.split_once('.').unwrap().0).unwrap();
        assert_eq!(String::from_utf8(json).unwrap(), r#"[{"level":"error","text":"x"}]"#);
    }

    #[test]
    fn taking_displayed_messages_clears_cookie() {
        let mut flash = Flash::new(SECRET, false).success("hi");
        flash.had_cookie = true;
        assert_eq!(flash.take().len(), 1);
        let cookies = set_cookies(flash);
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].contains("Max-Age=0"));
    }
}
