use std::path::PathBuf;
use std::str::FromStr;

use filmhub_core::password_rules::DEFAULT_MIN_LENGTH;

use crate::auth::session::SessionConfig;

/// Default session lifetime: two weeks.
const DEFAULT_SESSION_EXPIRY_HOURS: i64 = 336;
/// Default upload ceiling: 10 MiB.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Credentials for the superuser created (or promoted) at startup.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long in-flight requests may drain after a shutdown signal.
    pub shutdown_timeout_secs: u64,
    /// Session cookie signing and lifetime.
    pub session: SessionConfig,
    /// Directory uploaded images are written to and served from.
    pub media_root: PathBuf,
    /// Largest accepted image upload in bytes.
    pub max_upload_bytes: usize,
    /// Minimum password length enforced at registration.
    pub password_min_length: usize,
    /// Optional superuser bootstrap.
    pub admin: Option<AdminBootstrap>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default         |
    /// |-------------------------|-----------------|
    /// | `HOST`                  | `0.0.0.0`       |
    /// | `PORT`                  | `3000`          |
    /// | `DATABASE_URL`          | **required**    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`            |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`            |
    /// | `SESSION_SECRET`        | **required**    |
    /// | `SESSION_EXPIRY_HOURS`  | `336`           |
    /// | `SESSION_COOKIE_SECURE` | `false`         |
    /// | `MEDIA_ROOT`            | `media`         |
    /// | `MAX_UPLOAD_BYTES`      | `10485760`      |
    /// | `PASSWORD_MIN_LENGTH`   | `8`             |
    ///
    /// `ADMIN_USERNAME` and `ADMIN_PASSWORD` (plus optional `ADMIN_EMAIL`)
    /// enable the superuser bootstrap when both are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &'static str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let secret = var("SESSION_SECRET").ok_or(ConfigError::Missing("SESSION_SECRET"))?;

        let admin = match (var("ADMIN_USERNAME"), var("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminBootstrap {
                username,
                password,
                email: var("ADMIN_EMAIL").unwrap_or_default(),
            }),
            _ => None,
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse(var("PORT"), "PORT", 3000)?,
            database_url,
            request_timeout_secs: parse(var("REQUEST_TIMEOUT_SECS"), "REQUEST_TIMEOUT_SECS", 30)?,
            shutdown_timeout_secs: parse(
                var("SHUTDOWN_TIMEOUT_SECS"),
                "SHUTDOWN_TIMEOUT_SECS",
                30,
            )?,
            session: SessionConfig {
                secret,
                expiry_hours: parse(
                    var("SESSION_EXPIRY_HOURS"),
                    "SESSION_EXPIRY_HOURS",
                    DEFAULT_SESSION_EXPIRY_HOURS,
                )?,
                cookie_secure: parse(var("SESSION_COOKIE_SECURE"), "SESSION_COOKIE_SECURE", false)?,
            },
            media_root: var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("media")),
            max_upload_bytes: parse(
                var("MAX_UPLOAD_BYTES"),
                "MAX_UPLOAD_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
            password_min_length: parse(
                var("PASSWORD_MIN_LENGTH"),
                "PASSWORD_MIN_LENGTH",
                DEFAULT_MIN_LENGTH,
            )?,
            admin,
        })
    }
}

fn parse<T>(raw: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) => Ok(parsed),
            Err(e) => Err(ConfigError::Invalid {
                name,
                reason: e.to_string(),
                value,
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/filmhub"),
        ("SESSION_SECRET", "s3cret"),
    ];

    #[test]
    fn defaults_apply() {
        let config = ServerConfig::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.session.expiry_hours, 336);
        assert!(!config.session.cookie_secure);
        assert_eq!(config.media_root, PathBuf::from("media"));
        assert_eq!(config.max_upload_bytes, 10_485_760);
        assert_eq!(config.password_min_length, 8);
        assert!(config.admin.is_none());
    }

    #[test]
    fn missing_secret_is_reported() {
        let err = ServerConfig::from_lookup(lookup(&REQUIRED[..1])).unwrap_err();
        assert_matches!(err, ConfigError::Missing("SESSION_SECRET"));
    }

    #[test]
    fn invalid_number_is_reported() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "eighty"));
        let err = ServerConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { name: "PORT", .. });
    }

    #[test]
    fn admin_bootstrap_needs_username_and_password() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ADMIN_USERNAME", "root"));
        assert!(ServerConfig::from_lookup(lookup(&pairs))
            .unwrap()
            .admin
            .is_none());

        pairs.push(("ADMIN_PASSWORD", "correct-horse"));
        let admin = ServerConfig::from_lookup(lookup(&pairs))
            .unwrap()
            .admin
            .unwrap();
        assert_eq!(admin.username, "root");
        assert_eq!(admin.email, "");
    }
}
