/*
 * Responsibility
 * - 環境変数の読み込み (PORT, 許可する identity, 401 応答の形など)
 * - 設定値のバリデーション (不正なら起動失敗)
 */
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use axum::http::{HeaderName, HeaderValue};

use crate::error::{Rejection, RejectionBody};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub body_limit_bytes: usize,
    pub request_timeout_seconds: u64,

    // Header carrying the client address; only set this behind a trusted proxy
    // that overwrites it. Unset means the peer address is the identity.
    pub identity_header: Option<HeaderName>,
    pub allowed_identities: Vec<IpAddr>,

    // WWW-Authenticate value on 401, omitted when unset
    pub auth_challenge: Option<HeaderValue>,
    pub auth_error_body: RejectionBody,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let app_env = lookup("APP_ENV")
            .map(|v| AppEnv::parse(&v))
            .unwrap_or(AppEnv::Development);

        let body_limit_bytes = match lookup("BODY_LIMIT_BYTES") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::Invalid("BODY_LIMIT_BYTES"))?,
            None => 1024 * 1024,
        };

        // 0 だと全リクエストが 408 になる
        let request_timeout_seconds = match lookup("REQUEST_TIMEOUT_SECONDS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"))?,
            None => 30,
        };

        let identity_header = lookup("AUTH_IDENTITY_HEADER")
            .filter(|v| !v.trim().is_empty())
            .map(|v| {
                HeaderName::try_from(v.trim())
                    .map_err(|_| ConfigError::Invalid("AUTH_IDENTITY_HEADER"))
            })
            .transpose()?;

        let allowed_identities = lookup("AUTH_ALLOWED_IDENTITIES")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<IpAddr>()
                    .map_err(|_| ConfigError::Invalid("AUTH_ALLOWED_IDENTITIES"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let auth_challenge = lookup("AUTH_CHALLENGE")
            .filter(|v| !v.trim().is_empty())
            .map(|v| HeaderValue::try_from(v).map_err(|_| ConfigError::Invalid("AUTH_CHALLENGE")))
            .transpose()?;

        let auth_error_body = match lookup("AUTH_ERROR_BODY")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str()
        {
            "" | "empty" => RejectionBody::Empty,
            "json" => RejectionBody::Json,
            _ => return Err(ConfigError::Invalid("AUTH_ERROR_BODY")),
        };

        Ok(Self {
            addr,
            app_env,
            body_limit_bytes,
            request_timeout_seconds,
            identity_header,
            allowed_identities,
            auth_challenge,
            auth_error_body,
        })
    }

    /// 401 応答の形を設定から組み立てる
    pub fn rejection(&self) -> Rejection {
        let rejection = Rejection::new().with_body(self.auth_error_body);
        match &self.auth_challenge {
            Some(challenge) => rejection.with_challenge(challenge.clone()),
            None => rejection,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert!(config.identity_header.is_none());
        assert_eq!(config.body_limit_bytes, 1024 * 1024);
        assert_eq!(config.request_timeout_seconds, 30);
        assert!(config.allowed_identities.is_empty());
        assert!(config.auth_challenge.is_none());
        assert_eq!(config.auth_error_body, RejectionBody::Empty);
    }

    #[test]
    fn allowlist_is_parsed_and_trimmed() {
        let config = config_from(&[("AUTH_ALLOWED_IDENTITIES", " 0.0.0.0, ::1 ,,")]).unwrap();

        assert_eq!(
            config.allowed_identities,
            vec![
                "0.0.0.0".parse::<IpAddr>().unwrap(),
                "::1".parse::<IpAddr>().unwrap()
            ]
        );
    }

    #[test]
    fn bad_allowlist_entry_fails_startup() {
        let err = config_from(&[("AUTH_ALLOWED_IDENTITIES", "0.0.0.0,not-an-ip")]).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("AUTH_ALLOWED_IDENTITIES"));
    }

    #[test]
    fn bad_port_fails_startup() {
        let err = config_from(&[("PORT", "http")]).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("PORT"));
    }

    #[test]
    fn identity_header_is_opt_in() {
        let config = config_from(&[("AUTH_IDENTITY_HEADER", "X-Real-IP")]).unwrap();
        assert_eq!(config.identity_header.unwrap(), "x-real-ip");

        let err = config_from(&[("AUTH_IDENTITY_HEADER", "bad header")]).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("AUTH_IDENTITY_HEADER"));
    }

    #[test]
    fn unparsable_limits_fail_startup() {
        let err = config_from(&[("BODY_LIMIT_BYTES", "1MiB")]).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("BODY_LIMIT_BYTES"));

        let err = config_from(&[("REQUEST_TIMEOUT_SECONDS", "soon")]).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"));
    }

    #[test]
    fn zero_timeout_fails_startup() {
        let err = config_from(&[("REQUEST_TIMEOUT_SECONDS", "0")]).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"));

        let config = config_from(&[("REQUEST_TIMEOUT_SECONDS", "5"), ("BODY_LIMIT_BYTES", "2048")])
            .unwrap();
        assert_eq!(config.request_timeout_seconds, 5);
        assert_eq!(config.body_limit_bytes, 2048);
    }

    #[test]
    fn unknown_error_body_fails_startup() {
        let err = config_from(&[("AUTH_ERROR_BODY", "html")]).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("AUTH_ERROR_BODY"));
    }

    #[test]
    fn rejection_carries_challenge_and_body() {
        let config = config_from(&[
            ("AUTH_CHALLENGE", "Bearer realm=\"api\""),
            ("AUTH_ERROR_BODY", "JSON"),
        ])
        .unwrap();

        let rejection = config.rejection();
        assert_eq!(rejection.body(), RejectionBody::Json);
        assert_eq!(
            rejection.challenge().unwrap(),
            &HeaderValue::from_static("Bearer realm=\"api\"")
        );
    }
}
