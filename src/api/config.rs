//! Receiver configuration loaded from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use secrecy::SecretString;

use crate::app::DEFAULT_MAX_BODY_BYTES;
use crate::domain::ConfigError;

use super::router::{DEFAULT_WEBHOOK_PATH, RouterConfig};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Everything the receiver binary needs to start.
#[derive(Debug)]
pub struct ReceiverConfig {
    pub bind_addr: SocketAddr,
    pub webhook_secret: SecretString,
    pub max_body_bytes: usize,
    pub json_logs: bool,
    pub router: RouterConfig,
}

impl ReceiverConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// See [`from_lookup`](Self::from_lookup).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, which maps a variable name
    /// to its value.
    ///
    /// Variables: `SAGAPAY_WEBHOOK_SECRET` (required), `BIND_ADDR`,
    /// `WEBHOOK_PATH`, `REQUEST_TIMEOUT_SECS` (also bounds the event
    /// handler), `MAX_BODY_BYTES`, `LOG_FORMAT=json`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingEnvVar`] when the secret is absent or empty,
    /// [`ConfigError::InvalidValue`] when a value does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let webhook_secret = get("SAGAPAY_WEBHOOK_SECRET")
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("SAGAPAY_WEBHOOK_SECRET".to_string()))?;

        let bind_addr: SocketAddr = parse_or(get("BIND_ADDR"), "BIND_ADDR", DEFAULT_BIND_ADDR.parse().ok())?;

        let webhook_path = get("WEBHOOK_PATH").unwrap_or_else(|| DEFAULT_WEBHOOK_PATH.to_string());
        if !webhook_path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                key: "WEBHOOK_PATH".to_string(),
                message: "must start with '/'".to_string(),
            });
        }

        let timeout_secs: u64 = parse_or(get("REQUEST_TIMEOUT_SECS"), "REQUEST_TIMEOUT_SECS", Some(30))?;
        let max_body_bytes = parse_or(get("MAX_BODY_BYTES"), "MAX_BODY_BYTES", Some(DEFAULT_MAX_BODY_BYTES))?;

        let json_logs = get("LOG_FORMAT").is_some_and(|format| format.eq_ignore_ascii_case("json"));

        Ok(Self {
            bind_addr,
            webhook_secret,
            max_body_bytes,
            json_logs,
            router: RouterConfig {
                webhook_path,
                request_timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: Option<T>) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| invalid(e.to_string())),
        None => default.ok_or_else(|| invalid("no value".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ReceiverConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ReceiverConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_only_secret() {
        let config = config_from(&[("SAGAPAY_WEBHOOK_SECRET", "whsec")]).unwrap();
        assert_eq!(config.webhook_secret.expose_secret(), "whsec");
        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.max_body_bytes, 64 * 1024);
        assert!(!config.json_logs);
        assert_eq!(config.router, RouterConfig::default());
    }

    #[test]
    fn test_missing_secret() {
        let err = config_from(&[("BIND_ADDR", "127.0.0.1:8080")]).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnvVar("SAGAPAY_WEBHOOK_SECRET".to_string()));

        let err = config_from(&[("SAGAPAY_WEBHOOK_SECRET", "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("SAGAPAY_WEBHOOK_SECRET", "whsec"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("WEBHOOK_PATH", "/ipn"),
            ("REQUEST_TIMEOUT_SECS", "5"),
            ("MAX_BODY_BYTES", "1024"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.router.webhook_path, "/ipn");
        assert_eq!(config.router.request_timeout, Duration::from_secs(5));
        assert_eq!(config.max_body_bytes, 1024);
        assert!(config.json_logs);
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = config_from(&[("SAGAPAY_WEBHOOK_SECRET", "whsec"), ("BIND_ADDR", "localhost")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "BIND_ADDR"));

        let err = config_from(&[("SAGAPAY_WEBHOOK_SECRET", "whsec"), ("WEBHOOK_PATH", "webhook")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "WEBHOOK_PATH"));

        let err = config_from(&[("SAGAPAY_WEBHOOK_SECRET", "whsec"), ("REQUEST_TIMEOUT_SECS", "soon")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "REQUEST_TIMEOUT_SECS"));
    }
}
