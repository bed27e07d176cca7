//! Configuration types.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Default header carrying the authenticated user id from the session layer.
pub const DEFAULT_IDENTITY_HEADER: &str = "x-user-id";

/// Server configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Path to the libSQL database file.
    pub db_path: PathBuf,
    /// Trusted header the upstream session layer sets to the user id.
    pub identity_header: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            db_path: PathBuf::from("./data/onboarding.db"),
            identity_header: DEFAULT_IDENTITY_HEADER.to_string(),
        }
    }
}

impl ServerConfig {
    /// Build config from `ONBOARDING_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Unset keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("ONBOARDING_PORT") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "ONBOARDING_PORT".into(),
                message: format!("{raw:?}: {e}"),
            })?,
            None => defaults.port,
        };

        let bind_addr = match lookup("ONBOARDING_BIND_ADDR") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "ONBOARDING_BIND_ADDR".into(),
                message: format!("{raw:?}: {e}"),
            })?,
            None => defaults.bind_addr,
        };

        let db_path = lookup("ONBOARDING_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let identity_header = lookup("ONBOARDING_IDENTITY_HEADER")
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.identity_header);

        if axum::http::HeaderName::from_bytes(identity_header.as_bytes()).is_err() {
            return Err(ConfigError::InvalidValue {
                key: "ONBOARDING_IDENTITY_HEADER".into(),
                message: format!("{identity_header:?} is not a valid header name"),
            });
        }

        Ok(Self {
            bind_addr,
            port,
            db_path,
            identity_header,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.identity_header, "x-user-id");
        assert_eq!(config.db_path, PathBuf::from("./data/onboarding.db"));
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn reads_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("ONBOARDING_PORT", "9000"),
            ("ONBOARDING_BIND_ADDR", "127.0.0.1"),
            ("ONBOARDING_DB_PATH", "/tmp/prefs.db"),
            ("ONBOARDING_IDENTITY_HEADER", "X-Auth-User"),
        ]))
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9000");
        assert_eq!(config.db_path, PathBuf::from("/tmp/prefs.db"));
        assert_eq!(config.identity_header, "x-auth-user");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = ServerConfig::from_lookup(lookup_from(&[("ONBOARDING_PORT", "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains("ONBOARDING_PORT"));
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let err = ServerConfig::from_lookup(lookup_from(&[(
            "ONBOARDING_IDENTITY_HEADER",
            "bad header",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("ONBOARDING_IDENTITY_HEADER"));
    }
}
