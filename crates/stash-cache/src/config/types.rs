//! Cache configuration types.

use crate::error::CacheError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which storage strategy a [`Cache`](crate::Cache) is built on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BackendKind {
    /// In-process concurrent map.
    #[default]
    Local,
    /// Redis server reached through the shared client.
    Remote,
}

impl BackendKind {
    /// Canonical name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "local-map" | "memory" => Ok(Self::Local),
            "remote" | "redis" => Ok(Self::Remote),
            _ => Err(CacheError::UnsupportedBackendKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for BackendKind {
    type Error = CacheError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BackendKind> for String {
    fn from(kind: BackendKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Parameters for reaching the remote store. Ignored by the local backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionOptions {
    /// `host:port` of the server.
    #[serde(default = "default_address")]
    pub address: String,
    /// Password for `AUTH`; empty disables authentication.
    #[serde(default)]
    pub password: String,
    /// Logical database index selected after connecting.
    #[serde(default)]
    pub database: i64,
}

fn default_address() -> String {
    "127.0.0.1:6379".to_string()
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            address: default_address(),
            password: String::new(),
            database: 0,
        }
    }
}

impl ConnectionOptions {
    /// Options for `address` with no password on database 0.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    /// Set the password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Set the database index.
    pub fn with_database(mut self, database: i64) -> Self {
        self.database = database;
        self
    }
}

/// Cache configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Backend to build.
    #[serde(default)]
    pub kind: BackendKind,
    /// Remote connection parameters.
    #[serde(default)]
    pub remote: ConnectionOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("local", BackendKind::Local ; "local")]
    #[test_case("local-map", BackendKind::Local ; "local map alias")]
    #[test_case("Memory", BackendKind::Local ; "memory alias mixed case")]
    #[test_case("remote", BackendKind::Remote ; "remote")]
    #[test_case("REDIS", BackendKind::Remote ; "redis alias upper case")]
    #[test_case(" remote ", BackendKind::Remote ; "surrounding whitespace")]
    fn test_parse_kind(input: &str, expected: BackendKind) {
        assert_eq!(input.parse::<BackendKind>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_kind_keeps_value() {
        let err = "bogus".parse::<BackendKind>().unwrap_err();
        assert!(matches!(err, CacheError::UnsupportedBackendKind(v) if v == "bogus"));
    }

    #[test]
    fn test_kind_display_roundtrips() {
        for kind in [BackendKind::Local, BackendKind::Remote] {
            assert_eq!(kind.to_string().parse::<BackendKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_connection_options_builder() {
        let options = ConnectionOptions::new("cache:6380")
            .with_password("secret")
            .with_database(2);
        assert_eq!(options.address, "cache:6380");
        assert_eq!(options.password, "secret");
        assert_eq!(options.database, 2);
    }

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.kind, BackendKind::Local);
        assert_eq!(config.remote.address, "127.0.0.1:6379");
        assert!(config.remote.password.is_empty());
        assert_eq!(config.remote.database, 0);
    }
}
