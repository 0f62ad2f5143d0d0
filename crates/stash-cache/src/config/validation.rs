//! Configuration validation.

use super::types::{BackendKind, CacheConfig};
use crate::backend::remote::split_address;
use thiserror::Error;

/// A problem found in a [`CacheConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `remote.address` is blank.
    #[error("Remote address is empty")]
    EmptyAddress,

    /// `remote.address` is not `host[:port]`.
    #[error("Invalid remote address: {0}")]
    InvalidAddress(String),

    /// `remote.database` is negative.
    #[error("Invalid database index: {0}")]
    InvalidDatabase(i64),
}

/// Validate cache configuration.
///
/// Remote options are only checked when the remote backend is selected.
pub fn validate_config(config: &CacheConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.kind == BackendKind::Remote {
        let remote = &config.remote;

        if remote.address.trim().is_empty() {
            errors.push(ConfigError::EmptyAddress);
        } else if split_address(&remote.address).is_err() {
            errors.push(ConfigError::InvalidAddress(remote.address.clone()));
        }

        if remote.database < 0 {
            errors.push(ConfigError::InvalidDatabase(remote.database));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
