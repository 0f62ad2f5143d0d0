//! Configuration loading utilities.

use super::types::CacheConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

/// Prefix of environment overrides, e.g. `STASH_KIND`, `STASH_REMOTE__ADDRESS`.
const ENV_PREFIX: &str = "STASH";

/// Load configuration from various sources.
///
/// Later sources override earlier ones: built-in defaults, then the optional
/// config file, then `STASH_*` environment variables (nested keys joined by
/// `__`, so `STASH_REMOTE__DATABASE=2` sets `remote.database`).
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Loader with defaults and environment only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also read this file; its format follows the extension. A missing file is skipped.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Load configuration.
    pub fn load(&self) -> Result<CacheConfig> {
        self.load_from_env(ENV_PREFIX)
    }

    fn load_from_env(&self, env_prefix: &str) -> Result<CacheConfig> {
        let mut builder = config::Config::builder().add_source(config::File::from_str(
            include_str!("defaults.toml"),
            config::FileFormat::Toml,
        ));

        if let Some(path) = &self.config_path {
            info!(path = %path.display(), "Loading config file");
            builder = builder.add_source(config::File::from(path.as_path()).required(false));
        }

        builder
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

/// Load configuration, reading the file named by `STASH_CONFIG_PATH` if set.
pub fn load_config() -> Result<CacheConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = std::env::var_os("STASH_CONFIG_PATH") {
        loader = loader.with_config_path(path);
    }
    loader.load()
}
