//! The caller-facing cache handle.

use crate::backend::{CacheBackend, LocalBackend, RemoteBackend};
use crate::config::{validate_config, BackendKind, CacheConfig, ConnectionOptions};
use crate::error::{CacheError, CacheResult};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

/// The concrete strategy a [`Cache`] dispatches to.
#[derive(Debug, Clone)]
pub enum Backend {
    /// In-process map.
    Local(LocalBackend),
    /// Redis through the shared client.
    Remote(RemoteBackend),
}

/// Key/value cache over a local map or a remote server.
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use stash_cache::{BackendKind, Cache, ConnectionOptions};
///
/// #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
/// struct Object {
///     key: String,
///     value: String,
/// }
///
/// let cache = Cache::new(BackendKind::Local, &ConnectionOptions::default()).unwrap();
/// cache
///     .store("example", &Object { key: "case1".into(), value: "any string".into() })
///     .unwrap();
///
/// let mut result = Object::default();
/// cache.load("example", &mut result).unwrap();
/// assert_eq!(result.key, "case1");
/// ```
#[derive(Debug, Clone)]
pub struct Cache {
    backend: Backend,
}

impl Cache {
    /// Build a cache of the given kind.
    ///
    /// `options` is ignored for [`BackendKind::Local`]. For
    /// [`BackendKind::Remote`] the first call in the process creates the
    /// shared client; later calls reuse it and their options are ignored.
    pub fn new(kind: BackendKind, options: &ConnectionOptions) -> CacheResult<Self> {
        let backend = match kind {
            BackendKind::Local => Backend::Local(LocalBackend::new()),
            BackendKind::Remote => Backend::Remote(RemoteBackend::new(options)?),
        };
        debug!(kind = %kind, "Cache created");
        Ok(Self { backend })
    }

    /// Build a cache from a kind name such as `"local"` or `"redis"`.
    ///
    /// Fails with [`CacheError::UnsupportedBackendKind`](crate::CacheError::UnsupportedBackendKind)
    /// for any other name.
    pub fn open(kind: &str, options: &ConnectionOptions) -> CacheResult<Self> {
        Self::new(kind.parse()?, options)
    }

    /// Build a cache from loaded configuration.
    ///
    /// The configuration is validated first; every problem found is reported
    /// in a single [`CacheError::InvalidOptions`](crate::CacheError::InvalidOptions).
    pub fn from_config(config: &CacheConfig) -> CacheResult<Self> {
        validate_config(config).map_err(|errors| {
            let reasons: Vec<String> = errors.iter().map(ToString::to_string).collect();
            CacheError::InvalidOptions(reasons.join("; "))
        })?;
        Self::new(config.kind, &config.remote)
    }

    /// Wrap an already constructed backend.
    pub fn from_backend(backend: Backend) -> Self {
        Self { backend }
    }

    /// Which backend this cache uses.
    pub fn kind(&self) -> BackendKind {
        match self.backend {
            Backend::Local(_) => BackendKind::Local,
            Backend::Remote(_) => BackendKind::Remote,
        }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Encode `value` and write it under `key`.
    pub fn store<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> CacheResult<()> {
        match &self.backend {
            Backend::Local(b) => b.store(key, value),
            Backend::Remote(b) => b.store(key, value),
        }
    }

    /// Decode the entry under `key` into `out`.
    ///
    /// A missing key is `Ok(())` with `out` untouched on the local backend and
    /// [`CacheError::NotFound`](crate::CacheError::NotFound) on the remote one.
    pub fn load<T: DeserializeOwned>(&self, key: &str, out: &mut T) -> CacheResult<()> {
        match &self.backend {
            Backend::Local(b) => b.load(key, out),
            Backend::Remote(b) => b.load(key, out),
        }
    }

    /// Fetch an owned value; `None` when absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        match &self.backend {
            Backend::Local(b) => b.get(key),
            Backend::Remote(b) => b.get(key),
        }
    }

    /// Remove the entry under `key`.
    pub fn delete(&self, key: &str) -> CacheResult<bool> {
        match &self.backend {
            Backend::Local(b) => b.delete(key),
            Backend::Remote(b) => b.delete(key),
        }
    }

    /// Check if key exists.
    pub fn exists(&self, key: &str) -> CacheResult<bool> {
        match &self.backend {
            Backend::Local(b) => b.exists(key),
            Backend::Remote(b) => b.exists(key),
        }
    }
}
