//! Cache backend trait definition.

use crate::error::CacheResult;
use serde::{de::DeserializeOwned, Serialize};

/// Storage strategy behind the [`Cache`](crate::Cache) facade.
///
/// Operations are synchronous and may be called from many threads at once.
pub trait CacheBackend: Send + Sync {
    /// Encode `value` and write it under `key`, replacing any previous entry.
    fn store<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> CacheResult<()>;

    /// Decode the entry under `key` into `out`.
    ///
    /// What happens on a miss depends on the backend: the local map leaves
    /// `out` untouched and returns `Ok(())`, the remote store fails with
    /// [`CacheError::NotFound`](crate::CacheError::NotFound).
    fn load<T: DeserializeOwned>(&self, key: &str, out: &mut T) -> CacheResult<()>;

    /// Fetch an owned value, `None` on a miss for every backend.
    fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>>;

    /// Remove an entry. Returns whether one existed.
    fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Check if key exists.
    fn exists(&self, key: &str) -> CacheResult<bool>;
}
