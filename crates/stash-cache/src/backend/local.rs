//! In-process cache backed by a concurrent map.

use super::r#trait::CacheBackend;
use crate::codec;
use crate::error::{CacheError, CacheResult};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::debug;

/// In-memory backend.
///
/// Entries live until overwritten, deleted or the process exits. Clones share
/// the same map.
#[derive(Debug, Clone, Default)]
pub struct LocalBackend {
    entries: Arc<DashMap<String, Vec<u8>>>,
}

impl LocalBackend {
    /// Create an empty local backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `key` to its decoded value, or `None` when absent.
    fn lookup<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let Some(entry) = self.entries.get(key) else {
            debug!(key = key, "Local cache miss");
            return Ok(None);
        };

        let body = codec::split_frame(entry.value()).ok_or_else(|| CacheError::CorruptEntry {
            key: key.to_string(),
        })?;
        let value = codec::decode_body(body)?;
        debug!(key = key, "Local cache hit");
        Ok(Some(value))
    }
}

impl CacheBackend for LocalBackend {
    fn store<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> CacheResult<()> {
        let encoded = codec::encode(value)?;
        let size = encoded.len();
        self.entries.insert(key.to_string(), encoded);
        debug!(key = key, bytes = size, "Local cache store");
        Ok(())
    }

    fn load<T: DeserializeOwned>(&self, key: &str, out: &mut T) -> CacheResult<()> {
        if let Some(value) = self.lookup(key)? {
            *out = value;
        }
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        self.lookup(key)
    }

    fn delete(&self, key: &str) -> CacheResult<bool> {
        let removed = self.entries.remove(key).is_some();
        debug!(key = key, removed = removed, "Local cache delete");
        Ok(removed)
    }

    fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.entries.contains_key(key))
    }
}
