//! Cache error types.

/// Cache operation result.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The requested backend kind is not one the facade knows how to build.
    #[error("unsupported backend kind: {0}")]
    UnsupportedBackendKind(String),

    /// The value could not be serialized; nothing was written.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Stored bytes could not be deserialized into the requested type.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// The local map holds something that is not an encoded frame.
    #[error("corrupt cache entry (key: {key})")]
    CorruptEntry { key: String },

    /// Key absent on the remote backend.
    #[error("key not found: {0}")]
    NotFound(String),

    /// Transport or server-side failure from the remote store.
    #[error("backend error: {0}")]
    Backend(String),

    /// Connection options could not be turned into a client.
    #[error("invalid connection options: {0}")]
    InvalidOptions(String),
}

impl CacheError {
    /// Returns `true` for a remote miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        Self::Backend(err.to_string())
    }
}
