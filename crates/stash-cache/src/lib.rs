//! Stash cache facade.
//!
//! A single [`Cache`] type stores and loads serde values under string keys,
//! backed either by an in-process concurrent map or by a redis server. Values
//! cross the storage boundary as MessagePack (see [`codec`]).

pub mod backend;
pub mod codec;
pub mod config;
pub mod error;
pub mod facade;

pub use backend::{CacheBackend, LocalBackend, RemoteBackend, RemoteClient, REMOTE_EXPIRATION};
pub use config::{load_config, validate_config, BackendKind, CacheConfig, ConfigLoader, ConnectionOptions};
pub use error::{CacheError, CacheResult};
pub use facade::{Backend, Cache};
