//! Storage strategies behind the cache facade.
//!
//! Provides both an in-process map and a Redis backend with a consistent interface.

pub mod r#trait;
pub mod local;
pub mod remote;

pub use r#trait::CacheBackend;
pub use local::LocalBackend;
pub use remote::{RemoteBackend, RemoteClient, REMOTE_EXPIRATION};
