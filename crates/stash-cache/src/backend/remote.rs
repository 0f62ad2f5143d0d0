//! Redis-backed cache with a process-wide shared client.

use super::r#trait::CacheBackend;
use crate::codec;
use crate::config::ConnectionOptions;
use crate::error::{CacheError, CacheResult};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use redis::{ConnectionAddr, ConnectionInfo, ConnectionLike, RedisConnectionInfo};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifetime of every entry written to the remote store.
pub const REMOTE_EXPIRATION: Duration = Duration::from_secs(4 * 60 * 60);

/// Bound on connect, read and write against the server.
const IO_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_PORT: u16 = 6379;

static SHARED_CLIENT: OnceCell<Arc<RemoteClient>> = OnceCell::new();

/// Handle to a redis server, safe to share between threads.
///
/// Opening a client performs no I/O. The first command opens a single
/// connection that every later command reuses; commands from different
/// threads take turns on it. A connection that fails with an I/O error,
/// timeout or drop is discarded and the next command reconnects.
pub struct RemoteClient {
    client: redis::Client,
    options: ConnectionOptions,
    conn: Mutex<Option<redis::Connection>>,
}

impl fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteClient")
            .field("options", &self.options)
            .field("connected", &self.conn.lock().is_some())
            .finish()
    }
}

impl RemoteClient {
    /// Build a client for the given options.
    pub fn open(options: &ConnectionOptions) -> CacheResult<Self> {
        let info = connection_info(options)?;
        let client = redis::Client::open(info)
            .map_err(|e| CacheError::InvalidOptions(e.to_string()))?;

        Ok(Self {
            client,
            options: options.clone(),
            conn: Mutex::new(None),
        })
    }

    /// Return the process-wide client, creating it on first use.
    ///
    /// The first successful call fixes the options. Later calls get the same
    /// client back even when they pass different options.
    pub fn shared(options: &ConnectionOptions) -> CacheResult<Arc<Self>> {
        let client = SHARED_CLIENT.get_or_try_init(|| {
            let client = Self::open(options)?;
            info!(
                address = %options.address,
                database = options.database,
                "Remote cache client initialized"
            );
            Ok::<_, CacheError>(Arc::new(client))
        })?;

        if client.options != *options {
            warn!(
                active = %client.options.address,
                requested = %options.address,
                "Remote cache client already initialized, ignoring new options"
            );
        }

        Ok(Arc::clone(client))
    }

    /// Options the client was opened with.
    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    fn connect(&self) -> CacheResult<redis::Connection> {
        let conn = self.client.get_connection_with_timeout(IO_TIMEOUT)?;
        conn.set_read_timeout(Some(IO_TIMEOUT))?;
        conn.set_write_timeout(Some(IO_TIMEOUT))?;
        debug!(address = %self.options.address, "Remote cache connection opened");
        Ok(conn)
    }

    /// Run one command on the held connection, opening it if needed.
    fn run<R>(&self, cmd: &redis::Cmd) -> CacheResult<R>
    where
        R: redis::FromRedisValue,
    {
        let mut slot = self.conn.lock();
        let mut conn = match slot.take() {
            Some(conn) => conn,
            None => self.connect()?,
        };

        match cmd.query::<R>(&mut conn) {
            Err(e)
                if e.is_io_error()
                    || e.is_timeout()
                    || e.is_connection_dropped()
                    || !conn.is_open() =>
            {
                warn!(error = %e, "Remote cache connection lost, will reconnect");
                Err(e.into())
            }
            result => {
                *slot = Some(conn);
                result.map_err(Into::into)
            }
        }
    }
}

/// `SET key payload EX <4h>`.
fn store_command(key: &str, payload: &[u8]) -> redis::Cmd {
    let mut cmd = redis::cmd("SET");
    cmd.arg(key)
        .arg(payload)
        .arg("EX")
        .arg(REMOTE_EXPIRATION.as_secs());
    cmd
}

/// Translate facade options into redis connection parameters.
fn connection_info(options: &ConnectionOptions) -> CacheResult<ConnectionInfo> {
    let (host, port) = split_address(&options.address)?;
    let password = Some(options.password.clone()).filter(|p| !p.is_empty());

    Ok(ConnectionInfo {
        addr: ConnectionAddr::Tcp(host, port),
        redis: RedisConnectionInfo {
            db: options.database,
            username: None,
            password,
            ..Default::default()
        },
    })
}

/// Split `host:port`. A bare host gets the default redis port.
pub(crate) fn split_address(address: &str) -> CacheResult<(String, u16)> {
    let address = address.trim();
    if address.is_empty() {
        return Err(CacheError::InvalidOptions("address is empty".to_string()));
    }

    // [::1]:6379
    if let Some(rest) = address.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| CacheError::InvalidOptions(format!("malformed address: {address}")))?;
        let port = match tail.strip_prefix(':') {
            Some(port) => parse_port(address, port)?,
            None if tail.is_empty() => DEFAULT_PORT,
            None => {
                return Err(CacheError::InvalidOptions(format!(
                    "malformed address: {address}"
                )))
            }
        };
        return Ok((host.to_string(), port));
    }

    match address.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() => Ok((host.to_string(), parse_port(address, port)?)),
        Some(_) => Err(CacheError::InvalidOptions(format!("missing host: {address}"))),
        None => Ok((address.to_string(), DEFAULT_PORT)),
    }
}

fn parse_port(address: &str, port: &str) -> CacheResult<u16> {
    port.parse()
        .map_err(|_| CacheError::InvalidOptions(format!("invalid port in address: {address}")))
}

/// Remote backend bound to a shared [`RemoteClient`].
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: Arc<RemoteClient>,
}

impl RemoteBackend {
    /// Bind to the process-wide client.
    pub fn new(options: &ConnectionOptions) -> CacheResult<Self> {
        Ok(Self::with_client(RemoteClient::shared(options)?))
    }

    /// Bind to an explicitly provided client.
    pub fn with_client(client: Arc<RemoteClient>) -> Self {
        Self { client }
    }

    /// The client this backend issues commands through.
    pub fn client(&self) -> &Arc<RemoteClient> {
        &self.client
    }

    fn fetch(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.client.run(redis::cmd("GET").arg(key))
    }
}

impl CacheBackend for RemoteBackend {
    fn store<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> CacheResult<()> {
        let encoded = codec::encode(value)?;
        self.client.run::<()>(&store_command(key, &encoded))?;

        debug!(key = key, ttl_secs = REMOTE_EXPIRATION.as_secs(), "Remote cache store");
        Ok(())
    }

    fn load<T: DeserializeOwned>(&self, key: &str, out: &mut T) -> CacheResult<()> {
        match self.fetch(key)? {
            Some(data) => {
                debug!(key = key, "Remote cache hit");
                codec::decode_into(&data, out)
            }
            None => {
                debug!(key = key, "Remote cache miss");
                Err(CacheError::NotFound(key.to_string()))
            }
        }
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        self.fetch(key)?.map(|data| codec::decode(&data)).transpose()
    }

    fn delete(&self, key: &str) -> CacheResult<bool> {
        let removed: u64 = self.client.run(redis::cmd("DEL").arg(key))?;
        debug!(key = key, removed = removed, "Remote cache delete");
        Ok(removed > 0)
    }

    fn exists(&self, key: &str) -> CacheResult<bool> {
        self.client.run(redis::cmd("EXISTS").arg(key))
    }
}
