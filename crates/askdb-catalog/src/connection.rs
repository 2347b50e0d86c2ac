//! Connection cache keyed by `(host, database)`.
//!
//! Connections are opened lazily through a [`Connector`] and reused across
//! calls. Before a cached connection is handed out it is pinged; a dead one is
//! dropped and replaced by a fresh connect instead of failing the caller.
//! Nothing is retried beyond that single reconnect.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use askdb_config::DatabaseConfig;
use async_trait::async_trait;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

use crate::error::CatalogError;
use crate::introspect::RowSet;

/// Settings applied to every new connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub user: String,
    pub password: String,
    pub port: u16,
    pub charset: String,
    pub connect_timeout: Duration,
}

impl From<&DatabaseConfig> for ConnectOptions {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            user: config.user.clone(),
            password: config.password.clone(),
            port: config.port,
            charset: config.charset.clone(),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
        }
    }
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self::from(&DatabaseConfig::default())
    }
}

/// Cache key: a host, optionally narrowed to one database.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionKey {
    pub host: String,
    pub database: Option<String>,
}

impl ConnectionKey {
    #[must_use]
    pub fn new(host: &str, database: Option<&str>) -> Self {
        Self {
            host: host.to_string(),
            database: database.map(str::to_string),
        }
    }
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.database {
            Some(db) => write!(f, "{}_{db}", self.host),
            None => f.write_str(&self.host),
        }
    }
}

/// A live driver connection.
#[async_trait]
pub trait SqlConnection: Send {
    /// Liveness check. `false` means the connection must be replaced.
    async fn ping(&mut self) -> bool;

    /// Execute one statement and return its rows.
    async fn query(&mut self, sql: &str) -> anyhow::Result<RowSet>;
}

/// Opens driver connections.
#[async_trait]
pub trait Connector: Send + Sync {
    type Conn: SqlConnection;

    async fn connect(
        &self,
        host: &str,
        database: Option<&str>,
        options: &ConnectOptions,
    ) -> anyhow::Result<Self::Conn>;
}

/// Reusable connections, one per `(host, database)`.
pub struct ConnectionCache<C: Connector> {
    connector: C,
    options: ConnectOptions,
    connections: Mutex<HashMap<ConnectionKey, C::Conn>>,
}

impl<C: Connector> ConnectionCache<C> {
    #[must_use]
    pub fn new(connector: C, options: ConnectOptions) -> Self {
        Self {
            connector,
            options,
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Borrow a live connection, opening or replacing one as needed.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Connectivity`] if a new connection cannot be
    /// established.
    pub async fn acquire(
        &self,
        host: &str,
        database: Option<&str>,
    ) -> Result<MappedMutexGuard<'_, C::Conn>, CatalogError> {
        let key = ConnectionKey::new(host, database);
        let mut guard = self.connections.lock().await;

        let alive = match guard.get_mut(&key) {
            Some(conn) => conn.ping().await,
            None => false,
        };

        if !alive {
            if guard.remove(&key).is_some() {
                tracing::debug!(connection = %key, "cached connection failed ping; reconnecting");
            }
            let conn = self
                .connector
                .connect(host, database, &self.options)
                .await
                .map_err(|e| CatalogError::connectivity(host, database, &e))?;
            guard.insert(key.clone(), conn);
        }

        MutexGuard::try_map(guard, |map| map.get_mut(&key)).map_err(|_| {
            CatalogError::Connectivity {
                target: key.to_string(),
                message: "connection vanished from cache".to_string(),
            }
        })
    }

    /// Run one statement on a cached connection.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Connectivity`] if no connection can be made, or
    /// [`CatalogError::Query`] if the statement fails.
    pub async fn query(
        &self,
        host: &str,
        database: Option<&str>,
        sql: &str,
    ) -> Result<RowSet, CatalogError> {
        let mut conn = self.acquire(host, database).await?;
        conn.query(sql)
            .await
            .map_err(|e| CatalogError::query(database.unwrap_or(host), &e))
    }

    /// Drop the cached connection for a key, if any.
    pub async fn evict(&self, host: &str, database: Option<&str>) -> bool {
        self.connections
            .lock()
            .await
            .remove(&ConnectionKey::new(host, database))
            .is_some()
    }

    pub async fn clear(&self) {
        self.connections.lock().await.clear();
    }

    /// Number of cached connections.
    pub async fn len(&self) -> usize {
        self.connections.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    #[must_use]
    pub const fn connector(&self) -> &C {
        &self.connector
    }

    #[must_use]
    pub const fn options(&self) -> &ConnectOptions {
        &self.options
    }
}
