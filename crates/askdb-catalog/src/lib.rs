//! # askdb-catalog
//!
//! Schema discovery and database access for askdb.
//!
//! - [`DbIntrospector`]: the narrow collaborator interface the engine uses for
//!   listing databases/tables, describing columns, fetching DDL, and running SQL
//! - [`ConnectionCache`]: connections reused per `(host, database)` with a
//!   liveness ping and transparent reconnect
//! - [`CommandIntrospector`]: `DbIntrospector` over cached connections using
//!   `SHOW` / `DESCRIBE` statements
//! - [`refresh`] / [`discover`]: build a `SchemaCatalog` with the
//!   partial-result policy (only the database listing is fatal)

pub mod commands;
pub mod connection;
pub mod discover;
pub mod error;
pub mod introspect;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use commands::CommandIntrospector;
pub use connection::{ConnectOptions, ConnectionCache, ConnectionKey, Connector, SqlConnection};
pub use discover::{DiscoveryReport, discover, refresh};
pub use error::CatalogError;
pub use introspect::{DbIntrospector, RowSet};
