//! Catalog error types for askdb-catalog.

use thiserror::Error;

/// Errors from discovery, connections, and query execution.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The host (or one database on it) could not be reached or authenticated.
    #[error("cannot connect to {target}: {message}")]
    Connectivity { target: String, message: String },

    /// One database or table failed during discovery. Never fatal to a refresh.
    #[error("discovery skipped {target}: {message}")]
    PartialDiscovery { target: String, message: String },

    /// A SQL statement failed on one database.
    #[error("query failed on {database}: {message}")]
    Query { database: String, message: String },

    /// Error from the catalog model.
    #[error(transparent)]
    Core(#[from] askdb_core::CoreError),
}

impl CatalogError {
    pub(crate) fn connectivity(host: &str, database: Option<&str>, error: &anyhow::Error) -> Self {
        let target = database.map_or_else(|| host.to_string(), |db| format!("{host}/{db}"));
        Self::Connectivity {
            target,
            message: format!("{error:#}"),
        }
    }

    pub(crate) fn partial(target: impl Into<String>, error: &dyn std::fmt::Display) -> Self {
        Self::PartialDiscovery {
            target: target.into(),
            message: error.to_string(),
        }
    }

    pub(crate) fn query(database: &str, error: &anyhow::Error) -> Self {
        Self::Query {
            database: database.to_string(),
            message: format!("{error:#}"),
        }
    }
}
