//! Cross-cutting error types for askdb.
//!
//! Errors that can originate from any crate working with the catalog model.
//! Domain-specific errors (e.g., `CatalogError`, `OracleError`) are defined in
//! their respective crates and converge in `EngineError`.

use thiserror::Error;

/// Errors that can be raised by any askdb crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A catalog lookup returned no result.
    #[error("Not found in catalog: {kind} {name}")]
    NotFound { kind: String, name: String },

    /// Column names and column types must be index-aligned.
    #[error("Column mismatch on table {table}: {columns} names but {types} types")]
    ColumnMismatch {
        table: String,
        columns: usize,
        types: usize,
    },

    /// Data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    /// Shorthand for a missing database.
    #[must_use]
    pub fn unknown_database(name: &str) -> Self {
        Self::NotFound {
            kind: "database".to_string(),
            name: name.to_string(),
        }
    }

    /// Shorthand for a missing `database.table`.
    #[must_use]
    pub fn unknown_table(database: &str, table: &str) -> Self {
        Self::NotFound {
            kind: "table".to_string(),
            name: format!("{database}.{table}"),
        }
    }
}
