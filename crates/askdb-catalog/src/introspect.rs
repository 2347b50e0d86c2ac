//! Database introspection and execution collaborator.
//!
//! The engine never talks to a driver directly. Everything it needs from a
//! live host goes through [`DbIntrospector`], one request/response call at a
//! time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Result set of one statement, columns in select order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl RowSet {
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<serde_json::Value>>) -> Self {
        Self { columns, rows }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Text of column `idx` for every row. Non-string cells are rendered as JSON.
    #[must_use]
    pub fn text_column(&self, idx: usize) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.get(idx).map(cell_text))
            .collect()
    }
}

/// Render a cell as plain text.
#[must_use]
pub fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Introspection and query calls against one host.
///
/// Implementations are not expected to retry; a failed call is reported
/// immediately and the caller decides whether it is fatal.
#[async_trait]
pub trait DbIntrospector: Send + Sync {
    /// All database names on the host, system schemas included.
    async fn list_databases(&self, host: &str) -> Result<Vec<String>, CatalogError>;

    /// Table names of one database in the server's order.
    async fn list_tables(&self, host: &str, database: &str) -> Result<Vec<String>, CatalogError>;

    /// `(name, type)` pairs for a table in column order.
    async fn describe_columns(
        &self,
        host: &str,
        database: &str,
        table: &str,
    ) -> Result<Vec<(String, String)>, CatalogError>;

    /// `CREATE TABLE` text, or `None` when it cannot be retrieved.
    async fn get_ddl(&self, host: &str, database: &str, table: &str) -> Option<String>;

    /// Execute `sql` against one database.
    async fn run_query(&self, host: &str, database: &str, sql: &str)
    -> Result<RowSet, CatalogError>;
}
