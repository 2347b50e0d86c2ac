//! In-memory [`DbIntrospector`] for tests.
//!
//! Built up with `with_*` calls and failure switches; every `run_query` call is
//! recorded so tests can assert which databases were attempted.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::CatalogError;
use crate::introspect::{DbIntrospector, RowSet};

type Columns = Vec<(String, String)>;

#[derive(Default)]
pub struct FakeIntrospector {
    databases: Vec<String>,
    tables: HashMap<String, Vec<(String, Columns)>>,
    ddl: HashMap<(String, String), String>,
    results: HashMap<String, RowSet>,
    unreachable: bool,
    failing_list_tables: HashSet<String>,
    failing_describe: HashSet<(String, String)>,
    failing_queries: HashSet<String>,
    queries: Mutex<Vec<(String, String)>>,
}

impl FakeIntrospector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a database with no tables.
    #[must_use]
    pub fn with_database(mut self, database: &str) -> Self {
        self.ensure_database(database);
        self
    }

    /// Register a table (and its database) with `(name, type)` columns.
    #[must_use]
    pub fn with_table(mut self, database: &str, table: &str, columns: &[(&str, &str)]) -> Self {
        self.ensure_database(database);
        let columns = columns
            .iter()
            .map(|(n, t)| ((*n).to_string(), (*t).to_string()))
            .collect();
        self.tables
            .entry(database.to_string())
            .or_default()
            .push((table.to_string(), columns));
        self
    }

    /// Add the MySQL system schemas to the database listing.
    #[must_use]
    pub fn with_system_schemas(mut self) -> Self {
        for schema in askdb_core::SYSTEM_SCHEMAS {
            self.ensure_database(schema);
        }
        self
    }

    #[must_use]
    pub fn with_ddl(mut self, database: &str, table: &str, ddl: &str) -> Self {
        self.ddl
            .insert((database.to_string(), table.to_string()), ddl.to_string());
        self
    }

    /// Rows returned by `run_query` on `database`.
    #[must_use]
    pub fn with_result(mut self, database: &str, rows: RowSet) -> Self {
        self.results.insert(database.to_string(), rows);
        self
    }

    /// Make the top-level database listing fail.
    #[must_use]
    pub const fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    #[must_use]
    pub fn fail_list_tables(mut self, database: &str) -> Self {
        self.failing_list_tables.insert(database.to_string());
        self
    }

    #[must_use]
    pub fn fail_describe(mut self, database: &str, table: &str) -> Self {
        self.failing_describe
            .insert((database.to_string(), table.to_string()));
        self
    }

    #[must_use]
    pub fn fail_queries(mut self, database: &str) -> Self {
        self.failing_queries.insert(database.to_string());
        self
    }

    /// `(database, sql)` for every `run_query` call so far.
    ///
    /// # Panics
    ///
    /// Panics if the log mutex is poisoned.
    #[must_use]
    pub fn queries(&self) -> Vec<(String, String)> {
        self.queries.lock().unwrap().clone()
    }

    fn ensure_database(&mut self, database: &str) {
        if !self.databases.iter().any(|d| d == database) {
            self.databases.push(database.to_string());
        }
    }
}

#[async_trait]
impl DbIntrospector for FakeIntrospector {
    async fn list_databases(&self, host: &str) -> Result<Vec<String>, CatalogError> {
        if self.unreachable {
            return Err(CatalogError::Connectivity {
                target: host.to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(self.databases.clone())
    }

    async fn list_tables(&self, _host: &str, database: &str) -> Result<Vec<String>, CatalogError> {
        if self.failing_list_tables.contains(database) {
            return Err(CatalogError::Query {
                database: database.to_string(),
                message: "access denied".to_string(),
            });
        }
        Ok(self
            .tables
            .get(database)
            .map(|tables| tables.iter().map(|(t, _)| t.clone()).collect())
            .unwrap_or_default())
    }

    async fn describe_columns(
        &self,
        _host: &str,
        database: &str,
        table: &str,
    ) -> Result<Vec<(String, String)>, CatalogError> {
        if self
            .failing_describe
            .contains(&(database.to_string(), table.to_string()))
        {
            return Err(CatalogError::Query {
                database: database.to_string(),
                message: format!("table {table} is locked"),
            });
        }
        Ok(self
            .tables
            .get(database)
            .and_then(|tables| tables.iter().find(|(t, _)| t == table))
            .map(|(_, cols)| cols.clone())
            .unwrap_or_default())
    }

    async fn get_ddl(&self, _host: &str, database: &str, table: &str) -> Option<String> {
        self.ddl
            .get(&(database.to_string(), table.to_string()))
            .cloned()
    }

    async fn run_query(
        &self,
        _host: &str,
        database: &str,
        sql: &str,
    ) -> Result<RowSet, CatalogError> {
        if let Ok(mut log) = self.queries.lock() {
            log.push((database.to_string(), sql.to_string()));
        }
        if self.failing_queries.contains(database) {
            return Err(CatalogError::Query {
                database: database.to_string(),
                message: "Unknown table".to_string(),
            });
        }
        Ok(self.results.get(database).cloned().unwrap_or_default())
    }
}
