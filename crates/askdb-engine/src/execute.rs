//! Running a resolved query against one or more catalogued databases.

use askdb_catalog::{DbIntrospector, RowSet};
use askdb_config::RoutingConfig;
use askdb_core::{PrioritySet, QueryResolution, SchemaCatalog};
use serde::Serialize;

use crate::error::EngineError;
use crate::extract::referenced_databases;

/// Rows returned by one database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseRows {
    pub database: String,
    pub priority: bool,
    pub rows: RowSet,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionReport {
    /// The statement actually sent, after any automatic `LIMIT`.
    pub sql: String,
    /// Databases attempted, in order.
    pub targets: Vec<String>,
    /// Non-empty results only.
    pub results: Vec<DatabaseRows>,
    /// `"db: message"` per failed database.
    pub errors: Vec<String>,
    pub priority_rows: usize,
    pub other_rows: usize,
}

impl ExecutionReport {
    #[must_use]
    pub const fn total_rows(&self) -> usize {
        self.priority_rows + self.other_rows
    }
}

pub struct QueryExecutor<'a> {
    introspector: &'a dyn DbIntrospector,
    config: &'a RoutingConfig,
}

impl<'a> QueryExecutor<'a> {
    #[must_use]
    pub const fn new(introspector: &'a dyn DbIntrospector, config: &'a RoutingConfig) -> Self {
        Self {
            introspector,
            config,
        }
    }

    /// Run `resolution.sql` on every target database. A failing database is
    /// reported in [`ExecutionReport::errors`]; the rest are still tried.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unresolved`] if the resolution did not succeed.
    pub async fn execute(
        &self,
        resolution: &QueryResolution,
        catalog: &SchemaCatalog,
        priority: &PrioritySet,
    ) -> Result<ExecutionReport, EngineError> {
        if !resolution.success {
            return Err(EngineError::Unresolved(
                resolution.error.clone().unwrap_or_default(),
            ));
        }

        let sql = if self.config.auto_limit {
            apply_limit(&resolution.sql, self.config.result_limit)
        } else {
            resolution.sql.clone()
        };
        let targets = self.targets(resolution, &sql, catalog, priority);
        let mut report = ExecutionReport {
            sql,
            ..ExecutionReport::default()
        };

        for db in &targets {
            match self.introspector.run_query(&catalog.host, db, &report.sql).await {
                Ok(rows) if rows.is_empty() => {}
                Ok(rows) => {
                    let is_priority = priority.contains(db);
                    if is_priority {
                        report.priority_rows += rows.len();
                    } else {
                        report.other_rows += rows.len();
                    }
                    report.results.push(DatabaseRows {
                        database: db.clone(),
                        priority: is_priority,
                        rows,
                    });
                }
                Err(error) => {
                    tracing::warn!(database = %db, %error, "query failed");
                    report.errors.push(format!("{db}: {error}"));
                }
            }
        }
        report.targets = targets;
        Ok(report)
    }

    /// Resolution's databases, else those named in the SQL, else a few
    /// catalogued databases (priority ones first when preferred).
    fn targets(
        &self,
        resolution: &QueryResolution,
        sql: &str,
        catalog: &SchemaCatalog,
        priority: &PrioritySet,
    ) -> Vec<String> {
        if !resolution.used_databases.is_empty() {
            return resolution.used_databases.clone();
        }
        let named = referenced_databases(sql, catalog);
        if !named.is_empty() {
            return named;
        }

        let n = self.config.fallback_database_count;
        let (preferred, _) = catalog.partition_by_priority(priority);
        let pool = if self.config.prefer_priority && !preferred.is_empty() {
            preferred
        } else {
            catalog.databases().iter().collect()
        };
        pool.into_iter().take(n).map(|db| db.name.clone()).collect()
    }
}

/// Append `LIMIT n` to a `SELECT` that has no limit, keeping a trailing `;`.
///
/// Other statements (`DESCRIBE`, `SHOW`) are left alone since MySQL rejects a
/// limit on them.
#[must_use]
pub fn apply_limit(sql: &str, limit: u32) -> String {
    let trimmed = sql.trim_end();
    let lowered = trimmed.to_lowercase();
    if lowered.contains("limit") || !lowered.trim_start().starts_with("select") {
        return sql.to_string();
    }
    match trimmed.strip_suffix(';') {
        Some(body) => format!("{} LIMIT {limit};", body.trim_end()),
        None => format!("{trimmed} LIMIT {limit}"),
    }
}
