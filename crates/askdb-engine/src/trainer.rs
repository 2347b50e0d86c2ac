//! Priority-ordered bulk training over a discovered catalog.
//!
//! Every table gets the same artifact sequence: DDL (when the server has
//! one), three question/SQL pairs, and a column description. Each database
//! then gets a summary listing its tables. Failures are collected and the
//! sweep keeps going.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use askdb_catalog::DbIntrospector;
use askdb_core::{DatabaseEntry, PrioritySet, RecordMetadata, SchemaCatalog};
use serde::Serialize;

use crate::corpus::TrainingCorpusManager;
use crate::templates;

/// Marker inserted into documentation for priority databases.
const PRIORITY_NOTE: &str = "（优先数据库）";

/// Summary of one training sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrainingRunResult {
    pub success: bool,
    pub databases_trained: usize,
    pub tables_trained: usize,
    /// `"table db.t: ..."` or `"database db: ..."`, in the order they happened.
    pub errors: Vec<String>,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct PriorityOrderedTrainer {
    trained: BTreeSet<String>,
    summary_tables: usize,
}

impl PriorityOrderedTrainer {
    /// `summary_tables` caps how many table names a database summary lists.
    #[must_use]
    pub const fn new(summary_tables: usize) -> Self {
        Self {
            trained: BTreeSet::new(),
            summary_tables,
        }
    }

    /// `database.table` identifiers trained by this trainer so far.
    #[must_use]
    pub const fn trained_items(&self) -> &BTreeSet<String> {
        &self.trained
    }

    #[must_use]
    pub fn is_trained(&self, database: &str, table: &str) -> bool {
        self.trained.contains(&format!("{database}.{table}"))
    }

    /// Train every table of `catalog`, priority databases first.
    ///
    /// DDL is fetched through `introspector` from the catalog's host.
    pub async fn train_all(
        &mut self,
        catalog: &SchemaCatalog,
        priority: &PrioritySet,
        introspector: &dyn DbIntrospector,
        corpus: &mut TrainingCorpusManager,
    ) -> TrainingRunResult {
        let started = Instant::now();
        let mut result = TrainingRunResult::default();

        if catalog.is_empty() {
            result.errors.push("no database information".to_string());
            result.elapsed = started.elapsed();
            return result;
        }

        for db in catalog.priority_order(priority) {
            let is_priority = priority.contains(&db.name);
            for table in db.tables() {
                self.train_table(catalog, db, table, is_priority, introspector, corpus, &mut result)
                    .await;
            }
            if db.is_empty() {
                result.databases_trained += 1;
                continue;
            }
            let summary = database_summary(db, is_priority, self.summary_tables);
            match corpus
                .record_documentation(&summary, RecordMetadata::for_database(&db.name, is_priority))
                .await
            {
                Ok(()) => result.databases_trained += 1,
                Err(error) => result.errors.push(format!("database {}: {error}", db.name)),
            }
        }

        result.success = true;
        result.elapsed = started.elapsed();
        tracing::info!(
            databases = result.databases_trained,
            tables = result.tables_trained,
            errors = result.errors.len(),
            elapsed_ms = u64::try_from(result.elapsed.as_millis()).unwrap_or(u64::MAX),
            "training run finished"
        );
        result
    }

    #[allow(clippy::too_many_arguments)]
    async fn train_table(
        &mut self,
        catalog: &SchemaCatalog,
        db: &DatabaseEntry,
        table: &str,
        is_priority: bool,
        introspector: &dyn DbIntrospector,
        corpus: &mut TrainingCorpusManager,
        result: &mut TrainingRunResult,
    ) {
        let database = db.name.as_str();
        let metadata = || RecordMetadata::for_table(database, table, is_priority);
        let mut outcomes = Vec::new();

        if let Some(ddl) = introspector
            .get_ddl(&catalog.host, database, table)
            .await
            .filter(|ddl| !ddl.trim().is_empty())
        {
            outcomes.push(corpus.record_ddl(&ddl, metadata()).await);
        }

        let select = templates::select_all(database, table);
        let pairs = [
            (format!("查询表 {table}"), select.clone()),
            (format!("查看表 {table} 的详情"), templates::describe(database, table)),
            (format!("帮我查 {table} 表"), select),
        ];
        for (question, sql) in &pairs {
            outcomes.push(corpus.record_question_sql(question, sql, metadata()).await);
        }

        if let Some(entry) = db.table(table).filter(|t| t.has_columns()) {
            let note = if is_priority { PRIORITY_NOTE } else { "" };
            let description = format!(
                "数据库 {database} {note}中的表 {table} 包含以下字段: {}",
                entry.described_columns().join(", ")
            );
            outcomes.push(corpus.record_documentation(&description, metadata()).await);
        }

        for error in outcomes.into_iter().filter_map(Result::err) {
            tracing::warn!(database, table, %error, "table training step failed");
            result.errors.push(format!("table {database}.{table}: {error}"));
        }

        self.trained.insert(format!("{database}.{table}"));
        result.tables_trained += 1;
    }
}

/// `"数据库 db （优先数据库）包含以下表: a, b"`, listing at most `limit` tables.
fn database_summary(db: &DatabaseEntry, is_priority: bool, limit: usize) -> String {
    let tag = if is_priority { PRIORITY_NOTE } else { "" };
    let listed: Vec<&str> = db.tables().iter().take(limit).map(String::as_str).collect();
    let mut summary = format!("数据库 {} {tag}包含以下表: {}", db.name, listed.join(", "));
    if db.table_count() > limit {
        summary.push_str(&format!(" 等共 {} 个表", db.table_count()));
    }
    summary
}
