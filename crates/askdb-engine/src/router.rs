//! Question routing: deterministic table match first, oracle second.

use std::sync::Arc;

use askdb_core::{DatabaseEntry, PrioritySet, QueryResolution, SchemaCatalog};
use askdb_oracle::SqlOracle;

use crate::error::EngineError;
use crate::extract::{referenced_databases, table_candidates};
use crate::intent::QueryIntent;

pub struct QueryRouter {
    oracle: Arc<dyn SqlOracle>,
}

impl QueryRouter {
    #[must_use]
    pub fn new(oracle: Arc<dyn SqlOracle>) -> Self {
        Self { oracle }
    }

    /// Resolve `question` against `catalog`. Never fails: errors are reported
    /// in [`QueryResolution::error`].
    pub async fn resolve(
        &self,
        question: &str,
        catalog: &SchemaCatalog,
        priority: &PrioritySet,
    ) -> QueryResolution {
        match self.try_resolve(question, catalog, priority).await {
            Ok(resolution) => resolution,
            Err(error) => {
                tracing::warn!(%error, "question could not be resolved");
                QueryResolution::failed(error.to_string())
            }
        }
    }

    /// Like [`Self::resolve`], returning the error instead of folding it in.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Generation`] if the oracle answers with no SQL,
    /// or [`EngineError::Oracle`] if the oracle call fails.
    pub async fn try_resolve(
        &self,
        question: &str,
        catalog: &SchemaCatalog,
        priority: &PrioritySet,
    ) -> Result<QueryResolution, EngineError> {
        if let Some(resolution) = exact_match(question, catalog, priority) {
            return Ok(resolution);
        }

        let sql = self.oracle.generate_sql(question, None).await?;
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(EngineError::Generation("oracle returned no SQL".to_string()));
        }
        let used = referenced_databases(sql, catalog);
        let priority_used = priority.any_of(&used);
        Ok(QueryResolution::generated(sql.to_string(), used, priority_used))
    }
}

/// Deterministic table-name match.
///
/// For each candidate, priority databases (catalog order) are searched first,
/// each with a case-sensitive then a case-insensitive pass. Only when no
/// candidate hits a priority database are all databases searched the same
/// way.
#[must_use]
pub fn exact_match(
    question: &str,
    catalog: &SchemaCatalog,
    priority: &PrioritySet,
) -> Option<QueryResolution> {
    let candidates = table_candidates(question);
    if candidates.is_empty() {
        return None;
    }

    let (priority_dbs, _) = catalog.partition_by_priority(priority);
    let all_dbs: Vec<&DatabaseEntry> = catalog.databases().iter().collect();

    let (db, table) = search(&candidates, &priority_dbs).or_else(|| search(&candidates, &all_dbs))?;

    let intent = QueryIntent::classify(question);
    tracing::debug!(database = %db, table = %table, ?intent, "exact table match");
    Some(QueryResolution::exact(
        db,
        table,
        intent.sql(db, table),
        priority.contains(db),
    ))
}

fn search<'a>(
    candidates: &[String],
    databases: &[&'a DatabaseEntry],
) -> Option<(&'a str, &'a str)> {
    candidates.iter().find_map(|candidate| {
        databases.iter().find_map(|db| {
            let tables = db.tables();
            tables
                .iter()
                .find(|t| *t == candidate)
                .or_else(|| tables.iter().find(|t| t.to_lowercase() == *candidate))
                .map(|t| (db.name.as_str(), t.as_str()))
        })
    })
}
