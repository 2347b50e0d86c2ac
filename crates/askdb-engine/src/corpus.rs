//! Training corpus: submits artifacts to the oracle and keeps a bounded,
//! timestamped history of what it accepted.

use std::collections::VecDeque;
use std::sync::Arc;

use askdb_config::TrainingConfig;
use askdb_core::{
    PrioritySet, RecordMetadata, SchemaCatalog, TrainingArtifact, TrainingKind, TrainingRecord,
    TrainingStats,
};
use askdb_oracle::SqlOracle;
use serde::Serialize;

use crate::error::EngineError;
use crate::templates::{self, SqlPair};

/// Result of submitting several pairs in one go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchOutcome {
    fn tally<T, E>(&mut self, result: &Result<T, E>) {
        if result.is_ok() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

pub struct TrainingCorpusManager {
    oracle: Arc<dyn SqlOracle>,
    history: VecDeque<TrainingRecord>,
    capacity: usize,
    preview_chars: usize,
}

impl TrainingCorpusManager {
    #[must_use]
    pub fn new(oracle: Arc<dyn SqlOracle>, config: &TrainingConfig) -> Self {
        Self {
            oracle,
            history: VecDeque::with_capacity(config.history_capacity),
            capacity: config.history_capacity,
            preview_chars: config.preview_chars,
        }
    }

    /// Submit DDL text.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TrainingSubmission`] if the oracle rejects it.
    pub async fn record_ddl(
        &mut self,
        ddl: &str,
        metadata: RecordMetadata,
    ) -> Result<(), EngineError> {
        self.submit(TrainingArtifact::ddl(ddl), metadata).await
    }

    /// Submit free-text documentation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TrainingSubmission`] if the oracle rejects it.
    pub async fn record_documentation(
        &mut self,
        documentation: &str,
        metadata: RecordMetadata,
    ) -> Result<(), EngineError> {
        self.submit(TrainingArtifact::documentation(documentation), metadata)
            .await
    }

    /// Submit a question with the SQL that answers it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TrainingSubmission`] if the oracle rejects it.
    pub async fn record_question_sql(
        &mut self,
        question: &str,
        sql: &str,
        metadata: RecordMetadata,
    ) -> Result<(), EngineError> {
        self.submit(TrainingArtifact::question_sql(question, sql), metadata)
            .await
    }

    /// Submit an execution plan, if the oracle accepts plans at all.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unsupported`] when the oracle has no plan
    /// intake, or [`EngineError::TrainingSubmission`] if it rejects the plan.
    pub async fn record_plan(
        &mut self,
        plan: &str,
        metadata: RecordMetadata,
    ) -> Result<(), EngineError> {
        if !self.oracle.supports_plans() {
            tracing::warn!("oracle does not accept plan training");
            return Err(EngineError::Unsupported("plan training".to_string()));
        }
        self.submit(TrainingArtifact::plan(plan), metadata).await
    }

    /// Submit pairs one by one; failures are counted, not returned.
    pub async fn record_batch(
        &mut self,
        pairs: &[SqlPair],
        metadata: &RecordMetadata,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for pair in pairs {
            let result = self
                .record_question_sql(&pair.question, &pair.sql, metadata.clone())
                .await;
            outcome.tally(&result);
        }
        outcome
    }

    /// Submit the generic query shapes (describe, preview, count, first N).
    pub async fn record_query_patterns(&mut self) -> BatchOutcome {
        self.record_batch(&templates::query_patterns(), &RecordMetadata::default())
            .await
    }

    /// Submit the basic relational vocabulary as documentation.
    pub async fn record_terminology(&mut self) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for term in templates::TERMINOLOGY {
            let result = self
                .record_documentation(term, RecordMetadata::default())
                .await;
            outcome.tally(&result);
        }
        outcome
    }

    /// Submit `查询<table>表` for the first `per_database` tables of every
    /// catalogued database, in catalog order.
    pub async fn record_table_names(
        &mut self,
        catalog: &SchemaCatalog,
        priority: &PrioritySet,
        per_database: usize,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for db in catalog.databases() {
            let is_priority = priority.contains(&db.name);
            for table in db.tables().iter().take(per_database) {
                let pair = templates::table_name_example(&db.name, table);
                let metadata = RecordMetadata::for_table(&db.name, table, is_priority);
                let result = self
                    .record_question_sql(&pair.question, &pair.sql, metadata)
                    .await;
                outcome.tally(&result);
            }
        }
        tracing::info!(
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            "table-name training finished"
        );
        outcome
    }

    async fn submit(
        &mut self,
        artifact: TrainingArtifact,
        metadata: RecordMetadata,
    ) -> Result<(), EngineError> {
        let kind = artifact.kind();
        if let Err(error) = self.oracle.train(&artifact).await {
            tracing::warn!(
                %kind,
                database = metadata.database.as_deref().unwrap_or_default(),
                table = metadata.table.as_deref().unwrap_or_default(),
                %error,
                "training submission failed"
            );
            return Err(EngineError::TrainingSubmission {
                kind,
                source: error,
            });
        }
        self.push(TrainingRecord::from_artifact(
            &artifact,
            metadata,
            self.preview_chars,
        ));
        Ok(())
    }

    fn push(&mut self, record: TrainingRecord) {
        if self.capacity == 0 {
            return;
        }
        while self.history.len() >= self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(record);
    }

    /// Accepted records, oldest first.
    pub fn history(&self) -> impl ExactSizeIterator<Item = &TrainingRecord> {
        self.history.iter()
    }

    #[must_use]
    pub fn stats(&self) -> TrainingStats {
        TrainingStats::tally(&self.history)
    }

    /// Count of accepted records of `kind` still in the history.
    #[must_use]
    pub fn count(&self, kind: TrainingKind) -> usize {
        self.history.iter().filter(|r| r.kind == kind).count()
    }

    /// Empty the history. The oracle keeps what it was trained on.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn oracle(&self) -> &Arc<dyn SqlOracle> {
        &self.oracle
    }
}
