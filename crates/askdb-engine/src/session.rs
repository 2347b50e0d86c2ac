//! One user's routing session: configuration, priority databases, the
//! training corpus, and the current catalog, owned in one place.

use std::borrow::Cow;
use std::sync::Arc;

use askdb_catalog::{DbIntrospector, refresh};
use askdb_config::AskConfig;
use askdb_core::{PrioritySet, QueryResolution, RecordMetadata, SchemaCatalog};
use askdb_oracle::{ChatOracle, SqlOracle};

use crate::corpus::{BatchOutcome, TrainingCorpusManager};
use crate::error::EngineError;
use crate::execute::{ExecutionReport, QueryExecutor};
use crate::router::QueryRouter;
use crate::synth::{DiversityLevel, PairSynthesizer, SynthesisTable};
use crate::templates::{self, SqlPair};
use crate::trainer::{PriorityOrderedTrainer, TrainingRunResult};

pub struct RoutingSession {
    config: AskConfig,
    oracle: Arc<dyn SqlOracle>,
    priority: PrioritySet,
    corpus: TrainingCorpusManager,
    trainer: PriorityOrderedTrainer,
    router: QueryRouter,
    synthesizer: PairSynthesizer,
    catalog: Option<SchemaCatalog>,
    trained: bool,
}

impl RoutingSession {
    #[must_use]
    pub fn new(config: AskConfig, oracle: Arc<dyn SqlOracle>) -> Self {
        Self {
            corpus: TrainingCorpusManager::new(Arc::clone(&oracle), &config.training),
            trainer: PriorityOrderedTrainer::new(config.training.database_summary_tables),
            router: QueryRouter::new(Arc::clone(&oracle)),
            synthesizer: PairSynthesizer::new(),
            priority: PrioritySet::new(),
            catalog: None,
            trained: false,
            oracle,
            config,
        }
    }

    /// A session backed by the chat-completion oracle described in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Oracle`] if the HTTP client cannot be built.
    pub fn with_chat_oracle(config: AskConfig) -> Result<Self, EngineError> {
        let oracle = ChatOracle::new(config.oracle.clone())?;
        Ok(Self::new(config, Arc::new(oracle)))
    }

    /// Load configuration (including `.env`) and build a chat-backed session.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if configuration is invalid, or
    /// [`EngineError::Oracle`] if the HTTP client cannot be built.
    pub fn load() -> Result<Self, EngineError> {
        Self::with_chat_oracle(AskConfig::load_with_dotenv()?)
    }

    #[must_use]
    pub const fn config(&self) -> &AskConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Priority
    // -----------------------------------------------------------------------

    #[must_use]
    pub const fn priority(&self) -> &PrioritySet {
        &self.priority
    }

    /// Replace the priority databases.
    pub fn set_priority<I, S>(&mut self, databases: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.priority.replace(databases);
    }

    pub const fn priority_mut(&mut self) -> &mut PrioritySet {
        &mut self.priority
    }

    // -----------------------------------------------------------------------
    // Catalog
    // -----------------------------------------------------------------------

    /// Discover `host` and make it the session's catalog.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Catalog`] if the host's databases cannot be
    /// listed. The previous catalog is kept in that case.
    pub async fn refresh(
        &mut self,
        introspector: &dyn DbIntrospector,
        host: &str,
    ) -> Result<&SchemaCatalog, EngineError> {
        let catalog = refresh(introspector, host).await?;
        Ok(self.catalog.insert(catalog))
    }

    pub fn set_catalog(&mut self, catalog: SchemaCatalog) {
        self.catalog = Some(catalog);
    }

    #[must_use]
    pub const fn catalog(&self) -> Option<&SchemaCatalog> {
        self.catalog.as_ref()
    }

    // -----------------------------------------------------------------------
    // Training
    // -----------------------------------------------------------------------

    /// Train on the whole catalog, priority databases first.
    pub async fn train_all(&mut self, introspector: &dyn DbIntrospector) -> TrainingRunResult {
        let catalog = self.catalog.as_ref().map_or_else(
            || Cow::Owned(SchemaCatalog::new(self.config.database.default_host.clone())),
            Cow::Borrowed,
        );
        let result = self
            .trainer
            .train_all(&catalog, &self.priority, introspector, &mut self.corpus)
            .await;
        self.trained |= result.success;
        result
    }

    /// Whether a training run has completed in this session.
    #[must_use]
    pub const fn is_trained(&self) -> bool {
        self.trained
    }

    #[must_use]
    pub const fn corpus(&self) -> &TrainingCorpusManager {
        &self.corpus
    }

    pub const fn corpus_mut(&mut self) -> &mut TrainingCorpusManager {
        &mut self.corpus
    }

    #[must_use]
    pub const fn trainer(&self) -> &PriorityOrderedTrainer {
        &self.trainer
    }

    /// Submit reviewed pairs as question/SQL training.
    pub async fn train_pairs(&mut self, pairs: &[SqlPair]) -> BatchOutcome {
        self.corpus.record_batch(pairs, &RecordMetadata::default()).await
    }

    /// Quick training: the generic query shapes.
    pub async fn train_query_patterns(&mut self) -> BatchOutcome {
        self.corpus.record_query_patterns().await
    }

    /// Quick training: basic relational vocabulary.
    pub async fn train_terminology(&mut self) -> BatchOutcome {
        self.corpus.record_terminology().await
    }

    /// Quick training: `查询<table>表` for the first few tables of each
    /// catalogued database.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Core`] if no catalog has been discovered.
    pub async fn train_table_names(&mut self) -> Result<BatchOutcome, EngineError> {
        let catalog = self.catalog.as_ref().ok_or_else(no_catalog)?;
        Ok(self
            .corpus
            .record_table_names(
                catalog,
                &self.priority,
                templates::QUICK_TABLES_PER_DATABASE,
            )
            .await)
    }

    // -----------------------------------------------------------------------
    // Routing
    // -----------------------------------------------------------------------

    /// Resolve a question against the current catalog.
    pub async fn resolve(&self, question: &str) -> QueryResolution {
        self.router
            .resolve(question, &self.current_catalog(), &self.priority)
            .await
    }

    /// Run a resolution's SQL with the session's routing settings.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unresolved`] for a failed resolution.
    pub async fn execute(
        &self,
        introspector: &dyn DbIntrospector,
        resolution: &QueryResolution,
    ) -> Result<ExecutionReport, EngineError> {
        QueryExecutor::new(introspector, &self.config.routing)
            .execute(resolution, &self.current_catalog(), &self.priority)
            .await
    }

    // -----------------------------------------------------------------------
    // Synthesis
    // -----------------------------------------------------------------------

    /// Synthesize up to `count` pairs for `(database, table)` selections.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Core`] if a selection is not in the catalog.
    pub async fn synthesize(
        &self,
        selections: &[(&str, &str)],
        count: usize,
        diversity: DiversityLevel,
    ) -> Result<Vec<SqlPair>, EngineError> {
        let catalog = self.require_catalog()?;
        let tables = selections
            .iter()
            .map(|(db, table)| SynthesisTable::from_catalog(catalog, db, table))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self
            .synthesizer
            .synthesize(self.oracle.as_ref(), &tables, count, diversity)
            .await)
    }

    /// The three fixed example pairs for one catalogued table.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Core`] if the table is not in the catalog.
    pub fn simple_examples(
        &self,
        database: &str,
        table: &str,
    ) -> Result<Vec<SqlPair>, EngineError> {
        self.require_catalog()?.table(database, table)?;
        Ok(templates::simple_examples(database, table))
    }

    /// The discovered catalog, or an empty one for the default host.
    fn current_catalog(&self) -> Cow<'_, SchemaCatalog> {
        self.catalog.as_ref().map_or_else(
            || Cow::Owned(SchemaCatalog::new(self.config.database.default_host.clone())),
            Cow::Borrowed,
        )
    }

    fn require_catalog(&self) -> Result<&SchemaCatalog, EngineError> {
        self.catalog.as_ref().ok_or_else(no_catalog)
    }
}

fn no_catalog() -> EngineError {
    EngineError::Core(askdb_core::CoreError::Validation(
        "no catalog: refresh a host first".to_string(),
    ))
}
