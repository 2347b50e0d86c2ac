//! Scripted [`SqlOracle`] for tests.
//!
//! Canned answers and failure switches are configured up front; every call
//! is recorded for later assertions.

use std::collections::HashSet;
use std::sync::Mutex;

use askdb_core::{TrainingArtifact, TrainingKind};
use async_trait::async_trait;

use crate::error::OracleError;
use crate::oracle::{CompletionOptions, SqlOracle};

/// A recorded `complete` call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionCall {
    pub system: String,
    pub user: String,
    pub options: CompletionOptions,
}

#[derive(Default)]
pub struct ScriptedOracle {
    sql: String,
    completion: Option<String>,
    fail_generation: bool,
    fail_completion: bool,
    plans: bool,
    rejected_kinds: HashSet<TrainingKind>,
    rejected_text: Vec<String>,
    trained: Mutex<Vec<TrainingArtifact>>,
    questions: Mutex<Vec<(String, Option<String>)>>,
    completions: Mutex<Vec<CompletionCall>>,
}

impl ScriptedOracle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// SQL returned by every `generate_sql` call. Defaults to empty.
    #[must_use]
    pub fn with_sql(mut self, sql: &str) -> Self {
        self.sql = sql.to_string();
        self
    }

    /// Text returned by `complete`. Without it `complete` is unsupported.
    #[must_use]
    pub fn with_completion(mut self, text: &str) -> Self {
        self.completion = Some(text.to_string());
        self
    }

    #[must_use]
    pub const fn failing_generation(mut self) -> Self {
        self.fail_generation = true;
        self
    }

    #[must_use]
    pub const fn failing_completion(mut self) -> Self {
        self.fail_completion = true;
        self
    }

    #[must_use]
    pub const fn with_plan_support(mut self) -> Self {
        self.plans = true;
        self
    }

    /// Reject every artifact of `kind`.
    #[must_use]
    pub fn reject_kind(mut self, kind: TrainingKind) -> Self {
        self.rejected_kinds.insert(kind);
        self
    }

    /// Reject artifacts whose content contains `needle`.
    #[must_use]
    pub fn reject_containing(mut self, needle: &str) -> Self {
        self.rejected_text.push(needle.to_string());
        self
    }

    /// Accepted artifacts, in submission order.
    ///
    /// # Panics
    ///
    /// Panics if the log mutex is poisoned.
    #[must_use]
    pub fn trained(&self) -> Vec<TrainingArtifact> {
        self.trained.lock().unwrap().clone()
    }

    /// `(question, db_context)` for every `generate_sql` call.
    ///
    /// # Panics
    ///
    /// Panics if the log mutex is poisoned.
    #[must_use]
    pub fn questions(&self) -> Vec<(String, Option<String>)> {
        self.questions.lock().unwrap().clone()
    }

    /// # Panics
    ///
    /// Panics if the log mutex is poisoned.
    #[must_use]
    pub fn completions(&self) -> Vec<CompletionCall> {
        self.completions.lock().unwrap().clone()
    }
}

#[async_trait]
impl SqlOracle for ScriptedOracle {
    async fn generate_sql(
        &self,
        question: &str,
        db_context: Option<&str>,
    ) -> Result<String, OracleError> {
        if let Ok(mut log) = self.questions.lock() {
            log.push((question.to_string(), db_context.map(str::to_string)));
        }
        if self.fail_generation {
            return Err(OracleError::Api {
                status: 503,
                message: "model overloaded".to_string(),
            });
        }
        Ok(self.sql.clone())
    }

    async fn train(&self, artifact: &TrainingArtifact) -> Result<(), OracleError> {
        if artifact.kind() == TrainingKind::Plan && !self.plans {
            return Err(OracleError::Unsupported("plan training".to_string()));
        }
        if self.rejected_kinds.contains(&artifact.kind()) {
            return Err(OracleError::Rejected(format!("{} intake offline", artifact.kind())));
        }
        let content = artifact.history_content();
        if let Some(needle) = self.rejected_text.iter().find(|n| content.contains(n.as_str())) {
            return Err(OracleError::Rejected(format!("content matched {needle:?}")));
        }
        if let Ok(mut log) = self.trained.lock() {
            log.push(artifact.clone());
        }
        Ok(())
    }

    fn supports_plans(&self) -> bool {
        self.plans
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        options: CompletionOptions,
    ) -> Result<String, OracleError> {
        if let Ok(mut log) = self.completions.lock() {
            log.push(CompletionCall {
                system: system.to_string(),
                user: user.to_string(),
                options,
            });
        }
        if self.fail_completion {
            return Err(OracleError::RateLimited { retry_after_secs: 60 });
        }
        self.completion
            .clone()
            .ok_or_else(|| OracleError::Unsupported("raw completion".to_string()))
    }
}
