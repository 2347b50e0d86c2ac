//! The oracle seam: SQL generation, training intake, and raw completion.

use askdb_core::TrainingArtifact;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::OracleError;

/// Sampling parameters for one completion call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A natural-language-to-SQL generator that can be trained in place.
#[async_trait]
pub trait SqlOracle: Send + Sync {
    /// Generate SQL for `question`. `db_context` is extra schema text appended
    /// to the prompt. An empty string means the oracle had no answer.
    async fn generate_sql(
        &self,
        question: &str,
        db_context: Option<&str>,
    ) -> Result<String, OracleError>;

    /// Submit one artifact to the training intake.
    async fn train(&self, artifact: &TrainingArtifact) -> Result<(), OracleError>;

    /// Whether [`TrainingArtifact::Plan`] is accepted by [`Self::train`].
    fn supports_plans(&self) -> bool {
        false
    }

    /// Free-form chat completion, used for bulk pair synthesis.
    async fn complete(
        &self,
        _system: &str,
        _user: &str,
        _options: CompletionOptions,
    ) -> Result<String, OracleError> {
        Err(OracleError::Unsupported("raw completion".to_string()))
    }
}
