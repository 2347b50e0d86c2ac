//! Engine error types.

use askdb_catalog::CatalogError;
use askdb_config::ConfigError;
use askdb_core::{CoreError, TrainingKind};
use askdb_oracle::OracleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The oracle's training intake refused an artifact. History is untouched.
    #[error("{kind} training failed: {source}")]
    TrainingSubmission {
        kind: TrainingKind,
        #[source]
        source: OracleError,
    },

    /// The oracle produced no usable SQL for a question.
    #[error("SQL generation failed: {0}")]
    Generation(String),

    /// The oracle lacks a capability the call needs.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Execution was asked for a resolution that did not succeed.
    #[error("question was not resolved: {0}")]
    Unresolved(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
