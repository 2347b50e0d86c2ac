//! Training corpus configuration.

use serde::{Deserialize, Serialize};

/// Records kept in the training history before the oldest is evicted.
const fn default_history_capacity() -> usize {
    50
}

/// Characters of content kept in a history record summary.
const fn default_preview_chars() -> usize {
    100
}

/// Table names listed in a database summary before truncating.
const fn default_summary_tables() -> usize {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrainingConfig {
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    #[serde(default = "default_summary_tables")]
    pub database_summary_tables: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            preview_chars: default_preview_chars(),
            database_summary_tables: default_summary_tables(),
        }
    }
}
