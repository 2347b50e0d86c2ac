//! Query routing and execution configuration.

use serde::{Deserialize, Serialize};

const fn default_auto_limit() -> bool {
    true
}

const fn default_result_limit() -> u32 {
    100
}

/// Databases tried when neither the resolution nor the SQL names one.
const fn default_fallback_database_count() -> usize {
    3
}

const fn default_prefer_priority() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoutingConfig {
    /// Append `LIMIT` to executed SQL that has none.
    #[serde(default = "default_auto_limit")]
    pub auto_limit: bool,

    #[serde(default = "default_result_limit")]
    pub result_limit: u32,

    #[serde(default = "default_fallback_database_count")]
    pub fallback_database_count: usize,

    /// Try priority databases first when falling back.
    #[serde(default = "default_prefer_priority")]
    pub prefer_priority: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            auto_limit: default_auto_limit(),
            result_limit: default_result_limit(),
            fallback_database_count: default_fallback_database_count(),
            prefer_priority: default_prefer_priority(),
        }
    }
}
