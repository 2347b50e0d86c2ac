//! Query resolution results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a question was turned into SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// A catalogued table name appeared in the question.
    ExactTable,
    /// The generative oracle wrote the SQL.
    VannaGenerated,
}

impl MatchType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExactTable => "exact_table",
            Self::VannaGenerated => "vanna_generated",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of routing one question. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResolution {
    pub success: bool,
    #[serde(default)]
    pub sql: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<MatchType>,
    /// Catalogued databases the SQL touches, first appearance first.
    #[serde(default)]
    pub used_databases: Vec<String>,
    #[serde(default)]
    pub priority_used: bool,
    /// `database.table` picked by the exact-match path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResolution {
    /// A resolution from a direct table-name hit.
    #[must_use]
    pub fn exact(database: &str, table: &str, sql: String, priority_used: bool) -> Self {
        Self {
            success: true,
            sql,
            match_type: Some(MatchType::ExactTable),
            used_databases: vec![database.to_string()],
            priority_used,
            matched_table: Some(format!("{database}.{table}")),
            error: None,
        }
    }

    /// A resolution produced by the oracle.
    #[must_use]
    pub fn generated(sql: String, used_databases: Vec<String>, priority_used: bool) -> Self {
        Self {
            success: true,
            sql,
            match_type: Some(MatchType::VannaGenerated),
            used_databases,
            priority_used,
            matched_table: None,
            error: None,
        }
    }

    /// A failed resolution carrying the error message.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            sql: String::new(),
            match_type: None,
            used_databases: Vec::new(),
            priority_used: false,
            matched_table: None,
            error: Some(error.into()),
        }
    }
}
