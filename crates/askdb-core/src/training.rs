//! Training artifacts, history records, and statistics.
//!
//! A [`TrainingArtifact`] is the full unit submitted to the oracle's training
//! intake. A [`TrainingRecord`] is what the history keeps after a confirmed
//! submission: only a truncated preview of the content, never the full text.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker appended to truncated summaries.
const ELLIPSIS: &str = "...";

// ---------------------------------------------------------------------------
// TrainingKind
// ---------------------------------------------------------------------------

/// Kind of training artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingKind {
    Ddl,
    Documentation,
    QuestionSql,
    Plan,
}

impl TrainingKind {
    /// Display label used in statistics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ddl => "DDL",
            Self::Documentation => "Documentation",
            Self::QuestionSql => "Question-SQL",
            Self::Plan => "Plan",
        }
    }
}

impl fmt::Display for TrainingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TrainingArtifact
// ---------------------------------------------------------------------------

/// One unit of training content for the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrainingArtifact {
    Ddl { ddl: String },
    Documentation { documentation: String },
    QuestionSql { question: String, sql: String },
    Plan { plan: String },
}

impl TrainingArtifact {
    #[must_use]
    pub fn ddl(text: impl Into<String>) -> Self {
        Self::Ddl { ddl: text.into() }
    }

    #[must_use]
    pub fn documentation(text: impl Into<String>) -> Self {
        Self::Documentation {
            documentation: text.into(),
        }
    }

    #[must_use]
    pub fn question_sql(question: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::QuestionSql {
            question: question.into(),
            sql: sql.into(),
        }
    }

    #[must_use]
    pub fn plan(text: impl Into<String>) -> Self {
        Self::Plan { plan: text.into() }
    }

    #[must_use]
    pub const fn kind(&self) -> TrainingKind {
        match self {
            Self::Ddl { .. } => TrainingKind::Ddl,
            Self::Documentation { .. } => TrainingKind::Documentation,
            Self::QuestionSql { .. } => TrainingKind::QuestionSql,
            Self::Plan { .. } => TrainingKind::Plan,
        }
    }

    /// Text the history summary is cut from.
    #[must_use]
    pub fn history_content(&self) -> String {
        match self {
            Self::Ddl { ddl: text }
            | Self::Documentation {
                documentation: text,
            }
            | Self::Plan { plan: text } => text.clone(),
            Self::QuestionSql { question, sql } => format!("Q: {question}\nSQL: {sql}"),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordMetadata
// ---------------------------------------------------------------------------

/// Where a training artifact came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<bool>,
}

impl RecordMetadata {
    /// Metadata for a table-level artifact.
    #[must_use]
    pub fn for_table(database: &str, table: &str, priority: bool) -> Self {
        Self {
            database: Some(database.to_string()),
            table: Some(table.to_string()),
            priority: Some(priority),
        }
    }

    /// Metadata for a database-level artifact.
    #[must_use]
    pub fn for_database(database: &str, priority: bool) -> Self {
        Self {
            database: Some(database.to_string()),
            table: None,
            priority: Some(priority),
        }
    }

    #[must_use]
    pub fn is_priority(&self) -> bool {
        self.priority.unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// TrainingRecord
// ---------------------------------------------------------------------------

/// History entry for a confirmed training submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub kind: TrainingKind,
    pub content_summary: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: RecordMetadata,
}

impl TrainingRecord {
    /// Build a record stamped now, summarizing `artifact` to `preview_chars`.
    #[must_use]
    pub fn from_artifact(
        artifact: &TrainingArtifact,
        metadata: RecordMetadata,
        preview_chars: usize,
    ) -> Self {
        Self {
            kind: artifact.kind(),
            content_summary: summarize(&artifact.history_content(), preview_chars),
            timestamp: Utc::now(),
            metadata,
        }
    }
}

/// Truncate `content` to `max_chars` characters, marking the cut with `...`.
///
/// Counts characters, not bytes, so multi-byte text is never split.
#[must_use]
pub fn summarize(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{ELLIPSIS}", &content[..byte_idx]),
        None => content.to_string(),
    }
}

// ---------------------------------------------------------------------------
// TrainingStats
// ---------------------------------------------------------------------------

/// Counts over the current history window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingStats {
    pub total: usize,
    pub by_kind: BTreeMap<TrainingKind, usize>,
}

impl TrainingStats {
    /// Tally records by kind.
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a TrainingRecord>) -> Self {
        let mut stats = Self::default();
        for record in records {
            stats.total += 1;
            *stats.by_kind.entry(record.kind).or_insert(0) += 1;
        }
        stats
    }

    #[must_use]
    pub fn count(&self, kind: TrainingKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }
}
