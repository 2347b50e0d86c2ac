//! Keyword intent for exact-match questions.

use crate::templates;

const STRUCTURE_KEYWORDS: &[&str] = &[
    "详情", "结构", "字段", "列", "desc", "describe", "detail", "structure", "field", "column",
];

const COUNT_KEYWORDS: &[&str] = &["数量", "计数", "count", "多少", "how many"];

/// What a question wants from a matched table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryIntent {
    Structure,
    Count,
    Rows,
}

impl QueryIntent {
    /// Structure keywords win over count keywords; anything else wants rows.
    #[must_use]
    pub fn classify(question: &str) -> Self {
        let lowered = question.to_lowercase();
        let mentions = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));
        if mentions(STRUCTURE_KEYWORDS) {
            Self::Structure
        } else if mentions(COUNT_KEYWORDS) {
            Self::Count
        } else {
            Self::Rows
        }
    }

    #[must_use]
    pub fn sql(self, database: &str, table: &str) -> String {
        match self {
            Self::Structure => templates::describe(database, table),
            Self::Count => templates::count_rows(database, table),
            Self::Rows => templates::select_all(database, table),
        }
    }
}
