//! Pure text scanning: table-name candidates in questions, database names in
//! SQL.

use std::collections::HashSet;
use std::sync::LazyLock;

use askdb_core::SchemaCatalog;
use regex::Regex;

/// Phrasings that put a table name next to a "query"/"table" word. Group 1 is
/// the candidate. Tried in order.
const TABLE_PATTERNS: &[&str] = &[
    r"查\s+(\w+)\s*表",
    r"查询\s+(\w+)\s*表",
    r"表\s+(\w+)",
    r"\b(\w+)\b表",
    r"帮我查\s+(\w+)",
];

/// Bare tokens shorter than this are not candidates.
const MIN_TOKEN_CHARS: usize = 3;

/// Tokens that are question words, never table names.
const STOPWORDS: &[&str] = &["查询", "帮我", "详情", "查看"];

static TABLE_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    TABLE_PATTERNS
        .iter()
        .map(|p| Regex::new(p).expect("table pattern should compile"))
        .collect()
});

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\w+)\b").expect("word pattern should compile"));

/// `db.table` references, optionally backquoted.
static QUALIFIED_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"`?(\w+)`?\.`?(\w+)`?").expect("qualified name pattern should compile")
});

/// Candidate table names in `question`, pattern hits first, then bare tokens.
///
/// Matching runs on the lowercased question. Duplicates keep their first
/// position, so the result is deterministic for a given input.
#[must_use]
pub fn table_candidates(question: &str) -> Vec<String> {
    let lowered = question.to_lowercase();
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    let pattern_hits = TABLE_REGEXES
        .iter()
        .flat_map(|re| re.captures_iter(&lowered).map(|c| c[1].to_string()));
    let tokens = WORD
        .captures_iter(&lowered)
        .map(|c| c[1].to_string())
        .filter(|w| w.chars().count() >= MIN_TOKEN_CHARS && !STOPWORDS.contains(&w.as_str()));

    for candidate in pattern_hits.chain(tokens) {
        if seen.insert(candidate.clone()) {
            candidates.push(candidate);
        }
    }
    candidates
}

/// Catalogued databases referenced as `db.table` in `sql`, first appearance
/// first, without duplicates.
#[must_use]
pub fn referenced_databases(sql: &str, catalog: &SchemaCatalog) -> Vec<String> {
    let mut used: Vec<String> = Vec::new();
    for caps in QUALIFIED_REF.captures_iter(sql) {
        let db = &caps[1];
        if catalog.contains_database(db) && !used.iter().any(|u| u == db) {
            used.push(db.to_string());
        }
    }
    used
}
