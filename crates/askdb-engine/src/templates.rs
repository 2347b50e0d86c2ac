//! Fixed SQL shapes and question phrasings shared by training, routing, and
//! synthesis.

use askdb_core::{qualified_name, quote_ident};
use serde::{Deserialize, Serialize};

/// Rows returned by the "all rows" template.
pub const PREVIEW_ROWS: usize = 10;

/// Tables per database covered by quick table-name training.
pub const QUICK_TABLES_PER_DATABASE: usize = 5;

/// Generic query shapes. `{table}` and `{n}` stay as literal placeholders.
const QUERY_PATTERNS: &[(&str, &str)] = &[
    ("查询表结构", "DESCRIBE {table}"),
    ("查看表数据", "SELECT * FROM {table} LIMIT 10"),
    ("统计记录数", "SELECT COUNT(*) FROM {table}"),
    ("查询前N条", "SELECT * FROM {table} LIMIT {n}"),
];

/// Basic relational vocabulary.
pub const TERMINOLOGY: &[&str] = &[
    "表是数据库中存储数据的基本单位",
    "字段是表中的列，用于存储特定类型的数据",
    "主键是唯一标识表中每条记录的字段",
    "外键是关联两个表的字段",
];

/// A natural-language question with the SQL that answers it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SqlPair {
    pub question: String,
    pub sql: String,
}

impl SqlPair {
    #[must_use]
    pub fn new(question: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            sql: sql.into(),
        }
    }
}

#[must_use]
pub fn select_all(database: &str, table: &str) -> String {
    format!(
        "SELECT * FROM {} LIMIT {PREVIEW_ROWS}",
        qualified_name(database, table)
    )
}

#[must_use]
pub fn describe(database: &str, table: &str) -> String {
    format!("DESCRIBE {}", qualified_name(database, table))
}

#[must_use]
pub fn count_rows(database: &str, table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", qualified_name(database, table))
}

#[must_use]
pub fn select_column(database: &str, table: &str, column: &str) -> String {
    format!(
        "SELECT {} FROM {} LIMIT {PREVIEW_ROWS}",
        quote_ident(column),
        qualified_name(database, table)
    )
}

/// All rows, describe, and row count for one table.
#[must_use]
pub fn simple_examples(database: &str, table: &str) -> Vec<SqlPair> {
    vec![
        SqlPair::new(format!("查询{table}表的所有数据"), select_all(database, table)),
        SqlPair::new(format!("查看{table}表的字段信息"), describe(database, table)),
        SqlPair::new(format!("统计{table}表有多少条记录"), count_rows(database, table)),
    ]
}

/// The generic query shapes as pairs.
#[must_use]
pub fn query_patterns() -> Vec<SqlPair> {
    QUERY_PATTERNS
        .iter()
        .map(|(question, sql)| SqlPair::new(*question, *sql))
        .collect()
}

/// `查询<table>表` answered by the all-rows select.
#[must_use]
pub fn table_name_example(database: &str, table: &str) -> SqlPair {
    SqlPair::new(format!("查询{table}表"), select_all(database, table))
}

#[must_use]
pub fn column_example(database: &str, table: &str, column: &str) -> SqlPair {
    SqlPair::new(
        format!("查询{table}表的{column}字段"),
        select_column(database, table, column),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn statements_quote_identifiers() {
        assert_eq!(select_all("shop", "orders"), "SELECT * FROM `shop`.`orders` LIMIT 10");
        assert_eq!(describe("shop", "orders"), "DESCRIBE `shop`.`orders`");
        assert_eq!(count_rows("shop", "orders"), "SELECT COUNT(*) FROM `shop`.`orders`");
        assert_eq!(
            select_column("shop", "orders", "total"),
            "SELECT `total` FROM `shop`.`orders` LIMIT 10"
        );
    }

    #[test]
    fn reserved_column_names_are_quoted() {
        assert_eq!(
            column_example("shop", "orders", "order").sql,
            "SELECT `order` FROM `shop`.`orders` LIMIT 10"
        );
        assert_eq!(
            select_column("shop", "orders", "ship date"),
            "SELECT `ship date` FROM `shop`.`orders` LIMIT 10"
        );
    }

    #[test]
    fn query_patterns_keep_placeholders() {
        let patterns = query_patterns();
        assert_eq!(patterns.len(), 4);
        assert_eq!(patterns[0], SqlPair::new("查询表结构", "DESCRIBE {table}"));
        assert_eq!(patterns[3].sql, "SELECT * FROM {table} LIMIT {n}");
    }

    #[test]
    fn table_name_example_selects_preview() {
        assert_eq!(
            table_name_example("shop", "orders"),
            SqlPair::new("查询orders表", "SELECT * FROM `shop`.`orders` LIMIT 10")
        );
    }

    #[test]
    fn simple_examples_cover_three_shapes() {
        let pairs = simple_examples("shop", "orders");
        assert_eq!(
            pairs,
            vec![
                SqlPair::new("查询orders表的所有数据", "SELECT * FROM `shop`.`orders` LIMIT 10"),
                SqlPair::new("查看orders表的字段信息", "DESCRIBE `shop`.`orders`"),
                SqlPair::new("统计orders表有多少条记录", "SELECT COUNT(*) FROM `shop`.`orders`"),
            ]
        );
    }
}
