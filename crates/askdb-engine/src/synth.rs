//! Bulk question/SQL pair synthesis for selected tables.
//!
//! The oracle is asked for `count` pairs in a line format; valid lines are
//! kept, and any shortfall is filled from fixed templates. If the oracle
//! cannot be used at all, a reduced template set is returned instead. The
//! synthesizer itself never fails.

use std::collections::HashSet;
use std::fmt;

use askdb_core::SchemaCatalog;
use askdb_oracle::{CompletionOptions, SqlOracle};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::templates::{self, SqlPair};

/// Separator between question and SQL on a generated line.
pub const PAIR_DELIMITER: &str = "###";

/// Leading keywords accepted for generated SQL.
const ALLOWED_SQL_PREFIXES: &[&str] =
    &["SELECT", "DESCRIBE", "SHOW", "COUNT", "SUM", "AVG", "MIN", "MAX"];

const SYSTEM_MESSAGE: &str = "你是一个专业的SQL查询生成助手。";

const MAX_TOKENS: u32 = 2000;

/// Columns per table that get a single-column template.
const BACKFILL_COLUMNS: usize = 3;

/// Tables and columns per table covered when the oracle is unavailable.
const REDUCED_TABLES: usize = 3;
const REDUCED_COLUMNS: usize = 2;

/// How varied the requested pairs should be.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiversityLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl DiversityLevel {
    /// Label used in the prompt.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "低",
            Self::Medium => "中",
            Self::High => "高",
        }
    }

    #[must_use]
    pub const fn temperature(self) -> f32 {
        match self {
            Self::High => 0.7,
            Self::Low | Self::Medium => 0.5,
        }
    }
}

impl fmt::Display for DiversityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One selected table with its column listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisTable {
    pub database: String,
    pub table: String,
    pub columns: Vec<String>,
    /// `"name (type)"` per column.
    pub column_info: Vec<String>,
}

impl SynthesisTable {
    /// Look a table up in the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Core`] if the database or table is unknown.
    pub fn from_catalog(
        catalog: &SchemaCatalog,
        database: &str,
        table: &str,
    ) -> Result<Self, EngineError> {
        let entry = catalog.table(database, table)?;
        Ok(Self {
            database: database.to_string(),
            table: table.to_string(),
            columns: entry.columns().to_vec(),
            column_info: entry.described_columns(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PairSynthesizer;

impl PairSynthesizer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Up to `count` distinct pairs covering `tables`.
    pub async fn synthesize(
        &self,
        oracle: &dyn SqlOracle,
        tables: &[SynthesisTable],
        count: usize,
        diversity: DiversityLevel,
    ) -> Vec<SqlPair> {
        if count == 0 || tables.is_empty() {
            return Vec::new();
        }

        let options = CompletionOptions {
            temperature: diversity.temperature(),
            max_tokens: MAX_TOKENS,
        };
        let prompt = build_prompt(tables, count, diversity);

        match oracle.complete(SYSTEM_MESSAGE, &prompt, options).await {
            Ok(text) => {
                let mut pairs = parse_pairs(&text);
                let generated = pairs.len();
                if pairs.len() < count {
                    pairs.extend(tables.iter().flat_map(backfill));
                }
                let pairs = dedup_truncate(pairs, count);
                tracing::debug!(generated, returned = pairs.len(), "synthesized pairs");
                pairs
            }
            Err(error) => {
                tracing::warn!(%error, "pair synthesis fell back to templates");
                let mut pairs: Vec<SqlPair> =
                    tables.iter().take(REDUCED_TABLES).flat_map(reduced).collect();
                pairs.truncate(count);
                pairs
            }
        }
    }
}

fn build_prompt(tables: &[SynthesisTable], count: usize, diversity: DiversityLevel) -> String {
    let described: String = tables
        .iter()
        .map(|t| {
            format!(
                "数据库: {}\n表: {}\n字段 ({}个): {}\n\n",
                t.database,
                t.table,
                t.columns.len(),
                t.column_info.join(", ")
            )
        })
        .collect();

    format!(
        "你是一个SQL专家，需要为以下数据库表生成自然语言问题和对应的SQL查询对。

表信息：
{described}
请生成{count}个多样化的问题-SQL对，涵盖以下类型：
1. 简单查询（SELECT *）
2. 表结构查询（DESCRIBE/SHOW COLUMNS）
3. 统计查询（COUNT, SUM, AVG等）
4. 条件查询（WHERE子句）
5. 排序查询（ORDER BY）
6. 分组查询（GROUP BY）
7. 多表查询（JOIN，如果涉及多个表）
8. 字段详情查询

多样性要求：{diversity}级别

格式要求：每个对占一行，问题和SQL之间用\"{PAIR_DELIMITER}\"分隔

示例：
查询用户表的所有数据###SELECT * FROM users LIMIT 10
查看订单表的字段信息###DESCRIBE orders
统计用户数量###SELECT COUNT(*) FROM users

现在开始生成："
    )
}

/// Keep lines of the form `question###SQL` whose SQL starts with an allowed
/// keyword. Everything else is dropped.
fn parse_pairs(text: &str) -> Vec<SqlPair> {
    text.lines()
        .filter_map(|line| line.trim().split_once(PAIR_DELIMITER))
        .map(|(question, sql)| (question.trim(), sql.trim()))
        .filter(|(question, sql)| {
            let upper = sql.to_uppercase();
            !question.is_empty() && ALLOWED_SQL_PREFIXES.iter().any(|p| upper.starts_with(p))
        })
        .map(|(question, sql)| SqlPair::new(question, sql))
        .collect()
}

fn backfill(table: &SynthesisTable) -> Vec<SqlPair> {
    let (db, t) = (table.database.as_str(), table.table.as_str());
    let mut pairs = templates::simple_examples(db, t);
    pairs.extend(
        table
            .columns
            .iter()
            .take(BACKFILL_COLUMNS)
            .map(|c| templates::column_example(db, t, c)),
    );
    pairs
}

fn reduced(table: &SynthesisTable) -> Vec<SqlPair> {
    let (db, t) = (table.database.as_str(), table.table.as_str());
    let mut pairs = templates::simple_examples(db, t);
    pairs.push(SqlPair::new(
        format!("从{t}表查询前10条数据"),
        templates::select_all(db, t),
    ));
    pairs.extend(
        table
            .columns
            .iter()
            .take(REDUCED_COLUMNS)
            .map(|c| templates::column_example(db, t, c)),
    );
    pairs
}

fn dedup_truncate(pairs: Vec<SqlPair>, count: usize) -> Vec<SqlPair> {
    let mut seen = HashSet::new();
    pairs
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .take(count)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use askdb_oracle::test_support::ScriptedOracle;
    use pretty_assertions::assert_eq;

    fn orders() -> SynthesisTable {
        SynthesisTable {
            database: "shop".into(),
            table: "orders".into(),
            columns: vec!["id".into(), "total".into(), "status".into(), "created_at".into()],
            column_info: vec![
                "id (int)".into(),
                "total (decimal)".into(),
                "status (varchar)".into(),
                "created_at (datetime)".into(),
            ],
        }
    }

    #[test]
    fn parse_keeps_valid_lines_only() {
        let text = "\
            1. 这是说明文字\n\
            查询所有订单###SELECT * FROM `shop`.`orders` LIMIT 10\n\
            删除订单###DELETE FROM orders\n\
            ###SELECT 1\n\
              订单字段 ### describe `shop`.`orders`  \n\
            统计###count(*)";
        assert_eq!(
            parse_pairs(text),
            vec![
                SqlPair::new("查询所有订单", "SELECT * FROM `shop`.`orders` LIMIT 10"),
                SqlPair::new("订单字段", "describe `shop`.`orders`"),
                SqlPair::new("统计", "count(*)"),
            ]
        );
    }

    #[test]
    fn sql_may_contain_delimiter() {
        assert_eq!(
            parse_pairs("q###SELECT '###' FROM t"),
            vec![SqlPair::new("q", "SELECT '###' FROM t")]
        );
    }

    #[test]
    fn backfill_covers_first_three_columns() {
        let pairs = backfill(&orders());
        assert_eq!(pairs.len(), 6);
        assert_eq!(
            pairs[3],
            SqlPair::new("查询orders表的id字段", "SELECT `id` FROM `shop`.`orders` LIMIT 10")
        );
        assert!(!pairs.iter().any(|p| p.sql.contains("created_at")));
    }

    #[test]
    fn reduced_set_adds_second_phrasing() {
        let pairs = reduced(&orders());
        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[3].question, "从orders表查询前10条数据");
        assert_eq!(pairs[3].sql, pairs[0].sql);
    }

    #[test]
    fn prompt_describes_tables() {
        let prompt = build_prompt(&[orders()], 15, DiversityLevel::High);
        assert!(prompt.contains("数据库: shop\n表: orders\n字段 (4个): id (int), total (decimal)"));
        assert!(prompt.contains("请生成15个"));
        assert!(prompt.contains("多样性要求：高级别"));
    }

    #[tokio::test]
    async fn tops_up_with_templates_without_duplicates() {
        let oracle = ScriptedOracle::new().with_completion(
            "查询orders表的所有数据###SELECT * FROM `shop`.`orders` LIMIT 10\n\
             按金额排序###SELECT * FROM `shop`.`orders` ORDER BY total DESC",
        );
        let pairs = PairSynthesizer::new()
            .synthesize(&oracle, &[orders()], 5, DiversityLevel::High)
            .await;

        assert_eq!(pairs.len(), 5);
        assert_eq!(pairs[1].question, "按金额排序");
        let unique: HashSet<_> = pairs.iter().collect();
        assert_eq!(unique.len(), pairs.len());
        assert_eq!(oracle.completions()[0].options.temperature, 0.7);
        assert_eq!(oracle.completions()[0].options.max_tokens, 2000);
    }

    #[tokio::test]
    async fn never_returns_more_than_requested() {
        let lines: String = (0..30)
            .map(|i| format!("问题{i}###SELECT {i}\n"))
            .collect();
        let oracle = ScriptedOracle::new().with_completion(&lines);
        let pairs = PairSynthesizer::new()
            .synthesize(&oracle, &[orders()], 10, DiversityLevel::Low)
            .await;
        assert_eq!(pairs.len(), 10);
        assert_eq!(oracle.completions()[0].options.temperature, 0.5);
    }

    #[tokio::test]
    async fn unavailable_oracle_uses_reduced_templates() {
        let oracle = ScriptedOracle::new().failing_completion();
        let pairs = PairSynthesizer::new()
            .synthesize(&oracle, &[orders()], 4, DiversityLevel::Medium)
            .await;
        assert_eq!(
            pairs.iter().map(|p| p.question.as_str()).collect::<Vec<_>>(),
            vec![
                "查询orders表的所有数据",
                "查看orders表的字段信息",
                "统计orders表有多少条记录",
                "从orders表查询前10条数据",
            ]
        );
    }

    #[tokio::test]
    async fn reduced_templates_cover_three_tables() {
        let tables: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|t| SynthesisTable {
                database: "shop".into(),
                table: (*t).to_string(),
                columns: Vec::new(),
                column_info: Vec::new(),
            })
            .collect();
        let pairs = PairSynthesizer::new()
            .synthesize(&ScriptedOracle::new(), &tables, 50, DiversityLevel::Medium)
            .await;
        assert_eq!(pairs.len(), 12);
        assert!(!pairs.iter().any(|p| p.sql.contains("`d`")));
    }

    #[tokio::test]
    async fn nothing_selected_yields_nothing() {
        let pairs = PairSynthesizer::new()
            .synthesize(&ScriptedOracle::new(), &[], 5, DiversityLevel::Medium)
            .await;
        assert!(pairs.is_empty());
    }
}
