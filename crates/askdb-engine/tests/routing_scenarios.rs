//! Question routing end to end: exact table matches, oracle fallback, and
//! execution of the resolved SQL.

use std::sync::Arc;

use askdb_catalog::RowSet;
use askdb_catalog::test_support::FakeIntrospector;
use askdb_config::RoutingConfig;
use askdb_core::{
    DatabaseEntry, MatchType, PrioritySet, QueryResolution, SchemaCatalog, TableEntry,
};
use askdb_engine::{EngineError, QueryExecutor, QueryRouter};
use askdb_oracle::test_support::ScriptedOracle;
use pretty_assertions::assert_eq;
use serde_json::json;

fn catalog() -> SchemaCatalog {
    SchemaCatalog::new("db.local")
        .with_database(
            DatabaseEntry::new("shop")
                .with_table("orders", TableEntry::from_pairs([("id", "int")]))
                .with_table("items", TableEntry::from_pairs([("sku", "varchar(32)")])),
        )
        .unwrap()
        .with_database(DatabaseEntry::new("crm").with_table("users", TableEntry::empty()))
        .unwrap()
        .with_database(DatabaseEntry::new("logs").with_table("events", TableEntry::empty()))
        .unwrap()
        .with_database(DatabaseEntry::new("hr").with_table("staff", TableEntry::empty()))
        .unwrap()
}

fn shop_priority() -> PrioritySet {
    ["shop"].into_iter().collect()
}

fn rows(n: usize) -> RowSet {
    RowSet::new(vec!["id".into()], (0..n).map(|i| vec![json!(i)]).collect())
}

#[tokio::test]
async fn exact_table_request() {
    let oracle = Arc::new(ScriptedOracle::new());
    let router = QueryRouter::new(oracle.clone());

    let resolution = router
        .resolve("帮我查 orders 表", &catalog(), &shop_priority())
        .await;

    assert_eq!(
        resolution,
        QueryResolution::exact(
            "shop",
            "orders",
            "SELECT * FROM `shop`.`orders` LIMIT 10".to_string(),
            true,
        )
    );
    assert_eq!(resolution.match_type, Some(MatchType::ExactTable));
    assert!(oracle.questions().is_empty());
}

#[tokio::test]
async fn exact_table_detail_request() {
    let router = QueryRouter::new(Arc::new(ScriptedOracle::new()));
    let resolution = router
        .resolve("orders 表的详情", &catalog(), &shop_priority())
        .await;
    assert_eq!(resolution.sql, "DESCRIBE `shop`.`orders`");
}

#[tokio::test]
async fn exact_table_count_request() {
    let router = QueryRouter::new(Arc::new(ScriptedOracle::new()));
    let resolution = router
        .resolve("users 表有多少条记录", &catalog(), &PrioritySet::new())
        .await;
    assert_eq!(resolution.sql, "SELECT COUNT(*) FROM `crm`.`users`");
    assert!(!resolution.priority_used);
}

#[tokio::test]
async fn generated_sql_reports_used_databases() {
    let oracle = Arc::new(
        ScriptedOracle::new().with_sql("SELECT * FROM `shop`.`orders` JOIN `shop`.`items`"),
    );
    let resolution = QueryRouter::new(oracle.clone())
        .resolve("最近一周的销售额", &catalog(), &shop_priority())
        .await;

    assert!(resolution.success);
    assert_eq!(resolution.match_type, Some(MatchType::VannaGenerated));
    assert_eq!(resolution.used_databases, vec!["shop"]);
    assert!(resolution.priority_used);
    assert_eq!(oracle.questions(), vec![("最近一周的销售额".to_string(), None)]);
}

#[tokio::test]
async fn executes_on_used_databases_with_limit() {
    let introspector = FakeIntrospector::new().with_result("shop", rows(3));
    let config = RoutingConfig::default();
    let resolution = QueryResolution::generated(
        "SELECT * FROM `shop`.`orders` WHERE total > 100;".to_string(),
        vec!["shop".to_string()],
        true,
    );

    let report = QueryExecutor::new(&introspector, &config)
        .execute(&resolution, &catalog(), &shop_priority())
        .await
        .unwrap();

    assert_eq!(report.sql, "SELECT * FROM `shop`.`orders` WHERE total > 100 LIMIT 100;");
    assert_eq!(report.targets, vec!["shop"]);
    assert_eq!(report.priority_rows, 3);
    assert_eq!(report.other_rows, 0);
    assert_eq!(
        introspector.queries(),
        vec![("shop".to_string(), report.sql.clone())]
    );
}

#[tokio::test]
async fn failing_database_does_not_stop_others() {
    let introspector = FakeIntrospector::new()
        .fail_queries("crm")
        .with_result("logs", rows(2));
    let config = RoutingConfig {
        prefer_priority: false,
        ..RoutingConfig::default()
    };
    let resolution = QueryResolution::generated("SELECT 1".to_string(), Vec::new(), false);

    let report = QueryExecutor::new(&introspector, &config)
        .execute(&resolution, &catalog(), &PrioritySet::new())
        .await
        .unwrap();

    // No databases named anywhere: the first three catalogued ones are tried.
    assert_eq!(report.targets, vec!["shop", "crm", "logs"]);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("crm: "));
    // `shop` answered with no rows and is not listed.
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].database, "logs");
    assert_eq!(report.total_rows(), 2);
}

#[tokio::test]
async fn fallback_prefers_priority_databases() {
    let introspector = FakeIntrospector::new();
    let config = RoutingConfig::default();
    let priority: PrioritySet = ["hr", "logs"].into_iter().collect();
    let resolution = QueryResolution::generated("SELECT NOW()".to_string(), Vec::new(), false);

    let report = QueryExecutor::new(&introspector, &config)
        .execute(&resolution, &catalog(), &priority)
        .await
        .unwrap();

    assert_eq!(report.targets, vec!["logs", "hr"]);
}

#[tokio::test]
async fn failed_resolution_is_not_executed() {
    let introspector = FakeIntrospector::new();
    let config = RoutingConfig::default();
    let err = QueryExecutor::new(&introspector, &config)
        .execute(
            &QueryResolution::failed("SQL generation failed"),
            &catalog(),
            &PrioritySet::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unresolved(_)));
    assert!(introspector.queries().is_empty());
}
