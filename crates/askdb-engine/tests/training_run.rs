//! Priority-ordered training sweeps against an in-memory server and a
//! scripted oracle.

use std::sync::Arc;

use askdb_catalog::refresh;
use askdb_catalog::test_support::FakeIntrospector;
use askdb_config::TrainingConfig;
use askdb_core::{PrioritySet, SchemaCatalog, TrainingArtifact, TrainingKind};
use askdb_engine::{PriorityOrderedTrainer, TrainingCorpusManager};
use askdb_oracle::test_support::ScriptedOracle;
use pretty_assertions::assert_eq;

fn shop() -> FakeIntrospector {
    FakeIntrospector::new()
        .with_table("shop", "orders", &[("id", "int"), ("total", "decimal")])
        .with_table("shop", "items", &[])
        .with_ddl("shop", "orders", "CREATE TABLE `orders` (`id` int, `total` decimal)")
}

async fn catalog(introspector: &FakeIntrospector) -> SchemaCatalog {
    refresh(introspector, "db.local").await.unwrap()
}

fn corpus(oracle: &Arc<ScriptedOracle>) -> TrainingCorpusManager {
    TrainingCorpusManager::new(Arc::<ScriptedOracle>::clone(oracle), &TrainingConfig::default())
}

#[tokio::test]
async fn absent_ddl_is_skipped_silently() {
    let introspector = shop();
    let catalog = catalog(&introspector).await;
    let oracle = Arc::new(ScriptedOracle::new());
    let mut corpus = corpus(&oracle);
    let mut trainer = PriorityOrderedTrainer::new(10);

    let result = trainer
        .train_all(&catalog, &PrioritySet::new(), &introspector, &mut corpus)
        .await;

    assert!(result.success);
    assert_eq!(result.tables_trained, 2);
    assert_eq!(result.databases_trained, 1);
    assert!(result.errors.is_empty());
    assert_eq!(corpus.count(TrainingKind::Ddl), 1);
    assert!(trainer.is_trained("shop", "orders"));
    assert!(trainer.is_trained("shop", "items"));
}

#[tokio::test]
async fn table_artifacts_follow_fixed_sequence() {
    let introspector = shop();
    let catalog = catalog(&introspector).await;
    let oracle = Arc::new(ScriptedOracle::new());
    let mut corpus = corpus(&oracle);
    let priority: PrioritySet = ["shop"].into_iter().collect();

    PriorityOrderedTrainer::new(10)
        .train_all(&catalog, &priority, &introspector, &mut corpus)
        .await;

    let trained = oracle.trained();
    assert_eq!(
        trained[..5],
        [
            TrainingArtifact::ddl("CREATE TABLE `orders` (`id` int, `total` decimal)"),
            TrainingArtifact::question_sql(
                "查询表 orders",
                "SELECT * FROM `shop`.`orders` LIMIT 10"
            ),
            TrainingArtifact::question_sql("查看表 orders 的详情", "DESCRIBE `shop`.`orders`"),
            TrainingArtifact::question_sql(
                "帮我查 orders 表",
                "SELECT * FROM `shop`.`orders` LIMIT 10"
            ),
            TrainingArtifact::documentation(
                "数据库 shop （优先数据库）中的表 orders 包含以下字段: id (int), total (decimal)"
            ),
        ]
    );
    // `items` has no columns: three pairs, no description.
    assert_eq!(trained[5..8].iter().filter(|a| a.kind() == TrainingKind::QuestionSql).count(), 3);
    assert_eq!(
        trained.last(),
        Some(&TrainingArtifact::documentation(
            "数据库 shop （优先数据库）包含以下表: orders, items"
        ))
    );
    assert_eq!(trained.len(), 9);
}

#[tokio::test]
async fn priority_databases_train_first() {
    let introspector = FakeIntrospector::new()
        .with_table("crm", "users", &[("id", "bigint")])
        .with_table("shop", "orders", &[("id", "int")])
        .with_table("logs", "events", &[("id", "bigint")]);
    let catalog = catalog(&introspector).await;
    let oracle = Arc::new(ScriptedOracle::new());
    let mut corpus = corpus(&oracle);
    let priority: PrioritySet = ["logs", "shop"].into_iter().collect();

    PriorityOrderedTrainer::new(10)
        .train_all(&catalog, &priority, &introspector, &mut corpus)
        .await;

    let mut order: Vec<String> = Vec::new();
    for record in corpus.history() {
        let db = record.metadata.database.clone().unwrap();
        if order.last() != Some(&db) {
            order.push(db);
        }
    }
    assert_eq!(order, vec!["shop", "logs", "crm"]);
    assert!(
        corpus
            .history()
            .filter(|r| r.metadata.database.as_deref() == Some("crm"))
            .all(|r| !r.metadata.is_priority())
    );
}

#[tokio::test]
async fn summary_failure_is_collected_and_run_completes() {
    let introspector = shop();
    let catalog = catalog(&introspector).await;
    let oracle = Arc::new(ScriptedOracle::new().reject_containing("包含以下表"));
    let mut corpus = corpus(&oracle);

    let result = PriorityOrderedTrainer::new(10)
        .train_all(&catalog, &PrioritySet::new(), &introspector, &mut corpus)
        .await;

    assert!(result.success);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("database shop: "));
    assert_eq!(result.tables_trained, 2);
    assert_eq!(result.databases_trained, 0);
}

#[tokio::test]
async fn artifact_failures_do_not_stop_the_sweep() {
    let introspector = shop();
    let catalog = catalog(&introspector).await;
    let oracle = Arc::new(ScriptedOracle::new().reject_kind(TrainingKind::QuestionSql));
    let mut corpus = corpus(&oracle);
    let mut trainer = PriorityOrderedTrainer::new(10);

    let result = trainer
        .train_all(&catalog, &PrioritySet::new(), &introspector, &mut corpus)
        .await;

    assert_eq!(result.errors.len(), 6);
    assert!(result.errors[0].starts_with("table shop.orders: "));
    assert!(result.errors[5].starts_with("table shop.items: "));
    assert_eq!(result.tables_trained, 2);
    assert_eq!(trainer.trained_items().len(), 2);
    assert_eq!(corpus.count(TrainingKind::QuestionSql), 0);
}

#[tokio::test]
async fn empty_catalog_fails_the_run() {
    let oracle = Arc::new(ScriptedOracle::new());
    let mut corpus = corpus(&oracle);

    let result = PriorityOrderedTrainer::new(10)
        .train_all(
            &SchemaCatalog::new("db.local"),
            &PrioritySet::new(),
            &FakeIntrospector::new(),
            &mut corpus,
        )
        .await;

    assert!(!result.success);
    assert_eq!(result.errors, vec!["no database information"]);
    assert!(oracle.trained().is_empty());
}
