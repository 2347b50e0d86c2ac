//! `ChatOracle` behind the `SqlOracle` trait object, without network access.

use askdb_config::OracleConfig;
use askdb_core::TrainingArtifact;
use askdb_oracle::prompt::SQL_SYSTEM_PROMPT;
use askdb_oracle::{ChatOracle, CompletionOptions, OracleError, SqlOracle};
use pretty_assertions::assert_eq;

fn unconfigured() -> Box<dyn SqlOracle> {
    Box::new(ChatOracle::new(OracleConfig::default()).unwrap())
}

#[tokio::test]
async fn trains_through_trait_object() {
    let chat = ChatOracle::new(OracleConfig::default()).unwrap();
    let oracle: &dyn SqlOracle = &chat;

    oracle
        .train(&TrainingArtifact::ddl("CREATE TABLE `orders` (`id` int)"))
        .await
        .unwrap();
    oracle
        .train(&TrainingArtifact::question_sql(
            "查询表 orders",
            "SELECT * FROM `shop`.`orders` LIMIT 10",
        ))
        .await
        .unwrap();

    assert_eq!(chat.training_data().len(), 2);
    let prompt = chat.build_system_prompt(Some("shop: orders"));
    assert!(prompt.starts_with(SQL_SYSTEM_PROMPT));
    assert!(prompt.contains("DDL结构:\nCREATE TABLE `orders` (`id` int)"));
    assert!(prompt.contains(
        "示例查询:\n问题: 查询表 orders\nSQL: SELECT * FROM `shop`.`orders` LIMIT 10"
    ));
    assert!(prompt.ends_with("当前数据库上下文:\nshop: orders"));
}

#[tokio::test]
async fn completion_requires_credentials() {
    let err = unconfigured()
        .complete(
            "你是一个专业的SQL查询生成助手。",
            "生成 5 个问题",
            CompletionOptions {
                temperature: 0.7,
                max_tokens: 2000,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, OracleError::NotConfigured));
}

#[test]
fn not_configured_message_names_settings() {
    assert_eq!(
        OracleError::NotConfigured.to_string(),
        "oracle is not configured: set oracle.api_key and oracle.base_url"
    );
}
