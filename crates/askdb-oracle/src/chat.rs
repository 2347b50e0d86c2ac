//! OpenAI-compatible `/chat/completions` oracle.
//!
//! Training is in-process: artifacts are kept in memory and the most recent
//! `context_window` of them are replayed into every generation prompt. Nothing
//! survives a restart.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use askdb_config::OracleConfig;
use askdb_core::TrainingArtifact;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::OracleError;
use crate::http::check_response;
use crate::oracle::{CompletionOptions, SqlOracle};
use crate::prompt;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Text of the first choice, trimmed.
fn first_choice_text(body: &str) -> Result<String, OracleError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| OracleError::Parse(e.to_string()))?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| OracleError::Parse("response has no choices".to_string()))?;
    Ok(choice.message.content.unwrap_or_default().trim().to_string())
}

// ---------------------------------------------------------------------------
// ChatOracle
// ---------------------------------------------------------------------------

pub struct ChatOracle {
    http: reqwest::Client,
    config: OracleConfig,
    training: Mutex<Vec<TrainingArtifact>>,
}

impl ChatOracle {
    /// Build a client from configuration. An unconfigured oracle can still be
    /// trained; generation then fails with [`OracleError::NotConfigured`].
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Http`] if the HTTP client cannot be built.
    pub fn new(config: OracleConfig) -> Result<Self, OracleError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("askdb/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            config,
            training: Mutex::new(Vec::new()),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Every artifact trained so far, oldest first.
    #[must_use]
    pub fn training_data(&self) -> Vec<TrainingArtifact> {
        self.store().clone()
    }

    pub fn clear_training_data(&self) {
        self.store().clear();
    }

    /// System prompt for the next generation call.
    #[must_use]
    pub fn build_system_prompt(&self, db_context: Option<&str>) -> String {
        let store = self.store();
        prompt::system_prompt(prompt::recent(&store, self.config.context_window), db_context)
    }

    fn store(&self) -> MutexGuard<'_, Vec<TrainingArtifact>> {
        self.training.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn chat(
        &self,
        system: &str,
        user: &str,
        options: CompletionOptions,
    ) -> Result<String, OracleError> {
        if !self.config.is_configured() {
            return Err(OracleError::NotConfigured);
        }
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };
        let resp = self
            .http
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;
        let body = check_response(resp).await?.text().await?;
        first_choice_text(&body)
    }
}

#[async_trait]
impl SqlOracle for ChatOracle {
    async fn generate_sql(
        &self,
        question: &str,
        db_context: Option<&str>,
    ) -> Result<String, OracleError> {
        let system = self.build_system_prompt(db_context);
        let options = CompletionOptions {
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        match self.chat(&system, question, options).await {
            Ok(text) => Ok(prompt::strip_code_fences(&text)),
            Err(error) => {
                tracing::warn!(model = %self.config.model, %error, "SQL generation failed");
                Err(error)
            }
        }
    }

    async fn train(&self, artifact: &TrainingArtifact) -> Result<(), OracleError> {
        if matches!(artifact, TrainingArtifact::Plan { .. }) {
            return Err(OracleError::Unsupported("plan training".to_string()));
        }
        self.store().push(artifact.clone());
        Ok(())
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        options: CompletionOptions,
    ) -> Result<String, OracleError> {
        self.chat(system, user, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn oracle() -> ChatOracle {
        ChatOracle::new(OracleConfig {
            context_window: 2,
            ..OracleConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn parses_first_choice() {
        let body = r#"{"id":"c1","choices":[
            {"index":0,"message":{"role":"assistant","content":"  SELECT 1  "}}
        ]}"#;
        assert_eq!(first_choice_text(body).unwrap(), "SELECT 1");
    }

    #[test]
    fn null_content_is_empty() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert_eq!(first_choice_text(body).unwrap(), "");
    }

    #[test]
    fn missing_choices_is_parse_error() {
        assert!(matches!(
            first_choice_text(r#"{"choices":[]}"#),
            Err(OracleError::Parse(_))
        ));
        assert!(matches!(first_choice_text("<html>"), Err(OracleError::Parse(_))));
    }

    #[test]
    fn request_serializes_openai_shape() {
        let request = ChatRequest {
            model: "qwen-plus",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "s",
                },
                ChatMessage {
                    role: "user",
                    content: "u",
                },
            ],
            temperature: 0.5,
            max_tokens: 2000,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "model": "qwen-plus",
                "messages": [
                    {"role": "system", "content": "s"},
                    {"role": "user", "content": "u"}
                ],
                "temperature": 0.5,
                "max_tokens": 2000
            })
        );
    }

    #[tokio::test]
    async fn training_is_kept_in_memory() {
        let oracle = oracle();
        oracle.train(&TrainingArtifact::ddl("CREATE TABLE a (id int)")).await.unwrap();
        oracle
            .train(&TrainingArtifact::question_sql("查询表 a", "SELECT * FROM a"))
            .await
            .unwrap();
        assert_eq!(oracle.training_data().len(), 2);
        oracle.clear_training_data();
        assert!(oracle.training_data().is_empty());
    }

    #[tokio::test]
    async fn prompt_uses_context_window() {
        let oracle = oracle();
        for name in ["first", "second", "third"] {
            oracle.train(&TrainingArtifact::documentation(name)).await.unwrap();
        }
        let prompt = oracle.build_system_prompt(None);
        assert!(!prompt.contains("first"));
        assert!(prompt.contains("second"));
        assert!(prompt.contains("third"));
    }

    #[tokio::test]
    async fn plans_are_unsupported() {
        let oracle = oracle();
        assert!(!oracle.supports_plans());
        let err = oracle.train(&TrainingArtifact::plan("scan")).await.unwrap_err();
        assert!(matches!(err, OracleError::Unsupported(_)));
        assert!(oracle.training_data().is_empty());
    }

    #[tokio::test]
    async fn unconfigured_generation_fails_fast() {
        let err = oracle().generate_sql("查询表 a", None).await.unwrap_err();
        assert!(matches!(err, OracleError::NotConfigured));
    }
}
