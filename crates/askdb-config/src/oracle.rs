//! NL-to-SQL oracle (OpenAI-compatible chat endpoint) configuration.

use serde::{Deserialize, Serialize};

fn default_model() -> String {
    "qwen-plus".to_string()
}

const fn default_temperature() -> f32 {
    0.1
}

const fn default_max_tokens() -> u32 {
    1000
}

/// Number of recent training artifacts sent as in-context examples.
const fn default_context_window() -> usize {
    10
}

const fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OracleConfig {
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the chat API, e.g. `https://dashscope.aliyuncs.com/compatible-mode/v1`.
    #[serde(default)]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature for SQL generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_context_window")]
    pub context_window: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: String::new(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            context_window: default_context_window(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl OracleConfig {
    /// Check if the oracle has an endpoint and credentials.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.base_url.is_empty()
    }

    /// Chat completions endpoint derived from `base_url`.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = OracleConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.model, "qwen-plus");
        assert_eq!(config.max_tokens, 1000);
        assert_eq!(config.context_window, 10);
    }

    #[test]
    fn configured_when_key_and_url_set() {
        let config = OracleConfig {
            api_key: "sk-123".into(),
            base_url: "https://example.test/v1".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
    }

    #[test]
    fn completions_url_trims_trailing_slash() {
        let config = OracleConfig {
            base_url: "https://example.test/v1/".into(),
            ..Default::default()
        };
        assert_eq!(config.completions_url(), "https://example.test/v1/chat/completions");
    }
}
