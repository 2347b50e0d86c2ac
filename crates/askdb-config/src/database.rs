//! Database connection configuration.

use serde::{Deserialize, Serialize};

const fn default_port() -> u16 {
    3306
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_charset() -> String {
    "utf8mb4".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Host discovered when the caller does not name one.
    #[serde(default)]
    pub default_host: String,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Timeout applied when a connection is first established.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_charset")]
    pub charset: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            default_host: String::new(),
            user: String::new(),
            password: String::new(),
            port: default_port(),
            connect_timeout_secs: default_connect_timeout_secs(),
            charset: default_charset(),
        }
    }
}

impl DatabaseConfig {
    /// Check if credentials are present.
    pub fn is_configured(&self) -> bool {
        !self.user.is_empty()
    }
}
