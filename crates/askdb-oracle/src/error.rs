//! Oracle error types.

use thiserror::Error;

/// Errors from the NL-to-SQL oracle and its training intake.
#[derive(Debug, Error)]
pub enum OracleError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The chat endpoint returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the endpoint.
        status: u16,
        /// Response body.
        message: String,
    },

    /// The endpoint returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// The response body could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// No API key or base URL is configured.
    #[error("oracle is not configured: set oracle.api_key and oracle.base_url")]
    NotConfigured,

    /// The oracle lacks a capability (plan training, raw completion).
    #[error("unsupported by this oracle: {0}")]
    Unsupported(String),

    /// The training intake refused an artifact.
    #[error("training rejected: {0}")]
    Rejected(String),
}
