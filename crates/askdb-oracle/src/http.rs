//! Status handling for chat endpoint responses.

use serde::Deserialize;

use crate::error::OracleError;

/// Fallback wait when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// OpenAI-compatible error envelope: `{"error": {"message": "..."}}`.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Pass a successful response through; map 429 and other failures to errors.
///
/// Non-success bodies are reduced to the endpoint's `error.message` when the
/// body has that shape, otherwise kept verbatim.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, OracleError> {
    let status = resp.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(OracleError::RateLimited {
            retry_after_secs: parse_retry_after(&resp),
        });
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(OracleError::Api {
            status: status.as_u16(),
            message: api_error_message(&body),
        });
    }
    Ok(resp)
}

fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map_or_else(|_| body.trim().to_string(), |e| e.error.message)
}
