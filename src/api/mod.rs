pub mod gamma;
pub mod kalshi;
#[cfg(test)]
pub(crate) mod stub;

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::normalize::DecodeError;

/// Default per-request timeout shared by both platforms.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Shared HTTP client. One connection pool, one timeout.
pub fn http_client(timeout: Duration) -> Result<Client, ApiError> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("predwatch-rs/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Pull the message out of an `{"error": ...}` body.
fn upstream_error(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// GET a URL and return its JSON body.
///
/// An `{"error": ...}` body is `Upstream` regardless of status; any other
/// non-2xx is `Status`.
pub(crate) async fn get_json(
    client: &Client,
    url: &str,
    query: &[(String, String)],
) -> Result<Value, ApiError> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .query(query)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;
    let body = serde_json::from_str::<Value>(&text);

    if let Ok(body) = &body {
        if let Some(message) = upstream_error(body) {
            return Err(ApiError::Upstream(message));
        }
    }

    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    body.map_err(|e| ApiError::Parse(e.to_string()))
}
