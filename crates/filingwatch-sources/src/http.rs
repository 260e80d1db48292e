//! Shared HTTP plumbing: client construction, throttled GETs, and status mapping.

use std::time::Duration;

use filingwatch_core::ProviderError;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::throttle::RateLimiter;

/// Build a `reqwest` client with a fixed user agent and per-request deadline.
pub(crate) fn build_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| ProviderError::Config(format!("failed to build HTTP client: {e}")))
}

/// Throttled GET returning the response body.
///
/// `url` is logged; `query` is not, since it may carry an API key.
pub(crate) async fn get_text(
    client: &reqwest::Client,
    limiter: &RateLimiter,
    url: &str,
    query: &[(&str, String)],
) -> Result<String, ProviderError> {
    send(client, limiter, url, query)
        .await?
        .text()
        .await
        .map_err(|e| ProviderError::Transport(format!("{url}: reading body: {e}")))
}

/// Throttled GET for binary bodies (archives).
#[cfg(feature = "dart")]
pub(crate) async fn get_bytes(
    client: &reqwest::Client,
    limiter: &RateLimiter,
    url: &str,
    query: &[(&str, String)],
) -> Result<Vec<u8>, ProviderError> {
    let body = send(client, limiter, url, query)
        .await?
        .bytes()
        .await
        .map_err(|e| ProviderError::Transport(format!("{url}: reading body: {e}")))?;
    Ok(body.to_vec())
}

async fn send(
    client: &reqwest::Client,
    limiter: &RateLimiter,
    url: &str,
    query: &[(&str, String)],
) -> Result<reqwest::Response, ProviderError> {
    limiter.acquire().await;
    debug!(url, "GET");

    let resp = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| ProviderError::Transport(format!("{url}: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(classify_status(status.as_u16(), url, &body));
    }
    Ok(resp)
}

/// Decode a JSON body, reporting failures as parse errors.
pub(crate) fn decode<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::Parse(format!("{what}: {e}")))
}

/// Map a non-success HTTP status to the provider error taxonomy.
pub(crate) fn classify_status(status: u16, url: &str, body: &str) -> ProviderError {
    let snippet: String = body.chars().take(200).collect();
    match status {
        401 | 403 => ProviderError::Auth(format!("{url} returned {status}: {snippet}")),
        404 => ProviderError::NotFound(url.to_string()),
        _ => ProviderError::Transport(format!("{url} returned {status}: {snippet}")),
    }
}
