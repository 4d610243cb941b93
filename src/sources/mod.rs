//! Remote data sources: the inactive-users report, metrics, notifications
//! and the reminder store.

use std::time::Duration;

pub mod inactive;
pub mod metrics;
pub mod notify;
pub mod reminders;

/// Result type alias for source operations outside the report orchestrator.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// `User-Agent` sent with every request.
#[must_use]
pub fn user_agent() -> String {
    format!("operator-engine/{}", env!("CARGO_PKG_VERSION"))
}

/// What: Build an HTTP client with the shared defaults.
///
/// Inputs:
/// - `timeout`: Whole-request timeout.
///
/// # Errors
/// - The TLS backend cannot be initialised.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(15))
        .timeout(timeout)
        .user_agent(user_agent())
        .build()?)
}

/// What: `GET` a URL and return the body of a 2xx reply.
///
/// # Errors
/// - Network failure, or a non-2xx status (the body's `error` text is used
///   when present).
pub(crate) async fn get_text(client: &reqwest::Client, url: &str) -> Result<String> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    let body = resp.text().await?;
    if status.is_success() {
        return Ok(body);
    }
    let server_error = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string));
    Err(server_error
        .unwrap_or_else(|| format!("HTTP {} from {url}", status.as_u16()))
        .into())
}
