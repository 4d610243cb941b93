//! HTTP seam for the report endpoint.

use std::future::Future;
use std::time::Duration;

use reqwest::Url;
use tracing::debug;

use super::error::FetchError;

/// Path of the inactive-paid-users report relative to the API base.
pub const INACTIVE_USERS_PATH: &str = "/reports/inactive-paid-users";

/// Status and body of a completed HTTP exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
}

impl HttpReply {
    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Something that can perform the report `GET`.
///
/// Implementations only move bytes; classification, timeout, retry and
/// caching belong to the orchestrator.
pub trait ReportTransport: Send + Sync + 'static {
    /// Issue one `GET` with the given query parameters.
    fn fetch_report(
        &self,
        query: Vec<(&'static str, String)>,
    ) -> impl Future<Output = Result<HttpReply, FetchError>> + Send;
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    /// Shared client with connection pooling.
    client: reqwest::Client,
    /// Absolute URL of the report endpoint.
    endpoint: Url,
}

impl HttpTransport {
    /// What: Build a transport for `base_url` + [`INACTIVE_USERS_PATH`].
    ///
    /// # Errors
    /// - `base_url` does not form a valid absolute URL.
    /// - The HTTP client cannot be constructed.
    pub fn new(base_url: &str) -> crate::sources::Result<Self> {
        let endpoint = Url::parse(&format!(
            "{}{INACTIVE_USERS_PATH}",
            base_url.trim_end_matches('/')
        ))?;
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .user_agent(crate::sources::user_agent())
            .build()?;
        Ok(Self { client, endpoint })
    }
}

impl ReportTransport for HttpTransport {
    fn fetch_report(
        &self,
        query: Vec<(&'static str, String)>,
    ) -> impl Future<Output = Result<HttpReply, FetchError>> + Send {
        async move {
            let mut url = self.endpoint.clone();
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
            debug!(url = %url, "requesting inactive users report");
            let resp = self.client.get(url).send().await.map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Network(e.to_string())
                }
            })?;
            let status = resp.status().as_u16();
            let body = resp
                .text()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;
            Ok(HttpReply { status, body })
        }
    }
}
