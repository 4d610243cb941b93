//! Dashboard metrics from `GET /api/end{n}` and the API health check.

use std::time::Duration;

use futures::future::join_all;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::Result;

/// Daily signup count in a trend metric.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TrendPoint {
    /// Day, as reported.
    pub date: String,
    /// Signups on that day.
    pub signups: u64,
}

/// One metric reading.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MetricReading {
    /// Metric title.
    pub metric: String,
    /// Scalar value: a number or a preformatted string such as `"18.5%"`.
    #[serde(default)]
    pub value: Option<Value>,
    /// Longer explanation.
    #[serde(default)]
    pub description: Option<String>,
    /// Unit suffix such as `"/10"`.
    #[serde(default)]
    pub unit: Option<String>,
    /// Per-day series for trend metrics.
    #[serde(default)]
    pub trend: Vec<TrendPoint>,
    /// Server timestamp.
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl MetricReading {
    /// Value formatted for display, `N/A` when absent.
    #[must_use]
    pub fn display_value(&self) -> String {
        let base = match &self.value {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => return "N/A".to_string(),
            Some(v) => v.to_string(),
        };
        match &self.unit {
            Some(unit) => format!("{base}{unit}"),
            None => base,
        }
    }
}

/// `GET /api/health` payload.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    /// `"healthy"` when all is well.
    pub status: String,
    /// Server timestamp.
    #[serde(default)]
    pub timestamp: String,
    /// API version.
    #[serde(default)]
    pub version: String,
}

/// What: Parse a metric body.
///
/// # Errors
/// - Body is not JSON, carries an `error` field, or lacks `metric`.
pub fn parse_metric(body: &str) -> Result<MetricReading> {
    let v: Value = serde_json::from_str(body)?;
    if let Some(err) = v.get("error").and_then(Value::as_str) {
        return Err(err.to_string().into());
    }
    Ok(serde_json::from_value(v)?)
}

/// Client for the metrics API.
pub struct MetricsClient {
    /// Shared HTTP client.
    client: reqwest::Client,
    /// API base URL without trailing slash.
    base_url: String,
}

impl MetricsClient {
    /// What: Create a client for `base_url`.
    ///
    /// # Errors
    /// - The HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: super::build_client(Duration::from_secs(30))?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of metric endpoint `n`.
    #[must_use]
    pub fn metric_url(&self, n: u32) -> String {
        format!("{}/api/end{n}", self.base_url)
    }

    /// What: Fetch metric endpoint `n`.
    ///
    /// # Errors
    /// - Network failure, non-2xx status, or an unparsable body.
    pub async fn fetch_metric(&self, n: u32) -> Result<MetricReading> {
        let url = self.metric_url(n);
        let body = super::get_text(&self.client, &url).await?;
        parse_metric(&body)
    }

    /// What: Fetch every endpoint in `endpoints` concurrently.
    ///
    /// Output:
    /// - `(endpoint, result)` in input order; one failure never affects the others.
    ///
    /// Details:
    /// - No caching or retry; a dashboard refresh simply calls this again.
    pub async fn fetch_dashboard(&self, endpoints: &[u32]) -> Vec<(u32, Result<MetricReading>)> {
        let results = join_all(endpoints.iter().map(|&n| async move {
            let res = self.fetch_metric(n).await;
            if let Err(e) = &res {
                warn!(endpoint = n, error = %e, "failed to fetch metric");
            }
            (n, res)
        }))
        .await;
        let ok = results.iter().filter(|(_, r)| r.is_ok()).count();
        info!(requested = endpoints.len(), ok, "dashboard metrics refreshed");
        results
    }

    /// What: Query `GET /api/health`.
    ///
    /// # Errors
    /// - Network failure, non-2xx status, or an unparsable body.
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = format!("{}/api/health", self.base_url);
        let body = super::get_text(&self.client, &url).await?;
        let status: HealthStatus = serde_json::from_str(&body)?;
        debug!(status = %status.status, version = %status.version, "health check");
        Ok(status)
    }
}
