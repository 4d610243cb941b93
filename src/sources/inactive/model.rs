//! Report rows and response parsing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::error::FetchError;

/// One row of the inactive-paid-users report.
///
/// Values are opaque strings from the source system; nothing beyond
/// display formatting is applied.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Business name.
    #[serde(rename = "Business Name", default)]
    pub business_name: String,
    /// Registration date as reported.
    #[serde(rename = "Registered", default)]
    pub registered: String,
    /// Subscription end date as reported.
    #[serde(rename = "Subscription end", default)]
    pub subscription_end: String,
    /// Phone number as reported.
    #[serde(rename = "Phone Number", default)]
    pub phone_number: String,
}

/// Full, unpaginated result for one filter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultSet {
    /// Every row returned by the server.
    pub rows: Vec<UserRecord>,
    /// Server-reported total (falls back to `rows.len()`).
    pub total_count: usize,
    /// Server's `has_more` hint; informational only.
    pub has_more: bool,
}

/// What: Parse a 2xx report body into a [`ResultSet`].
///
/// Inputs:
/// - `body`: Raw JSON response text.
///
/// Output:
/// - `Ok(ResultSet)`; `Err(FetchError::Malformed)` when the body is not JSON,
///   has no `rows` array, or a row is not an object.
///
/// Details:
/// - Total is taken from `total`, else `count`, else the row count. The last
///   case logs a warning because the server normally reports one of them.
///
/// # Errors
/// - See Output.
pub fn parse_report(body: &str) -> Result<ResultSet, FetchError> {
    let v: Value =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    let rows_value = v
        .get("rows")
        .filter(|r| r.is_array())
        .cloned()
        .ok_or_else(|| FetchError::Malformed("missing `rows` array".to_string()))?;
    let rows: Vec<UserRecord> = serde_json::from_value(rows_value)
        .map_err(|e| FetchError::Malformed(format!("bad row: {e}")))?;

    let explicit_total = v
        .get("total")
        .and_then(Value::as_u64)
        .or_else(|| v.get("count").and_then(Value::as_u64));
    let total_count = explicit_total.map_or_else(
        || {
            warn!(
                rows = rows.len(),
                "report response has neither `total` nor `count`; using row count"
            );
            rows.len()
        },
        |t| usize::try_from(t).unwrap_or(usize::MAX),
    );
    let has_more = v.get("has_more").and_then(Value::as_bool).unwrap_or(false);

    Ok(ResultSet {
        rows,
        total_count,
        has_more,
    })
}
