//! Failure classification for report requests.
//!
//! The class decides whether a request is retried, what the operator is
//! told, and whether the rows already on screen survive the failure.

use std::fmt;

/// Classified failure of a report request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The client-side timeout elapsed and the call was cancelled.
    Timeout,
    /// Transport-level failure (DNS, connection refused, reset, ...).
    Network(String),
    /// HTTP 5xx.
    Server {
        /// HTTP status code.
        status: u16,
        /// `error` field of the response body, if any.
        message: Option<String>,
    },
    /// HTTP 429.
    RateLimited {
        /// `error` field of the response body, if any.
        message: Option<String>,
    },
    /// HTTP 404.
    NotFound {
        /// `error` field of the response body, if any.
        message: Option<String>,
    },
    /// Any other HTTP 4xx (or unexpected non-2xx) status.
    Client {
        /// HTTP status code.
        status: u16,
        /// `error` field of the response body, if any.
        message: Option<String>,
    },
    /// Rejected before dispatch; never sent.
    InvalidFilter(String),
    /// Body was not JSON or lacked the `rows` array.
    Malformed(String),
}

impl FetchError {
    /// What: Classify a non-2xx reply.
    ///
    /// Inputs:
    /// - `status`: HTTP status code.
    /// - `body`: Raw response body, scanned for `{"error": "..."}`.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = server_error_text(body);
        match status {
            429 => Self::RateLimited { message },
            404 => Self::NotFound { message },
            500..=599 => Self::Server { status, message },
            _ => Self::Client { status, message },
        }
    }

    /// Whether an automatic retry with backoff is attempted.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::Network(_) | Self::Server { .. } | Self::RateLimited { .. }
        )
    }

    /// Whether the displayed result set must be discarded.
    ///
    /// Transient failures keep stale rows visible; failures saying the data
    /// itself is unusable clear them. Pre-flight rejections touch nothing.
    #[must_use]
    pub const fn clears_results(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Client { .. } | Self::Malformed(_)
        )
    }

    /// Operator-facing text. A server-supplied `error` string wins over the default.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Timeout => {
                "The request took longer than expected. Please try again.".to_string()
            }
            Self::Network(_) => {
                "Network error. Please check your internet connection.".to_string()
            }
            Self::Server { message, .. } => message.clone().unwrap_or_else(|| {
                "Our servers are experiencing issues. Please try again later.".to_string()
            }),
            Self::RateLimited { message } => message.clone().unwrap_or_else(|| {
                "Too many requests. Please wait a moment and try again.".to_string()
            }),
            Self::NotFound { message } => message
                .clone()
                .unwrap_or_else(|| "The report service is unavailable.".to_string()),
            Self::Client { status, message } => message
                .clone()
                .unwrap_or_else(|| format!("The request was rejected (HTTP {status}).")),
            Self::InvalidFilter(msg) => msg.clone(),
            Self::Malformed(_) => "Unable to load users. Please try again later.".to_string(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "request timed out"),
            Self::Network(e) => write!(f, "network error: {e}"),
            Self::Server { status, .. } => write!(f, "server error (HTTP {status})"),
            Self::RateLimited { .. } => write!(f, "rate limited (HTTP 429)"),
            Self::NotFound { .. } => write!(f, "endpoint not found (HTTP 404)"),
            Self::Client { status, .. } => write!(f, "request rejected (HTTP {status})"),
            Self::InvalidFilter(msg) => write!(f, "invalid filter: {msg}"),
            Self::Malformed(e) => write!(f, "malformed response: {e}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Extract a non-empty `error` string from a JSON body.
fn server_error_text(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    v.get("error")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Status codes map onto the documented classes with the right retry/clear flags.
    fn classification_table() {
        let cases: [(u16, bool, bool); 6] = [
            (500, true, false),
            (503, true, false),
            (429, true, false),
            (404, false, true),
            (400, false, true),
            (401, false, true),
        ];
        for (status, retryable, clears) in cases {
            let e = FetchError::from_status(status, "");
            assert_eq!(e.is_retryable(), retryable, "retryable for {status}");
            assert_eq!(e.clears_results(), clears, "clears for {status}");
        }
        assert!(FetchError::Timeout.is_retryable());
        assert!(!FetchError::Timeout.clears_results());
        assert!(FetchError::Network("refused".into()).is_retryable());
        assert!(!FetchError::Malformed("x".into()).is_retryable());
        assert!(FetchError::Malformed("x".into()).clears_results());
        let invalid = FetchError::InvalidFilter("bad".into());
        assert!(!invalid.is_retryable());
        assert!(!invalid.clears_results());
    }

    #[test]
    /// What: A server `error` string is surfaced verbatim; otherwise the default text is used.
    fn server_error_text_is_surfaced() {
        let e = FetchError::from_status(500, r#"{"error": "database unreachable"}"#);
        assert_eq!(e.user_message(), "database unreachable");
        let e = FetchError::from_status(500, "<html>oops</html>");
        assert!(e.user_message().contains("servers are experiencing issues"));
        let e = FetchError::from_status(404, r#"{"error": ""}"#);
        assert!(e.user_message().contains("unavailable"));
        assert!(
            FetchError::from_status(429, "{}")
                .user_message()
                .contains("Too many requests")
        );
    }
}
