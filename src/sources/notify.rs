//! Push notifications to a user segment via `POST /api/notify`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::Result;

/// Notification request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Target segment (message category).
    pub category: String,
    /// Notification title.
    pub title: String,
    /// Notification text.
    pub body: String,
    /// Delivery channel hint, e.g. `"push"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_type: Option<String>,
}

impl Notification {
    /// What: Reject incomplete notifications before sending.
    ///
    /// # Errors
    /// - Category, title or body is blank.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("category", &self.category),
            ("title", &self.title),
            ("body", &self.body),
        ] {
            if value.trim().is_empty() {
                return Err(format!("notification {field} must not be empty").into());
            }
        }
        Ok(())
    }
}

/// Server reply to a notification request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
struct NotifyReply {
    /// Whether the send succeeded.
    #[serde(default)]
    success: bool,
    /// Number of recipients.
    #[serde(default)]
    sent_to: u64,
    /// Failure reason.
    #[serde(default)]
    error: Option<String>,
}

/// What: Interpret a notify reply.
///
/// Output:
/// - `Ok(recipients)` when the server reports success.
///
/// # Errors
/// - Non-2xx status, `success: false`, or an unparsable body. The server's
///   `error` text is used when present.
pub fn parse_notify_reply(status: u16, body: &str) -> Result<u64> {
    let reply: NotifyReply = serde_json::from_str(body).unwrap_or_default();
    if (200..300).contains(&status) && reply.success {
        return Ok(reply.sent_to);
    }
    Err(reply
        .error
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| format!("notification failed (HTTP {status})"))
        .into())
}

/// Client for the notify endpoint.
pub struct NotifyClient {
    /// Shared HTTP client.
    client: reqwest::Client,
    /// Absolute notify URL.
    url: String,
}

impl NotifyClient {
    /// What: Create a client posting to `<base_url>/api/notify`.
    ///
    /// # Errors
    /// - The HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: super::build_client(Duration::from_secs(30))?,
            url: format!("{}/api/notify", base_url.trim_end_matches('/')),
        })
    }

    /// What: Send `notification`, returning the recipient count.
    ///
    /// # Errors
    /// - Validation failure, network failure, or a server-side rejection.
    pub async fn send(&self, notification: &Notification) -> Result<u64> {
        notification.validate()?;
        let resp = self
            .client
            .post(&self.url)
            .json(notification)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        match parse_notify_reply(status, &body) {
            Ok(sent_to) => {
                info!(category = %notification.category, sent_to, "notification sent");
                Ok(sent_to)
            }
            Err(e) => {
                warn!(category = %notification.category, status, error = %e, "notification rejected");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(title: &str) -> Notification {
        Notification {
            category: "payment_reminder".into(),
            title: title.into(),
            body: "Your subscription ends soon".into(),
            notification_type: None,
        }
    }

    #[test]
    fn blank_fields_are_rejected() {
        assert!(note("Reminder").validate().is_ok());
        let err = note("  ").validate().expect_err("blank title");
        assert!(err.to_string().contains("title"));
    }

    #[test]
    /// What: Success yields the recipient count; failures carry the server text.
    fn reply_interpretation() {
        assert_eq!(
            parse_notify_reply(200, r#"{"success": true, "sent_to": 42}"#).expect("sent"),
            42
        );
        let err = parse_notify_reply(400, r#"{"error": "Unknown category"}"#).expect_err("400");
        assert_eq!(err.to_string(), "Unknown category");
        let err = parse_notify_reply(200, r#"{"success": false}"#).expect_err("no success");
        assert!(err.to_string().contains("HTTP 200"));
        assert!(parse_notify_reply(502, "<html>").is_err());
    }

    #[test]
    fn body_omits_absent_type() {
        let json = serde_json::to_value(note("Hi")).expect("serialize");
        assert!(json.get("notification_type").is_none());
        assert_eq!(json["category"], "payment_reminder");
    }
}
