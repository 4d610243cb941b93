//! Message templates ("reminders") and automation rules behind the
//! `excel-sync` edge function.
//!
//! Every action is a JSON `POST` answered with `{success, data, error}`.
//! Nothing here is cached or retried; writes are followed by a fresh read
//! at the call site when the caller needs the updated list.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use super::Result;

/// Stored message template.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Row id.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    /// `<category_slug>_<n>` identifier.
    #[serde(default)]
    pub reminder_id: String,
    /// Owning category name.
    #[serde(default)]
    pub category: String,
    /// Template title.
    #[serde(default)]
    pub title: String,
    /// Template text.
    #[serde(default)]
    pub message: String,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Last update time.
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Message inside a [`PredefinedCategory`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CategoryMessage {
    /// Numeric suffix of the reminder id.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Text.
    pub content: String,
}

/// Category with its messages, as listed by `get_categories`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PredefinedCategory {
    /// Slug of the name.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Icon identifier.
    #[serde(default)]
    pub icon: String,
    /// Messages in the category.
    #[serde(default)]
    pub messages: Vec<CategoryMessage>,
}

/// Whether an automation rule runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    /// Rule fires.
    Active,
    /// Rule is suspended.
    Paused,
}

impl RuleStatus {
    /// The opposite status.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Paused,
            Self::Paused => Self::Active,
        }
    }

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
        }
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RuleStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" | "on" => Ok(Self::Active),
            "paused" | "off" => Ok(Self::Paused),
            other => Err(format!("unknown rule status: {other}")),
        }
    }
}

/// Automation rule in display form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutomationRule {
    /// Numeric id (position + 1 when the stored id is not numeric).
    pub id: u64,
    /// Rule name.
    pub name: String,
    /// Trigger condition text.
    pub trigger: String,
    /// Action text.
    pub action: String,
    /// Current status.
    pub status: RuleStatus,
    /// Category whose messages the rule sends.
    pub category: String,
    /// Creation time.
    pub created_at: Option<String>,
    /// Last update time.
    pub updated_at: Option<String>,
}

/// Rule as stored by the edge function.
#[derive(Clone, Debug, Deserialize)]
struct StoredRule {
    /// Stored id (string or number).
    #[serde(default)]
    id: Value,
    /// Rule name.
    #[serde(default)]
    name: String,
    /// Trigger condition.
    #[serde(default)]
    trigger_condition: String,
    /// Action text.
    #[serde(default)]
    action: String,
    /// Status.
    status: RuleStatus,
    /// Category.
    #[serde(default)]
    category: String,
    /// Creation time.
    #[serde(default)]
    created_at: Option<String>,
    /// Last update time.
    #[serde(default)]
    updated_at: Option<String>,
}

/// Result of the server-side smart selection.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartSelection {
    /// The rule as stored.
    pub rule: Value,
    /// Chosen template.
    pub selected_message: Reminder,
    /// Number of candidate templates.
    pub total_messages: usize,
}

/// Response envelope shared by every action.
#[derive(Debug, Deserialize)]
struct Envelope {
    /// Whether the action succeeded.
    #[serde(default)]
    success: bool,
    /// Payload on success.
    #[serde(default)]
    data: Option<Value>,
    /// Reason on failure.
    #[serde(default)]
    error: Option<String>,
}

/// Accept a JSON string or number as a `String`.
fn string_or_number<'de, D>(de: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// What: Unwrap an `excel-sync` reply.
///
/// Output:
/// - The `data` payload (`Value::Null` when absent).
///
/// # Errors
/// - Unparsable body, or `success` false (server `error` text when present).
pub fn unwrap_envelope(status: u16, body: &str) -> Result<Value> {
    let env: Envelope = serde_json::from_str(body)
        .map_err(|e| format!("invalid excel-sync response (HTTP {status}): {e}"))?;
    if env.success {
        Ok(env.data.unwrap_or(Value::Null))
    } else {
        Err(env
            .error
            .unwrap_or_else(|| format!("excel-sync request failed (HTTP {status})"))
            .into())
    }
}

/// What: Convert stored rules into display rules.
///
/// Details:
/// - `trigger_condition` becomes `trigger`.
/// - Ids that are not non-negative integers (or numeric strings) become
///   their 1-based position.
///
/// # Errors
/// - `data` is not an array of rules.
pub fn normalize_rules(data: Value) -> Result<Vec<AutomationRule>> {
    let stored: Vec<StoredRule> = serde_json::from_value(data)?;
    Ok(stored
        .into_iter()
        .enumerate()
        .map(|(idx, r)| {
            let fallback = u64::try_from(idx).unwrap_or(u64::MAX).saturating_add(1);
            let id = match &r.id {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse::<u64>().ok(),
                _ => None,
            }
            .unwrap_or(fallback);
            AutomationRule {
                id,
                name: r.name,
                trigger: r.trigger_condition,
                action: r.action,
                status: r.status,
                category: r.category,
                created_at: r.created_at,
                updated_at: r.updated_at,
            }
        })
        .collect())
}

/// Slug used for category ids: lowercase, whitespace runs become `_`.
#[must_use]
pub fn category_slug(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Client for the `excel-sync` edge function.
pub struct ReminderStore {
    /// Shared HTTP client.
    client: reqwest::Client,
    /// Absolute function URL.
    function_url: String,
    /// Supabase anonymous key.
    anon_key: String,
}

impl ReminderStore {
    /// What: Create a client for the project at `supabase_url`.
    ///
    /// # Errors
    /// - `supabase_url` is empty or the HTTP client cannot be built.
    pub fn new(supabase_url: &str, anon_key: &str) -> Result<Self> {
        let base = supabase_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err("supabase_url is not configured".into());
        }
        Ok(Self {
            client: super::build_client(Duration::from_secs(30))?,
            function_url: format!("{base}/functions/v1/excel-sync"),
            anon_key: anon_key.to_string(),
        })
    }

    /// Invoke `action` with `payload`, returning the unwrapped `data`.
    async fn invoke(&self, action: &str, mut payload: Value) -> Result<Value> {
        if let Value::Object(map) = &mut payload {
            map.insert("action".to_string(), Value::String(action.to_string()));
        }
        debug!(action, "invoking excel-sync");
        let mut req = self
            .client
            .post(format!("{}?action={action}", self.function_url))
            .json(&payload);
        if !self.anon_key.is_empty() {
            req = req
                .header("apikey", &self.anon_key)
                .bearer_auth(&self.anon_key);
        }
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        unwrap_envelope(status, &body)
    }

    /// What: List categories with their messages.
    ///
    /// # Errors
    /// - Request failure or unexpected payload.
    pub async fn categories(&self) -> Result<Vec<PredefinedCategory>> {
        let data = self.invoke("get_categories", json!({})).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// What: List automation rules in display form.
    ///
    /// # Errors
    /// - Request failure or unexpected payload.
    pub async fn automation_rules(&self) -> Result<Vec<AutomationRule>> {
        let data = self.invoke("get_automation_rules", json!({})).await?;
        normalize_rules(data)
    }

    /// What: Add a template to `category`.
    ///
    /// # Errors
    /// - Blank fields, request failure, or unexpected payload.
    pub async fn add_reminder(&self, category: &str, title: &str, message: &str) -> Result<Reminder> {
        require_non_blank(&[("category", category), ("title", title), ("message", message)])?;
        let data = self
            .invoke(
                "add_reminder",
                json!({ "category": category, "title": title, "message": message }),
            )
            .await?;
        let reminder: Reminder = serde_json::from_value(data)?;
        info!(reminder_id = %reminder.reminder_id, category, "reminder added");
        Ok(reminder)
    }

    /// What: Change the title and text of template `id`.
    ///
    /// # Errors
    /// - Blank fields, request failure, or unexpected payload.
    pub async fn update_reminder(&self, id: &str, title: &str, message: &str) -> Result<Reminder> {
        require_non_blank(&[("id", id), ("title", title), ("message", message)])?;
        let data = self
            .invoke(
                "update_reminder",
                json!({ "id": id, "title": title, "message": message }),
            )
            .await?;
        info!(id, "reminder updated");
        Ok(serde_json::from_value(data)?)
    }

    /// What: Create a category (stored as a placeholder template).
    ///
    /// # Errors
    /// - Blank name, existing category, request failure.
    pub async fn add_category(&self, name: &str) -> Result<Reminder> {
        require_non_blank(&[("name", name)])?;
        let data = self.invoke("add_category", json!({ "name": name })).await?;
        info!(name, slug = %category_slug(name), "category added");
        Ok(serde_json::from_value(data)?)
    }

    /// What: Set the status of rule `id`.
    ///
    /// # Errors
    /// - Request failure.
    pub async fn toggle_rule(&self, id: &str, status: RuleStatus) -> Result<Value> {
        let data = self
            .invoke("toggle_rule", json!({ "id": id, "status": status }))
            .await?;
        info!(id, %status, "automation rule toggled");
        Ok(data)
    }

    /// What: Ask the server to pick a template for an active rule.
    ///
    /// # Errors
    /// - Rule not active, empty category, request failure.
    pub async fn smart_message_selection(&self, rule_id: &str, category: &str) -> Result<SmartSelection> {
        let data = self
            .invoke(
                "smart_message_selection",
                json!({ "ruleId": rule_id, "category": category }),
            )
            .await?;
        Ok(serde_json::from_value(data)?)
    }
}

/// Reject blank required fields.
fn require_non_blank(fields: &[(&str, &str)]) -> Result<()> {
    for (name, value) in fields {
        if value.trim().is_empty() {
            return Err(format!("{name} must not be empty").into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Stored rules are renamed and non-numeric ids fall back to position.
    fn rules_are_normalized() {
        let data = json!([
            {"id": "7", "name": "Expiry", "trigger_condition": "subscription_end < 5d", "action": "send", "status": "active", "category": "Payment"},
            {"id": "b3f1c2", "name": "Welcome", "trigger_condition": "registered", "action": "send", "status": "paused", "category": "Onboarding"},
            {"id": 12, "name": "Winback", "trigger_condition": "inactive > 15d", "action": "send", "status": "active", "category": "Winback", "created_at": "2026-01-01"}
        ]);
        let rules = normalize_rules(data).expect("rules");
        assert_eq!(rules.iter().map(|r| r.id).collect::<Vec<_>>(), vec![7, 2, 12]);
        assert_eq!(rules[0].trigger, "subscription_end < 5d");
        assert_eq!(rules[1].status, RuleStatus::Paused);
        assert_eq!(rules[2].created_at.as_deref(), Some("2026-01-01"));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let data = json!([{ "id": 1, "status": "deleted" }]);
        assert!(normalize_rules(data).is_err());
    }

    #[test]
    /// What: The envelope yields data on success and the server's text on failure.
    fn envelope_handling() {
        let data = unwrap_envelope(200, r#"{"success": true, "data": [1, 2]}"#).expect("ok");
        assert_eq!(data, json!([1, 2]));
        let err = unwrap_envelope(200, r#"{"success": false, "error": "Category already exists"}"#)
            .expect_err("exists");
        assert_eq!(err.to_string(), "Category already exists");
        let err = unwrap_envelope(400, r#"{"success": false}"#).expect_err("bare failure");
        assert!(err.to_string().contains("HTTP 400"));
        assert!(unwrap_envelope(502, "Bad Gateway").is_err());
    }

    #[test]
    fn categories_and_reminders_deserialize() {
        let cats: Vec<PredefinedCategory> = serde_json::from_value(json!([
            {"id": "payment_reminder", "name": "Payment Reminder", "icon": "message-circle",
             "messages": [{"id": 1, "title": "Due soon", "content": "Lipa sasa"}]}
        ]))
        .expect("categories");
        assert_eq!(cats[0].messages[0].content, "Lipa sasa");

        let r: Reminder = serde_json::from_value(json!({
            "id": 42, "reminder_id": "payment_reminder_1", "category": "Payment Reminder",
            "title": "Due soon", "message": "Lipa sasa"
        }))
        .expect("reminder");
        assert_eq!(r.id, "42");
    }

    #[test]
    fn slug_and_status_helpers() {
        assert_eq!(category_slug("  Payment   Reminder "), "payment_reminder");
        assert_eq!(RuleStatus::Active.toggled(), RuleStatus::Paused);
        assert_eq!("Paused".parse::<RuleStatus>(), Ok(RuleStatus::Paused));
        assert!("gone".parse::<RuleStatus>().is_err());
        assert_eq!(json!({ "status": RuleStatus::Active }), json!({ "status": "active" }));
    }

    #[test]
    fn store_requires_url() {
        assert!(ReminderStore::new("  ", "key").is_err());
    }
}
