//! Integration tests for the inactive users orchestrator through the public API.
//!
//! Tests cover:
//! - Filter changes debounced into a single request
//! - Page navigation over a cached result set
//! - Error notices surfaced to the display side

#![cfg(test)]

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use operator_engine::config::parse_settings;
use operator_engine::sources::inactive::{
    FetchError, FilterPatch, FilterState, HttpReply, NoticeLevel, Orchestrator,
    OrchestratorConfig, ReportTransport,
};

/// Transport answering from a fixed table of signature -> reply.
#[derive(Clone, Default)]
struct TableTransport {
    /// Canned replies by query signature.
    replies: Arc<HashMap<String, HttpReply>>,
    /// Signatures requested, in order.
    log: Arc<Mutex<Vec<String>>>,
}

impl ReportTransport for TableTransport {
    fn fetch_report(
        &self,
        query: Vec<(&'static str, String)>,
    ) -> impl Future<Output = Result<HttpReply, FetchError>> + Send {
        let signature = query
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        self.log.lock().expect("log lock").push(signature.clone());
        let reply = self.replies.get(&signature).cloned().unwrap_or(HttpReply {
            status: 404,
            body: r#"{"error":"no such report"}"#.to_string(),
        });
        async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(reply)
        }
    }
}

/// What: Build a report body with `n` rows named `Shop {i}`.
fn report(n: usize) -> String {
    let rows: Vec<_> = (0..n)
        .map(|i| {
            serde_json::json!({
                "Business Name": format!("Shop {i}"),
                "Registered": "2025-03-01",
                "Subscription end": "2026-03-01",
                "Phone Number": "+255700000000",
            })
        })
        .collect();
    serde_json::json!({ "rows": rows, "count": n }).to_string()
}

fn transport(entries: &[(&str, String)]) -> TableTransport {
    TableTransport {
        replies: Arc::new(
            entries
                .iter()
                .map(|(sig, body)| {
                    (
                        (*sig).to_string(),
                        HttpReply {
                            status: 200,
                            body: body.clone(),
                        },
                    )
                })
                .collect(),
        ),
        log: Arc::default(),
    }
}

#[tokio::test(start_paused = true)]
/// What: Rapid filter edits produce one request for the final filter.
///
/// Inputs:
/// - Three day changes and a phone toggle inside the debounce window.
///
/// Output:
/// - One logged request; view shows its rows on page 1.
async fn debounced_filter_changes_issue_single_request() {
    let t = transport(&[("days=45&require_phone=true", report(12))]);
    let log = Arc::clone(&t.log);
    let orch = Orchestrator::new(t, OrchestratorConfig::default());

    for days in [20, 30, 45] {
        orch.on_filter_changed(&FilterPatch {
            inactivity_days: Some(days),
            ..FilterPatch::default()
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    orch.on_filter_changed(&FilterPatch {
        require_phone_number: Some(true),
        ..FilterPatch::default()
    });
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(
        *log.lock().expect("log lock"),
        vec!["days=45&require_phone=true".to_string()]
    );
    let view = orch.view();
    assert_eq!(view.rows.len(), 12);
    assert_eq!(view.pagination.current_page, 1);
    assert!(orch.take_notices().is_empty());
}

#[tokio::test(start_paused = true)]
/// What: Settings-driven page size paginates a cached result without refetching.
///
/// Inputs:
/// - `items_per_page = 10` and a 25-row report requested twice.
///
/// Output:
/// - Three pages, last one holding 5 rows; one network request.
async fn pages_follow_configured_page_size() {
    let settings = parse_settings("items_per_page = 10\ncache_ttl_secs = 60\n");
    let t = transport(&[("days=15&require_phone=false", report(25))]);
    let log = Arc::clone(&t.log);
    let orch = Orchestrator::new(t, OrchestratorConfig::from(&settings));

    orch.request_results(FilterState::default()).await;
    assert_eq!(orch.view().pagination.total_pages, 3);
    assert!(orch.set_page(3));
    let last = orch.view();
    assert_eq!(last.rows.len(), 5);
    assert_eq!(last.rows[0].business_name, "Shop 20");
    assert!(!orch.set_page(4));

    orch.request_results(FilterState::default()).await;
    assert_eq!(log.lock().expect("log lock").len(), 1);
    assert_eq!(orch.view().pagination.current_page, 1);
}

#[tokio::test(start_paused = true)]
/// What: An unknown report yields an error notice with the server's text.
///
/// Inputs:
/// - A filter the table has no entry for (404 with an error body).
///
/// Output:
/// - Empty view and one error notice carrying "no such report".
async fn not_found_surfaces_server_error_text() {
    let orch = Orchestrator::new(transport(&[]), OrchestratorConfig::default());
    orch.request_results(FilterState {
        inactivity_days: 90,
        ..FilterState::default()
    })
    .await;

    assert!(orch.view().rows.is_empty());
    assert!(!orch.is_loading());
    let notices = orch.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].text, "no such report");
}

#[tokio::test(start_paused = true)]
/// What: A zero-day filter is rejected before any request.
///
/// Inputs:
/// - Filter change setting `inactivity_days = 0`.
///
/// Output:
/// - No request; one error notice.
async fn zero_days_rejected_before_dispatch() {
    let t = transport(&[]);
    let log = Arc::clone(&t.log);
    let orch = Orchestrator::new(t, OrchestratorConfig::default());
    orch.on_filter_changed(&FilterPatch {
        inactivity_days: Some(0),
        ..FilterPatch::default()
    });
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(log.lock().expect("log lock").is_empty());
    let notices = orch.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].text, "Inactivity days must be at least 1");
}
