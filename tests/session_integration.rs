//! Integration tests for the operator session gate and message selection.
//!
//! Tests cover:
//! - Login, expiry and logout against a real session file
//! - Settings controlling passwords and lifetime
//! - Weighted message selection

#![cfg(test)]

use chrono::{Duration, TimeZone, Utc};
use operator_engine::config::parse_settings;
use operator_engine::logic::selection::select_weighted;
use operator_engine::logic::session::{SessionGate, SessionStatus, format_remaining};

#[test]
/// What: A session configured from settings lives exactly `session_hours`.
///
/// Inputs:
/// - `session_hours = 1`, one configured password.
///
/// Output:
/// - Active for 1h, expired afterwards with the file removed.
fn session_from_settings_expires_after_lifetime() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.json");
    let settings = parse_settings("session_hours = 1\noperator_passwords = opensesame\n");
    let gate = SessionGate::new(
        path.clone(),
        settings.operator_passwords.clone(),
        settings.session_lifetime(),
    );
    let start = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).single().expect("valid time");

    assert!(!gate.login("wrong".to_string(), start).expect("login io"));
    assert!(!path.exists());
    assert!(gate.login("opensesame".to_string(), start).expect("login io"));
    assert!(path.exists());

    let status = gate.status(start + Duration::minutes(30));
    assert_eq!(status, SessionStatus::Active(Duration::minutes(30)));
    assert_eq!(format_remaining(status), "30m");

    assert_eq!(gate.status(start + Duration::hours(1)), SessionStatus::Expired);
    assert!(!path.exists());
    assert_eq!(gate.status(start + Duration::hours(2)), SessionStatus::SignedOut);
}

#[test]
/// What: Logout ends a live session and is idempotent.
fn logout_removes_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let gate = SessionGate::new(
        dir.path().join("nested").join("session.json"),
        vec!["pw".to_string()],
        Duration::hours(2),
    );
    let now = Utc::now();
    assert!(gate.login("pw".to_string(), now).expect("login io"));
    assert!(gate.is_authenticated(now));
    gate.logout().expect("logout");
    assert!(!gate.is_authenticated(now));
    gate.logout().expect("second logout");
}

#[test]
/// What: Weighted selection favours earlier messages and covers the range.
///
/// Inputs:
/// - Three messages, decay 0.5 (weights 4/7, 2/7, 1/7).
///
/// Output:
/// - Rolls map onto the cumulative weights.
fn weighted_selection_follows_decay() {
    let messages = ["first", "second", "third"];
    assert_eq!(select_weighted(&messages, 0.5, 0.0), Some(&"first"));
    assert_eq!(select_weighted(&messages, 0.5, 0.5), Some(&"first"));
    assert_eq!(select_weighted(&messages, 0.5, 0.6), Some(&"second"));
    assert_eq!(select_weighted(&messages, 0.5, 0.9), Some(&"third"));
    assert_eq!(select_weighted::<&str>(&[], 0.5, 0.3), None);
}
