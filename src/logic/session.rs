//! Password gate for operators with a fixed session lifetime.
//!
//! A successful login writes the expiry time to a small JSON file; every
//! later check compares it with the clock and removes the file once expired.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zeroize::Zeroize;

/// Token value stored for an authenticated session.
const SESSION_TOKEN: &str = "authenticated";
/// Remaining time under which the session is flagged as expiring.
const EXPIRY_WARNING_MINUTES: i64 = 15;

/// On-disk session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SessionRecord {
    /// Session marker.
    token: String,
    /// Expiry as Unix milliseconds.
    expires_at_ms: i64,
}

/// Session state as seen by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No session, or it was removed.
    SignedOut,
    /// Session valid for the contained time.
    Active(Duration),
    /// Session ran out; the record has been removed.
    Expired,
}

/// Password gate backed by a session file.
#[derive(Debug, Clone)]
pub struct SessionGate {
    /// Session file location.
    path: PathBuf,
    /// Accepted passwords.
    passwords: Vec<String>,
    /// Session lifetime granted on login.
    lifetime: Duration,
}

impl SessionGate {
    /// Create a gate.
    #[must_use]
    pub const fn new(path: PathBuf, passwords: Vec<String>, lifetime: Duration) -> Self {
        Self {
            path,
            passwords,
            lifetime,
        }
    }

    /// What: Check `password` and start a session on success.
    ///
    /// Inputs:
    /// - `password`: Candidate; wiped from memory before returning.
    /// - `now`: Current time.
    ///
    /// Output:
    /// - `Ok(true)` when accepted and persisted, `Ok(false)` when rejected.
    ///
    /// # Errors
    /// - The session file cannot be written.
    pub fn login(&self, mut password: String, now: DateTime<Utc>) -> std::io::Result<bool> {
        let accepted = !password.is_empty() && self.passwords.iter().any(|p| *p == password);
        password.zeroize();
        if !accepted {
            warn!("operator login rejected");
            return Ok(false);
        }
        let record = SessionRecord {
            token: SESSION_TOKEN.to_string(),
            expires_at_ms: (now + self.lifetime).timestamp_millis(),
        };
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string(&record).map_err(std::io::Error::other)?;
        fs::write(&self.path, json)?;
        info!(
            expires_at = %(now + self.lifetime).to_rfc3339(),
            "operator session started"
        );
        Ok(true)
    }

    /// What: Evaluate the stored session at `now`.
    ///
    /// Details:
    /// - Expired or unreadable records are removed.
    pub fn status(&self, now: DateTime<Utc>) -> SessionStatus {
        let Some(record) = self.read_record() else {
            return SessionStatus::SignedOut;
        };
        if record.token != SESSION_TOKEN {
            self.remove_record();
            return SessionStatus::SignedOut;
        }
        let remaining = record.expires_at_ms - now.timestamp_millis();
        if remaining > 0 {
            SessionStatus::Active(Duration::milliseconds(remaining))
        } else {
            debug!("operator session expired");
            self.remove_record();
            SessionStatus::Expired
        }
    }

    /// Whether a valid session exists at `now`.
    #[must_use]
    pub fn is_authenticated(&self, now: DateTime<Utc>) -> bool {
        matches!(self.status(now), SessionStatus::Active(_))
    }

    /// End the session. Succeeds when none exists.
    ///
    /// # Errors
    /// - The session file exists but cannot be removed.
    pub fn logout(&self) -> std::io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("operator logged out");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Read and parse the record, treating a corrupt file as absent.
    fn read_record(&self) -> Option<SessionRecord> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(r) => Some(r),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "discarding corrupt session file");
                self.remove_record();
                None
            }
        }
    }

    /// Best-effort removal of the record.
    fn remove_record(&self) {
        if let Err(e) = fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(error = %e, path = %self.path.display(), "failed to remove session file");
        }
    }
}

/// What: Format remaining session time as `"1h 5m"`, `"12m"` or `"Expired"`.
#[must_use]
pub fn format_remaining(status: SessionStatus) -> String {
    match status {
        SessionStatus::Active(d) => {
            let hours = d.num_hours();
            let minutes = d.num_minutes() % 60;
            if hours > 0 {
                format!("{hours}h {minutes}m")
            } else {
                format!("{minutes}m")
            }
        }
        SessionStatus::Expired => "Expired".to_string(),
        SessionStatus::SignedOut => "Signed out".to_string(),
    }
}

/// Whether the session should be flagged as about to expire.
#[must_use]
pub fn is_expiring(status: SessionStatus) -> bool {
    match status {
        SessionStatus::Active(d) => d < Duration::minutes(EXPIRY_WARNING_MINUTES),
        SessionStatus::Expired => true,
        SessionStatus::SignedOut => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(dir: &tempfile::TempDir) -> SessionGate {
        SessionGate::new(
            dir.path().join("session.json"),
            vec!["2030".to_string(), "data".to_string()],
            Duration::hours(2),
        )
    }

    #[test]
    /// What: A session is valid until two hours after login, then removed.
    fn session_expires_after_lifetime() {
        let dir = tempfile::tempdir().expect("tempdir");
        let g = gate(&dir);
        let t0 = Utc::now();
        assert_eq!(g.status(t0), SessionStatus::SignedOut);
        assert!(g.login("2030".to_string(), t0).expect("login"));
        assert!(g.is_authenticated(t0 + Duration::minutes(119)));
        assert_eq!(
            g.status(t0 + Duration::minutes(60)),
            SessionStatus::Active(Duration::minutes(60))
        );
        assert_eq!(g.status(t0 + Duration::hours(2)), SessionStatus::Expired);
        assert!(!dir.path().join("session.json").exists());
        assert_eq!(g.status(t0), SessionStatus::SignedOut);
    }

    #[test]
    fn wrong_or_empty_password_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let g = gate(&dir);
        let now = Utc::now();
        assert!(!g.login("2031".to_string(), now).expect("login"));
        assert!(!g.login(String::new(), now).expect("login"));
        assert!(!g.is_authenticated(now));
    }

    #[test]
    fn logout_and_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let g = gate(&dir);
        let now = Utc::now();
        assert!(g.login("data".to_string(), now).expect("login"));
        g.logout().expect("logout");
        assert!(!g.is_authenticated(now));
        g.logout().expect("logout twice");

        fs::write(dir.path().join("session.json"), "{not json").expect("write");
        assert_eq!(g.status(now), SessionStatus::SignedOut);
        assert!(!dir.path().join("session.json").exists());
    }

    #[test]
    fn remaining_time_formatting() {
        let active = SessionStatus::Active(Duration::minutes(125));
        assert_eq!(format_remaining(active), "2h 5m");
        assert!(!is_expiring(active));
        let short = SessionStatus::Active(Duration::minutes(12));
        assert_eq!(format_remaining(short), "12m");
        assert!(is_expiring(short));
        assert_eq!(format_remaining(SessionStatus::Expired), "Expired");
    }
}
