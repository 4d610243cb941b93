//! Report filters, their canonical signature and pre-flight validation.

use chrono::{Duration, NaiveDate};

use super::error::FetchError;

/// Date format used on the wire (`yyyy-MM-dd`).
const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

/// The query the operator is currently asking for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FilterState {
    /// Minimum days since last login (must be `> 0`).
    pub inactivity_days: u32,
    /// Only users registered on or after this date.
    pub registered_after: Option<NaiveDate>,
    /// Only users whose subscription ends on or before this date.
    pub subscription_ends_before: Option<NaiveDate>,
    /// Only users with a phone number on file.
    pub require_phone_number: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            inactivity_days: 15,
            registered_after: None,
            subscription_ends_before: None,
            require_phone_number: false,
        }
    }
}

/// A partial filter change. `None` leaves the field untouched.
///
/// Date fields are doubly optional so a change can also clear a date
/// (`Some(None)`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterPatch {
    /// New inactivity threshold.
    pub inactivity_days: Option<u32>,
    /// New (or cleared) registration lower bound.
    pub registered_after: Option<Option<NaiveDate>>,
    /// New (or cleared) subscription end upper bound.
    pub subscription_ends_before: Option<Option<NaiveDate>>,
    /// New phone requirement.
    pub require_phone_number: Option<bool>,
}

impl FilterState {
    /// What: Serialise the filter into query parameters, sorted by key.
    ///
    /// Output:
    /// - `(key, value)` pairs; absent dates are omitted.
    ///
    /// Details:
    /// - Key order is fixed alphabetically so the same filter always yields
    ///   the same pairs regardless of how it was built.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("days", self.inactivity_days.to_string())];
        if let Some(d) = self.registered_after {
            pairs.push(("registered_start", d.format(WIRE_DATE_FORMAT).to_string()));
        }
        pairs.push(("require_phone", self.require_phone_number.to_string()));
        if let Some(d) = self.subscription_ends_before {
            pairs.push((
                "subscription_end_end",
                d.format(WIRE_DATE_FORMAT).to_string(),
            ));
        }
        pairs.sort_by_key(|(k, _)| *k);
        pairs
    }

    /// Canonical string key for caching and in-flight tracking.
    #[must_use]
    pub fn signature(&self) -> String {
        self.query_pairs()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Apply a partial change, producing a new filter.
    #[must_use]
    pub fn merge(&self, patch: &FilterPatch) -> Self {
        Self {
            inactivity_days: patch.inactivity_days.unwrap_or(self.inactivity_days),
            registered_after: patch.registered_after.unwrap_or(self.registered_after),
            subscription_ends_before: patch
                .subscription_ends_before
                .unwrap_or(self.subscription_ends_before),
            require_phone_number: patch
                .require_phone_number
                .unwrap_or(self.require_phone_number),
        }
    }

    /// What: Reject filters that are obviously wrong before any request is made.
    ///
    /// Inputs:
    /// - `today`: Reference date.
    /// - `window_days`: Allowed distance of any filter date from `today`.
    ///
    /// Output:
    /// - `Ok(())` or `FetchError::InvalidFilter` with an operator-facing message.
    ///
    /// # Errors
    /// - `inactivity_days` is zero.
    /// - A date lies outside `[today - window_days, today + window_days]`.
    pub fn validate(&self, today: NaiveDate, window_days: i64) -> Result<(), FetchError> {
        if self.inactivity_days == 0 {
            return Err(FetchError::InvalidFilter(
                "Inactivity days must be at least 1".to_string(),
            ));
        }
        let earliest = today - Duration::days(window_days);
        let latest = today + Duration::days(window_days);
        let dates = [
            ("Registration date", self.registered_after),
            ("Subscription end date", self.subscription_ends_before),
        ];
        for (label, date) in dates {
            if let Some(d) = date
                && (d < earliest || d > latest)
            {
                return Err(FetchError::InvalidFilter(format!(
                    "{label} {d} must be between {earliest} and {latest}"
                )));
            }
        }
        Ok(())
    }
}

/// Parse a `yyyy-MM-dd` date as used on the wire and on the command line.
///
/// # Errors
/// - The input is not a valid calendar date in that format.
pub fn parse_wire_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s.trim(), WIRE_DATE_FORMAT)
}
