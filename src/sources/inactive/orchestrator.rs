//! Fetch orchestration for the inactive-paid-users report.
//!
//! One [`Orchestrator`] owns the report cache, the set of in-flight
//! signatures, the displayed result set and its pagination. The display side
//! only reads [`Orchestrator::view`] / [`Orchestrator::take_notices`] and
//! calls the operations; it never touches the state directly.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::cache::ReportCache;
use super::error::FetchError;
use super::filter::{FilterPatch, FilterState};
use super::model::{ResultSet, UserRecord, parse_report};
use super::pagination::PaginationState;
use super::retry::{RetryPolicy, retry_with_backoff};
use super::transport::ReportTransport;
use crate::config::Settings;
use crate::util::debounce::Debouncer;

/// Tunables of the orchestrator.
#[derive(Clone, Debug, PartialEq)]
pub struct OrchestratorConfig {
    /// Per-attempt client timeout.
    pub request_timeout: Duration,
    /// Lifetime of cached results.
    pub cache_ttl: Duration,
    /// Maximum cached results.
    pub cache_capacity: usize,
    /// Retry limits and delays.
    pub retry: RetryPolicy,
    /// Initial rows per page.
    pub items_per_page: usize,
    /// Quiet period for filter changes.
    pub debounce: Duration,
    /// Allowed distance of filter dates from today, in days.
    pub date_window_days: i64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for OrchestratorConfig {
    fn from(s: &Settings) -> Self {
        Self {
            request_timeout: Duration::from_secs(s.request_timeout_secs),
            cache_ttl: Duration::from_secs(s.cache_ttl_secs),
            cache_capacity: s.cache_capacity,
            retry: RetryPolicy {
                max_retries: s.max_retries,
                base_delay: Duration::from_millis(s.retry_base_delay_ms),
                jitter_max: Duration::from_millis(s.retry_jitter_max_ms),
            },
            items_per_page: s.items_per_page,
            debounce: Duration::from_millis(s.debounce_ms),
            date_window_days: s.filter_date_window_days,
        }
    }
}

/// Severity of a [`Notice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational.
    Info,
    /// Something was off but data is usable.
    Warning,
    /// A request failed or was rejected.
    Error,
}

/// Operator-facing message queued for the display layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Message text.
    pub text: String,
}

impl Notice {
    /// Error-level notice.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Snapshot of what the display should show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageView {
    /// Rows of the current page.
    pub rows: Vec<UserRecord>,
    /// Pagination position.
    pub pagination: PaginationState,
    /// Whether a request is running.
    pub loading: bool,
    /// Signature of the displayed result set, if any.
    pub signature: Option<String>,
}

/// Mutable orchestrator state. Never held across an `.await`.
#[derive(Debug)]
struct State {
    /// Results by filter signature.
    cache: ReportCache,
    /// Signatures with a request running.
    in_flight: HashSet<String>,
    /// Signature most recently requested; only its results are applied.
    active_signature: Option<String>,
    /// Result set on display and the signature it came from.
    displayed: Option<(String, Arc<ResultSet>)>,
    /// Pagination over `displayed`.
    pagination: PaginationState,
    /// Filter accumulated from `on_filter_changed`.
    filter: FilterState,
    /// Notices not yet taken by the display.
    notices: Vec<Notice>,
}

impl State {
    /// Show `result_set` from its first page.
    fn apply(&mut self, signature: String, result_set: Arc<ResultSet>) {
        self.pagination.reset(result_set.total_count);
        info!(
            signature,
            rows = result_set.rows.len(),
            total = result_set.total_count,
            total_pages = self.pagination.total_pages,
            "applied inactive users result"
        );
        self.displayed = Some((signature, result_set));
    }

    /// Drop the displayed rows.
    fn clear(&mut self) {
        self.displayed = None;
        self.pagination.reset(0);
    }
}

/// Shared part behind every handle clone.
struct Inner<T> {
    /// Performs the HTTP exchange.
    transport: T,
    /// Tunables.
    config: OrchestratorConfig,
    /// Guarded state.
    state: Mutex<State>,
    /// Timer for debounced filter changes.
    debouncer: Mutex<Debouncer>,
}

impl<T> Inner<T> {
    /// Lock the state, recovering from a poisoned mutex.
    fn lock_state(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Lock the debounce timer, recovering from a poisoned mutex.
    fn lock_debouncer(&self) -> MutexGuard<'_, Debouncer> {
        match self.debouncer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Removes its signature from the in-flight set when the owning future is
/// cancelled mid-request. A completed request releases the signature itself,
/// in the same critical section that stores the result, and disarms the guard.
struct InFlightGuard<'a, T> {
    /// Owner of the in-flight set.
    inner: &'a Inner<T>,
    /// Signature to release.
    signature: &'a str,
    /// Cleared once the signature was released by the caller.
    armed: bool,
}

impl<T> InFlightGuard<'_, T> {
    /// Consume the guard without touching the state. The caller must already
    /// have removed the signature (typically while holding the state lock).
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<T> Drop for InFlightGuard<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            self.inner.lock_state().in_flight.remove(self.signature);
        }
    }
}

/// Cloneable handle to a report orchestrator.
pub struct Orchestrator<T> {
    /// Shared state and transport.
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Orchestrator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: ReportTransport> Orchestrator<T> {
    /// Create an orchestrator over `transport`.
    #[must_use]
    pub fn new(transport: T, config: OrchestratorConfig) -> Self {
        let state = State {
            cache: ReportCache::new(config.cache_capacity, config.cache_ttl),
            in_flight: HashSet::new(),
            active_signature: None,
            displayed: None,
            pagination: PaginationState::new(config.items_per_page),
            filter: FilterState::default(),
            notices: Vec::new(),
        };
        let debouncer = Debouncer::new(config.debounce);
        Self {
            inner: Arc::new(Inner {
                transport,
                config,
                state: Mutex::new(state),
                debouncer: Mutex::new(debouncer),
            }),
        }
    }

    /// What: Produce the result set for `filter` from cache or network.
    ///
    /// Inputs:
    /// - `filter`: Filter to fetch; becomes the active filter.
    ///
    /// Output: None; results land in the state read by [`Self::view`].
    ///
    /// Details:
    /// - Returns at once if the same signature is already in flight.
    /// - A live cache entry is applied without network I/O.
    /// - Otherwise fetches with timeout and retry, caches the result and
    ///   applies it only if the signature is still the active one.
    /// - Failures become notices; retryable ones keep the displayed rows.
    pub async fn request_results(&self, filter: FilterState) {
        let signature = filter.signature();
        {
            let mut st = self.inner.lock_state();
            st.active_signature = Some(signature.clone());
            if st.in_flight.contains(&signature) {
                debug!(signature, "request already in flight; dropping duplicate");
                return;
            }
            if let Some(hit) = st.cache.get(&signature, Instant::now()) {
                debug!(signature, "serving inactive users from cache");
                st.apply(signature, hit);
                return;
            }
            st.in_flight.insert(signature.clone());
        }

        let guard = InFlightGuard {
            inner: &self.inner,
            signature: &signature,
            armed: true,
        };
        let started = Instant::now();
        let outcome = retry_with_backoff(&self.inner.config.retry, || {
            self.fetch_once(filter.query_pairs())
        })
        .await;

        // Release and store under one lock: a concurrent request for this
        // signature must see either the in-flight entry or the cached result.
        let mut st = self.inner.lock_state();
        st.in_flight.remove(&signature);
        guard.disarm();
        let is_active = st.active_signature.as_deref() == Some(signature.as_str());
        match outcome {
            Ok(result_set) => {
                let result_set = Arc::new(result_set);
                st.cache
                    .insert(signature.clone(), Arc::clone(&result_set), Instant::now());
                if is_active {
                    info!(
                        signature,
                        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                        "fetched inactive users"
                    );
                    st.apply(signature, result_set);
                } else {
                    debug!(signature, "discarding stale response for superseded filter");
                }
            }
            Err(err) => {
                warn!(signature, error = %err, active = is_active, "inactive users request failed");
                if is_active {
                    if err.clears_results() {
                        st.clear();
                    }
                    st.notices.push(Notice::error(err.user_message()));
                }
            }
        }
    }

    /// One attempt: transport call bounded by the client timeout, then
    /// status classification and body parsing.
    async fn fetch_once(
        &self,
        query: Vec<(&'static str, String)>,
    ) -> Result<ResultSet, FetchError> {
        let reply = tokio::time::timeout(
            self.inner.config.request_timeout,
            self.inner.transport.fetch_report(query),
        )
        .await
        .map_err(|_| FetchError::Timeout)??;
        if !reply.is_success() {
            return Err(FetchError::from_status(reply.status, &reply.body));
        }
        parse_report(&reply.body)
    }

    /// What: Show page `page` of the held result set.
    ///
    /// Output:
    /// - `true` if the page changed.
    ///
    /// Details:
    /// - No-op when out of range or while any request is in flight.
    pub fn set_page(&self, page: usize) -> bool {
        let mut st = self.inner.lock_state();
        if !st.in_flight.is_empty() {
            debug!(page, "ignoring page change while loading");
            return false;
        }
        st.pagination.set_page(page)
    }

    /// Change rows per page and return to page 1. Zero is ignored.
    pub fn set_items_per_page(&self, n: usize) -> bool {
        self.inner.lock_state().pagination.set_items_per_page(n)
    }

    /// What: Merge a filter change and dispatch it after the debounce delay.
    ///
    /// Details:
    /// - Each call restarts the timer; only the final merged filter is sent.
    /// - When the timer fires the filter is validated against today's date;
    ///   a rejected filter becomes an error notice and nothing is fetched.
    /// - Must be called from within a tokio runtime.
    pub fn on_filter_changed(&self, patch: &FilterPatch) {
        {
            let mut st = self.inner.lock_state();
            st.filter = st.filter.merge(patch);
        }
        // Weak: dropping the last handle drops the debouncer, which aborts the timer.
        let weak = Arc::downgrade(&self.inner);
        self.inner.lock_debouncer().schedule(async move {
            if let Some(inner) = weak.upgrade() {
                Self { inner }.dispatch_pending().await;
            }
        });
    }

    /// Validate and request the accumulated filter.
    async fn dispatch_pending(&self) {
        let filter = self.inner.lock_state().filter.clone();
        let today = chrono::Local::now().date_naive();
        if let Err(err) = filter.validate(today, self.inner.config.date_window_days) {
            warn!(error = %err, "filter rejected before dispatch");
            self.inner
                .lock_state()
                .notices
                .push(Notice::error(err.user_message()));
            return;
        }
        self.request_results(filter).await;
    }

    /// Current page of rows plus pagination.
    #[must_use]
    pub fn view(&self) -> PageView {
        let st = self.inner.lock_state();
        let (rows, signature) = st.displayed.as_ref().map_or_else(
            || (Vec::new(), None),
            |(sig, rs)| {
                let range = st.pagination.slice_range(rs.rows.len());
                (rs.rows[range].to_vec(), Some(sig.clone()))
            },
        );
        PageView {
            rows,
            pagination: st.pagination,
            loading: !st.in_flight.is_empty(),
            signature,
        }
    }

    /// Drain queued notices, oldest first.
    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.inner.lock_state().notices)
    }

    /// Whether any request is running.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        !self.inner.lock_state().in_flight.is_empty()
    }

    /// Filter accumulated from [`Self::on_filter_changed`].
    #[must_use]
    pub fn current_filter(&self) -> FilterState {
        self.inner.lock_state().filter.clone()
    }

    /// Cancel a pending debounced dispatch. Running requests are unaffected.
    pub fn shutdown(&self) {
        if self.inner.lock_debouncer().cancel() {
            debug!("cancelled pending filter dispatch");
        }
    }
}
