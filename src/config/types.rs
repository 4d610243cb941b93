/// User-configurable application settings parsed from `settings.conf`.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Base URL of the reporting/metrics API (no trailing slash).
    pub api_base_url: String,
    /// Base URL of the Supabase project hosting the `excel-sync` function.
    pub supabase_url: String,
    /// Anonymous key sent as `apikey` and bearer token to Supabase.
    pub supabase_anon_key: String,
    /// Rows shown per page in the inactive-users report.
    pub items_per_page: usize,
    /// Client-side timeout for a single report request, in seconds.
    pub request_timeout_secs: u64,
    /// Lifetime of a cached report, in seconds.
    pub cache_ttl_secs: u64,
    /// Maximum number of cached reports.
    pub cache_capacity: usize,
    /// Retries attempted after the first failed report request.
    pub max_retries: u32,
    /// Backoff base delay in milliseconds (doubled per retry).
    pub retry_base_delay_ms: u64,
    /// Upper bound of the random jitter added to each backoff delay.
    pub retry_jitter_max_ms: u64,
    /// Quiet period before a filter change is dispatched, in milliseconds.
    pub debounce_ms: u64,
    /// Allowed distance of filter dates from today, in days.
    pub filter_date_window_days: i64,
    /// Metric endpoint numbers polled by the dashboard (`/api/end{n}`).
    pub metric_endpoints: Vec<u32>,
    /// Operator session lifetime, in hours.
    pub session_hours: u64,
    /// Passwords accepted by the session gate.
    pub operator_passwords: Vec<String>,
    /// Decay factor for smart message selection (weight of item `i` is `decay^i`).
    pub selection_decay: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:4900".to_string(),
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            items_per_page: 100,
            request_timeout_secs: 90,
            cache_ttl_secs: 300,
            cache_capacity: 10,
            max_retries: 2,
            retry_base_delay_ms: 2000,
            retry_jitter_max_ms: 1000,
            debounce_ms: 300,
            filter_date_window_days: 365,
            metric_endpoints: vec![1, 2, 3, 4, 5, 6, 7, 8, 100, 200, 300, 400],
            session_hours: 2,
            operator_passwords: Vec::new(),
            selection_decay: 0.8,
        }
    }
}

impl Settings {
    /// Operator session lifetime.
    #[must_use]
    pub fn session_lifetime(&self) -> chrono::Duration {
        // capped at a century to stay inside chrono's range
        let hours = i64::try_from(self.session_hours.min(876_000)).unwrap_or(2);
        chrono::Duration::hours(hours)
    }
}
