//! Inactive paid users report: filters, fetch orchestration, cache and pagination.

mod cache;
mod error;
mod filter;
mod model;
mod orchestrator;
mod pagination;
mod retry;
mod transport;

pub use cache::{CacheEntry, ReportCache};
pub use error::FetchError;
pub use filter::{FilterPatch, FilterState, parse_wire_date};
pub use model::{ResultSet, UserRecord, parse_report};
pub use orchestrator::{Notice, NoticeLevel, Orchestrator, OrchestratorConfig, PageView};
pub use pagination::PaginationState;
pub use retry::{RetryPolicy, retry_with_backoff};
pub use transport::{HttpReply, HttpTransport, INACTIVE_USERS_PATH, ReportTransport};
