//! Command-line inactive users report.

use chrono::NaiveDate;
use operator_engine::config::Settings;
use operator_engine::sources::inactive::{
    FilterState, HttpTransport, NoticeLevel, Orchestrator, OrchestratorConfig, PageView,
    parse_wire_date,
};

use crate::args::definition::InactiveArgs;

/// Parse an optional `YYYY-MM-DD` argument, exiting on a bad date.
fn date_arg(flag: &str, value: Option<&str>) -> Option<NaiveDate> {
    let raw = value?;
    match parse_wire_date(raw) {
        Ok(d) => Some(d),
        Err(e) => {
            eprintln!("Invalid --{flag} date '{raw}': {e} (expected YYYY-MM-DD)");
            std::process::exit(1);
        }
    }
}

/// What: Fetch one page of the inactive paid users report and print it.
///
/// Inputs:
/// - `args`: Filters and paging from the command line.
/// - `settings`: Loaded settings (API base, timeouts, page size).
///
/// Details:
/// - The filter is validated against today's date before any request.
/// - Goes through the same orchestrator as an interactive display, so the
///   timeout, retry and error classification are identical.
/// - Exits with status 1 when the request fails or the filter is rejected.
pub async fn handle_inactive(args: &InactiveArgs, settings: &Settings) {
    let filter = FilterState {
        inactivity_days: args.days,
        registered_after: date_arg("registered-after", args.registered_after.as_deref()),
        subscription_ends_before: date_arg(
            "subscription-ends-before",
            args.subscription_ends_before.as_deref(),
        ),
        require_phone_number: args.require_phone,
    };
    tracing::info!(signature = %filter.signature(), page = args.page, "inactive users requested from CLI");

    let today = chrono::Local::now().date_naive();
    if let Err(e) = filter.validate(today, settings.filter_date_window_days) {
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }

    let transport = match HttpTransport::new(&settings.api_base_url) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to set up HTTP client: {e}");
            tracing::error!(error = %e, "failed to build report transport");
            std::process::exit(1);
        }
    };
    let orchestrator = Orchestrator::new(transport, OrchestratorConfig::from(settings));
    if let Some(n) = args.per_page {
        orchestrator.set_items_per_page(n);
    }
    orchestrator.request_results(filter).await;

    let mut failed = false;
    for notice in orchestrator.take_notices() {
        failed |= notice.level == NoticeLevel::Error;
        eprintln!("{}", notice.text);
    }
    if failed {
        std::process::exit(1);
    }
    if args.page > 1 && !orchestrator.set_page(args.page) {
        let pages = orchestrator.view().pagination.total_pages;
        eprintln!("Page {} is out of range (1-{pages})", args.page);
        std::process::exit(1);
    }
    print_page(&orchestrator.view());
}

/// Print rows as a tab-separated table with a page footer.
fn print_page(view: &PageView) {
    if view.rows.is_empty() {
        println!("No inactive users found for the selected filters.");
        return;
    }
    println!("Business Name\tRegistered\tSubscription end\tPhone Number");
    for row in &view.rows {
        println!(
            "{}\t{}\t{}\t{}",
            row.business_name, row.registered, row.subscription_end, row.phone_number
        );
    }
    let p = view.pagination;
    println!();
    println!(
        "Page {} of {} ({} users, {} per page)",
        p.current_page, p.total_pages, p.total_items, p.items_per_page
    );
}
