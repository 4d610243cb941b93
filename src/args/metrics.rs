//! Command-line metrics and health check.

use operator_engine::config::Settings;
use operator_engine::sources::metrics::MetricsClient;

/// Build the client or exit.
fn client(settings: &Settings) -> MetricsClient {
    match MetricsClient::new(&settings.api_base_url) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to set up HTTP client: {e}");
            tracing::error!(error = %e, "failed to build metrics client");
            std::process::exit(1);
        }
    }
}

/// What: Fetch dashboard metrics in parallel and print one line each.
///
/// Inputs:
/// - `endpoints`: Endpoint numbers; empty means the configured list.
///
/// Details:
/// - A failing metric prints its error in place; the others still print.
pub async fn handle_metrics(endpoints: &[u32], settings: &Settings) {
    let endpoints = if endpoints.is_empty() {
        settings.metric_endpoints.as_slice()
    } else {
        endpoints
    };
    tracing::info!(count = endpoints.len(), "metrics requested from CLI");
    let client = client(settings);
    for (n, reading) in client.fetch_dashboard(endpoints).await {
        match reading {
            Ok(m) => {
                println!("end{n:<4} {:<40} {}", m.metric, m.display_value());
                for point in &m.trend {
                    println!("         {}  {}", point.date, point.signups);
                }
            }
            Err(e) => println!("end{n:<4} error: {e}"),
        }
    }
}

/// Print the API health status; exits 1 when unreachable or unhealthy.
pub async fn handle_health(settings: &Settings) {
    tracing::info!("health check requested from CLI");
    match client(settings).health().await {
        Ok(h) => {
            println!("{} (version {}, {})", h.status, h.version, h.timestamp);
            if h.status != "healthy" {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Health check failed: {e}");
            tracing::error!(error = %e, "health check failed");
            std::process::exit(1);
        }
    }
}
