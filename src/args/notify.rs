//! Command-line push notification.

use operator_engine::config::Settings;
use operator_engine::sources::notify::{Notification, NotifyClient};

/// What: Send a notification to a user category.
///
/// Details:
/// - Blank fields are rejected before any request.
/// - Exits with status 1 on validation or delivery failure.
pub async fn handle_notify(notification: Notification, settings: &Settings) {
    tracing::info!(category = %notification.category, "notification requested from CLI");
    if let Err(e) = notification.validate() {
        eprintln!("{e}");
        std::process::exit(1);
    }
    let client = match NotifyClient::new(&settings.api_base_url) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to set up HTTP client: {e}");
            std::process::exit(1);
        }
    };
    match client.send(&notification).await {
        Ok(sent_to) => println!("Notification sent to {sent_to} users."),
        Err(e) => {
            eprintln!("Failed to send notification: {e}");
            tracing::error!(error = %e, "notification failed");
            std::process::exit(1);
        }
    }
}
