//! Command-line argument parsing and handling.

pub mod definition;
pub mod inactive;
pub mod metrics;
pub mod notify;
pub mod reminders;
pub mod session;
pub mod utils;

use operator_engine::config::Settings;
use operator_engine::sources::notify::Notification;

// Re-export commonly used items
pub use definition::{Args, Command};
pub use utils::determine_log_level;

/// What: Apply global overrides and run the selected subcommand.
///
/// Inputs:
/// - `args`: Parsed command line.
/// - `settings`: Settings loaded from `settings.conf` and the environment.
///
/// Details:
/// - `--api-url` takes precedence over settings and the environment.
/// - Notifications require an active operator session.
pub async fn run(args: Args, mut settings: Settings) {
    if let Some(url) = args.api_url {
        settings.api_base_url = url.trim_end_matches('/').to_string();
    }
    match args.command {
        Command::Inactive(a) => inactive::handle_inactive(&a, &settings).await,
        Command::Metrics { endpoints } => metrics::handle_metrics(&endpoints, &settings).await,
        Command::Health => metrics::handle_health(&settings).await,
        Command::Notify {
            category,
            title,
            body,
            notification_type,
        } => {
            utils::require_session(&settings);
            let notification = Notification {
                category,
                title,
                body,
                notification_type,
            };
            notify::handle_notify(notification, &settings).await;
        }
        Command::Reminders(cmd) => reminders::handle_reminders(&cmd, &settings).await,
        Command::Login => session::handle_login(&settings),
        Command::Logout => session::handle_logout(&settings),
        Command::Session => session::handle_session(&settings),
    }
}
