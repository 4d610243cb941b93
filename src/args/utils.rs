//! Shared utilities for argument processing.

use operator_engine::config::Settings;

/// What: Determine the log level based on command-line arguments.
///
/// Details:
/// - Verbose flag overrides the `--log-level` argument.
pub fn determine_log_level(args: &crate::args::Args) -> String {
    if args.verbose {
        "debug".to_string()
    } else {
        args.log_level.clone()
    }
}

/// Exit with status 2 unless an operator session is active.
pub fn require_session(settings: &Settings) {
    if !crate::args::session::gate(settings).is_authenticated(chrono::Utc::now()) {
        eprintln!("No active operator session. Run `operator-engine login` first.");
        tracing::warn!("command refused without an operator session");
        std::process::exit(2);
    }
}
