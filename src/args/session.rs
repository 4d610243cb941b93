//! Command-line operator session management.

use operator_engine::config::{Settings, session_file};
use operator_engine::logic::session::{SessionGate, SessionStatus, format_remaining, is_expiring};

/// Gate over the configured session file and passwords.
pub fn gate(settings: &Settings) -> SessionGate {
    SessionGate::new(
        session_file(),
        settings.operator_passwords.clone(),
        settings.session_lifetime(),
    )
}

/// What: Prompt for the operator password and start a session.
///
/// Details:
/// - The password is read without echo and wiped after the check.
/// - Exits with status 1 when rejected or when no passwords are configured.
pub fn handle_login(settings: &Settings) {
    tracing::info!("login requested from CLI");
    if settings.operator_passwords.is_empty() {
        eprintln!("No operator passwords configured (set operator_passwords in settings.conf).");
        std::process::exit(1);
    }
    let password = match rpassword::prompt_password("Operator password: ") {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to read password: {e}");
            std::process::exit(1);
        }
    };
    match gate(settings).login(password, chrono::Utc::now()) {
        Ok(true) => println!(
            "Signed in for {}.",
            format_remaining(SessionStatus::Active(settings.session_lifetime()))
        ),
        Ok(false) => {
            eprintln!("Incorrect password.");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to save session: {e}");
            tracing::error!(error = %e, "failed to persist session");
            std::process::exit(1);
        }
    }
}

/// End the session.
pub fn handle_logout(settings: &Settings) {
    if let Err(e) = gate(settings).logout() {
        eprintln!("Failed to remove session: {e}");
        std::process::exit(1);
    }
    println!("Signed out.");
}

/// Print the session state and remaining time.
pub fn handle_session(settings: &Settings) {
    let status = gate(settings).status(chrono::Utc::now());
    let suffix = if is_expiring(status) {
        " (expiring soon)"
    } else {
        ""
    };
    println!("{}{suffix}", format_remaining(status));
}
