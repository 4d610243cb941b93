//! Settings and filesystem locations.
//!
//! Settings live in a line-oriented `settings.conf`; everything has a default
//! so a missing file is never an error.

/// Path resolution for config directories.
mod paths;
/// Settings file parsing.
mod settings;
/// Settings type definitions.
mod types;

pub use paths::{config_dir, logs_dir, session_file};
pub use settings::{API_URL_ENV, parse_settings, settings};
pub use types::Settings;
