//! Command-line argument definition.

use clap::{Parser, Subcommand};

/// Operator Engine - back-office for metrics, inactive-user reports, notifications and reminders
#[derive(Parser, Debug)]
#[command(name = "operator-engine")]
#[command(version)]
#[command(about = "Back-office for metrics, inactive-user reports, notifications and reminders", long_about = None)]
pub struct Args {
    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Enable verbose output (equivalent to --log-level debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the API base URL from settings
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List inactive paid users
    Inactive(InactiveArgs),
    /// Show dashboard metrics
    Metrics {
        /// Endpoint numbers to query (defaults to `metric_endpoints` from settings)
        #[arg(num_args = 0..)]
        endpoints: Vec<u32>,
    },
    /// Check API health
    Health,
    /// Send a push notification to a category of users
    Notify {
        /// Target category
        #[arg(short, long)]
        category: String,
        /// Notification title
        #[arg(short, long)]
        title: String,
        /// Notification text
        #[arg(short, long)]
        body: String,
        /// Delivery channel hint (e.g. push, sms)
        #[arg(long = "type")]
        notification_type: Option<String>,
    },
    /// Manage message templates and automation rules
    #[command(subcommand)]
    Reminders(RemindersCommand),
    /// Start an operator session (password prompt)
    Login,
    /// End the operator session
    Logout,
    /// Show the operator session state
    Session,
}

/// Filters and paging for the inactive users report.
#[derive(clap::Args, Debug)]
pub struct InactiveArgs {
    /// Minimum days since last login
    #[arg(short, long, default_value_t = 15)]
    pub days: u32,
    /// Only users registered on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub registered_after: Option<String>,
    /// Only users whose subscription ends on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub subscription_ends_before: Option<String>,
    /// Only users with a phone number
    #[arg(long)]
    pub require_phone: bool,
    /// Page to show
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,
    /// Rows per page (defaults to `items_per_page` from settings)
    #[arg(long)]
    pub per_page: Option<usize>,
}

/// Reminder store operations.
#[derive(Subcommand, Debug)]
pub enum RemindersCommand {
    /// List categories and their messages
    Categories,
    /// List automation rules
    Rules,
    /// Add a message to a category
    Add {
        /// Category name
        category: String,
        /// Message title
        title: String,
        /// Message text
        message: String,
    },
    /// Change a message
    Update {
        /// Reminder id
        id: String,
        /// New title
        title: String,
        /// New text
        message: String,
    },
    /// Create a category
    AddCategory {
        /// Category name
        name: String,
    },
    /// Set an automation rule's status (active or paused)
    Toggle {
        /// Rule id
        id: String,
        /// New status
        status: String,
    },
    /// Pick a message for an automation rule
    Pick {
        /// Rule id
        rule_id: String,
        /// Category of the rule
        category: String,
        /// Choose locally from the category's messages instead of asking the server
        #[arg(long)]
        local: bool,
    },
}
