//! Command-line reminder templates and automation rules.

use operator_engine::config::Settings;
use operator_engine::logic::selection::pick_weighted;
use operator_engine::sources::reminders::{ReminderStore, RuleStatus, category_slug};

use crate::args::definition::RemindersCommand;
use crate::args::utils::require_session;

/// Print an error and exit with status 1.
fn fail(context: &str, e: &(dyn std::error::Error + Send + Sync)) -> ! {
    eprintln!("{context}: {e}");
    tracing::error!(error = %e, context, "reminders command failed");
    std::process::exit(1);
}

/// What: Run one reminder store operation and print the outcome.
///
/// Details:
/// - Write operations require an active operator session.
/// - `pick --local` fetches the category list and chooses with the
///   weighted selection from settings instead of the server-side pick.
pub async fn handle_reminders(cmd: &RemindersCommand, settings: &Settings) {
    tracing::info!(command = ?cmd, "reminders requested from CLI");
    let store = match ReminderStore::new(&settings.supabase_url, &settings.supabase_anon_key) {
        Ok(s) => s,
        Err(e) => fail("Reminder store unavailable", e.as_ref()),
    };
    match cmd {
        RemindersCommand::Categories => match store.categories().await {
            Ok(categories) => {
                for c in categories {
                    println!("{} ({} messages)", c.name, c.messages.len());
                    for m in &c.messages {
                        println!("  {}_{}  {}: {}", c.id, m.id, m.title, m.content);
                    }
                }
            }
            Err(e) => fail("Failed to load categories", e.as_ref()),
        },
        RemindersCommand::Rules => match store.automation_rules().await {
            Ok(rules) => {
                for r in rules {
                    println!(
                        "#{:<3} [{}] {} | when: {} | then: {} | category: {}",
                        r.id, r.status, r.name, r.trigger, r.action, r.category
                    );
                }
            }
            Err(e) => fail("Failed to load automation rules", e.as_ref()),
        },
        RemindersCommand::Add {
            category,
            title,
            message,
        } => {
            require_session(settings);
            match store.add_reminder(category, title, message).await {
                Ok(r) => println!("Added {} to {}", r.reminder_id, r.category),
                Err(e) => fail("Failed to add reminder", e.as_ref()),
            }
        }
        RemindersCommand::Update { id, title, message } => {
            require_session(settings);
            match store.update_reminder(id, title, message).await {
                Ok(r) => println!("Updated {}", r.reminder_id),
                Err(e) => fail("Failed to update reminder", e.as_ref()),
            }
        }
        RemindersCommand::AddCategory { name } => {
            require_session(settings);
            match store.add_category(name).await {
                Ok(_) => println!("Added category {name} ({})", category_slug(name)),
                Err(e) => fail("Failed to add category", e.as_ref()),
            }
        }
        RemindersCommand::Toggle { id, status } => {
            require_session(settings);
            let status: RuleStatus = match status.parse() {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            };
            match store.toggle_rule(id, status).await {
                Ok(_) => println!("Rule {id} is now {status}"),
                Err(e) => fail("Failed to toggle rule", e.as_ref()),
            }
        }
        RemindersCommand::Pick {
            rule_id,
            category,
            local,
        } => {
            if *local {
                pick_local(&store, category, settings.selection_decay).await;
            } else {
                match store.smart_message_selection(rule_id, category).await {
                    Ok(sel) => println!(
                        "{}: {} ({} candidates)",
                        sel.selected_message.title,
                        sel.selected_message.message,
                        sel.total_messages
                    ),
                    Err(e) => fail("Smart selection failed", e.as_ref()),
                }
            }
        }
    }
}

/// Choose a message from `category` with the local weighted pick.
async fn pick_local(store: &ReminderStore, category: &str, decay: f64) {
    let categories = match store.categories().await {
        Ok(c) => c,
        Err(e) => fail("Failed to load categories", e.as_ref()),
    };
    let slug = category_slug(category);
    let Some(found) = categories
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(category) || c.id == slug)
    else {
        eprintln!("Unknown category: {category}");
        std::process::exit(1);
    };
    match pick_weighted(&found.messages, decay) {
        Some(m) => println!("{}: {} ({} candidates)", m.title, m.content, found.messages.len()),
        None => {
            eprintln!("Category {} has no messages", found.name);
            std::process::exit(1);
        }
    }
}
