use std::fs;

use tracing::{debug, warn};

use super::paths::resolve_settings_config_path;
use super::types::Settings;

/// Environment variable overriding `api_base_url`.
pub const API_URL_ENV: &str = "OPERATOR_ENGINE_API_URL";

/// Load user settings from `settings.conf`.
/// Falls back to `Settings::default()` when missing or invalid.
pub fn settings() -> Settings {
    let mut out = resolve_settings_config_path()
        .and_then(|p| {
            debug!(path = %p.display(), "loading settings");
            fs::read_to_string(&p).ok()
        })
        .map_or_else(Settings::default, |content| parse_settings(&content));
    if let Ok(url) = std::env::var(API_URL_ENV)
        && !url.trim().is_empty()
    {
        out.api_base_url = url.trim().trim_end_matches('/').to_string();
    }
    out
}

/// What: Parse the contents of a settings file on top of the defaults.
///
/// Inputs:
/// - `content`: Raw `key = value` text.
///
/// Output:
/// - `Settings` with every recognised, valid key applied.
///
/// Details:
/// - Skips blank lines and `#` / `//` comments; strips inline comments.
/// - Keys are lowercased and `.`, `-`, space become `_`.
/// - Unknown keys and unparsable values are ignored (defaults kept).
#[must_use]
pub fn parse_settings(content: &str) -> Settings {
    let mut out = Settings::default();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
            continue;
        }
        let Some((raw_key, val_raw)) = trimmed.split_once('=') else {
            continue;
        };
        let key = raw_key.trim().to_lowercase().replace(['.', '-', ' '], "_");
        let val = strip_inline_comment(val_raw.trim());
        apply_setting(&mut out, &key, val);
    }
    out
}

/// Apply one normalised `key = value` pair.
fn apply_setting(out: &mut Settings, key: &str, val: &str) {
    match key {
        "api_base_url" | "api_url" => {
            if !val.is_empty() {
                out.api_base_url = val.trim_end_matches('/').to_string();
            }
        }
        "supabase_url" => out.supabase_url = val.trim_end_matches('/').to_string(),
        "supabase_anon_key" | "supabase_key" => out.supabase_anon_key = val.to_string(),
        "items_per_page" | "page_size" => {
            if let Ok(v) = val.parse::<usize>()
                && v > 0
            {
                out.items_per_page = v;
            }
        }
        "request_timeout_secs" => {
            if let Ok(v) = val.parse::<u64>()
                && v > 0
            {
                out.request_timeout_secs = v;
            }
        }
        "cache_ttl_secs" => {
            if let Ok(v) = val.parse::<u64>() {
                out.cache_ttl_secs = v;
            }
        }
        "cache_capacity" => {
            if let Ok(v) = val.parse::<usize>()
                && v > 0
            {
                out.cache_capacity = v;
            }
        }
        "max_retries" => {
            if let Ok(v) = val.parse::<u32>() {
                out.max_retries = v;
            }
        }
        "retry_base_delay_ms" => {
            if let Ok(v) = val.parse::<u64>() {
                out.retry_base_delay_ms = v;
            }
        }
        "retry_jitter_max_ms" => {
            if let Ok(v) = val.parse::<u64>() {
                out.retry_jitter_max_ms = v;
            }
        }
        "debounce_ms" => {
            if let Ok(v) = val.parse::<u64>() {
                out.debounce_ms = v;
            }
        }
        "filter_date_window_days" => {
            if let Ok(v) = val.parse::<i64>()
                && v > 0
            {
                out.filter_date_window_days = v;
            }
        }
        "metric_endpoints" => {
            let parsed: Vec<u32> = split_list(val)
                .filter_map(|s| s.parse::<u32>().ok())
                .collect();
            if !parsed.is_empty() {
                out.metric_endpoints = parsed;
            }
        }
        "session_hours" => {
            if let Ok(v) = val.parse::<u64>()
                && v > 0
            {
                out.session_hours = v;
            }
        }
        "operator_passwords" => {
            out.operator_passwords = split_list(val).map(str::to_string).collect();
        }
        "selection_decay" => {
            if let Ok(v) = val.parse::<f64>()
                && v > 0.0
                && v <= 1.0
            {
                out.selection_decay = v;
            }
        }
        _ => {
            warn!(key, "ignoring unknown settings key");
        }
    }
}

/// Split a comma/space separated list, dropping empty items.
fn split_list(val: &str) -> impl Iterator<Item = &str> {
    val.split([',', ' '])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Strip a trailing `//` or ` #` comment from a value.
///
/// A `#` is only treated as a comment when preceded by whitespace so values
/// such as `https://host/#frag` or passwords containing `#` survive.
pub(crate) fn strip_inline_comment(mut s: &str) -> &str {
    if let Some(i) = s.find(" //") {
        s = &s[..i];
    }
    if let Some(i) = s.find(" #") {
        s = &s[..i];
    }
    s.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Defaults survive an empty file and match the documented constants.
    fn settings_defaults_when_empty() {
        let s = parse_settings("");
        assert_eq!(s, Settings::default());
        assert_eq!(s.items_per_page, 100);
        assert_eq!(s.request_timeout_secs, 90);
        assert_eq!(s.cache_ttl_secs, 300);
        assert_eq!(s.cache_capacity, 10);
        assert_eq!(s.max_retries, 2);
        assert_eq!(s.retry_base_delay_ms, 2000);
        assert_eq!(s.debounce_ms, 300);
        assert_eq!(s.session_hours, 2);
    }

    #[test]
    /// What: Keys are normalised, comments stripped and invalid values ignored.
    ///
    /// Inputs:
    /// - A config mixing comment styles, dashed/dotted keys and bad numbers.
    ///
    /// Output:
    /// - Valid keys applied; invalid ones keep their defaults.
    fn settings_parse_normalises_keys_and_ignores_bad_values() {
        let conf = r"
# comment
// another comment
API-Base-URL = https://api.example.test/   # trailing comment
items.per.page = 25
cache_capacity = 0
max_retries = nope
metric_endpoints = 1, 2,100
operator_passwords = 2030 data
selection_decay = 1.5
unknown_key = 1
";
        let s = parse_settings(conf);
        assert_eq!(s.api_base_url, "https://api.example.test");
        assert_eq!(s.items_per_page, 25);
        assert_eq!(s.cache_capacity, 10);
        assert_eq!(s.max_retries, 2);
        assert_eq!(s.metric_endpoints, vec![1, 2, 100]);
        assert_eq!(s.operator_passwords, vec!["2030", "data"]);
        assert!((s.selection_decay - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn strip_inline_comment_variants() {
        assert_eq!(strip_inline_comment("abc // hi"), "abc");
        assert_eq!(strip_inline_comment("pa#ss # tail"), "pa#ss");
        assert_eq!(strip_inline_comment("https://x.test/a"), "https://x.test/a");
    }
}
