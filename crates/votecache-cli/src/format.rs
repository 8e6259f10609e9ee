use chrono::{DateTime, Utc};
use votecache_core::models::PositionCounts;
use votecache_core::Position;

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a byte count with a binary unit
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Format how long ago `then` was, e.g. "3h ago"
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now - then;
    if age.num_days() > 0 {
        format!("{}d ago", age.num_days())
    } else if age.num_hours() > 0 {
        format!("{}h ago", age.num_hours())
    } else if age.num_minutes() > 0 {
        format!("{}m ago", age.num_minutes())
    } else {
        "just now".to_string()
    }
}

/// One-line position totals, e.g. "For 329 | Against 275 | ..."
pub fn format_counts(counts: &PositionCounts) -> String {
    Position::CODE_ORDER
        .iter()
        .map(|&position| format!("{} {}", position.label(), counts.get(position)))
        .collect::<Vec<_>>()
        .join(" | ")
}
