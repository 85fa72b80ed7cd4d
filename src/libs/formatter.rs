//! Time formatting for the status line and the break prompt.
//!
//! ```rust
//! use chrono::TimeDelta;
//! use teumnirm::libs::formatter::format_countdown;
//!
//! assert_eq!(format_countdown(&TimeDelta::seconds(3299)), "54:59");
//! assert_eq!(format_countdown(&TimeDelta::seconds(-5)), "00:00");
//! ```

use chrono::{DateTime, Local, TimeDelta, Utc};

/// Formats a duration as `MM:SS`.
///
/// Minutes are not wrapped into hours, so a 90 minute interval reads
/// `90:00`. Negative durations are shown as `00:00`.
pub fn format_countdown(duration: &TimeDelta) -> String {
    let total = duration.num_seconds().max(0);
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Formats a duration for prompts, e.g. `55 min` or `45 s`.
pub fn format_minutes(duration: &TimeDelta) -> String {
    let total = duration.num_seconds().max(0);
    if total >= 60 && total % 60 == 0 {
        format!("{} min", total / 60)
    } else if total >= 60 {
        format!("{} min {} s", total / 60, total % 60)
    } else {
        format!("{} s", total)
    }
}

/// Wall-clock time in the local timezone, `HH:MM`.
pub fn format_clock(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M").to_string()
}
