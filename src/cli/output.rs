//! Terminal formatting shared by the command handlers.
//!
//! Colours come from `colored`, which honours NO_COLOR.

use chrono::{DateTime, Utc};

/// Styles for the fields commands print
pub mod colors {
    use colored::{ColoredString, Colorize};

    pub fn label(s: &str) -> ColoredString {
        s.bold()
    }

    /// Index names and record ids
    pub fn name(s: &str) -> ColoredString {
        s.cyan()
    }

    pub fn file_path(s: &str) -> ColoredString {
        s.blue()
    }

    pub fn number(s: &str) -> ColoredString {
        s.yellow()
    }

    pub fn success(s: &str) -> ColoredString {
        s.green()
    }

    pub fn warning(s: &str) -> ColoredString {
        s.yellow().bold()
    }

    /// Secondary text such as extracted body previews
    pub fn dim(s: &str) -> ColoredString {
        s.dimmed()
    }
}

/// Byte count in binary units, e.g. `8.0 MB`
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// Age of a timestamp in its largest whole unit, e.g. `3d ago`
pub fn format_age(timestamp: &DateTime<Utc>) -> String {
    let age = Utc::now().signed_duration_since(*timestamp);
    if age.num_seconds() < 0 {
        return "in the future".to_string();
    }

    let (count, unit) = if age.num_days() > 0 {
        (age.num_days(), "d")
    } else if age.num_hours() > 0 {
        (age.num_hours(), "h")
    } else if age.num_minutes() > 0 {
        (age.num_minutes(), "m")
    } else {
        return "just now".to_string();
    };
    format!("{count}{unit} ago")
}

/// Shorten text to at most `max` characters, marking the cut
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push_str("...");
    out
}
