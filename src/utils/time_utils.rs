use chrono::DateTime;

pub use web_time::Instant as AppInstant;

pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Candle time for display. Out-of-range values print as the raw number.
pub fn epoch_sec_to_string(epoch_sec: i64) -> String {
    format_epoch_sec(epoch_sec, STANDARD_TIME_FORMAT)
}

pub fn epoch_sec_to_date(epoch_sec: i64) -> String {
    format_epoch_sec(epoch_sec, DATE_FORMAT)
}

fn format_epoch_sec(epoch_sec: i64, fmt: &str) -> String {
    match DateTime::from_timestamp(epoch_sec, 0) {
        Some(dt) => dt.format(fmt).to_string(),
        None => epoch_sec.to_string(),
    }
}

/// Compact span such as `45s`, `3h`, `2d` or `1Y 2M`.
pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    if secs < 60 {
        return format!("{}s", secs);
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{}m", mins);
    }
    let hours = mins / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }
    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }
    let months = days / 30;
    if months < 12 {
        return format!("{}M", months);
    }
    format!("{}Y {}M", months / 12, months % 12)
}
