//! Countdown text shown on widgets.

use chrono::{DateTime, Utc};

/// Text shown when no countdown target is set.
pub const NO_EVENT_TEXT: &str = "Set date";

const SECS_PER_HOUR: i64 = 60 * 60;
const SECS_PER_MINUTE: i64 = 60;

/// Formats the time left until `event_at`.
///
/// Whole calendar days (UTC dates) win once the event is on a later day;
/// below that hours and minutes are rounded up. Events in the past show
/// `"0 min"`.
pub fn countdown_text(event_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(event_at) = event_at else {
        return NO_EVENT_TEXT.to_string();
    };

    let millis = (event_at - now).num_milliseconds();
    if millis <= 0 {
        return "0 min".to_string();
    }

    let days = (event_at.date_naive() - now.date_naive()).num_days().max(0);
    if days >= 1 {
        return format!("{days} days");
    }

    if millis >= SECS_PER_HOUR * 1000 {
        let hours = ceil_div(millis, SECS_PER_HOUR * 1000);
        return format!("{hours} h");
    }

    let minutes = ceil_div(millis, SECS_PER_MINUTE * 1000).max(1);
    format!("{minutes} min")
}

fn ceil_div(value: i64, unit: i64) -> i64 {
    (value + unit - 1) / unit
}
