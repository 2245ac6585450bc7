//! Display formatting for dates and times shown on pages and in emails.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Timelike, Utc};

/// `14:30` -> `2:30 PM`. Unparsable input is returned unchanged.
pub fn time_12h(value: &str) -> String {
    let Ok(time) = NaiveTime::parse_from_str(value.get(..5).unwrap_or(value), "%H:%M") else {
        return value.to_string();
    };
    let (pm, hour) = time.hour12();
    let suffix = if pm { "PM" } else { "AM" };
    format!("{hour}:{:02} {suffix}", time.minute())
}

/// `Monday, October 19, 2026`
pub fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// `Mon, Oct 19, 2026`
pub fn short_date(date: NaiveDate) -> String {
    date.format("%a, %b %-d, %Y").to_string()
}

/// `Oct 19, 2026`
pub fn day_only(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%b %-d, %Y").to_string()
}

/// `Oct 19, 2026, 2:30 PM` in the server's local time zone.
pub fn date_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%b %-d, %Y, %-I:%M %p").to_string()
}
