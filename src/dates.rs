//! Calendar helpers shared by the scheduler and the statistics queries.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Add whole days to an instant, saturating at chrono's maximum.
pub fn add_days(instant: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    instant
        .checked_add_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Calendar day of `instant` as seen in `tz`.
pub fn day_in<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Human label for how far `target` lies from `now`.
pub fn format_due(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff_days = (target - now).num_milliseconds().div_euclid(MS_PER_DAY);

    match diff_days {
        d if d < -1 => format!("{} days overdue", -d),
        -1 => "1 day overdue".to_string(),
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        d if d <= 7 => format!("In {} days", d),
        d if d <= 30 => format!("In {} weeks", d / 7),
        d if d <= 365 => format!("In {} months", d / 30),
        d => format!("In {} years", d / 365),
    }
}
