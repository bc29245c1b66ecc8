//! Calendar-day helpers.
//!
//! Quota rows are keyed by the UTC calendar day in `YYYY-MM-DD` form.

use time::{Date, OffsetDateTime};

/// Format a date as `YYYY-MM-DD`.
#[inline]
pub fn utc_day(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Today's UTC calendar day as `YYYY-MM-DD`.
#[inline]
pub fn today_utc() -> String {
    utc_day(OffsetDateTime::now_utc().date())
}
