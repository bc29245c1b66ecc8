//! Stored record types.

use mentob_core::DrawnCard;
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime};

use crate::error::StoreError;

/// Per-user, per-day interpretation counter.
///
/// At most one record exists per `(user_id, date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaRecord {
    pub user_id: String,
    /// UTC calendar day, `YYYY-MM-DD`.
    pub date: String,
    pub count: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A completed reading, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInterpretation {
    pub user_id: String,
    pub question: String,
    pub spread_type: String,
    pub cards: Vec<DrawnCard>,
    pub interpretation: String,
}

/// A persisted reading.
///
/// The `id` doubles as the share link: anyone holding it can read the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterpretationRecord {
    pub id: String,
    pub user_id: String,
    pub question: String,
    pub spread_type: String,
    pub cards: Vec<DrawnCard>,
    pub interpretation: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl InterpretationRecord {
    pub(crate) fn from_new(new: NewInterpretation, id: String, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            user_id: new.user_id,
            question: new.question,
            spread_type: new.spread_type,
            cards: new.cards,
            interpretation: new.interpretation,
            created_at,
        }
    }
}

/// Current time truncated to millisecond precision, the resolution stored
/// by every backend.
#[inline]
pub(crate) fn now_millis() -> OffsetDateTime {
    from_millis(to_millis(OffsetDateTime::now_utc()))
}

#[inline]
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn to_millis(t: OffsetDateTime) -> i64 {
    (t.unix_timestamp_nanos() / 1_000_000) as i64
}

#[inline]
pub(crate) fn from_millis(ms: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

/// Millisecond bounds `[start, end)` of a `YYYY-MM-DD` UTC day.
pub(crate) fn day_bounds_millis(day: &str) -> Result<(i64, i64), StoreError> {
    let date = Date::parse(day, format_description!("[year]-[month]-[day]"))
        .map_err(|e| StoreError::Serialization(format!("invalid date {day:?}: {e}")))?;
    let start = date.midnight().assume_utc();
    let end = start + Duration::days(1);
    Ok((to_millis(start), to_millis(end)))
}
