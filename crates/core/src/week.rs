//! Week labels used to bucket the weekly transaction history.
//!
//! Labels have the shape `"{year}-W{n}"`. Two numbering schemes exist:
//!
//! - [`WeekNumbering::Legacy`]: `n = ceil((elapsed_since_jan_1 / one_week + 1) / 7)`,
//!   computed in UTC. This is year-relative and is *not* ISO-8601; it restarts
//!   at every January 1st and each index spans roughly seven calendar weeks.
//!   Kept so existing reports stay byte-for-byte comparable.
//! - [`WeekNumbering::Iso`]: ISO-8601 week-year and week number.

use crate::config::WeekNumbering;
use chrono::{DateTime, Datelike, Timelike, Utc};

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
const MS_PER_WEEK: f64 = (7 * MS_PER_DAY) as f64;

/// Label for `ts` under the given numbering scheme.
pub fn week_label(ts: DateTime<Utc>, numbering: WeekNumbering) -> String {
    match numbering {
        WeekNumbering::Legacy => legacy_week_label(ts),
        WeekNumbering::Iso => iso_week_label(ts),
    }
}

pub fn legacy_week_label(ts: DateTime<Utc>) -> String {
    format!("{}-W{}", ts.year(), legacy_week_number(ts))
}

/// Year-relative week index, 1-based.
pub fn legacy_week_number(ts: DateTime<Utc>) -> u32 {
    let elapsed_ms = ts.ordinal0() as i64 * MS_PER_DAY
        + ts.num_seconds_from_midnight() as i64 * 1000
        + ts.timestamp_subsec_millis() as i64;
    ((elapsed_ms as f64 / MS_PER_WEEK + 1.0) / 7.0).ceil() as u32
}

pub fn iso_week_label(ts: DateTime<Utc>) -> String {
    let iso = ts.iso_week();
    format!("{}-W{}", iso.year(), iso.week())
}
