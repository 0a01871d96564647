//! Start-date gate.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Local calendar date of `now` in `tz`.
#[must_use]
pub fn local_today(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Whether a run at `now` falls before the configured start date.
///
/// The comparison uses the local date in `tz`, so a start of `2026-03-01` in
/// Asia/Seoul opens at 2026-02-28T15:00Z.
#[must_use]
pub fn should_skip_before_start(start: Option<NaiveDate>, tz: Tz, now: DateTime<Utc>) -> bool {
    start.is_some_and(|start| local_today(tz, now) < start)
}
