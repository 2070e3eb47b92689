// ── Query time window ──

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::period::Period;

/// A closed UTC interval, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Anchor a window `days_back` whole days before `now`, spanning `period`.
    ///
    /// With `days_back == 0` the window starts at `now` and ends in the
    /// future; the controller simply returns what it has so far.
    pub fn anchored(
        now: DateTime<Utc>,
        days_back: u32,
        period: &Period,
    ) -> Result<Self, CoreError> {
        let out_of_range = || CoreError::InvalidWindow {
            reason: format!("{days_back} days back spanning {period} is out of range"),
        };

        let start = TimeDelta::try_days(i64::from(days_back))
            .and_then(|back| now.checked_sub_signed(back))
            .ok_or_else(out_of_range)?;
        let end = TimeDelta::try_milliseconds(period.as_millis())
            .and_then(|span| start.checked_add_signed(span))
            .ok_or_else(out_of_range)?;

        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// RFC 3339 with millisecond precision and a `Z` suffix.
    pub fn start_rfc3339(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// RFC 3339 with millisecond precision and a `Z` suffix.
    pub fn end_rfc3339(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
