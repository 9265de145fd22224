//! Schedule dates as supplied by planners and the job catalog.
//!
//! Dates are stored verbatim because upstream data is not always clean. The
//! calendar date is taken from the first ten characters (`YYYY-MM-DD`);
//! values that do not parse are treated as absent by every derived view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
const ISO_DATE_LEN: usize = 10;

/// ISO-8601 date string (optionally with a time suffix) as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleDate(String);

impl ScheduleDate {
    /// Wraps a raw date string. Blank input yields `None`.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let raw = value.into();
        let normalized = raw.trim();
        (!normalized.is_empty()).then(|| Self(normalized.to_owned()))
    }

    /// Formats a calendar date as `YYYY-MM-DD`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format(ISO_DATE_FORMAT).to_string())
    }

    /// Returns the raw string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the date portion, returning `None` when it is malformed.
    ///
    /// The prefix must be zero-padded `YYYY-MM-DD`; `2026-3-5` is malformed.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        let prefix = self.0.get(..ISO_DATE_LEN)?;
        NaiveDate::parse_from_str(prefix, ISO_DATE_FORMAT)
            .ok()
            .filter(|date| date.format(ISO_DATE_FORMAT).to_string() == prefix)
    }

    /// Returns `true` when the date parses and falls strictly before `today`.
    #[must_use]
    pub fn is_before(&self, today: NaiveDate) -> bool {
        self.date().is_some_and(|date| date < today)
    }

    /// Returns `true` when the raw value is exactly `day` as `YYYY-MM-DD`.
    #[must_use]
    pub fn is_on(&self, day: NaiveDate) -> bool {
        self.0 == day.format(ISO_DATE_FORMAT).to_string()
    }
}

impl AsRef<str> for ScheduleDate {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ScheduleDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signed number of days from `today` until `date`.
///
/// Missing or malformed dates count as zero.
#[must_use]
pub fn days_until(date: Option<&ScheduleDate>, today: NaiveDate) -> i64 {
    date.and_then(ScheduleDate::date)
        .map_or(0, |target| target.signed_duration_since(today).num_days())
}
