use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Wire format for calendar dates (`2026-01-01`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// ===============================
/// Parsing
/// ===============================

/// Parse a `YYYY-MM-DD` date, `None` for anything else.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

pub fn is_valid_date(value: &str) -> bool {
    parse_date(value).is_some()
}

/// Accepts `09:00` as well as `09:00:30`.
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// ===============================
/// Comparisons
/// ===============================

/// True when start and end are different days.
pub fn is_range(start: NaiveDate, end: NaiveDate) -> bool {
    start != end
}

/// Inclusive interval overlap.
pub fn overlaps(
    start_a: NaiveDate,
    end_a: NaiveDate,
    start_b: NaiveDate,
    end_b: NaiveDate,
) -> bool {
    start_a <= end_b && start_b <= end_a
}

/// Whole days from `today` to `date`; negative once the date has passed.
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Timing {
    Upcoming,
    Past,
}

/// A span starting today is still upcoming.
pub fn classify(span: DateSpan, today: NaiveDate) -> Timing {
    if span.start >= today {
        Timing::Upcoming
    } else {
        Timing::Past
    }
}

/// Closed calendar interval, `end >= start` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (end >= start).then_some(Self { start, end })
    }

    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        overlaps(self.start, self.end, date, date)
    }

    /// Inclusive length in days; a single day counts as 1.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}
