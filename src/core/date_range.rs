//! Calendar-day handling for trip dates.
//!
//! Dates coming out of the content backend are either plain `YYYY-MM-DD`
//! strings or ISO-8601 timestamps with a `T`-separated time and an offset.
//! Everything here works on whole calendar days so that neither the time of
//! day nor the viewer's time zone can move a trip by one day.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Display text for a start date that cannot be parsed.
pub const INVALID_DATE: &str = "Invalid date";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(CalendarDate)
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn month_abbrev(&self) -> String {
        self.0.format("%b").to_string()
    }

    fn same_month_as(&self, other: &CalendarDate) -> bool {
        self.0.year() == other.0.year() && self.0.month() == other.0.month()
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        CalendarDate(date)
    }
}

impl fmt::Display for CalendarDate {
    /// `Sep 15`: abbreviated month, unpadded day, no year.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month_abbrev(), self.day())
    }
}

/// A raw date-like value as handed over by a content entry or a caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawDate<'a> {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(&'a str),
    Unsupported,
}

impl<'a> From<&'a str> for RawDate<'a> {
    fn from(text: &'a str) -> Self {
        RawDate::Text(text)
    }
}

impl<'a> From<&'a String> for RawDate<'a> {
    fn from(text: &'a String) -> Self {
        RawDate::Text(text.as_str())
    }
}

impl From<NaiveDate> for RawDate<'_> {
    fn from(date: NaiveDate) -> Self {
        RawDate::Date(date)
    }
}

impl From<NaiveDateTime> for RawDate<'_> {
    fn from(date_time: NaiveDateTime) -> Self {
        RawDate::DateTime(date_time)
    }
}

impl From<CalendarDate> for RawDate<'_> {
    fn from(date: CalendarDate) -> Self {
        RawDate::Date(date.0)
    }
}

impl<'a> From<&'a Value> for RawDate<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::String(text) => RawDate::Text(text.as_str()),
            _ => RawDate::Unsupported,
        }
    }
}

/// Parses a raw date down to its calendar day. Returns `None` (after logging)
/// for anything that is not a real date; never panics.
pub fn parse_calendar_date<'a>(raw: impl Into<RawDate<'a>>) -> Option<CalendarDate> {
    match raw.into() {
        RawDate::Date(date) => Some(CalendarDate(date)),
        RawDate::DateTime(date_time) => Some(CalendarDate(date_time.date())),
        RawDate::Text(text) => {
            let parsed = parse_date_text(text);
            if parsed.is_none() {
                tracing::warn!(input = text, "could not parse calendar date");
            }
            parsed
        }
        RawDate::Unsupported => {
            tracing::warn!("date value is neither a string nor a date");
            None
        }
    }
}

fn parse_date_text(text: &str) -> Option<CalendarDate> {
    // 只取 T 之前的日期部分，時間與時區一律丟掉
    let date_part = text.trim().split('T').next().unwrap_or_default();

    let mut parts = date_part.split('-');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    CalendarDate::new(
        year.parse().ok()?,
        month.parse().ok()?,
        day.parse().ok()?,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Upcoming,
    Current,
    Past,
}

/// A trip's duration in whole days. `end` absent means a single-day trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeInterval {
    pub start: CalendarDate,
    pub end: Option<CalendarDate>,
}

impl TimeInterval {
    pub fn new(start: CalendarDate, end: Option<CalendarDate>) -> Self {
        Self { start, end }
    }

    /// `None` when the start cannot be parsed. An unparseable end is dropped.
    pub fn resolve<'a>(start: impl Into<RawDate<'a>>, end: Option<RawDate<'_>>) -> Option<Self> {
        let start = parse_calendar_date(start)?;
        let end = end.and_then(|raw| parse_calendar_date(raw));
        Some(Self { start, end })
    }

    pub fn last_day(&self) -> CalendarDate {
        self.end.unwrap_or(self.start)
    }

    /// An end before the start leaves the interval without any day in it.
    pub fn is_degenerate(&self) -> bool {
        self.last_day() < self.start
    }

    pub fn contains(&self, day: CalendarDate) -> bool {
        self.start <= day && day <= self.last_day()
    }

    pub fn status_on(&self, today: CalendarDate) -> TripStatus {
        if self.contains(today) {
            TripStatus::Current
        } else if self.start > today {
            TripStatus::Upcoming
        } else {
            TripStatus::Past
        }
    }

    pub fn display(&self) -> String {
        match self.end {
            Some(end) if end > self.start => {
                if self.start.same_month_as(&end) {
                    format!("{}-{}", self.start, end.day())
                } else {
                    format!("{} - {}", self.start, end)
                }
            }
            _ => self.start.to_string(),
        }
    }
}

pub fn format_date_range<'a>(start: impl Into<RawDate<'a>>, end: Option<RawDate<'_>>) -> String {
    match TimeInterval::resolve(start, end) {
        Some(interval) => interval.display(),
        None => INVALID_DATE.to_string(),
    }
}

pub fn local_today() -> CalendarDate {
    CalendarDate(Local::now().date_naive())
}

/// Whether the trip covers the local calendar day.
pub fn is_interval_current<'a>(start: impl Into<RawDate<'a>>, end: Option<RawDate<'_>>) -> bool {
    is_interval_current_on(start, end, local_today())
}

pub fn is_interval_current_on<'a>(
    start: impl Into<RawDate<'a>>,
    end: Option<RawDate<'_>>,
    today: CalendarDate,
) -> bool {
    TimeInterval::resolve(start, end)
        .map(|interval| interval.contains(today))
        .unwrap_or(false)
}

/// Strictly between the end of one stop and the start of the next. The
/// boundary days themselves do not count.
pub fn is_at_sea(previous: &TimeInterval, next: &TimeInterval, today: CalendarDate) -> bool {
    previous.last_day() < today && today < next.start
}
