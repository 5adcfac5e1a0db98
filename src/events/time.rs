//! Temporal normalization.
//!
//! Every date and time a record carries passes through here exactly once:
//! raw strings are resolved into the viewer's zone, formatted for display
//! and reduced to a [`ComparisonKey`]. Malformed input never fails; it
//! yields TBA markers and the unscheduled key.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::models::{DATE_TBA, TIME_TBA};

/// Display format for dates: "June 15, 2025"
const DATE_FORMAT: &str = "%B %-d, %Y";
/// Display format for times: "9:05 PM"
const CLOCK_FORMAT: &str = "%-I:%M %p";

/// Offset-less ISO layouts, read as wall-clock time in the viewer's zone
const LOCAL_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// ISO layouts with an explicit offset that RFC 3339 parsing rejects:
/// minute precision or a basic `+hhmm` offset
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
];

/// Date layouts the scrapers have written over time
const LEGACY_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%b. %d, %Y",
    "%m/%d/%Y",
];

const LEGACY_TIME_FORMATS: &[&str] = &["%I:%M %p", "%I:%M%p", "%H:%M"];

/// One side of an event window, already in the viewer's zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalInstant {
    /// A specific wall-clock moment
    At(NaiveDateTime),
    /// A whole day with no time of day
    Day(NaiveDate),
}

impl LocalInstant {
    /// Moment a window starting here opens
    pub fn opening(&self) -> NaiveDateTime {
        match self {
            LocalInstant::At(at) => *at,
            LocalInstant::Day(day) => day.and_time(NaiveTime::MIN),
        }
    }

    /// Moment a window ending here closes
    pub fn closing(&self) -> NaiveDateTime {
        match self {
            LocalInstant::At(at) => *at,
            LocalInstant::Day(day) => day.and_time(end_of_day()),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.opening().date()
    }
}

/// Total ordering key for events.
///
/// Orders by calendar date, then by minutes since midnight. `Unscheduled`
/// sorts after every scheduled key and stands in for a far-future date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComparisonKey {
    At { date: NaiveDate, minute_of_day: u32 },
    Unscheduled,
}

impl ComparisonKey {
    pub fn from_start(starts_at: Option<NaiveDateTime>) -> Self {
        match starts_at {
            Some(at) => ComparisonKey::At {
                date: at.date(),
                minute_of_day: at.hour() * 60 + at.minute(),
            },
            None => ComparisonKey::Unscheduled,
        }
    }

    /// Key of local midnight on `date`
    pub fn start_of(date: NaiveDate) -> Self {
        ComparisonKey::At {
            date,
            minute_of_day: 0,
        }
    }
}

/// Display strings and comparable start derived from a window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalFields {
    pub start_date: String,
    pub start_time: String,
    pub end_time: String,
    pub starts_at: Option<NaiveDateTime>,
}

impl TemporalFields {
    /// Fields for a record with no usable start
    pub fn unscheduled() -> Self {
        Self {
            start_date: DATE_TBA.to_string(),
            start_time: TIME_TBA.to_string(),
            end_time: TIME_TBA.to_string(),
            starts_at: None,
        }
    }
}

/// Derive display fields from a start and optional end.
///
/// A day-only start opens at midnight and a day-only end closes at 23:59,
/// so an all-day record always formats as "12:00 AM" / "11:59 PM".
pub fn normalize(start: Option<LocalInstant>, end: Option<LocalInstant>) -> TemporalFields {
    let Some(start) = start else {
        let mut fields = TemporalFields::unscheduled();
        if let Some(end) = end {
            fields.end_time = format_clock(end.closing().time());
        }
        return fields;
    };

    let opening = start.opening();
    let end_time = match (end, start) {
        (Some(end), _) => format_clock(end.closing().time()),
        (None, LocalInstant::Day(_)) => format_clock(end_of_day()),
        (None, LocalInstant::At(_)) => TIME_TBA.to_string(),
    };

    TemporalFields {
        start_date: format_date(opening.date()),
        start_time: format_clock(opening.time()),
        end_time,
        starts_at: Some(opening),
    }
}

/// Resolve an ISO-8601 string into the viewer's zone.
///
/// Strings with an offset are converted; offset-less date-times are taken
/// as wall-clock time in `tz`; a bare `YYYY-MM-DD` is a whole day.
pub fn parse_instant(raw: &str, tz: &Tz) -> Option<LocalInstant> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(LocalInstant::At(dt.with_timezone(tz).naive_local()));
    }

    let with_offset = match raw.strip_suffix(|c: char| c == 'Z' || c == 'z') {
        Some(utc) => format!("{}+00:00", utc),
        None => raw.to_string(),
    };
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&with_offset, format) {
            return Some(LocalInstant::At(dt.with_timezone(tz).naive_local()));
        }
    }

    for format in LOCAL_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(LocalInstant::At(naive));
        }
    }

    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(LocalInstant::Day(day));
    }

    debug!("Unparseable instant '{}'", raw);
    None
}

/// Parse a date written by an older scraper ("Sep 5 2025", "9/5/2025", ...)
pub fn parse_legacy_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    LEGACY_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Parse a clock time such as "7:00 pm", "11:30AM" or "19:00"
pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim().to_uppercase();
    LEGACY_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(&raw, format).ok())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_clock(time: NaiveTime) -> String {
    time.format(CLOCK_FORMAT).to_string()
}

/// Midnight at the start of `now`'s local day
pub fn today_in<T: TimeZone>(now: DateTime<T>, tz: &Tz) -> NaiveDate {
    now.with_timezone(tz).date_naive()
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN)
}
