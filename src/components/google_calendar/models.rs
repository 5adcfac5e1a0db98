use chrono::{Days, NaiveDate, NaiveDateTime, TimeDelta};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{google_calendar_error, AppResult};
use crate::events::time::{parse_instant, LocalInstant};
use crate::events::{EventTime, NormalizedEvent, RawExternalEvent};

/// Layout of `dateTime` values sent with an explicit `timeZone`
const WALL_CLOCK_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DAY_FORMAT: &str = "%Y-%m-%d";

/// Length given to a timed event that has no usable end
const DEFAULT_DURATION_MINUTES: i64 = 60;

/// Body of an events list response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsListResponse {
    #[serde(default)]
    pub items: Vec<RawExternalEvent>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Resource posted to the events insert endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCalendarEvent {
    pub summary: String,
    pub location: String,
    pub description: String,
    pub start: EventTime,
    pub end: EventTime,
}

impl NewCalendarEvent {
    /// Build an insert request from a normalized event.
    ///
    /// Timed events are sent as wall-clock `dateTime` in `tz`; all-day
    /// events as `date` with the exclusive end the API expects.
    pub fn from_normalized(event: &NormalizedEvent, tz: &Tz) -> AppResult<Self> {
        let start = parse_instant(&event.raw_start_iso, tz).ok_or_else(|| {
            google_calendar_error(&format!(
                "Event '{}' has no start time and cannot be added",
                event.title
            ))
        })?;
        let end = parse_instant(&event.raw_end_iso, tz);

        let (start, end) = match start {
            LocalInstant::Day(first) => {
                let last = end.map(|e| e.date()).filter(|last| *last >= first).unwrap_or(first);
                (day_time(first), day_time(last.checked_add_days(Days::new(1)).unwrap_or(last)))
            }
            LocalInstant::At(opening) => {
                let closing = end
                    .map(|e| e.closing())
                    .filter(|closing| *closing >= opening)
                    .unwrap_or_else(|| opening + TimeDelta::minutes(DEFAULT_DURATION_MINUTES));
                (wall_clock(opening, tz), wall_clock(closing, tz))
            }
        };

        Ok(Self {
            summary: event.title.clone(),
            location: event.location.clone(),
            description: event.description.clone(),
            start,
            end,
        })
    }
}

fn day_time(day: NaiveDate) -> EventTime {
    EventTime {
        date: Some(day.format(DAY_FORMAT).to_string()),
        ..Default::default()
    }
}

fn wall_clock(at: NaiveDateTime, tz: &Tz) -> EventTime {
    EventTime {
        date_time: Some(at.format(WALL_CLOCK_FORMAT).to_string()),
        time_zone: Some(tz.name().to_string()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ingest::ingest_scraped;
    use crate::events::RawScrapedEvent;
    use chrono_tz::America::Chicago;

    fn event(start: &str, end: &str) -> NormalizedEvent {
        let record = RawScrapedEvent {
            id: Some("evt".to_string()),
            summary: Some("Quad Day".to_string()),
            location: Some("Main Quad".to_string()),
            start: Some(start.to_string()),
            end: Some(end.to_string()),
            ..Default::default()
        };
        ingest_scraped(&record, &Chicago)
    }

    #[test]
    fn test_timed_event_uses_viewer_zone() {
        let request =
            NewCalendarEvent::from_normalized(&event("2025-08-24T17:00:00Z", "2025-08-24T19:00:00Z"), &Chicago)
                .unwrap();

        assert_eq!(request.start.date_time.as_deref(), Some("2025-08-24T12:00:00"));
        assert_eq!(request.end.date_time.as_deref(), Some("2025-08-24T14:00:00"));
        assert_eq!(request.start.time_zone.as_deref(), Some("America/Chicago"));
        assert!(request.start.date.is_none());
        assert_eq!(request.location, "Main Quad");
    }

    #[test]
    fn test_missing_end_defaults_to_one_hour() {
        let request =
            NewCalendarEvent::from_normalized(&event("2025-08-24T12:00:00", ""), &Chicago).unwrap();
        assert_eq!(request.end.date_time.as_deref(), Some("2025-08-24T13:00:00"));
    }

    #[test]
    fn test_all_day_event_sends_exclusive_end_date() {
        let request =
            NewCalendarEvent::from_normalized(&event("2025-08-24", "2025-08-25"), &Chicago).unwrap();

        assert_eq!(request.start.date.as_deref(), Some("2025-08-24"));
        assert_eq!(request.end.date.as_deref(), Some("2025-08-26"));
        assert!(request.start.date_time.is_none());
    }

    #[test]
    fn test_unscheduled_event_cannot_be_inserted() {
        assert!(NewCalendarEvent::from_normalized(&event("", ""), &Chicago).is_err());
    }

    #[test]
    fn test_list_response_without_items() {
        let response: EventsListResponse =
            serde_json::from_value(serde_json::json!({ "kind": "calendar#events" })).unwrap();
        assert!(response.items.is_empty());
    }
}
