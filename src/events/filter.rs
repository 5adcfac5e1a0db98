use chrono::NaiveDate;

use super::models::NormalizedEvent;
use super::time::ComparisonKey;

/// Whether an event started before local midnight of `today`.
///
/// Unscheduled events are never in the past.
pub fn is_past(event: &NormalizedEvent, today: NaiveDate) -> bool {
    event.comparison_key() < ComparisonKey::start_of(today)
}

/// Keep only events happening today or later
pub fn retain_upcoming(mut events: Vec<NormalizedEvent>, today: NaiveDate) -> Vec<NormalizedEvent> {
    events.retain(|event| !is_past(event, today));
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ingest::ingest_scraped;
    use crate::events::models::RawScrapedEvent;
    use chrono_tz::UTC;

    fn event_starting(start: &str) -> NormalizedEvent {
        let record = RawScrapedEvent {
            id: Some(start.to_string()),
            start: Some(start.to_string()),
            ..Default::default()
        };
        ingest_scraped(&record, &UTC)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_is_past() {
        assert!(is_past(&event_starting("2025-06-14T23:59:00"), today()));
        assert!(!is_past(&event_starting("2025-06-15T00:00:00"), today()));
        assert!(!is_past(&event_starting("2025-06-15T23:00:00"), today()));
        assert!(!is_past(&event_starting("2025-06-16"), today()));
        assert!(!is_past(&event_starting("not a date"), today()));
    }

    #[test]
    fn test_retain_upcoming_keeps_order() {
        let events = vec![
            event_starting("2025-06-20T10:00:00"),
            event_starting("2025-06-01T10:00:00"),
            event_starting("garbage"),
            event_starting("2025-06-15T08:00:00"),
        ];
        let ids: Vec<String> = retain_upcoming(events, today())
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["2025-06-20T10:00:00", "garbage", "2025-06-15T08:00:00"]);
    }
}
