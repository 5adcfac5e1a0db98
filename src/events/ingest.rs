use chrono_tz::Tz;
use tracing::debug;

use super::models::{
    NormalizedEvent, RawEvent, RawExternalEvent, RawScrapedEvent, Source, DEFAULT_HOST,
    DEFAULT_TAG, EXTERNAL_HOST, EXTERNAL_TAG, UNTITLED_EVENT,
};
use super::time::{normalize, parse_clock, parse_instant, parse_legacy_date, LocalInstant};

/// Placeholder the scrapers write for a missing value
const MISSING: &str = "N/A";

/// Normalize one record of either source
pub fn ingest(record: &RawEvent, tz: &Tz) -> NormalizedEvent {
    match record {
        RawEvent::Scraped(record) => ingest_scraped(record, tz),
        RawEvent::External(record) => ingest_external(record, tz),
    }
}

/// Normalize a batch, dropping cancelled calendar entries
pub fn ingest_all<I>(records: I, tz: &Tz) -> Vec<NormalizedEvent>
where
    I: IntoIterator<Item = RawEvent>,
{
    records
        .into_iter()
        .filter(|record| match record {
            RawEvent::External(external) if external.is_cancelled() => {
                debug!("Skipping cancelled calendar event {:?}", external.id);
                false
            }
            _ => true,
        })
        .map(|record| ingest(&record, tz))
        .collect()
}

/// Normalize a record from the realtime database
pub fn ingest_scraped(record: &RawScrapedEvent, tz: &Tz) -> NormalizedEvent {
    let (start, end, raw_start, raw_end) = match text(&record.start) {
        Some(raw_start) => {
            let raw_end = text(&record.end).unwrap_or_default();
            (
                parse_instant(raw_start, tz),
                parse_instant(raw_end, tz),
                raw_start.to_string(),
                raw_end.to_string(),
            )
        }
        None => {
            let (start, end) = legacy_window(record);
            (
                start,
                end,
                start.map(|s| iso_of(&s)).unwrap_or_default(),
                end.map(|e| iso_of(&e)).unwrap_or_default(),
            )
        }
    };

    let temporal = normalize(start, end);
    let organizer_name = record
        .organizer
        .as_ref()
        .and_then(|organizer| text(&organizer.display_name));

    NormalizedEvent {
        id: record.id.clone().unwrap_or_default(),
        title: text(&record.summary)
            .or_else(|| text(&record.title))
            .unwrap_or(UNTITLED_EVENT)
            .to_string(),
        description: text(&record.description).unwrap_or_default().to_string(),
        location: text(&record.location).unwrap_or_default().to_string(),
        tag: text(&record.tag).unwrap_or(DEFAULT_TAG).to_string(),
        host: organizer_name
            .or_else(|| text(&record.host))
            .unwrap_or(DEFAULT_HOST)
            .to_string(),
        event_link: text(&record.html_link)
            .or_else(|| text(&record.event_link))
            .map(str::to_string),
        start_date: temporal.start_date,
        start_time: temporal.start_time,
        end_time: temporal.end_time,
        raw_start_iso: raw_start,
        raw_end_iso: raw_end,
        source: Source::Scraped,
        starts_at: temporal.starts_at,
    }
}

/// Normalize a record from the Google Calendar events list
pub fn ingest_external(record: &RawExternalEvent, tz: &Tz) -> NormalizedEvent {
    let start = record.start.raw().and_then(|raw| parse_instant(raw, tz));
    let end = match (record.end.raw().and_then(|raw| parse_instant(raw, tz)), start) {
        // All-day end dates are exclusive
        (Some(LocalInstant::Day(end)), Some(LocalInstant::Day(first))) => {
            let last = end.pred_opt().unwrap_or(end);
            Some(LocalInstant::Day(last.max(first)))
        }
        (end, _) => end,
    };

    let temporal = normalize(start, end);
    let raw_start = record.start.raw().unwrap_or_default().to_string();
    let title = text(&record.summary).unwrap_or(UNTITLED_EVENT).to_string();
    let host = record
        .organizer
        .as_ref()
        .and_then(|organizer| text(&organizer.display_name).or_else(|| text(&organizer.email)))
        .unwrap_or(EXTERNAL_HOST)
        .to_string();

    NormalizedEvent {
        id: record
            .id
            .clone()
            .unwrap_or_else(|| format!("external:{}:{}", raw_start, title)),
        title,
        description: text(&record.description).unwrap_or_default().to_string(),
        location: text(&record.location).unwrap_or_default().to_string(),
        tag: EXTERNAL_TAG.to_string(),
        host,
        event_link: text(&record.html_link).map(str::to_string),
        start_date: temporal.start_date,
        start_time: temporal.start_time,
        end_time: temporal.end_time,
        raw_start_iso: raw_start,
        raw_end_iso: record.end.raw().unwrap_or_default().to_string(),
        source: Source::External,
        starts_at: temporal.starts_at,
    }
}

/// Window of a record that stores `start_date` + `start_time` separately
fn legacy_window(record: &RawScrapedEvent) -> (Option<LocalInstant>, Option<LocalInstant>) {
    let Some(date) = text(&record.start_date).and_then(parse_legacy_date) else {
        return (None, None);
    };

    match text(&record.start_time).and_then(parse_clock) {
        Some(start_time) => {
            let end = text(&record.end_time)
                .and_then(parse_clock)
                .map(|end_time| LocalInstant::At(date.and_time(end_time)));
            (Some(LocalInstant::At(date.and_time(start_time))), end)
        }
        None => (Some(LocalInstant::Day(date)), None),
    }
}

fn iso_of(instant: &LocalInstant) -> String {
    match instant {
        LocalInstant::At(at) => at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        LocalInstant::Day(day) => day.format("%Y-%m-%d").to_string(),
    }
}

/// Trimmed, non-placeholder text
fn text(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != MISSING)
}
