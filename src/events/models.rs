use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::time::ComparisonKey;

/// Title used when a record has none
pub const UNTITLED_EVENT: &str = "Untitled Event";
/// Category used when a record has no tag
pub const DEFAULT_TAG: &str = "General";
/// Host used for scraped records without an organizer
pub const DEFAULT_HOST: &str = "N/A";
/// Category given to every Google Calendar record
pub const EXTERNAL_TAG: &str = "Google Calendar";
/// Host used for Google Calendar records without an organizer
pub const EXTERNAL_HOST: &str = "Personal";

pub const DATE_TBA: &str = "Date TBA";
pub const TIME_TBA: &str = "Time TBA";
pub const ALL_DAY: &str = "All Day";
pub const LOCATION_TBA: &str = "Location TBA";
pub const NO_DESCRIPTION: &str = "No description available.";

/// Formatted start of an all-day window
pub const MIDNIGHT_LABEL: &str = "12:00 AM";
/// Formatted end of an all-day window
pub const END_OF_DAY_LABEL: &str = "11:59 PM";

/// Where a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Scraped,
    External,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Scraped => write!(f, "scraped"),
            Source::External => write!(f, "external"),
        }
    }
}

/// Event organizer as both sources encode it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organizer {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Record as stored by the scraper in the realtime database.
///
/// Current scraper output carries ISO `start`/`end` strings; older output
/// carries `title`, `event_link`, `host` and split `start_date`/`start_time`
/// fields. Both layouts deserialize into this type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScrapedEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub organizer: Option<Organizer>,
    #[serde(default)]
    pub html_link: Option<String>,
    #[serde(default, rename = "event_link")]
    pub event_link: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default, rename = "start_date")]
    pub start_date: Option<String>,
    #[serde(default, rename = "start_time")]
    pub start_time: Option<String>,
    #[serde(default, rename = "end_time")]
    pub end_time: Option<String>,
}

/// Start or end of a Google Calendar event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    /// The raw string this side of the window was given as
    pub fn raw(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }
}

/// Record as returned by the Google Calendar events list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExternalEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start: EventTime,
    #[serde(default)]
    pub end: EventTime,
    #[serde(default)]
    pub organizer: Option<Organizer>,
    #[serde(default)]
    pub html_link: Option<String>,
}

impl RawExternalEvent {
    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some("cancelled")
    }
}

/// A raw record tagged with its source
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    Scraped(RawScrapedEvent),
    External(RawExternalEvent),
}

impl RawEvent {
    pub fn source(&self) -> Source {
        match self {
            RawEvent::Scraped(_) => Source::Scraped,
            RawEvent::External(_) => Source::External,
        }
    }
}

impl From<RawScrapedEvent> for RawEvent {
    fn from(record: RawScrapedEvent) -> Self {
        RawEvent::Scraped(record)
    }
}

impl From<RawExternalEvent> for RawEvent {
    fn from(record: RawExternalEvent) -> Self {
        RawEvent::External(record)
    }
}

/// The single shape every record is normalized into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub tag: String,
    pub host: String,
    pub event_link: Option<String>,
    pub start_date: String,
    pub start_time: String,
    pub end_time: String,
    pub raw_start_iso: String,
    pub raw_end_iso: String,
    pub source: Source,
    /// Start in the viewer's zone, `None` when the record had no usable date
    #[serde(default)]
    pub starts_at: Option<NaiveDateTime>,
}

impl NormalizedEvent {
    /// Key used for ordering and past-event filtering
    pub fn comparison_key(&self) -> ComparisonKey {
        ComparisonKey::from_start(self.starts_at)
    }

    /// Window runs from local midnight to 23:59
    pub fn is_all_day(&self) -> bool {
        self.start_time == MIDNIGHT_LABEL && self.end_time == END_OF_DAY_LABEL
    }

    /// Time text shown on a card
    pub fn time_label(&self) -> String {
        if self.is_all_day() {
            ALL_DAY.to_string()
        } else if self.start_time == TIME_TBA {
            TIME_TBA.to_string()
        } else if self.end_time == TIME_TBA {
            self.start_time.clone()
        } else {
            format!("{} - {}", self.start_time, self.end_time)
        }
    }

    pub fn location_label(&self) -> &str {
        if self.location.is_empty() {
            LOCATION_TBA
        } else {
            &self.location
        }
    }

    pub fn description_label(&self) -> &str {
        if self.description.is_empty() {
            NO_DESCRIPTION
        } else {
            &self.description
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(start_time: &str, end_time: &str) -> NormalizedEvent {
        NormalizedEvent {
            id: "e1".to_string(),
            title: "Quad Day".to_string(),
            description: String::new(),
            location: String::new(),
            tag: DEFAULT_TAG.to_string(),
            host: DEFAULT_HOST.to_string(),
            event_link: None,
            start_date: "June 15, 2025".to_string(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            raw_start_iso: String::new(),
            raw_end_iso: String::new(),
            source: Source::Scraped,
            starts_at: None,
        }
    }

    #[test]
    fn test_time_label() {
        assert_eq!(event("12:00 AM", "11:59 PM").time_label(), "All Day");
        assert_eq!(event("9:00 AM", "10:30 AM").time_label(), "9:00 AM - 10:30 AM");
        assert_eq!(event("9:00 AM", TIME_TBA).time_label(), "9:00 AM");
        assert_eq!(event(TIME_TBA, TIME_TBA).time_label(), TIME_TBA);
        // Midnight start alone is not all-day
        assert!(!event("12:00 AM", "1:00 AM").is_all_day());
    }

    #[test]
    fn test_labels_for_missing_fields() {
        let e = event("9:00 AM", "10:00 AM");
        assert_eq!(e.location_label(), LOCATION_TBA);
        assert_eq!(e.description_label(), NO_DESCRIPTION);
    }

    #[test]
    fn test_scraped_record_accepts_legacy_field_names() {
        let record: RawScrapedEvent = serde_json::from_value(serde_json::json!({
            "title": "Illini Football",
            "event_link": "https://fightingillini.com",
            "start_date": "Sep 5 2025",
            "start_time": "7:00 pm",
            "tag": "Athletics"
        }))
        .unwrap();

        assert_eq!(record.title.as_deref(), Some("Illini Football"));
        assert_eq!(record.event_link.as_deref(), Some("https://fightingillini.com"));
        assert!(record.summary.is_none());
        assert_eq!(record.start_date.as_deref(), Some("Sep 5 2025"));
        assert_eq!(record.start_time.as_deref(), Some("7:00 pm"));
    }

    #[test]
    fn test_external_record_shapes() {
        let record: RawExternalEvent = serde_json::from_value(serde_json::json!({
            "id": "g1",
            "summary": "Holiday",
            "start": { "date": "2025-07-04" },
            "end": { "date": "2025-07-05" }
        }))
        .unwrap();

        assert_eq!(record.start.raw(), Some("2025-07-04"));
        assert!(record.start.date_time.is_none());
        assert!(!record.is_cancelled());
    }
}
