//! Decoding of a database snapshot into scraped records.
//!
//! The collection has been written in three layouts over time: a plain map
//! of id to record, an array (how the database returns integer keys), and
//! a versioned map whose entries each wrap a full snapshot in `data`.

use serde_json::{Map, Value};
use tracing::warn;

use crate::events::RawScrapedEvent;

/// Records of one snapshot, in the order the database returned them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedSnapshot {
    pub records: Vec<RawScrapedEvent>,
}

impl ScrapedSnapshot {
    pub fn from_value(value: Value) -> Self {
        let records = match value {
            Value::Null => Vec::new(),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .filter(|(_, item)| !item.is_null())
                .map(|(index, item)| record(index.to_string(), item))
                .collect(),
            Value::Object(map) if is_versioned(&map) => latest_version(map),
            Value::Object(map) => from_map(map),
            other => {
                warn!("Ignoring snapshot that is neither a map nor an array: {}", other);
                Vec::new()
            }
        };

        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<RawScrapedEvent> {
        self.records
    }
}

/// Every entry is an object wrapping its own `data`
fn is_versioned(map: &Map<String, Value>) -> bool {
    !map.is_empty()
        && map
            .values()
            .all(|entry| entry.as_object().is_some_and(|entry| entry.contains_key("data")))
}

/// Push ids sort by creation time, so the greatest key is the newest write
fn latest_version(map: Map<String, Value>) -> Vec<RawScrapedEvent> {
    let latest = map
        .into_iter()
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .and_then(|(_, mut entry)| entry.get_mut("data").map(Value::take));

    match latest {
        Some(data) => ScrapedSnapshot::from_value(data).records,
        None => Vec::new(),
    }
}

fn from_map(map: Map<String, Value>) -> Vec<RawScrapedEvent> {
    map.into_iter()
        .filter(|(_, item)| !item.is_null())
        .map(|(key, item)| record(key, item))
        .collect()
}

/// Decode one record; the key wins over any `id` inside it
fn record(key: String, value: Value) -> RawScrapedEvent {
    let mut record = match serde_json::from_value::<RawScrapedEvent>(value) {
        Ok(record) => record,
        Err(e) => {
            warn!("Record {} is malformed, using a placeholder: {}", key, e);
            RawScrapedEvent::default()
        }
    };
    record.id = Some(key);
    record
}
