use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::models::NormalizedEvent;

/// Wildcard category matching every tag
pub const ALL_CATEGORIES: &str = "all";

/// Sort events chronologically.
///
/// Stable, so events with the same date and minute keep their ingestion
/// order.
pub fn sort_chronologically(events: &mut [NormalizedEvent]) {
    events.sort_by_key(NormalizedEvent::comparison_key);
}

/// Distinct tags of a batch in code-point order.
///
/// The `all` wildcard is implicit and never stored here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySet {
    labels: Vec<String>,
}

impl CategorySet {
    pub fn from_events(events: &[NormalizedEvent]) -> Self {
        let labels: BTreeSet<&str> = events.iter().map(|event| event.tag.as_str()).collect();
        Self {
            labels: labels.into_iter().map(str::to_string).collect(),
        }
    }

    /// Observed tags, sorted
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Filter vocabulary as offered to a user: `all` first, then the tags
    pub fn options(&self) -> impl Iterator<Item = &str> + '_ {
        std::iter::once(ALL_CATEGORIES).chain(self.labels.iter().map(String::as_str))
    }

    pub fn contains(&self, category: &str) -> bool {
        category == ALL_CATEGORIES || self.labels.binary_search_by(|l| l.as_str().cmp(category)).is_ok()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ingest::ingest_scraped;
    use crate::events::models::RawScrapedEvent;
    use chrono_tz::UTC;

    fn event(id: &str, start: Option<&str>, tag: &str) -> NormalizedEvent {
        let record = RawScrapedEvent {
            id: Some(id.to_string()),
            start: start.map(str::to_string),
            tag: Some(tag.to_string()),
            ..Default::default()
        };
        ingest_scraped(&record, &UTC)
    }

    fn ids(events: &[NormalizedEvent]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_sort_by_date_then_time_of_day() {
        let mut events = vec![
            event("a", Some("2025-06-16T09:00:00"), "General"),
            event("b", Some("2025-06-15T17:00:00"), "General"),
            event("c", Some("2025-06-16T14:00:00"), "General"),
        ];
        sort_chronologically(&mut events);
        assert_eq!(ids(&events), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_sort_crosses_the_ten_oclock_boundary() {
        let mut events = vec![
            event("ten", Some("2025-06-16T10:00:00"), "General"),
            event("nine", Some("2025-06-16T09:00:00"), "General"),
        ];
        sort_chronologically(&mut events);
        assert_eq!(ids(&events), vec!["nine", "ten"]);
    }

    #[test]
    fn test_sort_is_stable_and_puts_unscheduled_last() {
        let mut events = vec![
            event("tba", None, "General"),
            event("first", Some("2025-06-16T09:00:00"), "General"),
            event("second", Some("2025-06-16T09:00:30"), "General"),
            event("early", Some("2025-06-15T09:00:00"), "General"),
        ];
        sort_chronologically(&mut events);
        assert_eq!(ids(&events), vec!["early", "first", "second", "tba"]);
    }

    #[test]
    fn test_category_set() {
        let events: Vec<_> = ["Music", "Sports", "Music", "Career"]
            .iter()
            .enumerate()
            .map(|(i, tag)| event(&i.to_string(), None, tag))
            .collect();
        let categories = CategorySet::from_events(&events);

        assert_eq!(categories.labels(), ["Career", "Music", "Sports"]);
        assert_eq!(
            categories.options().collect::<Vec<_>>(),
            vec!["all", "Career", "Music", "Sports"]
        );
        assert!(categories.contains("Music"));
        assert!(categories.contains("all"));
        assert!(!categories.contains("music"));
    }

    #[test]
    fn test_category_set_uses_code_point_order() {
        let events = vec![event("1", None, "career"), event("2", None, "Zoo")];
        assert_eq!(CategorySet::from_events(&events).labels(), ["Zoo", "career"]);
    }

    #[test]
    fn test_empty_batch_still_offers_all() {
        let categories = CategorySet::from_events(&[]);
        assert!(categories.is_empty());
        assert_eq!(categories.options().collect::<Vec<_>>(), vec!["all"]);
    }
}
