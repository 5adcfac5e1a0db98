//! Batches and the state transitions between them.
//!
//! A batch is rebuilt from scratch on every ingestion cycle and replaces
//! its predecessor wholesale; nothing is merged or patched.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::filter::retain_upcoming;
use super::ingest::ingest_all;
use super::models::{NormalizedEvent, RawEvent, RawExternalEvent, RawScrapedEvent, Source};
use super::ordering::{sort_chronologically, CategorySet};
use super::search::EventQuery;
use super::time::today_in;

/// Ordered, past-filtered events with their category vocabulary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventBatch {
    events: Vec<NormalizedEvent>,
    categories: CategorySet,
}

impl EventBatch {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Run the whole pipeline: ingest, drop past events, sort, index
    pub fn build<I>(records: I, tz: &Tz, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = RawEvent>,
    {
        Self::from_normalized(ingest_all(records, tz), today)
    }

    /// Filter, sort and index already-normalized events
    pub fn from_normalized(events: Vec<NormalizedEvent>, today: NaiveDate) -> Self {
        let mut events = retain_upcoming(events, today);
        sort_chronologically(&mut events);
        let categories = CategorySet::from_events(&events);
        Self { events, categories }
    }

    pub fn events(&self) -> &[NormalizedEvent] {
        &self.events
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    /// Events matching a free-text query and category, in batch order
    pub fn filter(&self, query: &str, category: &str) -> Vec<NormalizedEvent> {
        self.search(&EventQuery::new(query, category))
    }

    pub fn search(&self, query: &EventQuery) -> Vec<NormalizedEvent> {
        self.events
            .iter()
            .filter(|event| query.matches(event))
            .cloned()
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&NormalizedEvent> {
        self.events.iter().find(|event| event.id == id)
    }

    /// Both batches as one, re-filtered and re-sorted against `today`
    pub fn merged(&self, other: &EventBatch, today: NaiveDate) -> EventBatch {
        let events = self
            .events
            .iter()
            .chain(other.events.iter())
            .cloned()
            .collect();
        Self::from_normalized(events, today)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<NormalizedEvent> {
        self.events
    }
}

/// Health of one source as last observed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SourceStatus {
    /// Nothing fetched yet
    #[default]
    Pending,
    /// Last fetch succeeded
    Ready { fetched_at: DateTime<Utc> },
    /// Last fetch failed; the batch is whatever it was before
    Failed { message: String },
}

/// Which batch a consumer wants to see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    /// Scraped campus events
    Browse,
    /// The user's calendar
    Upcoming,
    /// Both sources in one ordering
    Combined,
}

/// Everything the display layer needs for one view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventView {
    pub kind: ViewKind,
    pub batch: EventBatch,
    pub status: SourceStatus,
}

/// The full in-memory state, replaced value by value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventState {
    pub scraped: EventBatch,
    pub external: EventBatch,
    pub scraped_status: SourceStatus,
    pub external_status: SourceStatus,
    external_ticket: u64,
}

impl EventState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the scraped batch with a fresh snapshot
    pub fn apply_snapshot(
        self,
        records: Vec<RawScrapedEvent>,
        tz: &Tz,
        now: DateTime<Utc>,
    ) -> Self {
        let today = today_in(now, tz);
        Self {
            scraped: EventBatch::build(records.into_iter().map(RawEvent::from), tz, today),
            scraped_status: SourceStatus::Ready { fetched_at: now },
            ..self
        }
    }

    /// Hand out a ticket for an external fetch; newer tickets supersede older ones
    pub fn issue_external_ticket(&mut self) -> u64 {
        self.external_ticket += 1;
        self.external_ticket
    }

    pub fn latest_external_ticket(&self) -> u64 {
        self.external_ticket
    }

    /// Replace the external batch if `ticket` is still the latest one.
    ///
    /// Returns the state and whether the records were applied.
    pub fn apply_external(
        self,
        ticket: u64,
        records: Vec<RawExternalEvent>,
        tz: &Tz,
        now: DateTime<Utc>,
    ) -> (Self, bool) {
        if ticket != self.external_ticket {
            return (self, false);
        }

        let today = today_in(now, tz);
        let state = Self {
            external: EventBatch::build(records.into_iter().map(RawEvent::from), tz, today),
            external_status: SourceStatus::Ready { fetched_at: now },
            ..self
        };
        (state, true)
    }

    /// Forget the external batch, e.g. after disconnecting
    pub fn clear_external(self) -> Self {
        Self {
            external: EventBatch::empty(),
            external_status: SourceStatus::Pending,
            external_ticket: self.external_ticket + 1,
            ..self
        }
    }

    /// Record a failed fetch without touching the batch
    pub fn report_failure(self, source: Source, message: String) -> Self {
        let status = SourceStatus::Failed { message };
        match source {
            Source::Scraped => Self {
                scraped_status: status,
                ..self
            },
            Source::External => Self {
                external_status: status,
                ..self
            },
        }
    }

    pub fn view(&self, kind: ViewKind, tz: &Tz, now: DateTime<Utc>) -> EventView {
        let (batch, status) = match kind {
            ViewKind::Browse => (self.scraped.clone(), self.scraped_status.clone()),
            ViewKind::Upcoming => (self.external.clone(), self.external_status.clone()),
            ViewKind::Combined => (
                self.scraped.merged(&self.external, today_in(now, tz)),
                combined_status(&self.scraped_status, &self.external_status),
            ),
        };
        EventView { kind, batch, status }
    }
}

/// Free function form of [`EventState::apply_snapshot`]
pub fn apply_snapshot(
    state: EventState,
    records: Vec<RawScrapedEvent>,
    tz: &Tz,
    now: DateTime<Utc>,
) -> EventState {
    state.apply_snapshot(records, tz, now)
}

fn combined_status(scraped: &SourceStatus, external: &SourceStatus) -> SourceStatus {
    match (scraped, external) {
        (SourceStatus::Failed { .. }, _) => scraped.clone(),
        (_, SourceStatus::Failed { .. }) => external.clone(),
        (SourceStatus::Pending, _) => SourceStatus::Pending,
        _ => scraped.clone(),
    }
}
