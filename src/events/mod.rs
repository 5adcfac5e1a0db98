//! The event pipeline: ingest, normalize, drop past events, order, index.
//!
//! Everything in here is synchronous and free of I/O. A batch is rebuilt
//! from raw records on every cycle.

pub mod batch;
pub mod filter;
pub mod ingest;
pub mod models;
pub mod ordering;
pub mod search;
pub mod time;

pub use batch::{apply_snapshot, EventBatch, EventState, EventView, SourceStatus, ViewKind};
pub use models::{
    EventTime, NormalizedEvent, Organizer, RawEvent, RawExternalEvent, RawScrapedEvent, Source,
};
pub use ordering::{CategorySet, ALL_CATEGORIES};
pub use search::EventQuery;
pub use time::ComparisonKey;
