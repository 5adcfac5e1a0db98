//! In-memory home of the current event batches.

mod actor;
mod handle;

pub use handle::EventStoreHandle;
