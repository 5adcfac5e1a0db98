mod actor;
mod handle;
pub mod models;
mod time;
pub mod token;

pub use actor::CalendarApi;
pub use handle::GoogleCalendarHandle;
pub use models::NewCalendarEvent;
pub use time::list_window;
pub use token::{authorizer_from_config, AccessToken, Authorizer};

use crate::config::Config;
use crate::error::AppResult;
use crate::events::Source;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::EventStoreHandle;

/// Fetch the calendar once and hand the result to the store.
///
/// The fetch holds a ticket; if another sync or a disconnect happens while
/// it is in flight, its result is discarded. Returns whether it was applied.
pub async fn sync_external(
    calendar: &GoogleCalendarHandle,
    store: &EventStoreHandle,
) -> AppResult<bool> {
    let ticket = store.issue_external_ticket().await?;

    match calendar.list_upcoming().await {
        Ok(records) => store.apply_external(ticket, records).await,
        Err(e) => {
            store.report_failure(Source::External, e.to_string()).await?;
            Err(e)
        }
    }
}

/// Google Calendar component: the user's own events as a second source
#[derive(Default)]
pub struct GoogleCalendar {
    handle: RwLock<Option<GoogleCalendarHandle>>,
}

impl GoogleCalendar {
    /// Create a new Google Calendar component
    pub fn new() -> Self {
        Self {
            handle: RwLock::new(None),
        }
    }

    /// Get the handle if it exists
    pub async fn get_handle(&self) -> Option<GoogleCalendarHandle> {
        let handle_lock = self.handle.read().await;
        handle_lock.clone()
    }
}

#[async_trait]
impl super::Component for GoogleCalendar {
    fn name(&self) -> &'static str {
        "google_calendar"
    }

    async fn init(
        &self,
        config: Arc<RwLock<Config>>,
        store: EventStoreHandle,
        cancel: CancellationToken,
    ) -> AppResult<()> {
        let mut handle_lock = self.handle.write().await;
        if handle_lock.is_some() {
            return Ok(());
        }

        let handle = {
            let config = config.read().await;
            let Some(authorizer) = authorizer_from_config(&config) else {
                info!("No calendar credentials configured, skipping calendar sync");
                return Ok(());
            };
            GoogleCalendarHandle::new(&config, authorizer)?
        };
        *handle_lock = Some(handle.clone());
        drop(handle_lock);

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                result = sync_external(&handle, &store) => match result {
                    Ok(true) => info!("Calendar events synced"),
                    Ok(false) => info!("Calendar sync superseded"),
                    Err(e) => error!("Failed to sync calendar events: {}", e),
                },
            }
        });

        Ok(())
    }

    async fn shutdown(&self) -> AppResult<()> {
        let handle_lock = self.handle.read().await;
        if let Some(handle) = &*handle_lock {
            handle.shutdown().await?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
