use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::client::RealtimeDbClient;
use crate::components::EventStoreHandle;
use crate::error::AppResult;
use crate::events::Source;

/// Fetch one snapshot and hand it to the store.
///
/// Returns the number of upcoming events retained. A failed fetch is
/// reported to the store and leaves the current batch in place.
pub async fn refresh_once(client: &RealtimeDbClient, store: &EventStoreHandle) -> AppResult<usize> {
    match client.fetch_snapshot().await {
        Ok(snapshot) => store.apply_snapshot(snapshot.into_records()).await,
        Err(e) => {
            store.report_failure(Source::Scraped, e.to_string()).await?;
            Err(e)
        }
    }
}

/// Refresh immediately, then on every tick until cancelled
pub fn start_refresh_loop(
    client: RealtimeDbClient,
    store: EventStoreHandle,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Refreshing events every {}s", period.as_secs());
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Refresh loop cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = refresh_once(&client, &store).await {
                        error!("Failed to refresh events: {}", e);
                    }
                }
            }
        }
    })
}
