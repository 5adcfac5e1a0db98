mod client;
mod scheduler;
pub mod snapshot;

pub use client::RealtimeDbClient;
pub use scheduler::{refresh_once, start_refresh_loop};
pub use snapshot::ScrapedSnapshot;

use crate::config::Config;
use crate::error::AppResult;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::EventStoreHandle;

/// Keeps the scraped batch in step with the hosted database
#[derive(Default)]
pub struct RealtimeDb {
    task: RwLock<Option<JoinHandle<()>>>,
}

impl RealtimeDb {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl super::Component for RealtimeDb {
    fn name(&self) -> &'static str {
        "realtime_db"
    }

    async fn init(
        &self,
        config: Arc<RwLock<Config>>,
        store: EventStoreHandle,
        cancel: CancellationToken,
    ) -> AppResult<()> {
        let (client, period) = {
            let config = config.read().await;
            (
                RealtimeDbClient::from_config(&config)?,
                Duration::from_secs(config.refresh_interval_secs),
            )
        };

        let mut task = self.task.write().await;
        if task.is_none() {
            *task = Some(start_refresh_loop(client, store, period, cancel));
        }

        Ok(())
    }

    async fn shutdown(&self) -> AppResult<()> {
        if let Some(task) = self.task.write().await.take() {
            task.abort();
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
