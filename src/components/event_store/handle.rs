use super::actor::{EventStoreActor, EventStoreCommand};
use crate::error::{store_error, AppResult};
use crate::events::{
    EventView, NormalizedEvent, RawExternalEvent, RawScrapedEvent, Source, ViewKind,
};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

/// Handle for interacting with the event store actor
#[derive(Clone)]
pub struct EventStoreHandle {
    command_tx: mpsc::Sender<EventStoreCommand>,
    revision_rx: watch::Receiver<u64>,
    _actor_task: Arc<JoinHandle<()>>,
}

impl EventStoreHandle {
    /// Create a new EventStoreHandle and spawn the actor
    pub fn new(tz: Tz) -> Self {
        let (mut actor, command_tx, revision_rx) = EventStoreActor::new(tz);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            command_tx,
            revision_rx,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Replace the scraped batch; returns how many events were retained
    pub async fn apply_snapshot(&self, records: Vec<RawScrapedEvent>) -> AppResult<usize> {
        let (response_tx, response_rx) = oneshot::channel();
        self.send(EventStoreCommand::ApplySnapshot(records, response_tx))
            .await?;
        response_rx
            .await
            .map_err(|_| store_error("Response channel closed"))
    }

    /// Ticket for a new calendar fetch; any older ticket becomes stale
    pub async fn issue_external_ticket(&self) -> AppResult<u64> {
        let (response_tx, response_rx) = oneshot::channel();
        self.send(EventStoreCommand::IssueExternalTicket(response_tx))
            .await?;
        response_rx
            .await
            .map_err(|_| store_error("Response channel closed"))
    }

    /// Replace the calendar batch if `ticket` is still current
    pub async fn apply_external(
        &self,
        ticket: u64,
        records: Vec<RawExternalEvent>,
    ) -> AppResult<bool> {
        let (respond_to, response_rx) = oneshot::channel();
        self.send(EventStoreCommand::ApplyExternal {
            ticket,
            records,
            respond_to,
        })
        .await?;
        response_rx
            .await
            .map_err(|_| store_error("Response channel closed"))
    }

    pub async fn clear_external(&self) -> AppResult<()> {
        self.send(EventStoreCommand::ClearExternal).await
    }

    pub async fn report_failure(&self, source: Source, message: impl Into<String>) -> AppResult<()> {
        self.send(EventStoreCommand::ReportFailure(source, message.into()))
            .await
    }

    /// Current view of one or both batches
    pub async fn view(&self, kind: ViewKind) -> AppResult<EventView> {
        let (response_tx, response_rx) = oneshot::channel();
        self.send(EventStoreCommand::View(kind, response_tx)).await?;
        response_rx
            .await
            .map_err(|_| store_error("Response channel closed"))
    }

    /// Events of a view matching a query and category
    pub async fn filter(
        &self,
        kind: ViewKind,
        query: &str,
        category: &str,
    ) -> AppResult<Vec<NormalizedEvent>> {
        Ok(self.view(kind).await?.batch.filter(query, category))
    }

    /// Receiver that changes every time the state does
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision_rx.clone()
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        let _ = self.command_tx.send(EventStoreCommand::Shutdown).await;
        Ok(())
    }

    async fn send(&self, command: EventStoreCommand) -> AppResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| store_error(&format!("Actor mailbox error: {}", e)))
    }
}
