use crate::events::{
    EventState, EventView, RawExternalEvent, RawScrapedEvent, Source, ViewKind,
};
use chrono::Utc;
use chrono_tz::Tz;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

/// Commands that can be sent to the event store actor
pub enum EventStoreCommand {
    ApplySnapshot(Vec<RawScrapedEvent>, oneshot::Sender<usize>),
    IssueExternalTicket(oneshot::Sender<u64>),
    ApplyExternal {
        ticket: u64,
        records: Vec<RawExternalEvent>,
        respond_to: oneshot::Sender<bool>,
    },
    ClearExternal,
    ReportFailure(Source, String),
    View(ViewKind, oneshot::Sender<EventView>),
    Shutdown,
}

/// Owns the current [`EventState`] and applies commands one at a time, so
/// no reader ever sees a half-applied snapshot.
pub struct EventStoreActor {
    state: EventState,
    tz: Tz,
    command_rx: mpsc::Receiver<EventStoreCommand>,
    revision_tx: watch::Sender<u64>,
}

impl EventStoreActor {
    /// Create a new actor with its mailbox and revision channel
    pub fn new(
        tz: Tz,
    ) -> (
        Self,
        mpsc::Sender<EventStoreCommand>,
        watch::Receiver<u64>,
    ) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (revision_tx, revision_rx) = watch::channel(0);

        let actor = Self {
            state: EventState::new(),
            tz,
            command_rx,
            revision_tx,
        };

        (actor, command_tx, revision_rx)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Event store actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                EventStoreCommand::ApplySnapshot(records, response_tx) => {
                    let state = std::mem::take(&mut self.state);
                    self.state = state.apply_snapshot(records, &self.tz, Utc::now());
                    let retained = self.state.scraped.len();
                    info!("Applied database snapshot: {} upcoming events", retained);
                    self.bump_revision();
                    let _ = response_tx.send(retained);
                }
                EventStoreCommand::IssueExternalTicket(response_tx) => {
                    let _ = response_tx.send(self.state.issue_external_ticket());
                }
                EventStoreCommand::ApplyExternal {
                    ticket,
                    records,
                    respond_to,
                } => {
                    let state = std::mem::take(&mut self.state);
                    let (state, applied) =
                        state.apply_external(ticket, records, &self.tz, Utc::now());
                    self.state = state;
                    if applied {
                        info!(
                            "Applied calendar events: {} upcoming events",
                            self.state.external.len()
                        );
                        self.bump_revision();
                    } else {
                        debug!("Discarding calendar fetch with superseded ticket {}", ticket);
                    }
                    let _ = respond_to.send(applied);
                }
                EventStoreCommand::ClearExternal => {
                    let state = std::mem::take(&mut self.state);
                    self.state = state.clear_external();
                    self.bump_revision();
                }
                EventStoreCommand::ReportFailure(source, message) => {
                    warn!("Fetching {} events failed: {}", source, message);
                    let state = std::mem::take(&mut self.state);
                    self.state = state.report_failure(source, message);
                    self.bump_revision();
                }
                EventStoreCommand::View(kind, response_tx) => {
                    let _ = response_tx.send(self.state.view(kind, &self.tz, Utc::now()));
                }
                EventStoreCommand::Shutdown => {
                    info!("Event store actor shutting down");
                    break;
                }
            }
        }

        info!("Event store actor shut down");
    }

    fn bump_revision(&self) {
        self.revision_tx.send_modify(|revision| *revision += 1);
    }
}
