use super::actor::{CalendarApi, GoogleCalendarActor, GoogleCalendarCommand};
use super::models::NewCalendarEvent;
use super::token::Authorizer;
use crate::config::Config;
use crate::error::{google_calendar_error, AppResult};
use crate::events::RawExternalEvent;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Handle for interacting with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarHandle {
    command_tx: mpsc::Sender<GoogleCalendarCommand>,
    _actor_task: Arc<JoinHandle<()>>,
}

impl GoogleCalendarHandle {
    /// Create a new GoogleCalendarHandle and spawn the actor
    pub fn new(config: &Config, authorizer: Arc<dyn Authorizer>) -> AppResult<Self> {
        let api = CalendarApi::new(&config.google_api_base, &config.google_calendar_id, authorizer)?;
        let (mut actor, command_tx) = GoogleCalendarActor::new(api);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Ok(Self {
            command_tx,
            _actor_task: Arc::new(actor_task),
        })
    }

    /// Upcoming events of the configured calendar
    pub async fn list_upcoming(&self) -> AppResult<Vec<RawExternalEvent>> {
        let (response_tx, response_rx) = oneshot::channel();
        self.send(GoogleCalendarCommand::ListUpcoming(response_tx))
            .await?;
        response_rx
            .await
            .map_err(|_| google_calendar_error("Response channel closed"))?
    }

    /// Add an event to the configured calendar
    pub async fn insert_event(&self, event: NewCalendarEvent) -> AppResult<RawExternalEvent> {
        let (response_tx, response_rx) = oneshot::channel();
        self.send(GoogleCalendarCommand::Insert(event, response_tx))
            .await?;
        response_rx
            .await
            .map_err(|_| google_calendar_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        let _ = self.command_tx.send(GoogleCalendarCommand::Shutdown).await;
        Ok(())
    }

    async fn send(&self, command: GoogleCalendarCommand) -> AppResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| google_calendar_error(&format!("Actor mailbox error: {}", e)))
    }
}
