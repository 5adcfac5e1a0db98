use super::models::{EventsListResponse, NewCalendarEvent};
use super::time::list_window;
use super::token::Authorizer;
use crate::error::{google_calendar_error, AppResult};
use crate::events::RawExternalEvent;
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use url::Url;

/// Page size of an events list request
const MAX_RESULTS: &str = "250";

/// Commands that can be sent to the Google Calendar actor
pub enum GoogleCalendarCommand {
    ListUpcoming(oneshot::Sender<AppResult<Vec<RawExternalEvent>>>),
    Insert(NewCalendarEvent, oneshot::Sender<AppResult<RawExternalEvent>>),
    Shutdown,
}

/// The events endpoint of one calendar, with its authorizer
#[derive(Clone)]
pub struct CalendarApi {
    client: Client,
    authorizer: Arc<dyn Authorizer>,
    events_url: Url,
}

impl CalendarApi {
    pub fn new(api_base: &str, calendar_id: &str, authorizer: Arc<dyn Authorizer>) -> AppResult<Self> {
        let mut events_url = Url::parse(api_base.trim_end_matches('/'))
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

        events_url
            .path_segments_mut()
            .map_err(|_| google_calendar_error("Calendar API URL cannot be a base"))?
            .extend(["calendars", calendar_id, "events"]);

        Ok(Self {
            client: Client::new(),
            authorizer,
            events_url,
        })
    }

    /// Events from now until a year ahead, recurring events expanded
    pub async fn list_upcoming(&self) -> AppResult<Vec<RawExternalEvent>> {
        let token = self.authorizer.authorize().await?;
        let (time_min, time_max) = list_window(Utc::now());

        let mut url = self.events_url.clone();
        url.query_pairs_mut()
            .append_pair("timeMin", &time_min.to_rfc3339_opts(SecondsFormat::Secs, true))
            .append_pair("timeMax", &time_max.to_rfc3339_opts(SecondsFormat::Secs, true))
            .append_pair("showDeleted", "false")
            .append_pair("singleEvents", "true")
            .append_pair("maxResults", MAX_RESULTS)
            .append_pair("orderBy", "startTime");

        let response = self
            .client
            .get(url)
            .header("Authorization", token.bearer())
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to fetch events: HTTP {} - {}",
                status, error_body
            )));
        }

        let body: EventsListResponse = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse events response: {}", e)))?;

        if body.next_page_token.is_some() {
            debug!("Events list truncated at {} results", MAX_RESULTS);
        }

        Ok(body.items)
    }

    /// Insert one event and return the created resource
    pub async fn insert(&self, event: &NewCalendarEvent) -> AppResult<RawExternalEvent> {
        let token = self.authorizer.authorize().await?;

        let response = self
            .client
            .post(self.events_url.clone())
            .header("Authorization", token.bearer())
            .json(event)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to insert event: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to insert event: HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse insert response: {}", e)))
    }
}

/// The Google Calendar actor that processes messages
pub struct GoogleCalendarActor {
    api: CalendarApi,
    command_rx: mpsc::Receiver<GoogleCalendarCommand>,
}

impl GoogleCalendarActor {
    /// Create a new actor and its mailbox
    pub fn new(api: CalendarApi) -> (Self, mpsc::Sender<GoogleCalendarCommand>) {
        let (command_tx, command_rx) = mpsc::channel(32);
        (Self { api, command_rx }, command_tx)
    }

    /// Start the actor's processing loop.
    ///
    /// Each request runs as its own task, so a slow call never holds up
    /// the mailbox and no two calls share state.
    pub async fn run(&mut self) {
        info!("Google Calendar actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                GoogleCalendarCommand::ListUpcoming(response_tx) => {
                    let api = self.api.clone();
                    tokio::spawn(async move {
                        let _ = response_tx.send(api.list_upcoming().await);
                    });
                }
                GoogleCalendarCommand::Insert(event, response_tx) => {
                    let api = self.api.clone();
                    tokio::spawn(async move {
                        let _ = response_tx.send(api.insert(&event).await);
                    });
                }
                GoogleCalendarCommand::Shutdown => {
                    info!("Google Calendar actor shutting down");
                    break;
                }
            }
        }

        info!("Google Calendar actor shut down");
    }
}
