use chrono_tz::UTC;
use eventflow::components::google_calendar::token::{RefreshTokenAuthorizer, StaticTokenAuthorizer};
use eventflow::components::google_calendar::{sync_external, Authorizer, NewCalendarEvent};
use eventflow::components::{EventStoreHandle, GoogleCalendarHandle};
use eventflow::config::{Config, GoogleCredentials};
use eventflow::error::Error;
use eventflow::events::{EventTime, SourceStatus, ViewKind};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EVENTS_PATH: &str = "/calendars/primary/events";

fn config_for(server: &MockServer) -> Config {
    Config {
        google_api_base: server.uri(),
        google_token_url: format!("{}/token", server.uri()),
        ..Config::default()
    }
}

fn static_handle(server: &MockServer) -> GoogleCalendarHandle {
    GoogleCalendarHandle::new(
        &config_for(server),
        Arc::new(StaticTokenAuthorizer::new("ya29.test")),
    )
    .unwrap()
}

#[tokio::test]
async fn test_list_upcoming_sends_window_and_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .and(header("Authorization", "Bearer ya29.test"))
        .and(query_param("singleEvents", "true"))
        .and(query_param("orderBy", "startTime"))
        .and(query_param("showDeleted", "false"))
        .and(query_param("maxResults", "250"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "id": "g1",
                    "summary": "Dentist",
                    "start": { "dateTime": "2099-03-01T10:00:00Z" },
                    "end": { "dateTime": "2099-03-01T11:00:00Z" }
                },
                {
                    "id": "g2",
                    "status": "cancelled",
                    "start": { "date": "2099-03-02" },
                    "end": { "date": "2099-03-03" }
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let handle = static_handle(&server);
    let events = handle.list_upcoming().await.unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].summary.as_deref(), Some("Dentist"));
    assert!(events[1].is_cancelled());

    let requests = server.received_requests().await.unwrap();
    let query: Vec<(String, String)> = requests[0]
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert!(query.iter().any(|(k, _)| k == "timeMin"));
    assert!(query.iter().any(|(k, _)| k == "timeMax"));
}

#[tokio::test]
async fn test_sync_external_applies_and_drops_cancelled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "id": "g1",
                    "summary": "Dentist",
                    "organizer": { "email": "me@example.com" },
                    "start": { "dateTime": "2099-03-01T10:00:00Z" },
                    "end": { "dateTime": "2099-03-01T11:00:00Z" }
                },
                {
                    "id": "g2",
                    "status": "cancelled",
                    "start": { "date": "2099-03-02" },
                    "end": { "date": "2099-03-03" }
                }
            ]
        })))
        .mount(&server)
        .await;

    let handle = static_handle(&server);
    let store = EventStoreHandle::new(UTC);

    assert!(sync_external(&handle, &store).await.unwrap());

    let view = store.view(ViewKind::Upcoming).await.unwrap();
    assert_eq!(view.batch.len(), 1);
    let event = &view.batch.events()[0];
    assert_eq!(event.host, "me@example.com");
    assert_eq!(event.tag, "Google Calendar");
    assert_eq!(event.time_label(), "10:00 AM - 11:00 AM");
}

#[tokio::test]
async fn test_list_without_items_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "kind": "calendar#events" })))
        .mount(&server)
        .await;

    assert!(static_handle(&server).list_upcoming().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_sync_is_reported_to_store() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
        .mount(&server)
        .await;

    let handle = static_handle(&server);
    let store = EventStoreHandle::new(UTC);

    let err = sync_external(&handle, &store).await.unwrap_err();
    assert!(matches!(err, Error::GoogleCalendar(_)));

    let view = store.view(ViewKind::Upcoming).await.unwrap();
    assert!(view.batch.is_empty());
    assert!(matches!(view.status, SourceStatus::Failed { .. }));
}

#[tokio::test]
async fn test_insert_posts_event_resource() {
    let server = MockServer::start().await;

    let request = NewCalendarEvent {
        summary: "Quad Day".to_string(),
        location: "Main Quad".to_string(),
        description: String::new(),
        start: EventTime {
            date_time: Some("2099-08-24T12:00:00".to_string()),
            time_zone: Some("America/Chicago".to_string()),
            ..Default::default()
        },
        end: EventTime {
            date_time: Some("2099-08-24T15:00:00".to_string()),
            time_zone: Some("America/Chicago".to_string()),
            ..Default::default()
        },
    };

    Mock::given(method("POST"))
        .and(path(EVENTS_PATH))
        .and(header("Authorization", "Bearer ya29.test"))
        .and(body_json(json!({
            "summary": "Quad Day",
            "location": "Main Quad",
            "description": "",
            "start": { "dateTime": "2099-08-24T12:00:00", "timeZone": "America/Chicago" },
            "end": { "dateTime": "2099-08-24T15:00:00", "timeZone": "America/Chicago" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "created1",
            "htmlLink": "https://calendar.google.com/event?eid=created1",
            "summary": "Quad Day",
            "start": { "dateTime": "2099-08-24T12:00:00-05:00" },
            "end": { "dateTime": "2099-08-24T15:00:00-05:00" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = static_handle(&server).insert_event(request).await.unwrap();
    assert_eq!(created.id.as_deref(), Some("created1"));
    assert!(created.html_link.is_some());
}

#[tokio::test]
async fn test_refresh_token_is_exchanged_once_and_cached() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=1%2F%2Frefresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.fresh",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let authorizer = RefreshTokenAuthorizer::new(
        GoogleCredentials {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: "1//refresh".to_string(),
        },
        format!("{}/token", server.uri()),
    );

    let first = authorizer.authorize().await.unwrap();
    let second = authorizer.authorize().await.unwrap();
    assert_eq!(first.secret, "ya29.fresh");
    assert_eq!(first, second);
    assert!(first.expires_at.is_some());
}

#[tokio::test]
async fn test_refresh_failure_is_authorization_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_grant" })))
        .mount(&server)
        .await;

    let authorizer = RefreshTokenAuthorizer::new(
        GoogleCredentials {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: "revoked".to_string(),
        },
        format!("{}/token", server.uri()),
    );

    let err = authorizer.authorize().await.unwrap_err();
    assert!(matches!(err, Error::Authorization(m) if m.contains("invalid_grant")));
}
