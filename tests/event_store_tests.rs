use chrono::{Days, Utc};
use chrono_tz::UTC;
use eventflow::components::EventStoreHandle;
use eventflow::events::{
    EventTime, RawExternalEvent, RawScrapedEvent, Source, SourceStatus, ViewKind,
};

/// A date safely in the future relative to the wall clock running the test
fn future_day(days: u64) -> String {
    (Utc::now().date_naive() + Days::new(days))
        .format("%Y-%m-%d")
        .to_string()
}

fn scraped(id: &str, days_ahead: u64, tag: &str) -> RawScrapedEvent {
    RawScrapedEvent {
        id: Some(id.to_string()),
        summary: Some(format!("Event {}", id)),
        start: Some(format!("{}T12:00:00", future_day(days_ahead))),
        tag: Some(tag.to_string()),
        ..Default::default()
    }
}

fn external(id: &str, days_ahead: u64) -> RawExternalEvent {
    RawExternalEvent {
        id: Some(id.to_string()),
        summary: Some(format!("Event {}", id)),
        start: EventTime {
            date: Some(future_day(days_ahead)),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn test_snapshot_replaces_browse_view() {
    let store = EventStoreHandle::new(UTC);

    let retained = store
        .apply_snapshot(vec![scraped("a", 3, "Music"), scraped("b", 1, "Sports")])
        .await
        .unwrap();
    assert_eq!(retained, 2);

    let view = store.view(ViewKind::Browse).await.unwrap();
    let ids: Vec<_> = view.batch.events().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
    assert!(matches!(view.status, SourceStatus::Ready { .. }));

    store.apply_snapshot(Vec::new()).await.unwrap();
    let view = store.view(ViewKind::Browse).await.unwrap();
    assert!(view.batch.is_empty());
    assert!(view.batch.categories().is_empty());

    store.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_revision_changes_on_every_apply() {
    let store = EventStoreHandle::new(UTC);
    let mut revisions = store.subscribe();
    assert_eq!(*revisions.borrow(), 0);

    store.apply_snapshot(vec![scraped("a", 1, "Music")]).await.unwrap();
    revisions.changed().await.unwrap();
    assert_eq!(*revisions.borrow_and_update(), 1);

    store
        .report_failure(Source::Scraped, "timeout")
        .await
        .unwrap();
    revisions.changed().await.unwrap();
    assert_eq!(*revisions.borrow_and_update(), 2);
}

#[tokio::test]
async fn test_latest_external_fetch_wins() {
    let store = EventStoreHandle::new(UTC);

    let first = store.issue_external_ticket().await.unwrap();
    let second = store.issue_external_ticket().await.unwrap();
    assert!(second > first);

    // The newer fetch lands first; the older one must not overwrite it
    assert!(store.apply_external(second, vec![external("new", 2)]).await.unwrap());
    assert!(!store.apply_external(first, vec![external("stale", 2)]).await.unwrap());

    let view = store.view(ViewKind::Upcoming).await.unwrap();
    let ids: Vec<_> = view.batch.events().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["new"]);
}

#[tokio::test]
async fn test_clear_external_discards_in_flight_fetch() {
    let store = EventStoreHandle::new(UTC);
    let ticket = store.issue_external_ticket().await.unwrap();
    store.clear_external().await.unwrap();

    assert!(!store.apply_external(ticket, vec![external("late", 1)]).await.unwrap());
    let view = store.view(ViewKind::Upcoming).await.unwrap();
    assert!(view.batch.is_empty());
    assert_eq!(view.status, SourceStatus::Pending);
}

#[tokio::test]
async fn test_failure_keeps_previous_batch() {
    let store = EventStoreHandle::new(UTC);
    store.apply_snapshot(vec![scraped("a", 1, "Music")]).await.unwrap();
    store
        .report_failure(Source::Scraped, "HTTP 503")
        .await
        .unwrap();

    let view = store.view(ViewKind::Browse).await.unwrap();
    assert_eq!(view.batch.len(), 1);
    assert_eq!(
        view.status,
        SourceStatus::Failed {
            message: "HTTP 503".to_string()
        }
    );
}

#[tokio::test]
async fn test_combined_view_and_filter() {
    let store = EventStoreHandle::new(UTC);
    store
        .apply_snapshot(vec![scraped("s1", 1, "Music"), scraped("s2", 3, "Sports")])
        .await
        .unwrap();
    let ticket = store.issue_external_ticket().await.unwrap();
    store
        .apply_external(ticket, vec![external("g1", 2)])
        .await
        .unwrap();

    let view = store.view(ViewKind::Combined).await.unwrap();
    let ids: Vec<_> = view.batch.events().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "g1", "s2"]);
    assert_eq!(
        view.batch.categories().labels(),
        ["Google Calendar", "Music", "Sports"]
    );

    let music = store
        .filter(ViewKind::Combined, "", "Music")
        .await
        .unwrap();
    assert_eq!(music.len(), 1);
    assert_eq!(music[0].id, "s1");

    let by_text = store
        .filter(ViewKind::Combined, "event g1", "all")
        .await
        .unwrap();
    assert_eq!(by_text.len(), 1);
}

#[tokio::test]
async fn test_concurrent_readers_see_whole_snapshots() {
    let store = EventStoreHandle::new(UTC);
    let batch: Vec<_> = (0..50).map(|i| scraped(&format!("e{}", i), 1, "Music")).collect();

    let writer = {
        let store = store.clone();
        tokio::spawn(async move {
            for _ in 0..10 {
                store.apply_snapshot(batch.clone()).await.unwrap();
                store.apply_snapshot(Vec::new()).await.unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                for _ in 0..20 {
                    let len = store.view(ViewKind::Browse).await.unwrap().batch.len();
                    assert!(len == 0 || len == 50, "partial snapshot of {} events", len);
                }
            })
        })
        .collect();

    writer.await.unwrap();
    for reader in futures::future::join_all(readers).await {
        reader.unwrap();
    }
}
