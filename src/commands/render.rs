//! Plain-text rendering of views for the terminal.

use crate::events::{CategorySet, EventView, NormalizedEvent, SourceStatus, ViewKind};
use rust_i18n::t;

/// Timestamp layout in status lines
const STATUS_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

pub fn view_title(kind: ViewKind) -> String {
    match kind {
        ViewKind::Browse => t!("view_browse").to_string(),
        ViewKind::Upcoming => t!("view_upcoming").to_string(),
        ViewKind::Combined => t!("view_combined").to_string(),
    }
}

pub fn status_line(status: &SourceStatus) -> String {
    match status {
        SourceStatus::Pending => t!("status_pending").to_string(),
        SourceStatus::Ready { fetched_at } => {
            t!("status_ready", time = fetched_at.format(STATUS_TIME_FORMAT)).to_string()
        }
        SourceStatus::Failed { message } => t!("status_failed", message = message).to_string(),
    }
}

/// One event card
pub fn render_event(event: &NormalizedEvent) -> String {
    let mut lines = vec![
        event.title.clone(),
        format!("  {} | {}", event.start_date, event.time_label()),
        format!("  {}", t!("event_location", location = event.location_label())),
        format!("  {}", t!("event_host", host = event.host)),
        format!("  {}", t!("event_category", tag = event.tag)),
    ];
    if let Some(link) = &event.event_link {
        lines.push(format!("  {}", t!("event_link", link = link)));
    }
    lines.push(format!("  {}", event.description_label()));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Header, status and the given events of a view
pub fn render_view(view: &EventView, events: &[NormalizedEvent]) -> String {
    let mut out = format!(
        "== {} ==\n{}\n{}\n\n",
        view_title(view.kind),
        status_line(&view.status),
        t!("event_count", count = events.len())
    );

    if events.is_empty() {
        out.push_str(&t!("no_events"));
        out.push('\n');
        return out;
    }

    for event in events {
        out.push_str(&render_event(event));
        out.push('\n');
    }
    out
}

/// Category options, `all` first
pub fn render_categories(categories: &CategorySet) -> String {
    let mut out = format!("{}:\n", t!("categories_title"));
    for (index, option) in categories.options().enumerate() {
        let label = if index == 0 {
            t!("category_all").to_string()
        } else {
            option.to_string()
        };
        out.push_str(&format!("  {}\n", label));
    }
    out
}
