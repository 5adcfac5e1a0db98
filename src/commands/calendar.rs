use super::browse::fetch_view;
use super::{CommandContext, CommandResult};
use crate::components::google_calendar::{authorizer_from_config, GoogleCalendar, NewCalendarEvent};
use crate::components::GoogleCalendarHandle;
use crate::error::{config_error, google_calendar_error, AppResult};
use crate::events::ViewKind;
use rust_i18n::t;
use tracing::{debug, info};

/// Add a campus event to the configured calendar
pub async fn add(ctx: &CommandContext, id: &str) -> CommandResult {
    let view = fetch_view(ctx, ViewKind::Browse).await?;
    let event = view.batch.find(id).ok_or_else(|| {
        google_calendar_error(&format!("No upcoming campus event with id '{}'", id))
    })?;

    let request = {
        let config = ctx.config.read().await;
        NewCalendarEvent::from_normalized(event, &config.tz()?)?
    };

    let handle = calendar_handle(ctx).await?;
    let created = handle.insert_event(request).await?;
    info!("Inserted event {} as {:?}", id, created.id);

    println!("{}", t!("event_added", title = event.title));
    if let Some(link) = &created.html_link {
        println!("{}", t!("event_added_link", link = link));
    }

    Ok(())
}

/// The running component's handle, or a standalone one
async fn calendar_handle(ctx: &CommandContext) -> AppResult<GoogleCalendarHandle> {
    if let Some(cm) = &ctx.component_manager {
        if let Some(component) = cm
            .get_component_by_name("google_calendar")
            .and_then(|component| component.as_any().downcast_ref::<GoogleCalendar>())
        {
            if let Some(handle) = component.get_handle().await {
                debug!("Using Google Calendar component from ComponentManager");
                return Ok(handle);
            }
        }
    }

    debug!("Creating standalone Google Calendar handle");
    let config = ctx.config.read().await;
    let authorizer = authorizer_from_config(&config).ok_or_else(|| {
        config_error(
            "Calendar credentials are not configured (GOOGLE_ACCESS_TOKEN or GOOGLE_REFRESH_TOKEN)",
        )
    })?;
    GoogleCalendarHandle::new(&config, authorizer)
}
