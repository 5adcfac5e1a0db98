use super::render::{render_categories, render_view};
use super::{CommandContext, CommandResult};
use crate::components::google_calendar::{authorizer_from_config, sync_external};
use crate::components::realtime_db::{refresh_once, RealtimeDbClient};
use crate::components::GoogleCalendarHandle;
use crate::error::{config_error, AppResult};
use crate::events::{EventView, ViewKind};
use tracing::{info, warn};

/// Run one fetch of every source `kind` draws on and return the view.
///
/// Both sources are fetched concurrently. A failed database fetch aborts.
/// A failed calendar fetch aborts the calendar view and only marks the
/// calendar source as failed everywhere else.
pub async fn fetch_view(ctx: &CommandContext, kind: ViewKind) -> AppResult<EventView> {
    let (scraped, external) = futures::join!(
        async {
            match kind {
                ViewKind::Upcoming => Ok(()),
                _ => fetch_scraped(ctx).await,
            }
        },
        async {
            match kind {
                ViewKind::Browse => Ok(()),
                _ => fetch_external(ctx, kind == ViewKind::Upcoming).await,
            }
        }
    );
    scraped?;
    external?;

    ctx.store.view(kind).await
}

async fn fetch_scraped(ctx: &CommandContext) -> AppResult<()> {
    let client = {
        let config = ctx.config.read().await;
        RealtimeDbClient::from_config(&config)?
    };
    let retained = refresh_once(&client, &ctx.store).await?;
    info!("Fetched {} upcoming campus events", retained);
    Ok(())
}

/// Sync the calendar once; missing credentials or a failed sync are errors only if `required`
async fn fetch_external(ctx: &CommandContext, required: bool) -> AppResult<()> {
    let calendar = {
        let config = ctx.config.read().await;
        match authorizer_from_config(&config) {
            Some(authorizer) => GoogleCalendarHandle::new(&config, authorizer)?,
            None if required => {
                return Err(config_error(
                    "Calendar credentials are not configured (GOOGLE_ACCESS_TOKEN or GOOGLE_REFRESH_TOKEN)",
                ))
            }
            None => {
                info!("No calendar credentials configured, showing campus events only");
                return Ok(());
            }
        }
    };

    let synced = sync_external(&calendar, &ctx.store).await;
    calendar.shutdown().await?;

    match synced {
        Err(e) if required => Err(e),
        Err(e) => {
            warn!("Calendar events unavailable: {}", e);
            Ok(())
        }
        Ok(_) => Ok(()),
    }
}

/// Print the events of a view matching a query and category
pub async fn list(ctx: &CommandContext, kind: ViewKind, query: &str, category: &str) -> CommandResult {
    let view = fetch_view(ctx, kind).await?;

    if !view.batch.categories().contains(category) {
        warn!("No event in this view has category '{}'", category);
    }

    let events = view.batch.filter(query, category);
    println!("{}", render_view(&view, &events));
    Ok(())
}

/// Print the category vocabulary of a view
pub async fn categories(ctx: &CommandContext, kind: ViewKind) -> CommandResult {
    let view = fetch_view(ctx, kind).await?;
    println!("{}", render_categories(view.batch.categories()));
    Ok(())
}
