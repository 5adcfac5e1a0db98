use super::render::render_view;
use super::{CommandContext, CommandResult};
use crate::error::component_error;
use crate::events::ViewKind;
use crate::shutdown;
use rust_i18n::t;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Start the components and print `kind` every time the store changes
pub async fn watch(ctx: &CommandContext, kind: ViewKind) -> CommandResult {
    let manager = ctx
        .component_manager
        .clone()
        .ok_or_else(|| component_error("Component manager is not available"))?;

    let cancel = CancellationToken::new();
    let mut revisions = ctx.store.subscribe();

    manager.init_all(ctx.store.clone(), cancel.clone()).await?;

    // Spawn signal handler task
    let shutdown_cancel = cancel.clone();
    let shutdown_components = Arc::clone(&manager);
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_cancel, shutdown_components).await;
    });

    println!("{}", t!("watch_started"));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Received shutdown signal, stopping watch");
                break;
            }
            changed = revisions.changed() => {
                if changed.is_err() {
                    error!("Event store closed");
                    break;
                }
                let view = ctx.store.view(kind).await?;
                println!("{}", render_view(&view, view.batch.events()));
            }
        }
    }

    ctx.store.shutdown().await
}
