use crate::commands::{self, Cli, CommandContext};
use crate::components::{
    google_calendar::GoogleCalendar, realtime_db::RealtimeDb, ComponentManager, EventStoreHandle,
};
use crate::config::Config;
use crate::error::Error;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Wire up the store and components, then run the requested command
pub async fn run(cli: Cli, config: Arc<RwLock<Config>>) -> miette::Result<()> {
    let tz = {
        let config_read = config.read().await;
        crate::utils::i18n::set_locale(&config_read.locale);
        info!("Setting locale to {}", config_read.locale);
        config_read.tz()?
    };
    info!("Showing events in {}", tz);

    if !config.read().await.has_google_auth() {
        info!("No calendar credentials configured, calendar features are disabled");
    }

    let store = EventStoreHandle::new(tz);

    // Initialize component manager
    let mut component_manager = ComponentManager::new(Arc::clone(&config));
    component_manager.register(RealtimeDb::new());
    component_manager.register(GoogleCalendar::new());
    let component_manager = Arc::new(component_manager);

    let ctx = CommandContext::new(Arc::clone(&config), store)
        .with_component_manager(component_manager);

    commands::run(cli.command.unwrap_or_default(), &ctx).await?;
    Ok(())
}
