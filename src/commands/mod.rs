use crate::components::{ComponentManager, EventStoreHandle};
use crate::config::Config;
use crate::error::AppResult;
use crate::events::ViewKind;
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;
use tokio::sync::RwLock;

// Export submodules
pub mod browse;
pub mod calendar;
pub mod render;
pub mod watch;

/// Campus event feed: fetch, order and search upcoming events
#[derive(Debug, Parser)]
#[command(name = "eventflow", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Keep the feed fresh and print it whenever it changes
    Watch {
        #[arg(long, value_enum, default_value_t = ViewArg::Browse)]
        view: ViewArg,
    },
    /// Fetch once and print matching events
    List {
        /// Case-insensitive text to look for in title, description or location
        #[arg(short, long, default_value = "")]
        query: String,
        /// Exact category, or `all`
        #[arg(short, long, default_value = crate::events::ALL_CATEGORIES)]
        category: String,
        #[arg(long, value_enum, default_value_t = ViewArg::Browse)]
        view: ViewArg,
    },
    /// Fetch once and print the category vocabulary
    Categories {
        #[arg(long, value_enum, default_value_t = ViewArg::Browse)]
        view: ViewArg,
    },
    /// Add a campus event to your calendar by id
    Add {
        id: String,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Watch {
            view: ViewArg::Browse,
        }
    }
}

/// `--view` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewArg {
    Browse,
    Upcoming,
    Combined,
}

impl From<ViewArg> for ViewKind {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Browse => ViewKind::Browse,
            ViewArg::Upcoming => ViewKind::Upcoming,
            ViewArg::Combined => ViewKind::Combined,
        }
    }
}

/// Shared context for all commands
#[derive(Clone)]
pub struct CommandContext {
    pub config: Arc<RwLock<Config>>,
    pub store: EventStoreHandle,
    pub component_manager: Option<Arc<ComponentManager>>,
}

impl CommandContext {
    /// Create a new command context
    pub fn new(config: Arc<RwLock<Config>>, store: EventStoreHandle) -> Self {
        Self {
            config,
            store,
            component_manager: None,
        }
    }

    /// Set the component manager
    pub fn with_component_manager(mut self, component_manager: Arc<ComponentManager>) -> Self {
        self.component_manager = Some(component_manager);
        self
    }
}

/// Type alias for command result
pub type CommandResult = AppResult<()>;

/// Dispatch one parsed command
pub async fn run(command: Command, ctx: &CommandContext) -> CommandResult {
    match command {
        Command::Watch { view } => watch::watch(ctx, view.into()).await,
        Command::List {
            query,
            category,
            view,
        } => browse::list(ctx, view.into(), &query, &category).await,
        Command::Categories { view } => browse::categories(ctx, view.into()).await,
        Command::Add { id } => calendar::add(ctx, &id).await,
    }
}
