use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(eventflow::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(eventflow::config))]
    Config(String),

    #[error("Realtime database error: {0}")]
    #[diagnostic(code(eventflow::database))]
    Database(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(eventflow::google_calendar))]
    GoogleCalendar(String),

    #[error("Authorization error: {0}")]
    #[diagnostic(
        code(eventflow::authorization),
        help("Check GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET and GOOGLE_REFRESH_TOKEN")
    )]
    Authorization(String),

    #[error("Event store error: {0}")]
    #[diagnostic(code(eventflow::store))]
    Store(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(eventflow::component))]
    Component(String),

    #[error(transparent)]
    #[diagnostic(code(eventflow::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(eventflow::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(eventflow::other))]
    Other(String),
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create realtime database errors
pub fn database_error(message: &str) -> Error {
    Error::Database(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create authorization errors
pub fn authorization_error(message: &str) -> Error {
    Error::Authorization(message.to_string())
}

/// Helper to create event store errors
pub fn store_error(message: &str) -> Error {
    Error::Store(message.to_string())
}

/// Helper to create component errors
pub fn component_error(message: &str) -> Error {
    Error::Component(message.to_string())
}
