use crate::error::{config_error, env_error, AppResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;

/// Collection the scraper writes to
pub const DEFAULT_EVENTS_COLLECTION: &str = "scraped_events";
/// Seconds between two database refreshes
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;
/// Shortest refresh interval accepted from the environment
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_GOOGLE_CALENDAR_ID: &str = "primary";
pub const DEFAULT_GOOGLE_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

const COMPONENTS_FILE: &str = "config/components.toml";

/// OAuth client credentials used to refresh Google access tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the hosted realtime database
    pub database_url: String,
    /// Optional `auth` query parameter for the database
    pub database_auth: Option<String>,
    /// Name of the collection holding scraped events
    pub events_collection: String,
    /// Seconds between snapshot refreshes
    pub refresh_interval_secs: u64,
    /// Credentials for refresh-token authorization
    pub google_credentials: Option<GoogleCredentials>,
    /// Fixed bearer token, used when no credentials are configured
    pub google_access_token: Option<String>,
    /// Google Calendar ID to read from and insert into
    pub google_calendar_id: String,
    pub google_api_base: String,
    pub google_token_url: String,
    /// Viewer time zone (IANA name)
    pub timezone: String,
    /// Language of display labels
    pub locale: String,
    /// Map of component names to their enabled status
    pub components: HashMap<String, bool>,
}

impl Default for Config {
    fn default() -> Self {
        let mut components = HashMap::new();
        components.insert("realtime_db".to_string(), true);
        components.insert("google_calendar".to_string(), true);

        Self {
            database_url: String::new(),
            database_auth: None,
            events_collection: DEFAULT_EVENTS_COLLECTION.to_string(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            google_credentials: None,
            google_access_token: None,
            google_calendar_id: DEFAULT_GOOGLE_CALENDAR_ID.to_string(),
            google_api_base: DEFAULT_GOOGLE_API_BASE.to_string(),
            google_token_url: DEFAULT_GOOGLE_TOKEN_URL.to_string(),
            timezone: "UTC".to_string(),
            locale: "en".to_string(),
            components,
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let database_url =
            env::var("FIREBASE_DATABASE_URL").map_err(|_| env_error("FIREBASE_DATABASE_URL"))?;

        let refresh_interval_secs = match env::var("REFRESH_INTERVAL_SECS") {
            Ok(raw) => parse_refresh_interval(&raw)?,
            Err(_) => DEFAULT_REFRESH_INTERVAL_SECS,
        };

        let google_credentials = match (
            optional_var("GOOGLE_CLIENT_ID"),
            optional_var("GOOGLE_CLIENT_SECRET"),
            optional_var("GOOGLE_REFRESH_TOKEN"),
        ) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => {
                Some(GoogleCredentials {
                    client_id,
                    client_secret,
                    refresh_token,
                })
            }
            _ => None,
        };

        let mut config = Config {
            database_url,
            database_auth: optional_var("FIREBASE_AUTH"),
            events_collection: optional_var("EVENTS_COLLECTION")
                .unwrap_or_else(|| DEFAULT_EVENTS_COLLECTION.to_string()),
            refresh_interval_secs,
            google_credentials,
            google_access_token: optional_var("GOOGLE_ACCESS_TOKEN"),
            google_calendar_id: optional_var("GOOGLE_CALENDAR_ID")
                .unwrap_or_else(|| DEFAULT_GOOGLE_CALENDAR_ID.to_string()),
            google_api_base: optional_var("GOOGLE_API_BASE")
                .unwrap_or_else(|| DEFAULT_GOOGLE_API_BASE.to_string()),
            google_token_url: optional_var("GOOGLE_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_GOOGLE_TOKEN_URL.to_string()),
            timezone: optional_var("TIMEZONE").unwrap_or_else(|| String::from("UTC")),
            locale: optional_var("LOCALE").unwrap_or_else(|| String::from("en")),
            ..Config::default()
        };

        // Fail early on an unknown zone
        config.tz()?;

        // Load components configuration from file if it exists
        if let Ok(content) = fs::read_to_string(COMPONENTS_FILE) {
            config.merge_components(&content)?;
        }

        Ok(config)
    }

    /// Resolve the viewer time zone
    pub fn tz(&self) -> AppResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown time zone '{}'", self.timezone)))
    }

    /// Whether any form of Google authorization is configured
    pub fn has_google_auth(&self) -> bool {
        self.google_credentials.is_some() || self.google_access_token.is_some()
    }

    /// Check if a component is enabled
    pub fn is_component_enabled(&self, name: &str) -> bool {
        *self.components.get(name).unwrap_or(&false)
    }

    /// Merge component flags from TOML over the defaults
    pub fn merge_components(&mut self, content: &str) -> AppResult<()> {
        let file_components = toml::from_str::<HashMap<String, bool>>(content)?;
        for (key, value) in file_components {
            self.components.insert(key, value);
        }
        Ok(())
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_refresh_interval(raw: &str) -> AppResult<u64> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| config_error("Invalid REFRESH_INTERVAL_SECS format"))?;
    Ok(secs.max(MIN_REFRESH_INTERVAL_SECS))
}
