use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::snapshot::ScrapedSnapshot;
use crate::config::Config;
use crate::error::{database_error, AppResult};

/// REST client for the hosted realtime database
#[derive(Debug, Clone)]
pub struct RealtimeDbClient {
    client: Client,
    collection_url: Url,
}

impl RealtimeDbClient {
    pub fn new(base_url: &str, collection: &str, auth: Option<&str>) -> AppResult<Self> {
        let url_str = format!(
            "{}/{}.json",
            base_url.trim_end_matches('/'),
            collection.trim_matches('/')
        );

        let mut collection_url = Url::parse(&url_str)
            .map_err(|e| database_error(&format!("Invalid database URL '{}': {}", url_str, e)))?;

        if let Some(auth) = auth {
            collection_url.query_pairs_mut().append_pair("auth", auth);
        }

        Ok(Self {
            client: Client::new(),
            collection_url,
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            &config.database_url,
            &config.events_collection,
            config.database_auth.as_deref(),
        )
    }

    /// Read the whole collection once
    pub async fn fetch_snapshot(&self) -> AppResult<ScrapedSnapshot> {
        debug!("Fetching snapshot from {}", self.collection_url.path());

        let response = self
            .client
            .get(self.collection_url.clone())
            .send()
            .await
            .map_err(|e| database_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(database_error(&format!(
                "Failed to fetch events: HTTP {} - {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| database_error(&format!("Failed to parse snapshot: {}", e)))?;

        Ok(ScrapedSnapshot::from_value(body))
    }
}
