use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::{Config, GoogleCredentials};
use crate::error::{authorization_error, AppResult};

/// Lifetime assumed when the token endpoint omits `expires_in`
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;
/// A cached token this close to expiry is refreshed before use
const REFRESH_MARGIN_SECS: i64 = 60;

/// Bearer token for the calendar API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub secret: String,
    /// `None` for tokens of unknown lifetime
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(secret: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            secret: secret.into(),
            expires_at,
        }
    }

    /// Whether the token will have expired `REFRESH_MARGIN_SECS` from `now`
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - TimeDelta::seconds(REFRESH_MARGIN_SECS) <= now,
            None => false,
        }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.secret)
    }
}

/// Source of access tokens; every call is independent
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self) -> AppResult<AccessToken>;
}

/// Hands out a token supplied by configuration
pub struct StaticTokenAuthorizer {
    token: AccessToken,
}

impl StaticTokenAuthorizer {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(secret, None),
        }
    }
}

#[async_trait]
impl Authorizer for StaticTokenAuthorizer {
    async fn authorize(&self) -> AppResult<AccessToken> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Exchanges a long-lived refresh token for access tokens, caching the
/// latest one until it is about to expire
pub struct RefreshTokenAuthorizer {
    credentials: GoogleCredentials,
    token_url: String,
    client: Client,
    cached: Mutex<Option<AccessToken>>,
}

impl RefreshTokenAuthorizer {
    pub fn new(credentials: GoogleCredentials, token_url: impl Into<String>) -> Self {
        Self {
            credentials,
            token_url: token_url.into(),
            client: Client::new(),
            cached: Mutex::new(None),
        }
    }

    /// Request a fresh access token from the token endpoint
    async fn refresh(&self) -> AppResult<AccessToken> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", self.credentials.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| authorization_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(authorization_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| authorization_error(&format!("Failed to parse token response: {}", e)))?;

        let expires_in = token.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        let expires_at = Utc::now() + TimeDelta::seconds(expires_in);
        info!("Refreshed calendar access token, valid until {}", expires_at);

        Ok(AccessToken::new(token.access_token, Some(expires_at)))
    }
}

#[async_trait]
impl Authorizer for RefreshTokenAuthorizer {
    async fn authorize(&self) -> AppResult<AccessToken> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if !token.is_stale(Utc::now()) {
                return Ok(token.clone());
            }
            debug!("Cached calendar token is about to expire");
        }

        let token = self.refresh().await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}

/// Pick an authorizer from configuration.
///
/// Refresh credentials win over a fixed token. `None` when neither is set.
pub fn authorizer_from_config(config: &Config) -> Option<Arc<dyn Authorizer>> {
    if let Some(credentials) = &config.google_credentials {
        return Some(Arc::new(RefreshTokenAuthorizer::new(
            credentials.clone(),
            config.google_token_url.clone(),
        )));
    }

    config
        .google_access_token
        .as_ref()
        .map(|token| Arc::new(StaticTokenAuthorizer::new(token.clone())) as Arc<dyn Authorizer>)
}
