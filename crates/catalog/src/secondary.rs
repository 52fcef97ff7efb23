//! HTTP client for the secondary metadata source.
//!
//! Keyed by the cross-reference (IMDb) id carried on the catalog detail
//! payload. A missing credential short-circuits to an empty overlay so the
//! pipeline works without the secondary source configured.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cache::{DEFAULT_TTL, SqliteCache};
use serde_json::Value;
use tracing::debug;

use crate::api::SecondaryApi;
use crate::error::Result;
use crate::types::SecondaryOverlay;

const CACHE_PREFIX: &str = "omdb";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SecondaryConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for SecondaryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.omdbapi.com/".to_string(),
            api_key: None,
        }
    }
}

impl SecondaryConfig {
    /// Read the credential from `OMDB_API_KEY`.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OMDB_API_KEY").ok(),
            ..Default::default()
        }
    }
}

/// Secondary-source client with read-through caching.
pub struct SecondaryClient {
    http: reqwest::Client,
    cache: Arc<SqliteCache>,
    config: SecondaryConfig,
}

impl SecondaryClient {
    pub fn new(config: SecondaryConfig, cache: Arc<SqliteCache>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            cache,
            config,
        })
    }
}

#[async_trait]
impl SecondaryApi for SecondaryClient {
    async fn overlay(&self, imdb_id: &str) -> Result<Option<SecondaryOverlay>> {
        let Some(api_key) = &self.config.api_key else {
            return Ok(None);
        };
        if imdb_id.is_empty() {
            return Ok(None);
        }

        let key = format!("{CACHE_PREFIX}:{imdb_id}");
        if let Some(hit) = self.cache.get_json(&key) {
            debug!(imdb_id, "secondary cache hit");
            return Ok(parse_overlay(&hit));
        }

        let value: Value = self
            .http
            .get(&self.config.base_url)
            .query(&[
                ("apikey", api_key.as_str()),
                ("i", imdb_id),
                ("plot", "short"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // Only successful payloads are worth caching; a transient "False"
        // response should be retried on the next request.
        if is_success(&value) {
            self.cache.set_json(&key, &value, DEFAULT_TTL);
        }
        Ok(parse_overlay(&value))
    }
}

fn is_success(value: &Value) -> bool {
    value.get("Response").and_then(Value::as_str) == Some("True")
}

fn parse_overlay(value: &Value) -> Option<SecondaryOverlay> {
    if !is_success(value) {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}
