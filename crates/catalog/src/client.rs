//! HTTP client for the primary catalog source.
//!
//! Every call reads through the shared [`SqliteCache`] under a stable
//! `tmdb:` key prefix, so identical calls collide to the same entry and
//! repeated queries never hit the network inside the TTL.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cache::{DEFAULT_TTL, SqliteCache};
use serde_json::Value;
use tracing::debug;

use crate::api::{CatalogApi, EntityKind};
use crate::error::Result;
use crate::filter::DiscoverFilter;
use crate::types::{Candidate, EntityMatch, MovieDetail, MovieId};

/// Result cap for search-driven candidate lists.
pub const SEARCH_CAP: usize = 10;

/// Result cap for browse sections (trending, upcoming, ...).
pub const BROWSE_CAP: usize = 20;

const CACHE_PREFIX: &str = "tmdb";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the catalog source.
///
/// A bearer token takes precedence; the legacy `api_key` query parameter is
/// the fallback.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            api_key: None,
            bearer_token: None,
        }
    }
}

impl CatalogConfig {
    /// Read credentials from `TMDB_API_KEY` / `TMDB_READ_ACCESS_TOKEN`.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("TMDB_API_KEY").ok(),
            bearer_token: std::env::var("TMDB_READ_ACCESS_TOKEN").ok(),
            ..Default::default()
        }
    }
}

/// Catalog client with read-through caching.
pub struct CatalogClient {
    http: reqwest::Client,
    cache: Arc<SqliteCache>,
    config: CatalogConfig,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig, cache: Arc<SqliteCache>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            cache,
            config,
        })
    }

    /// GET a catalog path, consulting the cache first.
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value> {
        let key = cache_key(path, query);
        if let Some(hit) = self.cache.get_json(&key) {
            debug!(path, "catalog cache hit");
            return Ok(hit);
        }

        let mut request = self
            .http
            .get(format!("{}{}", self.config.base_url, path))
            .query(query)
            .header("accept", "application/json");
        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        } else if let Some(api_key) = &self.config.api_key {
            request = request.query(&[("api_key", api_key.as_str())]);
        }

        let value: Value = request.send().await?.error_for_status()?.json().await?;
        self.cache.set_json(&key, &value, DEFAULT_TTL);
        Ok(value)
    }

    async fn candidate_list(
        &self,
        path: &str,
        query: &[(String, String)],
        cap: usize,
    ) -> Result<Vec<Candidate>> {
        let value = self.get_json(path, query).await?;
        Ok(parse_candidates(&value, cap))
    }

    // Browse sections; lightweight lists, no enrichment implied.

    pub async fn trending(&self) -> Result<Vec<Candidate>> {
        self.candidate_list("/trending/movie/day", &[], BROWSE_CAP)
            .await
    }

    pub async fn upcoming(&self) -> Result<Vec<Candidate>> {
        self.candidate_list("/movie/upcoming", &[], BROWSE_CAP).await
    }

    pub async fn now_playing(&self) -> Result<Vec<Candidate>> {
        self.candidate_list("/movie/now_playing", &[], BROWSE_CAP)
            .await
    }

    pub async fn top_rated(&self) -> Result<Vec<Candidate>> {
        self.candidate_list("/movie/top_rated", &[], BROWSE_CAP)
            .await
    }

    pub async fn by_genre(&self, genre_id: u64) -> Result<Vec<Candidate>> {
        let filter = DiscoverFilter {
            genre_ids: vec![genre_id],
            min_votes: Some(100),
            ..Default::default()
        };
        self.candidate_list("/discover/movie", &filter.to_query(), BROWSE_CAP)
            .await
    }

    pub async fn by_company(&self, company_id: u64) -> Result<Vec<Candidate>> {
        let filter = DiscoverFilter {
            company_ids: vec![company_id],
            min_votes: Some(100),
            ..Default::default()
        };
        self.candidate_list("/discover/movie", &filter.to_query(), BROWSE_CAP)
            .await
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn search_titles(&self, query: &str) -> Result<Vec<Candidate>> {
        let params = vec![
            ("query".to_string(), query.to_string()),
            ("page".to_string(), "1".to_string()),
        ];
        self.candidate_list("/search/movie", &params, SEARCH_CAP)
            .await
    }

    async fn discover(&self, filter: &DiscoverFilter) -> Result<Vec<Candidate>> {
        self.candidate_list("/discover/movie", &filter.to_query(), SEARCH_CAP)
            .await
    }

    async fn recommendations(&self, id: MovieId) -> Result<Vec<Candidate>> {
        let params = vec![("page".to_string(), "1".to_string())];
        self.candidate_list(&format!("/movie/{id}/recommendations"), &params, SEARCH_CAP)
            .await
    }

    async fn detail(&self, id: MovieId) -> Result<Option<MovieDetail>> {
        let params = vec![(
            "append_to_response".to_string(),
            "credits,keywords,watch/providers".to_string(),
        )];
        let value = self.get_json(&format!("/movie/{id}"), &params).await?;
        if value.get("id").is_none() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }

    async fn search_entities(&self, kind: EntityKind, query: &str) -> Result<Vec<EntityMatch>> {
        let params = vec![("query".to_string(), query.to_string())];
        let value = self.get_json(kind.search_path(), &params).await?;
        Ok(parse_entities(&value))
    }
}

/// Deterministic cache key: stable prefix, path, and sorted query pairs.
fn cache_key(path: &str, query: &[(String, String)]) -> String {
    let mut pairs: Vec<&(String, String)> = query.iter().collect();
    pairs.sort();
    let encoded = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{CACHE_PREFIX}:{path}?{encoded}")
}

/// Pull candidates out of a `results` list, dropping entries that do not
/// deserialize (the catalog occasionally mixes media types into lists).
fn parse_candidates(value: &Value, cap: usize) -> Vec<Candidate> {
    value
        .get("results")
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .take(cap)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_entities(value: &Value) -> Vec<EntityMatch> {
    value
        .get("results")
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
