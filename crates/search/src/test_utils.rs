//! In-memory catalog double for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use catalog::{
    Candidate, CatalogApi, CatalogError, DiscoverFilter, EntityKind, EntityMatch, MovieDetail,
    MovieId, Result,
};

pub fn entity(id: u64, name: &str) -> EntityMatch {
    EntityMatch {
        id,
        name: name.to_string(),
    }
}

pub fn candidates(ids: &[MovieId]) -> Vec<Candidate> {
    ids.iter()
        .map(|&id| Candidate::new(id, format!("Movie {id}")))
        .collect()
}

/// Scripted [`CatalogApi`] implementation. Discover responses are consumed
/// in order, one per call, so tests can assert relaxation attempt counts.
#[derive(Default)]
pub struct ScriptedCatalog {
    pub titles: Vec<Candidate>,
    pub fail_titles: bool,
    pub discover_responses: Mutex<Vec<Vec<Candidate>>>,
    pub discover_calls: Mutex<Vec<DiscoverFilter>>,
    pub fail_discover: bool,
    pub recommendations: HashMap<MovieId, Vec<Candidate>>,
    pub details: HashMap<MovieId, MovieDetail>,
    pub fail_detail_ids: HashSet<MovieId>,
    pub entities: HashMap<(EntityKind, String), Vec<EntityMatch>>,
    pub fail_entity_queries: HashSet<String>,
}

impl ScriptedCatalog {
    pub fn add_entity(&mut self, kind: EntityKind, query: &str, hit: EntityMatch) {
        self.entities
            .entry((kind, query.to_string()))
            .or_default()
            .push(hit);
    }

    pub fn push_discover(&self, response: Vec<Candidate>) {
        self.discover_responses.lock().unwrap().push(response);
    }

    pub fn discover_call_count(&self) -> usize {
        self.discover_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CatalogApi for ScriptedCatalog {
    async fn search_titles(&self, _query: &str) -> Result<Vec<Candidate>> {
        if self.fail_titles {
            return Err(CatalogError::Upstream("scripted title failure".into()));
        }
        Ok(self.titles.clone())
    }

    async fn discover(&self, filter: &DiscoverFilter) -> Result<Vec<Candidate>> {
        self.discover_calls.lock().unwrap().push(filter.clone());
        if self.fail_discover {
            return Err(CatalogError::Upstream("scripted discover failure".into()));
        }
        let mut responses = self.discover_responses.lock().unwrap();
        if responses.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(responses.remove(0))
        }
    }

    async fn recommendations(&self, id: MovieId) -> Result<Vec<Candidate>> {
        Ok(self.recommendations.get(&id).cloned().unwrap_or_default())
    }

    async fn detail(&self, id: MovieId) -> Result<Option<MovieDetail>> {
        if self.fail_detail_ids.contains(&id) {
            return Err(CatalogError::Upstream("scripted detail failure".into()));
        }
        Ok(self.details.get(&id).cloned())
    }

    async fn search_entities(&self, kind: EntityKind, query: &str) -> Result<Vec<EntityMatch>> {
        if self.fail_entity_queries.contains(query) {
            return Err(CatalogError::Upstream("scripted entity failure".into()));
        }
        Ok(self
            .entities
            .get(&(kind, query.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}
