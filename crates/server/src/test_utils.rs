//! In-memory source doubles for orchestrator and enrichment tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use catalog::{
    Candidate, CatalogApi, CatalogError, DiscoverFilter, EntityKind, EntityMatch, MovieDetail,
    MovieId, Result, SecondaryApi, SecondaryOverlay,
};

pub fn candidates(ids: &[MovieId]) -> Vec<Candidate> {
    ids.iter()
        .map(|&id| Candidate::new(id, format!("Movie {id}")))
        .collect()
}

pub fn detail_with_imdb(id: MovieId, imdb_id: &str) -> MovieDetail {
    let mut detail = MovieDetail::from_candidate(&Candidate::new(id, format!("Movie {id}")));
    detail.imdb_id = Some(imdb_id.to_string());
    detail
}

/// Scripted [`CatalogApi`] implementation.
///
/// Title searches answer per query string (falling back to `titles`);
/// discover responses are consumed in order, one per call.
#[derive(Default)]
pub struct ScriptedCatalog {
    pub titles: Vec<Candidate>,
    pub titles_by_query: HashMap<String, Vec<Candidate>>,
    pub fail_titles: bool,
    pub discover_responses: Mutex<Vec<Vec<Candidate>>>,
    pub fail_discover: bool,
    pub recommendations: HashMap<MovieId, Vec<Candidate>>,
    pub details: HashMap<MovieId, MovieDetail>,
    pub fail_detail_ids: HashSet<MovieId>,
    pub entities: HashMap<(EntityKind, String), Vec<EntityMatch>>,
}

impl ScriptedCatalog {
    pub fn push_discover(&self, response: Vec<Candidate>) {
        self.discover_responses.lock().unwrap().push(response);
    }

    pub fn add_detail(&mut self, detail: MovieDetail) {
        self.details.insert(detail.id, detail);
    }
}

#[async_trait]
impl CatalogApi for ScriptedCatalog {
    async fn search_titles(&self, query: &str) -> Result<Vec<Candidate>> {
        if self.fail_titles {
            return Err(CatalogError::Upstream("scripted title failure".into()));
        }
        Ok(self
            .titles_by_query
            .get(query)
            .cloned()
            .unwrap_or_else(|| self.titles.clone()))
    }

    async fn discover(&self, _filter: &DiscoverFilter) -> Result<Vec<Candidate>> {
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
        Ok(self
            .entities
            .get(&(kind, query.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

/// Scripted [`SecondaryApi`] implementation keyed by cross-reference id.
#[derive(Default)]
pub struct ScriptedSecondary {
    pub overlays: HashMap<String, SecondaryOverlay>,
    pub fail_ids: HashSet<String>,
}

#[async_trait]
impl SecondaryApi for ScriptedSecondary {
    async fn overlay(&self, imdb_id: &str) -> Result<Option<SecondaryOverlay>> {
        if self.fail_ids.contains(imdb_id) {
            return Err(CatalogError::Upstream("scripted overlay failure".into()));
        }
        Ok(self.overlays.get(imdb_id).cloned())
    }
}
