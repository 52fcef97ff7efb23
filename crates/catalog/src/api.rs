//! Trait seams over the external metadata sources.
//!
//! The retrieval pipeline only ever sees these traits, so tests swap in
//! in-memory doubles and production wires up the HTTP clients. No component
//! holds a global client.

use async_trait::async_trait;

use crate::error::Result;
use crate::filter::DiscoverFilter;
use crate::types::{Candidate, EntityMatch, MovieDetail, MovieId, SecondaryOverlay};

/// Which entity index a name lookup goes against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Person,
    Company,
    Keyword,
}

impl EntityKind {
    pub(crate) fn search_path(self) -> &'static str {
        match self {
            Self::Person => "/search/person",
            Self::Company => "/search/company",
            Self::Keyword => "/search/keyword",
        }
    }
}

/// Read surface of the primary catalog source.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Title search over the free-text index, best matches first.
    async fn search_titles(&self, query: &str) -> Result<Vec<Candidate>>;

    /// Filtered discovery over resolved ids and numeric ranges.
    async fn discover(&self, filter: &DiscoverFilter) -> Result<Vec<Candidate>>;

    /// Items related to the given catalog item.
    async fn recommendations(&self, id: MovieId) -> Result<Vec<Candidate>>;

    /// Full detail for one item. `Ok(None)` means the catalog answered but
    /// has no such item.
    async fn detail(&self, id: MovieId) -> Result<Option<MovieDetail>>;

    /// Look up internal ids for a free-text entity name.
    async fn search_entities(&self, kind: EntityKind, query: &str) -> Result<Vec<EntityMatch>>;
}

/// Read surface of the secondary metadata source, keyed by the
/// cross-reference id carried on the detail payload.
#[async_trait]
pub trait SecondaryApi: Send + Sync {
    /// Fetch the overlay for one cross-reference id. Absence of data or of
    /// an API credential is `Ok(None)`, not an error.
    async fn overlay(&self, imdb_id: &str) -> Result<Option<SecondaryOverlay>>;
}
