//! Server crate for the CineScout search pipeline.
//!
//! Hosts the orchestrator that runs retrieval strategies, the enrichment
//! fan-out that assembles full records, and the timeout-guarded ranking
//! boundary.

pub mod enrich;
pub mod orchestrator;
pub mod ranking;

#[cfg(test)]
pub(crate) mod test_utils;

pub use enrich::{EnrichedMovie, Enricher, MAX_IN_FLIGHT};
pub use orchestrator::{MAX_RESULTS, SearchOrchestrator};
pub use ranking::{
    RANKING_TIMEOUT, RankedEntry, Ranker, Ranking, apply_ranking, rank_with_timeout,
};

use std::sync::Arc;

use catalog::{CatalogApi, QueryParameters, SecondaryApi};

/// Retrieval and enrichment wired together: the full pass from structured
/// parameters to enriched records, ready for external ranking.
pub struct SearchPipeline {
    orchestrator: SearchOrchestrator,
    enricher: Enricher,
}

impl SearchPipeline {
    pub fn new(catalog: Arc<dyn CatalogApi>, secondary: Arc<dyn SecondaryApi>) -> Self {
        Self {
            orchestrator: SearchOrchestrator::new(Arc::clone(&catalog)),
            enricher: Enricher::new(catalog, secondary),
        }
    }

    /// Search and enrich. An empty list means "no matching items", which the
    /// caller presents however it likes; it is never an error.
    pub async fn run(&self, params: &QueryParameters) -> Vec<EnrichedMovie> {
        let candidates = self.orchestrator.search(params).await;
        self.enricher.enrich(candidates).await
    }
}
