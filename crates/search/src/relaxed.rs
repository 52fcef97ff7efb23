//! Relaxation controller for filtered discovery.
//!
//! Over-specific thematic tags are the most common reason a discovery query
//! comes back nearly empty, with tight rating/vote thresholds second. The
//! controller retries with those constraints progressively dropped, keeping
//! whichever attempt yielded the most results. Genre, people, and year
//! filters encode explicit user intent and are never relaxed.

use catalog::{Candidate, CatalogApi, DEFAULT_VOTE_FLOOR, DiscoverFilter, Result};
use tracing::{info, warn};

/// Minimum acceptable result count before relaxation kicks in.
pub const MIN_RESULTS: usize = 5;

/// Wraps the discovery executor with progressive constraint-dropping.
///
/// Thresholds are empirically chosen; both are configurable.
#[derive(Debug, Clone)]
pub struct RelaxationController {
    pub min_results: usize,
    pub relaxed_vote_floor: u32,
}

impl Default for RelaxationController {
    fn default() -> Self {
        Self {
            min_results: MIN_RESULTS,
            relaxed_vote_floor: DEFAULT_VOTE_FLOOR,
        }
    }
}

impl RelaxationController {
    /// Run discovery, relaxing constraints until `min_results` is met or the
    /// relaxation ladder is exhausted. Returns the best attempt seen.
    ///
    /// The first attempt's failure propagates (the orchestrator isolates
    /// per-strategy failures); failures of later attempts only forfeit that
    /// relaxation step.
    pub async fn run(
        &self,
        catalog: &dyn CatalogApi,
        filter: &DiscoverFilter,
    ) -> Result<Vec<Candidate>> {
        let mut best = catalog.discover(filter).await?;
        if best.len() >= self.min_results {
            return Ok(best);
        }

        // Attempt 2: drop the tag filter.
        if !filter.keyword_ids.is_empty() {
            let mut relaxed = filter.clone();
            relaxed.keyword_ids.clear();
            match catalog.discover(&relaxed).await {
                Ok(results) => {
                    if results.len() >= self.min_results {
                        info!(count = results.len(), "relaxed: dropped tag filter");
                        return Ok(results);
                    }
                    if results.len() > best.len() {
                        best = results;
                    }
                }
                Err(err) => warn!(%err, "tag-relaxed discovery failed, keeping earlier attempt"),
            }
        }

        // Attempt 3: drop tags and loosen rating/vote thresholds. Kept only
        // if it strictly improves on the running best.
        if best.len() < self.min_results {
            let mut relaxed = filter.clone();
            relaxed.keyword_ids.clear();
            relaxed.min_rating = None;
            relaxed.min_votes = Some(self.relaxed_vote_floor);
            match catalog.discover(&relaxed).await {
                Ok(results) => {
                    if results.len() > best.len() {
                        info!(count = results.len(), "relaxed: dropped tags, loosened thresholds");
                        best = results;
                    }
                }
                Err(err) => warn!(%err, "fully-relaxed discovery failed, keeping earlier attempt"),
            }
        }

        Ok(best)
    }
}
