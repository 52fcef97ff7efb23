//! # Enrichment Fan-out
//!
//! Turns the orchestrator's candidate list into full records: for each
//! candidate, fetch the primary detail and, when the detail carries a
//! cross-reference id, the secondary-source overlay.
//!
//! Candidates are enriched in parallel under a bounded concurrency cap.
//! Each candidate is failure-isolated: a failed enrichment drops only that
//! candidate. Output order matches input order exactly - tasks complete in
//! any order and are reassembled by original index.

use std::sync::Arc;

use catalog::{Candidate, CatalogApi, MovieDetail, SecondaryApi, SecondaryOverlay};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Cap on concurrent in-flight detail fetches.
pub const MAX_IN_FLIGHT: usize = 10;

/// A candidate augmented with full detail and an optional secondary-source
/// overlay.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedMovie {
    pub detail: MovieDetail,
    pub overlay: Option<SecondaryOverlay>,
    /// Filled in by the ranking collaborator, when one ran.
    pub relevance_explanation: Option<String>,
}

/// Bounded parallel enricher. One instance is reused across requests; no
/// pool is constructed per call.
pub struct Enricher {
    catalog: Arc<dyn CatalogApi>,
    secondary: Arc<dyn SecondaryApi>,
    max_in_flight: usize,
}

impl Enricher {
    pub fn new(catalog: Arc<dyn CatalogApi>, secondary: Arc<dyn SecondaryApi>) -> Self {
        Self {
            catalog,
            secondary,
            max_in_flight: MAX_IN_FLIGHT,
        }
    }

    /// Override the concurrency cap (builder style).
    pub fn with_max_in_flight(mut self, cap: usize) -> Self {
        self.max_in_flight = cap.max(1);
        self
    }

    /// Enrich all candidates. The output is a subsequence of the input:
    /// never longer, relative order preserved, failed candidates dropped.
    pub async fn enrich(&self, candidates: Vec<Candidate>) -> Vec<EnrichedMovie> {
        let total = candidates.len();
        let semaphore = Arc::new(Semaphore::new(self.max_in_flight));
        let mut tasks: JoinSet<(usize, Option<EnrichedMovie>)> = JoinSet::new();

        for (index, candidate) in candidates.into_iter().enumerate() {
            let catalog = Arc::clone(&self.catalog);
            let secondary = Arc::clone(&self.secondary);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    // Closed semaphore means we are shutting down.
                    Err(_) => return (index, None),
                };
                (index, enrich_one(&*catalog, &*secondary, candidate).await)
            });
        }

        // Reassemble by original index, not completion order.
        let mut slots: Vec<Option<EnrichedMovie>> = (0..total).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, enriched)) => slots[index] = enriched,
                Err(err) => warn!(%err, "enrichment task panicked"),
            }
        }

        let enriched: Vec<EnrichedMovie> = slots.into_iter().flatten().collect();
        debug!(input = total, output = enriched.len(), "enrichment complete");
        enriched
    }
}

/// Enrich one candidate. Returns `None` only when the record cannot be
/// represented at all; a failed detail fetch falls back to the candidate
/// itself as long as it carries the minimum display fields.
async fn enrich_one(
    catalog: &dyn CatalogApi,
    secondary: &dyn SecondaryApi,
    candidate: Candidate,
) -> Option<EnrichedMovie> {
    let detail = match catalog.detail(candidate.id).await {
        Ok(Some(detail)) => detail,
        Ok(None) => fallback_detail(candidate)?,
        Err(err) => {
            debug!(%err, "detail fetch failed, falling back to candidate");
            fallback_detail(candidate)?
        }
    };

    let overlay = match detail.imdb_id.as_deref() {
        Some(imdb_id) => match secondary.overlay(imdb_id).await {
            Ok(overlay) => overlay,
            Err(err) => {
                debug!(imdb_id, %err, "overlay fetch failed, continuing without");
                None
            }
        },
        None => None,
    };

    Some(EnrichedMovie {
        detail,
        overlay,
        relevance_explanation: None,
    })
}

fn fallback_detail(candidate: Candidate) -> Option<MovieDetail> {
    if candidate.title.trim().is_empty() {
        // Not displayable; partial nulls must not masquerade as a record.
        return None;
    }
    Some(MovieDetail::from_candidate(&candidate))
}
