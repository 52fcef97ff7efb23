//! Ranking boundary.
//!
//! Relevance scoring is delegated to an external collaborator behind the
//! [`Ranker`] trait. The orchestration side only enforces a wall-clock
//! timeout and applies the returned ordering; a timeout is a degraded
//! success that hands back enriched-but-unranked results.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use catalog::MovieId;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::enrich::EnrichedMovie;

/// Wall-clock budget for one ranking call.
pub const RANKING_TIMEOUT: Duration = Duration::from_secs(12);

/// One ranked entry as produced by the collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedEntry {
    pub id: MovieId,
    pub rank: u32,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub relevance_explanation: Option<String>,
}

/// A ranking verdict over one candidate set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ranking {
    pub summary: String,
    pub entries: Vec<RankedEntry>,
}

/// External relevance-ranking collaborator.
#[async_trait]
pub trait Ranker: Send + Sync {
    async fn rank(&self, query: &str, movies: &[EnrichedMovie]) -> anyhow::Result<Ranking>;
}

/// Invoke the ranker with a hard timeout. `None` means the results should be
/// returned unranked - on timeout the abandoned call may still complete in
/// the background, but its result is discarded.
pub async fn rank_with_timeout(
    ranker: &dyn Ranker,
    query: &str,
    movies: &[EnrichedMovie],
    budget: Duration,
) -> Option<Ranking> {
    match tokio::time::timeout(budget, ranker.rank(query, movies)).await {
        Ok(Ok(ranking)) => Some(ranking),
        Ok(Err(err)) => {
            warn!(%err, "ranking failed, returning unranked results");
            None
        }
        Err(_) => {
            warn!(?budget, "ranking timed out, returning unranked results");
            None
        }
    }
}

/// Reorder `movies` by the ranking and attach relevance explanations.
/// Ids the ranker did not mention keep their relative order at the end.
pub fn apply_ranking(movies: &mut [EnrichedMovie], ranking: &Ranking) {
    let positions: HashMap<MovieId, usize> = ranking
        .entries
        .iter()
        .enumerate()
        .map(|(position, entry)| (entry.id, position))
        .collect();
    let explanations: HashMap<MovieId, &RankedEntry> = ranking
        .entries
        .iter()
        .map(|entry| (entry.id, entry))
        .collect();

    for movie in movies.iter_mut() {
        if let Some(entry) = explanations.get(&movie.detail.id) {
            movie.relevance_explanation = entry.relevance_explanation.clone();
        }
    }

    movies.sort_by_key(|movie| {
        positions
            .get(&movie.detail.id)
            .copied()
            .unwrap_or(usize::MAX)
    });
}
