//! # Search Orchestrator
//!
//! Coordinates one retrieval pass:
//! 1. Resolve free-text names to catalog ids (entity kinds in parallel)
//! 2. Run the requested strategies in order
//! 3. Merge and deduplicate candidates (first-seen wins)
//! 4. Fall back to a title search when everything came back empty
//! 5. Return at most [`MAX_RESULTS`] candidates for enrichment

use std::collections::HashSet;
use std::sync::Arc;

use catalog::{Candidate, CatalogApi, EntityKind, MovieId, QueryParameters, Strategy};
use search::{EntityResolver, RelaxationController, discover, similar, title};
use tracing::{info, warn};

/// Hard cap on the candidate set handed to enrichment.
pub const MAX_RESULTS: usize = 10;

/// Runs retrieval strategies against the catalog and merges their output.
pub struct SearchOrchestrator {
    catalog: Arc<dyn CatalogApi>,
    resolver: EntityResolver,
    relaxation: RelaxationController,
}

impl SearchOrchestrator {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        let resolver = EntityResolver::new(Arc::clone(&catalog));
        Self {
            catalog,
            resolver,
            relaxation: RelaxationController::default(),
        }
    }

    /// Override the relaxation thresholds (builder style).
    pub fn with_relaxation(mut self, relaxation: RelaxationController) -> Self {
        self.relaxation = relaxation;
        self
    }

    /// Main entry point: produce up to [`MAX_RESULTS`] deduplicated
    /// candidates for the given parameters.
    ///
    /// Never errors: a failing strategy is logged and skipped, and a fully
    /// empty run returns an explicit empty list.
    pub async fn search(&self, params: &QueryParameters) -> Vec<Candidate> {
        let strategies = params.effective_strategies();

        // Resolution is only needed (and only paid for) by discovery.
        let needs_resolution = strategies
            .iter()
            .any(|s| matches!(s, Strategy::Discover | Strategy::MultiSearch));
        let resolved = if needs_resolution {
            self.resolve_entities(params).await
        } else {
            search::ResolvedEntities::default()
        };

        let mut seen: HashSet<MovieId> = HashSet::new();
        let mut merged: Vec<Candidate> = Vec::new();

        for strategy in &strategies {
            match self.run_strategy(*strategy, params, &resolved).await {
                Ok(results) => {
                    info!(%strategy, count = results.len(), "strategy completed");
                    merge_first_seen(&mut merged, &mut seen, results);
                }
                Err(err) => warn!(%strategy, %err, "strategy failed, continuing"),
            }
        }

        // Safety net: discovery that matched nothing can still serve the
        // free-text keywords as a title search.
        if merged.is_empty()
            && strategies.contains(&Strategy::Discover)
            && params.keywords_trimmed().is_some()
        {
            match title::run(&*self.catalog, params).await {
                Ok(results) => {
                    info!(count = results.len(), "fell back to title search");
                    merge_first_seen(&mut merged, &mut seen, results);
                }
                Err(err) => warn!(%err, "fallback title search failed"),
            }
        }

        merged.truncate(MAX_RESULTS);
        merged
    }

    /// Resolve all entity kinds concurrently. The kinds are independent, so
    /// the lookups run side by side; each kind is sequential across names.
    async fn resolve_entities(&self, params: &QueryParameters) -> search::ResolvedEntities {
        let tags = discover::effective_tags(params);
        let (cast, crew, companies, keywords) = tokio::join!(
            self.resolver.resolve(EntityKind::Person, &params.actors),
            self.resolver.resolve(EntityKind::Person, &params.directors),
            self.resolver.resolve(EntityKind::Company, &params.companies),
            self.resolver.resolve_tags(&tags),
        );
        search::ResolvedEntities {
            cast,
            crew,
            companies,
            keywords,
        }
    }

    async fn run_strategy(
        &self,
        strategy: Strategy,
        params: &QueryParameters,
        resolved: &search::ResolvedEntities,
    ) -> catalog::Result<Vec<Candidate>> {
        match strategy {
            Strategy::TitleSearch => title::run(&*self.catalog, params).await,
            Strategy::Similar => similar::run(&*self.catalog, params).await,
            Strategy::Discover => {
                let filter = discover::build_filter(params, resolved);
                self.relaxation.run(&*self.catalog, &filter).await
            }
            Strategy::MultiSearch => {
                let filter = discover::build_filter(params, resolved);
                let mut results = self.relaxation.run(&*self.catalog, &filter).await?;
                if results.len() < self.relaxation.min_results {
                    results.extend(title::run(&*self.catalog, params).await?);
                }
                Ok(results)
            }
        }
    }
}

/// Append candidates whose ids have not been seen yet, preserving order.
fn merge_first_seen(
    merged: &mut Vec<Candidate>,
    seen: &mut HashSet<MovieId>,
    results: Vec<Candidate>,
) {
    for candidate in results {
        if seen.insert(candidate.id) {
            merged.push(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ScriptedCatalog, candidates};

    fn orchestrator(scripted: ScriptedCatalog) -> SearchOrchestrator {
        SearchOrchestrator::new(Arc::new(scripted))
    }

    #[tokio::test]
    async fn test_dedup_across_strategies_first_seen_wins() {
        let mut scripted = ScriptedCatalog::default();
        scripted
            .titles_by_query
            .insert("the anchor".to_string(), candidates(&[99]));
        scripted
            .titles_by_query
            .insert("classics".to_string(), candidates(&[3, 1, 4]));
        scripted.recommendations.insert(99, candidates(&[1, 2]));

        let params = QueryParameters {
            similar_to_title: Some("the anchor".to_string()),
            keywords: Some("classics".to_string()),
            strategies: vec![Strategy::Similar, Strategy::TitleSearch],
            ..Default::default()
        };
        let results = orchestrator(scripted).search(&params).await;

        // Similar produced [1, 2]; title search added 3 and 4 but not the
        // duplicate 1.
        let ids: Vec<MovieId> = results.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_result_cap() {
        let scripted = ScriptedCatalog {
            titles: candidates(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]),
            ..Default::default()
        };
        let params = QueryParameters {
            keywords: Some("everything".to_string()),
            strategies: vec![Strategy::TitleSearch],
            ..Default::default()
        };
        let results = orchestrator(scripted).search(&params).await;
        assert_eq!(results.len(), MAX_RESULTS);
    }

    #[tokio::test]
    async fn test_failing_strategy_does_not_abort_the_rest() {
        let scripted = ScriptedCatalog {
            fail_discover: true,
            titles: candidates(&[7]),
            ..Default::default()
        };
        let params = QueryParameters {
            keywords: Some("resilient".to_string()),
            strategies: vec![Strategy::Discover, Strategy::TitleSearch],
            ..Default::default()
        };
        let results = orchestrator(scripted).search(&params).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 7);
    }

    #[tokio::test]
    async fn test_empty_discover_falls_back_to_title_search() {
        // Discovery yields nothing at every relaxation level, but the
        // keyword field can still be served as a title search.
        let scripted = ScriptedCatalog {
            titles: candidates(&[42]),
            ..Default::default()
        };
        let params = QueryParameters {
            keywords: Some("obscure festival film".to_string()),
            strategies: vec![Strategy::Discover],
            ..Default::default()
        };
        let results = orchestrator(scripted).search(&params).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 42);
    }

    #[tokio::test]
    async fn test_no_fallback_without_keywords() {
        let scripted = ScriptedCatalog {
            titles: candidates(&[42]),
            ..Default::default()
        };
        let params = QueryParameters {
            genres: vec!["horror".to_string()],
            strategies: vec![Strategy::Discover],
            ..Default::default()
        };
        let results = orchestrator(scripted).search(&params).await;
        assert!(results.is_empty(), "explicit empty list, not a fallback");
    }

    #[tokio::test]
    async fn test_multi_search_tops_up_sparse_discovery() {
        let scripted = ScriptedCatalog {
            titles: candidates(&[100, 101]),
            ..Default::default()
        };
        scripted.push_discover(candidates(&[1, 2]));

        let params = QueryParameters {
            keywords: Some("niche".to_string()),
            strategies: vec![Strategy::MultiSearch],
            ..Default::default()
        };
        let results = orchestrator(scripted).search(&params).await;

        let ids: Vec<MovieId> = results.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 100, 101]);
    }

    #[tokio::test]
    async fn test_no_duplicate_ids_in_any_output() {
        let scripted = ScriptedCatalog {
            titles: candidates(&[1, 1, 2, 2, 3]),
            ..Default::default()
        };
        let params = QueryParameters {
            keywords: Some("dupes".to_string()),
            strategies: vec![Strategy::TitleSearch, Strategy::TitleSearch],
            ..Default::default()
        };
        let results = orchestrator(scripted).search(&params).await;

        let ids: Vec<MovieId> = results.iter().map(|c| c.id).collect();
        let unique: HashSet<MovieId> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len());
    }
}
