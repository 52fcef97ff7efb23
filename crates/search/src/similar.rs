//! Similarity strategy: resolve an anchor title, then ask for its
//! recommendations.

use catalog::{Candidate, CatalogApi, QueryParameters, Result};
use tracing::debug;

/// Run a similarity search. Falls back to the keyword field when no anchor
/// title was given; an unresolvable anchor yields no candidates.
pub async fn run(catalog: &dyn CatalogApi, params: &QueryParameters) -> Result<Vec<Candidate>> {
    let anchor = params
        .similar_to_title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .or_else(|| params.keywords_trimmed());
    let Some(anchor) = anchor else {
        return Ok(Vec::new());
    };

    let matches = catalog.search_titles(anchor).await?;
    let Some(anchor_id) = matches.first().map(|candidate| candidate.id) else {
        debug!(anchor, "anchor title not found, similarity yields nothing");
        return Ok(Vec::new());
    };
    catalog.recommendations(anchor_id).await
}
