//! Exact-title strategy: direct title lookup on the free-text keyword field.

use catalog::{Candidate, CatalogApi, QueryParameters, Result};

/// Run a title search. An absent or blank keyword field yields no
/// candidates rather than an error.
pub async fn run(catalog: &dyn CatalogApi, params: &QueryParameters) -> Result<Vec<Candidate>> {
    let Some(keywords) = params.keywords_trimmed() else {
        return Ok(Vec::new());
    };
    catalog.search_titles(keywords).await
}
