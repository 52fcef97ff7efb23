//! Entity resolution: free-text names to catalog-internal ids.
//!
//! Resolution is best-effort and order-preserving. A name with no match is
//! skipped, a failed lookup is skipped with a warning; neither is an error.
//! Thematic tags additionally retry with separator-normalized spelling
//! variants, because the query-understanding collaborator tends to emit
//! hyphenated tags the catalog's keyword index does not know.

use std::collections::HashSet;
use std::sync::Arc;

use catalog::{CatalogApi, EntityId, EntityKind};
use tracing::{debug, warn};

/// Ids resolved from the query parameters' name fields. Computed once per
/// request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedEntities {
    pub cast: Vec<EntityId>,
    pub crew: Vec<EntityId>,
    pub companies: Vec<EntityId>,
    pub keywords: Vec<EntityId>,
}

/// Resolves free-text names against the catalog's entity indices.
pub struct EntityResolver {
    catalog: Arc<dyn CatalogApi>,
}

impl EntityResolver {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self { catalog }
    }

    /// Resolve a list of names of one entity kind, first match per name,
    /// preserving input order.
    pub async fn resolve(&self, kind: EntityKind, names: &[String]) -> Vec<EntityId> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            match self.catalog.search_entities(kind, name).await {
                Ok(matches) => match matches.first() {
                    Some(first) => ids.push(first.id),
                    None => debug!(?kind, name, "no entity match, skipping"),
                },
                Err(err) => warn!(?kind, name, %err, "entity lookup failed, skipping"),
            }
        }
        ids
    }

    /// Resolve thematic tags, trying spelling variants per tag until one
    /// matches. Duplicate ids across tags are dropped.
    pub async fn resolve_tags(&self, tags: &[String]) -> Vec<EntityId> {
        let mut ids = Vec::new();
        let mut seen: HashSet<EntityId> = HashSet::new();
        for tag in tags {
            for variant in tag_variants(tag) {
                let matches = match self.catalog.search_entities(EntityKind::Keyword, &variant).await
                {
                    Ok(matches) => matches,
                    Err(err) => {
                        warn!(tag, variant, %err, "tag lookup failed, trying next variant");
                        continue;
                    }
                };
                if let Some(first) = matches.first() {
                    if seen.insert(first.id) {
                        ids.push(first.id);
                    }
                    // First hit wins; remaining variants are not tried.
                    break;
                }
            }
        }
        ids
    }
}

/// Spelling variants for a tag: verbatim, separator-normalized
/// (space-joined), then each individual token.
fn tag_variants(tag: &str) -> Vec<String> {
    let mut variants = vec![tag.to_string()];
    if tag.contains(['-', '_']) {
        let joined = tag.replace(['-', '_'], " ");
        variants.push(joined.clone());
        variants.extend(
            joined
                .split_whitespace()
                .map(str::to_string)
                .filter(|token| !token.is_empty()),
        );
    }
    variants.dedup();
    variants
}
