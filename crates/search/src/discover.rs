//! Filtered-discovery strategy: build catalog filter criteria from resolved
//! ids and numeric ranges.

use catalog::{DiscoverFilter, QueryParameters, Strategy, genre_id};

use crate::resolver::ResolvedEntities;

/// Keyword promotion word cap: a short free-text query can double as a
/// thematic tag when no tags were extracted.
const TAG_PROMOTION_MAX_WORDS: usize = 3;

/// The thematic tags to resolve for a discovery request.
///
/// When the query-understanding collaborator produced no tags but a short
/// free-text keyword is present and discovery was requested, the keyword is
/// promoted to a tag candidate.
pub fn effective_tags(params: &QueryParameters) -> Vec<String> {
    if !params.tags.is_empty() {
        return params.tags.clone();
    }
    let wants_discovery = params
        .effective_strategies()
        .iter()
        .any(|strategy| matches!(strategy, Strategy::Discover | Strategy::MultiSearch));
    if let Some(keywords) = params.keywords_trimmed()
        && wants_discovery
        && keywords.split_whitespace().count() <= TAG_PROMOTION_MAX_WORDS
    {
        return vec![keywords.to_string()];
    }
    Vec::new()
}

/// Assemble the discovery filter from query parameters and resolved ids.
/// Unknown genre names are dropped; every other field passes straight
/// through.
pub fn build_filter(params: &QueryParameters, resolved: &ResolvedEntities) -> DiscoverFilter {
    DiscoverFilter {
        genre_ids: params
            .genres
            .iter()
            .filter_map(|name| genre_id(name))
            .collect(),
        exclude_genre_ids: params
            .exclude_genres
            .iter()
            .filter_map(|name| genre_id(name))
            .collect(),
        cast_ids: resolved.cast.clone(),
        crew_ids: resolved.crew.clone(),
        company_ids: resolved.companies.clone(),
        keyword_ids: resolved.keywords.clone(),
        year_from: params.year_from,
        year_to: params.year_to,
        min_rating: params.min_rating,
        min_votes: params.min_votes,
        runtime_min: params.runtime_min,
        runtime_max: params.runtime_max,
        sort_by: params.sort_by,
    }
}
