//! Filter criteria for the catalog's discovery endpoint.

use crate::types::SortBy;

/// Once this many genres are requested, they are OR-combined so the query is
/// not impossibly restrictive.
pub const GENRE_OR_THRESHOLD: usize = 3;

/// Vote-count floor applied when the caller does not set one.
pub const DEFAULT_VOTE_FLOOR: u32 = 50;

/// Fully resolved filter set for one discovery call.
///
/// Ids are catalog-internal (already resolved from free-text names); numeric
/// ranges are passed through from the query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverFilter {
    pub genre_ids: Vec<u64>,
    pub exclude_genre_ids: Vec<u64>,
    pub cast_ids: Vec<u64>,
    pub crew_ids: Vec<u64>,
    pub company_ids: Vec<u64>,
    pub keyword_ids: Vec<u64>,
    pub year_from: Option<u16>,
    pub year_to: Option<u16>,
    pub min_rating: Option<f32>,
    pub min_votes: Option<u32>,
    pub runtime_min: Option<u32>,
    pub runtime_max: Option<u32>,
    pub sort_by: SortBy,
}

impl DiscoverFilter {
    /// Encode the filter as discovery-endpoint query parameters.
    ///
    /// Genres switch from AND-join (`,`) to OR-join (`|`) at
    /// [`GENRE_OR_THRESHOLD`]; all other id lists are OR-joined.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("sort_by".to_string(), self.sort_by.as_str().to_string()),
            ("page".to_string(), "1".to_string()),
            (
                "vote_count.gte".to_string(),
                self.min_votes.unwrap_or(DEFAULT_VOTE_FLOOR).to_string(),
            ),
        ];

        if !self.genre_ids.is_empty() {
            let sep = if self.genre_ids.len() >= GENRE_OR_THRESHOLD {
                "|"
            } else {
                ","
            };
            query.push(("with_genres".to_string(), join_ids(&self.genre_ids, sep)));
        }
        if !self.exclude_genre_ids.is_empty() {
            query.push((
                "without_genres".to_string(),
                join_ids(&self.exclude_genre_ids, ","),
            ));
        }
        if !self.cast_ids.is_empty() {
            query.push(("with_cast".to_string(), join_ids(&self.cast_ids, "|")));
        }
        if !self.crew_ids.is_empty() {
            query.push(("with_crew".to_string(), join_ids(&self.crew_ids, "|")));
        }
        if !self.company_ids.is_empty() {
            query.push((
                "with_companies".to_string(),
                join_ids(&self.company_ids, "|"),
            ));
        }
        if !self.keyword_ids.is_empty() {
            query.push(("with_keywords".to_string(), join_ids(&self.keyword_ids, "|")));
        }

        if let Some(year) = self.year_from {
            query.push((
                "primary_release_date.gte".to_string(),
                format!("{year}-01-01"),
            ));
        }
        if let Some(year) = self.year_to {
            query.push((
                "primary_release_date.lte".to_string(),
                format!("{year}-12-31"),
            ));
        }
        if let Some(rating) = self.min_rating {
            query.push(("vote_average.gte".to_string(), rating.to_string()));
        }
        if let Some(runtime) = self.runtime_min {
            query.push(("with_runtime.gte".to_string(), runtime.to_string()));
        }
        if let Some(runtime) = self.runtime_max {
            query.push(("with_runtime.lte".to_string(), runtime.to_string()));
        }

        query
    }
}

fn join_ids(ids: &[u64], sep: &str) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
        query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_defaults_always_present() {
        let query = DiscoverFilter::default().to_query();
        assert_eq!(lookup(&query, "sort_by"), Some("popularity.desc"));
        assert_eq!(lookup(&query, "page"), Some("1"));
        assert_eq!(lookup(&query, "vote_count.gte"), Some("50"));
        assert_eq!(lookup(&query, "with_genres"), None);
    }

    #[test]
    fn test_two_genres_are_and_joined() {
        let filter = DiscoverFilter {
            genre_ids: vec![27, 53],
            ..Default::default()
        };
        assert_eq!(lookup(&filter.to_query(), "with_genres"), Some("27,53"));
    }

    #[test]
    fn test_excluded_genres_emitted_separately() {
        let filter = DiscoverFilter {
            genre_ids: vec![27],
            exclude_genre_ids: vec![16, 10751],
            ..Default::default()
        };
        let query = filter.to_query();
        assert_eq!(lookup(&query, "with_genres"), Some("27"));
        assert_eq!(lookup(&query, "without_genres"), Some("16,10751"));
    }

    #[test]
    fn test_three_genres_switch_to_or_join() {
        let filter = DiscoverFilter {
            genre_ids: vec![27, 53, 878],
            ..Default::default()
        };
        assert_eq!(lookup(&filter.to_query(), "with_genres"), Some("27|53|878"));
    }

    #[test]
    fn test_year_window_becomes_full_dates() {
        let filter = DiscoverFilter {
            year_from: Some(1990),
            year_to: Some(1999),
            ..Default::default()
        };
        let query = filter.to_query();
        assert_eq!(
            lookup(&query, "primary_release_date.gte"),
            Some("1990-01-01")
        );
        assert_eq!(
            lookup(&query, "primary_release_date.lte"),
            Some("1999-12-31")
        );
    }

    #[test]
    fn test_resolved_ids_are_or_joined() {
        let filter = DiscoverFilter {
            cast_ids: vec![6384, 1100],
            keyword_ids: vec![4565],
            min_rating: Some(7.5),
            min_votes: Some(200),
            runtime_min: Some(90),
            runtime_max: Some(150),
            ..Default::default()
        };
        let query = filter.to_query();
        assert_eq!(lookup(&query, "with_cast"), Some("6384|1100"));
        assert_eq!(lookup(&query, "with_keywords"), Some("4565"));
        assert_eq!(lookup(&query, "vote_average.gte"), Some("7.5"));
        assert_eq!(lookup(&query, "vote_count.gte"), Some("200"));
        assert_eq!(lookup(&query, "with_runtime.gte"), Some("90"));
        assert_eq!(lookup(&query, "with_runtime.lte"), Some("150"));
    }
}
