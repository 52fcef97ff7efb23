//! Core domain types for catalog search.
//!
//! The query-understanding collaborator hands us a [`QueryParameters`] bag;
//! everything downstream of it is typed. Absence of a field always means
//! "no constraint", never "exclude everything".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a catalog item (movie).
pub type MovieId = u64;

/// Unique identifier for a resolved entity (person, company, keyword tag).
pub type EntityId = u64;

/// One retrieval mode. The orchestrator runs the requested strategies in
/// order and merges their candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Direct title lookup on the free-text keyword field.
    TitleSearch,
    /// Filtered discovery over resolved ids and numeric ranges.
    Discover,
    /// Recommendations anchored on a reference title.
    Similar,
    /// Discovery with a title-search top-up when results are sparse.
    MultiSearch,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title_search" => Ok(Self::TitleSearch),
            "discover" => Ok(Self::Discover),
            "similar" => Ok(Self::Similar),
            "multi_search" => Ok(Self::MultiSearch),
            other => Err(format!("unknown strategy: {other}")),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TitleSearch => "title_search",
            Self::Discover => "discover",
            Self::Similar => "similar",
            Self::MultiSearch => "multi_search",
        };
        f.write_str(name)
    }
}

/// Sort directive for filtered discovery, in the catalog's dotted notation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    #[default]
    #[serde(rename = "popularity.desc")]
    PopularityDesc,
    #[serde(rename = "vote_average.desc")]
    VoteAverageDesc,
    #[serde(rename = "primary_release_date.desc")]
    ReleaseDateDesc,
    #[serde(rename = "revenue.desc")]
    RevenueDesc,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PopularityDesc => "popularity.desc",
            Self::VoteAverageDesc => "vote_average.desc",
            Self::ReleaseDateDesc => "primary_release_date.desc",
            Self::RevenueDesc => "revenue.desc",
        }
    }
}

/// Structured search parameters produced by the query-understanding
/// collaborator.
///
/// Every field defaults to unconstrained, so a partial JSON object
/// deserializes into a valid query. Validation happens here, once, rather
/// than ad hoc at each consumption site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryParameters {
    /// Free-text fallback search terms.
    pub keywords: Option<String>,
    /// Thematic tags to resolve against the catalog's keyword index.
    #[serde(alias = "tmdb_keyword_tags")]
    pub tags: Vec<String>,
    /// Category names to include (resolved via the fixed genre table).
    pub genres: Vec<String>,
    /// Category names to exclude.
    pub exclude_genres: Vec<String>,
    /// Cast member names.
    pub actors: Vec<String>,
    /// Crew (director) names.
    pub directors: Vec<String>,
    /// Production company names.
    pub companies: Vec<String>,
    pub year_from: Option<u16>,
    pub year_to: Option<u16>,
    pub min_rating: Option<f32>,
    pub min_votes: Option<u32>,
    pub runtime_min: Option<u32>,
    pub runtime_max: Option<u32>,
    pub sort_by: SortBy,
    pub language: Option<String>,
    pub region: Option<String>,
    /// Anchor title for the similarity strategy.
    pub similar_to_title: Option<String>,
    /// Retrieval strategies to run, in order. Empty means discover.
    pub strategies: Vec<Strategy>,
}

impl QueryParameters {
    /// The free-text keyword field, ignoring empty and whitespace-only
    /// values.
    pub fn keywords_trimmed(&self) -> Option<&str> {
        self.keywords
            .as_deref()
            .map(str::trim)
            .filter(|keywords| !keywords.is_empty())
    }

    /// Strategies to execute; an empty list falls back to discovery.
    pub fn effective_strategies(&self) -> Vec<Strategy> {
        if self.strategies.is_empty() {
            vec![Strategy::Discover]
        } else {
            self.strategies.clone()
        }
    }
}

/// Minimal representation of one catalog item as returned by the list
/// endpoints (search, discover, recommendations, browse).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub popularity: Option<f32>,
    #[serde(default)]
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub vote_count: Option<u32>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl Candidate {
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            release_date: None,
            overview: None,
            popularity: None,
            vote_average: None,
            vote_count: None,
            genre_ids: Vec::new(),
            poster_path: None,
        }
    }

    /// Release year extracted from the `YYYY-MM-DD` release date. A date
    /// too short or too mangled to carry one yields `None`.
    pub fn release_year(&self) -> Option<&str> {
        release_year_of(self.release_date.as_deref())
    }
}

/// The leading `YYYY` of a date string. Upstream dates are not validated at
/// deserialization, so this must tolerate arbitrary byte content.
fn release_year_of(date: Option<&str>) -> Option<&str> {
    let year = date?.get(..4)?;
    year.bytes().all(|b| b.is_ascii_digit()).then_some(year)
}

/// A resolved entity returned by the catalog's person/company/keyword search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMatch {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
}

/// One cast or crew member on a detail payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditEntry {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub character: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CreditEntry>,
    #[serde(default)]
    pub crew: Vec<CreditEntry>,
}

/// The catalog nests the keyword list one level down.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordList {
    #[serde(default)]
    pub keywords: Vec<EntityMatch>,
}

/// Full detail for one catalog item, including credits, keywords, and
/// availability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub vote_count: Option<u32>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub budget: Option<u64>,
    #[serde(default)]
    pub revenue: Option<u64>,
    /// Cross-reference id into the secondary metadata source.
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub genres: Vec<EntityMatch>,
    #[serde(default)]
    pub credits: Credits,
    #[serde(default)]
    pub keywords: KeywordList,
    /// Watch-provider availability, kept opaque; display is external.
    #[serde(default, rename = "watch/providers")]
    pub watch_providers: Option<serde_json::Value>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
}

impl MovieDetail {
    /// Build a minimal detail record from a candidate. Used when the detail
    /// fetch fails but the candidate carries enough fields for display.
    pub fn from_candidate(candidate: &Candidate) -> Self {
        Self {
            id: candidate.id,
            title: candidate.title.clone(),
            release_date: candidate.release_date.clone(),
            overview: candidate.overview.clone(),
            tagline: None,
            vote_average: candidate.vote_average,
            vote_count: candidate.vote_count,
            runtime: None,
            budget: None,
            revenue: None,
            imdb_id: None,
            genres: Vec::new(),
            credits: Credits::default(),
            keywords: KeywordList::default(),
            watch_providers: None,
            poster_path: candidate.poster_path.clone(),
            backdrop_path: None,
        }
    }

    pub fn release_year(&self) -> Option<&str> {
        release_year_of(self.release_date.as_deref())
    }

    /// Crew members credited as director.
    pub fn directors(&self) -> Vec<&CreditEntry> {
        self.credits
            .crew
            .iter()
            .filter(|entry| entry.job.as_deref() == Some("Director"))
            .collect()
    }

    /// The first `limit` cast members, in billing order.
    pub fn top_cast(&self, limit: usize) -> &[CreditEntry] {
        let end = self.credits.cast.len().min(limit);
        &self.credits.cast[..end]
    }

    /// Up to `limit` keyword names from the detail payload.
    pub fn keyword_names(&self, limit: usize) -> Vec<&str> {
        self.keywords
            .keywords
            .iter()
            .take(limit)
            .map(|keyword| keyword.name.as_str())
            .collect()
    }
}

/// One entry in the secondary source's ratings list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayRating {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// Supplementary ratings and credits from the secondary metadata source.
///
/// All fields are free text as delivered by the source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecondaryOverlay {
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: Option<String>,
    #[serde(rename = "Metascore", default)]
    pub metascore: Option<String>,
    #[serde(rename = "Rated", default)]
    pub rated: Option<String>,
    #[serde(rename = "Director", default)]
    pub director: Option<String>,
    #[serde(rename = "Writer", default)]
    pub writers: Option<String>,
    #[serde(rename = "Actors", default)]
    pub actors: Option<String>,
    #[serde(rename = "Ratings", default)]
    pub ratings: Vec<OverlayRating>,
}

impl SecondaryOverlay {
    /// The Rotten Tomatoes score, if the ratings list carries one.
    pub fn rotten_tomatoes(&self) -> Option<&str> {
        self.ratings
            .iter()
            .find(|rating| rating.source == "Rotten Tomatoes")
            .map(|rating| rating.value.as_str())
    }
}

/// Map a category name to its fixed catalog genre id.
///
/// The table is the catalog's published movie-genre list; `sci-fi` is an
/// accepted alias for science fiction.
pub fn genre_id(name: &str) -> Option<u64> {
    let id = match name.to_lowercase().as_str() {
        "action" => 28,
        "adventure" => 12,
        "animation" => 16,
        "comedy" => 35,
        "crime" => 80,
        "documentary" => 99,
        "drama" => 18,
        "family" => 10751,
        "fantasy" => 14,
        "history" => 36,
        "horror" => 27,
        "music" => 10402,
        "mystery" => 9648,
        "romance" => 10749,
        "science fiction" | "sci-fi" => 878,
        "tv movie" => 10770,
        "thriller" => 53,
        "war" => 10752,
        "western" => 37,
        _ => return None,
    };
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_deserializes_with_defaults() {
        let params: QueryParameters =
            serde_json::from_str(r#"{"keywords": "heist", "strategies": ["discover"]}"#).unwrap();

        assert_eq!(params.keywords.as_deref(), Some("heist"));
        assert_eq!(params.strategies, vec![Strategy::Discover]);
        assert!(params.genres.is_empty());
        assert_eq!(params.min_rating, None);
        assert_eq!(params.sort_by, SortBy::PopularityDesc);
    }

    #[test]
    fn test_tag_field_accepts_legacy_alias() {
        let params: QueryParameters =
            serde_json::from_str(r#"{"tmdb_keyword_tags": ["time travel"]}"#).unwrap();
        assert_eq!(params.tags, vec!["time travel".to_string()]);
    }

    #[test]
    fn test_empty_strategy_list_defaults_to_discover() {
        let params = QueryParameters::default();
        assert_eq!(params.effective_strategies(), vec![Strategy::Discover]);
    }

    #[test]
    fn test_keywords_trimmed_ignores_blank_input() {
        let mut params = QueryParameters::default();
        assert_eq!(params.keywords_trimmed(), None);
        params.keywords = Some("   ".to_string());
        assert_eq!(params.keywords_trimmed(), None);
        params.keywords = Some(" inception ".to_string());
        assert_eq!(params.keywords_trimmed(), Some("inception"));
    }

    #[test]
    fn test_genre_table_covers_aliases() {
        assert_eq!(genre_id("Sci-Fi"), Some(878));
        assert_eq!(genre_id("science fiction"), Some(878));
        assert_eq!(genre_id("HORROR"), Some(27));
        assert_eq!(genre_id("telenovela"), None);
    }

    #[test]
    fn test_candidate_release_year() {
        let mut candidate = Candidate::new(603, "The Matrix");
        assert_eq!(candidate.release_year(), None);
        candidate.release_date = Some("1999-03-31".to_string());
        assert_eq!(candidate.release_year(), Some("1999"));
    }

    #[test]
    fn test_release_year_tolerates_mangled_upstream_dates() {
        let mut candidate = Candidate::new(603, "The Matrix");
        // Multi-byte character straddling the year boundary must not panic.
        candidate.release_date = Some("199é-01-01".to_string());
        assert_eq!(candidate.release_year(), None);
        candidate.release_date = Some("19".to_string());
        assert_eq!(candidate.release_year(), None);
        candidate.release_date = Some("n/a".to_string());
        assert_eq!(candidate.release_year(), None);

        let mut detail = MovieDetail::from_candidate(&candidate);
        detail.release_date = Some("199é-01-01".to_string());
        assert_eq!(detail.release_year(), None);
        detail.release_date = Some("2010-07-16".to_string());
        assert_eq!(detail.release_year(), Some("2010"));
    }

    #[test]
    fn test_detail_director_and_cast_helpers() {
        let detail: MovieDetail = serde_json::from_value(serde_json::json!({
            "id": 603,
            "title": "The Matrix",
            "credits": {
                "cast": [
                    {"id": 1, "name": "Keanu Reeves", "character": "Neo"},
                    {"id": 2, "name": "Carrie-Anne Moss", "character": "Trinity"}
                ],
                "crew": [
                    {"id": 3, "name": "Lana Wachowski", "job": "Director"},
                    {"id": 4, "name": "Bill Pope", "job": "Director of Photography"}
                ]
            }
        }))
        .unwrap();

        let directors = detail.directors();
        assert_eq!(directors.len(), 1);
        assert_eq!(directors[0].name, "Lana Wachowski");
        assert_eq!(detail.top_cast(1).len(), 1);
        assert_eq!(detail.top_cast(10).len(), 2);
    }

    #[test]
    fn test_overlay_rotten_tomatoes_lookup() {
        let overlay: SecondaryOverlay = serde_json::from_value(serde_json::json!({
            "imdbRating": "8.7",
            "Ratings": [
                {"Source": "Internet Movie Database", "Value": "8.7/10"},
                {"Source": "Rotten Tomatoes", "Value": "88%"}
            ]
        }))
        .unwrap();

        assert_eq!(overlay.rotten_tomatoes(), Some("88%"));
        assert_eq!(overlay.imdb_rating.as_deref(), Some("8.7"));
    }

    #[test]
    fn test_strategy_parses_wire_names() {
        assert_eq!("discover".parse::<Strategy>(), Ok(Strategy::Discover));
        assert_eq!(
            "multi_search".parse::<Strategy>(),
            Ok(Strategy::MultiSearch)
        );
        assert!("fuzzy".parse::<Strategy>().is_err());
    }
}
