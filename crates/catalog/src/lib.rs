//! # Catalog Crate
//!
//! Typed access to the two external metadata sources:
//!
//! - the primary catalog (TMDb-shaped): title search, filtered discovery,
//!   item detail, recommendations, entity lookup, and browse sections;
//! - the secondary overlay source (OMDb-shaped): supplementary ratings and
//!   credits keyed by a cross-reference id.
//!
//! Both clients read through the persistent [`cache`] crate under stable key
//! prefixes, and both sit behind trait seams ([`CatalogApi`],
//! [`SecondaryApi`]) so the retrieval pipeline can be tested with in-memory
//! doubles.

pub mod api;
pub mod client;
pub mod error;
pub mod filter;
pub mod secondary;
pub mod types;

// Re-export commonly used types
pub use api::{CatalogApi, EntityKind, SecondaryApi};
pub use client::{BROWSE_CAP, CatalogClient, CatalogConfig, SEARCH_CAP};
pub use error::{CatalogError, Result};
pub use filter::{DEFAULT_VOTE_FLOOR, DiscoverFilter, GENRE_OR_THRESHOLD};
pub use secondary::{SecondaryClient, SecondaryConfig};
pub use types::{
    Candidate, CreditEntry, Credits, EntityId, EntityMatch, KeywordList, MovieDetail, MovieId,
    OverlayRating, QueryParameters, SecondaryOverlay, SortBy, Strategy, genre_id,
};
