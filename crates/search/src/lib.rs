//! # Search Crate
//!
//! Retrieval building blocks for the search pipeline:
//!
//! - [`resolver`]: free-text names (people, companies, thematic tags) to
//!   catalog-internal ids, with fuzzy retry variants for tag spelling;
//! - [`title`], [`discover`], [`similar`]: one executor per retrieval mode,
//!   each producing an ordered candidate list with no dedup responsibility;
//! - [`relaxed`]: wraps discovery with progressive constraint-dropping until
//!   a minimum result count is met.
//!
//! Merging, deduplication, and fallback across strategies live upstream in
//! the server crate's orchestrator.

pub mod discover;
pub mod relaxed;
pub mod resolver;
pub mod similar;
pub mod title;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types
pub use relaxed::{MIN_RESULTS, RelaxationController};
pub use resolver::{EntityResolver, ResolvedEntities};
