//! Error types for catalog and secondary-source calls.

use thiserror::Error;

/// Errors that can occur while talking to an upstream metadata source.
///
/// Callers in the retrieval pipeline treat these as recoverable: a failed
/// lookup becomes an empty result for that call, never a fatal error.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Transport-level failure (connect, timeout, non-2xx status).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not match the expected shape.
    #[error("unexpected payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The upstream answered but the payload signals failure.
    #[error("upstream error: {0}")]
    Upstream(String),
}

/// Convenience alias for Results in this crate.
pub type Result<T> = std::result::Result<T, CatalogError>;
