//! Types for the comic catalog.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A catalog row: one upstream comic with its normalized terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comic {
    /// Upstream comic number.
    pub id: i64,
    /// Image URL, or `"missing"` for placeholder rows.
    pub url: String,
    /// Stemmed terms extracted from the comic's text. Unordered, no
    /// duplicates, never contains the empty string.
    pub words: Vec<String>,
}

/// A search hit: the id/url pair returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComicRef {
    pub id: i64,
    pub url: String,
}

/// Catalog statistics.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CatalogStats {
    /// Sum of per-comic term counts (duplicates across comics counted).
    pub words_total: u64,
    /// Number of distinct terms across the whole catalog.
    pub words_unique: u64,
    /// Number of rows in the catalog.
    pub comics_fetched: u64,
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for CatalogError {
    fn from(e: rusqlite::Error) -> Self {
        CatalogError::Database(e.to_string())
    }
}
