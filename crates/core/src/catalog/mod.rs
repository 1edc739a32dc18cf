//! Comic catalog - the durable mapping from comic id to image URL and
//! normalized terms.
//!
//! The update pipeline writes rows as it reconciles against upstream; the
//! search service reads them back either through the ranked SQL path or as a
//! full dump when rebuilding the in-memory index.

mod sqlite;
mod types;

pub use sqlite::SqliteCatalog;
pub use types::*;

/// Trait for comic catalog storage.
pub trait ComicCatalog: Send + Sync {
    /// Insert a comic. Idempotent: if the id already exists the row is left
    /// untouched and no error is returned. Empty terms are filtered out.
    fn add(&self, comic: &Comic) -> Result<(), CatalogError>;

    /// All comic ids, ascending.
    fn ids(&self) -> Result<Vec<i64>, CatalogError>;

    /// Remove every row.
    fn drop_all(&self) -> Result<(), CatalogError>;

    /// Catalog statistics.
    fn stats(&self) -> Result<CatalogStats, CatalogError>;

    /// Rank rows by how many of `terms` they contain, descending, ties by id
    /// ascending, and return the top `limit` together with the match count
    /// clamped to `limit`. Rows with no matching term are excluded. An empty
    /// term list short-circuits to an empty result.
    fn search_comics(
        &self,
        terms: &[String],
        limit: i64,
    ) -> Result<(Vec<ComicRef>, u64), CatalogError>;

    /// Dump the whole catalog as id -> terms, for index construction. Rows
    /// without terms map to an empty list.
    fn load_index_data(&self) -> Result<std::collections::HashMap<i64, Vec<String>>, CatalogError>;

    /// Fetch the subset of `ids` present in the catalog, ordered by id
    /// ascending. An empty input short-circuits to an empty result.
    fn comics_by_ids(&self, ids: &[i64]) -> Result<Vec<ComicRef>, CatalogError>;

    /// Cheap liveness probe.
    fn ping(&self) -> Result<(), CatalogError>;
}
