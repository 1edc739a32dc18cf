//! Search core - two phrase-search modes over the indexed corpus.
//!
//! `search` ranks rows in the database; `isearch` ranks against the
//! in-memory inverted index and only touches the database to resolve the
//! winning ids to URLs. Both share phrase validation and normalization. The
//! index is rebuilt in full, never mutated incrementally.

pub mod index;
pub mod indexer;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::info;

use crate::catalog::{CatalogError, ComicCatalog, ComicRef};
use crate::normalizer::{NormalizeError, Normalizer, MAX_PHRASE_BYTES};

use index::{build_index, Index};

const DEFAULT_LIMIT: i64 = 10;

/// A ranked page of search hits plus the total match count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub comics: Vec<ComicRef>,
    pub total: u64,
}

/// Errors for search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("arguments are not acceptable")]
    BadArguments,

    #[error("request is too large")]
    RequestTooLarge,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl From<NormalizeError> for SearchError {
    fn from(e: NormalizeError) -> Self {
        match e {
            NormalizeError::EmptyPhrase => SearchError::BadArguments,
            NormalizeError::PhraseTooLarge => SearchError::RequestTooLarge,
        }
    }
}

/// The search service.
pub struct SearchService {
    catalog: Arc<dyn ComicCatalog>,
    normalizer: Arc<dyn Normalizer>,

    index: RwLock<Index>,
    rebuilds: AtomicU64,
}

impl SearchService {
    pub fn new(catalog: Arc<dyn ComicCatalog>, normalizer: Arc<dyn Normalizer>) -> Self {
        Self {
            catalog,
            normalizer,
            index: RwLock::new(Index::new()),
            rebuilds: AtomicU64::new(0),
        }
    }

    /// Database-backed relevance search.
    pub async fn search(&self, phrase: &str, limit: i64) -> Result<SearchResult, SearchError> {
        let limit = normalize_limit(limit)?;
        let phrase = sanitize_phrase(phrase)?;

        let terms = self.normalizer.normalize(phrase).await?;
        if terms.is_empty() {
            return Ok(SearchResult::default());
        }

        let (comics, total) = self.catalog.search_comics(&terms, limit)?;
        Ok(SearchResult { comics, total })
    }

    /// In-memory index-backed ranked search.
    pub async fn isearch(&self, phrase: &str, limit: i64) -> Result<SearchResult, SearchError> {
        let limit = normalize_limit(limit)?;
        let phrase = sanitize_phrase(phrase)?;

        let terms = self.normalizer.normalize(phrase).await?;
        let terms = deduplicate_terms(terms);
        if terms.is_empty() {
            return Ok(SearchResult::default());
        }

        let mut ranked = self.rank_ids(&terms);
        let total = ranked.len() as u64;
        if total == 0 {
            return Ok(SearchResult::default());
        }

        ranked.truncate(limit as usize);

        let comics = self.catalog.comics_by_ids(&ranked)?;
        let ordered = order_comics(comics, &ranked);

        Ok(SearchResult {
            comics: ordered,
            total,
        })
    }

    /// Rebuild the inverted index from the catalog and swap it in atomically.
    pub fn rebuild_index(&self) -> Result<(), SearchError> {
        let data = self.catalog.load_index_data()?;
        let new_index = build_index(data);
        let entries = new_index.len();

        *self.index.write().unwrap() = new_index;
        self.rebuilds.fetch_add(1, Ordering::SeqCst);

        info!("index rebuilt, {} entries", entries);
        Ok(())
    }

    /// Number of completed rebuilds since construction.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds.load(Ordering::SeqCst)
    }

    /// Rank ids by how many of `terms` their posting lists contain,
    /// descending, ties broken by id ascending.
    fn rank_ids(&self, terms: &[String]) -> Vec<i64> {
        let index = self.index.read().unwrap();
        if index.is_empty() {
            return Vec::new();
        }

        let mut counts: HashMap<i64, u32> = HashMap::new();
        for term in terms {
            if let Some(ids) = index.get(term) {
                for id in ids {
                    *counts.entry(*id).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(i64, u32)> = counts.into_iter().collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.into_iter().map(|(id, _)| id).collect()
    }
}

fn normalize_limit(limit: i64) -> Result<i64, SearchError> {
    if limit < 0 {
        return Err(SearchError::BadArguments);
    }
    if limit == 0 {
        return Ok(DEFAULT_LIMIT);
    }
    Ok(limit)
}

fn sanitize_phrase(phrase: &str) -> Result<&str, SearchError> {
    let phrase = phrase.trim();
    if phrase.is_empty() {
        return Err(SearchError::BadArguments);
    }
    if phrase.len() > MAX_PHRASE_BYTES {
        return Err(SearchError::RequestTooLarge);
    }
    Ok(phrase)
}

/// Drop duplicates and empty strings, preserving first-occurrence order.
fn deduplicate_terms(terms: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::with_capacity(terms.len());
    terms
        .into_iter()
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}

/// Reorder the catalog's id-sorted rows to match the ranked order, dropping
/// ids the fetch did not return.
fn order_comics(source: Vec<ComicRef>, order: &[i64]) -> Vec<ComicRef> {
    let by_id: HashMap<i64, ComicRef> = source.into_iter().map(|c| (c.id, c)).collect();
    order.iter().filter_map(|id| by_id.get(id).cloned()).collect()
}
