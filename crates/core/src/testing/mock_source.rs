//! Mock upstream comic source for testing.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::upstream::{ComicInfo, ComicSource, SourceError};

/// Mock implementation of the `ComicSource` trait.
///
/// Provides controllable behavior for testing:
/// - Script the comics the source knows about and its last id
/// - Mark ids as missing (404) or transiently failing (500)
/// - Delay every `get` to widen race windows
/// - Count `get` calls for assertions
pub struct MockComicSource {
    comics: RwLock<HashMap<i64, ComicInfo>>,
    missing: RwLock<HashSet<i64>>,
    failing: RwLock<HashSet<i64>>,
    last_id: AtomicI64,
    get_delay: RwLock<Option<Duration>>,
    get_calls: AtomicU64,
}

impl MockComicSource {
    pub fn new() -> Self {
        Self {
            comics: RwLock::new(HashMap::new()),
            missing: RwLock::new(HashSet::new()),
            failing: RwLock::new(HashSet::new()),
            last_id: AtomicI64::new(0),
            get_delay: RwLock::new(None),
            get_calls: AtomicU64::new(0),
        }
    }

    /// Add a comic and grow `last_id` to cover it.
    pub async fn insert_comic(&self, id: i64, title: &str, description: &str) {
        let info = ComicInfo {
            id,
            url: format!("https://comics.example/{id}.png"),
            title: title.to_string(),
            description: description.to_string(),
        };
        self.comics.write().await.insert(id, info);
        self.last_id.fetch_max(id, Ordering::SeqCst);
    }

    /// Make `get(id)` answer 404.
    pub async fn mark_missing(&self, id: i64) {
        self.missing.write().await.insert(id);
        self.last_id.fetch_max(id, Ordering::SeqCst);
    }

    /// Make `get(id)` answer with a transient server error.
    pub async fn mark_failing(&self, id: i64) {
        self.failing.write().await.insert(id);
        self.last_id.fetch_max(id, Ordering::SeqCst);
    }

    /// Let `get(id)` succeed again after `mark_failing`.
    pub async fn clear_failing(&self, id: i64) {
        self.failing.write().await.remove(&id);
    }

    pub fn set_last_id(&self, id: i64) {
        self.last_id.store(id, Ordering::SeqCst);
    }

    /// Delay every subsequent `get` by `delay`.
    pub async fn set_get_delay(&self, delay: Duration) {
        *self.get_delay.write().await = Some(delay);
    }

    /// How many `get` calls the source has served (or started serving).
    pub fn get_call_count(&self) -> u64 {
        self.get_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockComicSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ComicSource for MockComicSource {
    async fn last_id(&self, cancel: &CancellationToken) -> Result<i64, SourceError> {
        if cancel.is_cancelled() {
            return Err(SourceError::Cancelled);
        }
        Ok(self.last_id.load(Ordering::SeqCst))
    }

    async fn get(&self, id: i64, cancel: &CancellationToken) -> Result<ComicInfo, SourceError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.get_delay.read().await;
        if let Some(delay) = delay {
            tokio::select! {
                _ = cancel.cancelled() => return Err(SourceError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
        if cancel.is_cancelled() {
            return Err(SourceError::Cancelled);
        }

        if self.missing.read().await.contains(&id) {
            return Err(SourceError::NotFound);
        }
        if self.failing.read().await.contains(&id) {
            return Err(SourceError::Status(500));
        }
        match self.comics.read().await.get(&id) {
            Some(info) => Ok(info.clone()),
            None => Err(SourceError::NotFound),
        }
    }
}
