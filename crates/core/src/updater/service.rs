//! Update pipeline implementation.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::catalog::{Comic, ComicCatalog};
use crate::events::EventBus;
use crate::normalizer::{Normalizer, MAX_PHRASE_BYTES};
use crate::upstream::{ComicSource, SourceError};

use super::types::{UpdateError, UpdateStats, UpdateStatus};

/// URL stored for ids the upstream source reports as missing.
pub(crate) const PLACEHOLDER_URL: &str = "missing";

const STATUS_IDLE: u8 = 0;
const STATUS_RUNNING: u8 = 1;

/// The update pipeline service.
///
/// `update` takes the writer lock non-blocking and fails fast if a pass is
/// already in flight; `drop_catalog` waits for it. The status value is
/// readable without touching the lock.
pub struct UpdateService {
    catalog: Arc<dyn ComicCatalog>,
    source: Arc<dyn ComicSource>,
    normalizer: Arc<dyn Normalizer>,
    events: EventBus,
    concurrency: usize,

    writer: tokio::sync::Mutex<()>,
    status: AtomicU8,
}

impl UpdateService {
    pub fn new(
        catalog: Arc<dyn ComicCatalog>,
        source: Arc<dyn ComicSource>,
        normalizer: Arc<dyn Normalizer>,
        events: EventBus,
        concurrency: usize,
    ) -> Result<Self, UpdateError> {
        if concurrency < 1 {
            return Err(UpdateError::InvalidConcurrency);
        }
        Ok(Self {
            catalog,
            source,
            normalizer,
            events,
            concurrency,
            writer: tokio::sync::Mutex::new(()),
            status: AtomicU8::new(STATUS_IDLE),
        })
    }

    /// Run one reconciliation pass against the upstream source.
    pub async fn update(&self, cancel: &CancellationToken) -> Result<(), UpdateError> {
        let guard = self
            .writer
            .try_lock()
            .map_err(|_| UpdateError::AlreadyRunning)?;
        self.status.store(STATUS_RUNNING, Ordering::SeqCst);

        let result = self.run(cancel).await;

        self.status.store(STATUS_IDLE, Ordering::SeqCst);
        drop(guard);

        if result.is_ok() {
            info!("update complete, publishing db updated event");
            self.events.publish_db_updated();
        }
        result
    }

    async fn run(&self, cancel: &CancellationToken) -> Result<(), UpdateError> {
        let last = match self.source.last_id(cancel).await {
            Err(SourceError::Cancelled) => return Err(UpdateError::Cancelled),
            other => other?,
        };
        let existing: HashSet<i64> = self.catalog.ids()?.into_iter().collect();

        let (tx, rx) = mpsc::channel::<i64>(self.concurrency * 2);
        let rx = Arc::new(tokio::sync::Mutex::new(rx));

        let mut workers = JoinSet::new();
        for _ in 0..self.concurrency {
            let rx = Arc::clone(&rx);
            let catalog = Arc::clone(&self.catalog);
            let source = Arc::clone(&self.source);
            let normalizer = Arc::clone(&self.normalizer);
            let cancel = cancel.clone();
            workers.spawn(Self::worker(rx, catalog, source, normalizer, cancel));
        }

        for id in 1..=last {
            if existing.contains(&id) {
                continue;
            }
            tokio::select! {
                _ = cancel.cancelled() => {
                    drop(tx);
                    while workers.join_next().await.is_some() {}
                    return Err(UpdateError::Cancelled);
                }
                sent = tx.send(id) => {
                    if sent.is_err() {
                        break;
                    }
                }
            }
        }

        drop(tx);
        while workers.join_next().await.is_some() {}

        if cancel.is_cancelled() {
            return Err(UpdateError::Cancelled);
        }
        Ok(())
    }

    async fn worker(
        rx: Arc<tokio::sync::Mutex<mpsc::Receiver<i64>>>,
        catalog: Arc<dyn ComicCatalog>,
        source: Arc<dyn ComicSource>,
        normalizer: Arc<dyn Normalizer>,
        cancel: CancellationToken,
    ) {
        loop {
            let id = { rx.lock().await.recv().await };
            let Some(id) = id else { return };

            if cancel.is_cancelled() {
                return;
            }

            let info = match source.get(id, &cancel).await {
                Ok(info) => info,
                Err(SourceError::NotFound) => {
                    let placeholder = Comic {
                        id,
                        url: PLACEHOLDER_URL.to_string(),
                        words: Vec::new(),
                    };
                    if let Err(e) = catalog.add(&placeholder) {
                        warn!("db add placeholder failed for comic {}: {}", id, e);
                    }
                    continue;
                }
                Err(SourceError::Cancelled) => return,
                Err(e) => {
                    // Leave the gap; the next update pass retries it.
                    warn!("upstream get failed for comic {}: {}", id, e);
                    continue;
                }
            };

            let phrase = format!("{} {}", info.title, info.description);
            let phrase = truncate_utf8(&phrase, MAX_PHRASE_BYTES);

            let words = match normalizer.normalize(phrase).await {
                Ok(words) => words,
                Err(e) => {
                    warn!("normalize failed for comic {}: {}", id, e);
                    Vec::new()
                }
            };

            let comic = Comic {
                id: info.id,
                url: info.url,
                words,
            };
            if let Err(e) = catalog.add(&comic) {
                warn!("db add failed for comic {}: {}", id, e);
            }
        }
    }

    /// Catalog statistics plus the upstream's last id.
    pub async fn stats(&self, cancel: &CancellationToken) -> Result<UpdateStats, UpdateError> {
        let db = self.catalog.stats()?;
        let comics_total = match self.source.last_id(cancel).await {
            Err(SourceError::Cancelled) => return Err(UpdateError::Cancelled),
            other => other?,
        };
        Ok(UpdateStats { db, comics_total })
    }

    /// Current status, readable without the writer lock.
    pub fn status(&self) -> UpdateStatus {
        match self.status.load(Ordering::SeqCst) {
            STATUS_RUNNING => UpdateStatus::Running,
            _ => UpdateStatus::Idle,
        }
    }

    /// Truncate the catalog. Waits for an in-flight update to finish.
    pub async fn drop_catalog(&self) -> Result<(), UpdateError> {
        let _guard = self.writer.lock().await;
        self.catalog.drop_all()?;
        info!("catalog dropped");
        Ok(())
    }
}

/// Cut `s` to at most `limit` bytes without splitting a UTF-8 sequence.
fn truncate_utf8(s: &str, limit: usize) -> &str {
    if s.len() <= limit {
        return s;
    }
    let mut end = limit;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
