//! Index refresh drivers.
//!
//! Two independent tasks keep the in-memory index fresh: a timer that
//! rebuilds every `index_ttl`, and an event listener that coalesces "db
//! updated" bursts through a debounced pending flag. Rebuilds are atomic, so
//! overlap between the two costs nothing but redundant work.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::events::{Event, EventBus};

use super::SearchService;

/// Default interval between pending-flag checks in the event driver.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(10);

/// Spawn the timer driver: one immediate rebuild, then one every `ttl`.
///
/// A failed rebuild is logged and the previous index stays in place.
pub fn spawn_timer_indexer(
    search: Arc<SearchService>,
    ttl: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = search.rebuild_index() {
            error!("initial index rebuild failed: {}", e);
        }

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("timer indexer stopped");
                    return;
                }
                _ = tokio::time::sleep(ttl) => {
                    if let Err(e) = search.rebuild_index() {
                        error!("index rebuild failed: {}", e);
                    }
                }
            }
        }
    })
}

/// Spawn the event driver: every "db updated" message arms a pending flag,
/// and each `debounce` tick rebuilds at most once if the flag is armed.
/// Messages arriving during a rebuild coalesce into the next tick.
pub fn spawn_event_indexer(
    search: Arc<SearchService>,
    events: &EventBus,
    debounce: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let mut rx = events.subscribe();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(debounce);
        // The first tick of an interval fires immediately; consume it so the
        // first check happens one debounce period from now.
        ticker.tick().await;

        let mut pending = false;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("event indexer stopped");
                    return;
                }
                _ = ticker.tick() => {
                    if pending {
                        info!("rebuilding index after db update events");
                        if let Err(e) = search.rebuild_index() {
                            error!("index rebuild failed: {}", e);
                        }
                        pending = false;
                    }
                }
                msg = rx.recv() => match msg {
                    Ok(Event::DbUpdated) => pending = true,
                    // A lagged receiver still learned that something changed.
                    Err(RecvError::Lagged(_)) => pending = true,
                    Err(RecvError::Closed) => return,
                },
            }
        }
    })
}
