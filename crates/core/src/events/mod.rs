//! In-process event transport.
//!
//! A best-effort publish/subscribe channel carrying a single subject: "the
//! catalog changed". Delivery is at-most-once; subscribers that lag simply
//! miss events, and the timer-driven index rebuild guarantees eventual
//! consistency anyway.

use tokio::sync::broadcast;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 16;

/// Events carried by the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The update pipeline finished a successful pass over the catalog.
    DbUpdated,
}

/// Best-effort in-process event bus.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish the "db updated" event. Never blocks; absent subscribers are
    /// not an error.
    pub fn publish_db_updated(&self) {
        debug!("publishing db updated event");
        let _ = self.tx.send(Event::DbUpdated);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
