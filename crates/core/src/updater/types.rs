//! Types for the update pipeline.

use thiserror::Error;

use crate::catalog::{CatalogError, CatalogStats};
use crate::upstream::SourceError;

/// Whether an update pass is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    Idle,
    Running,
}

impl UpdateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateStatus::Idle => "idle",
            UpdateStatus::Running => "running",
        }
    }
}

/// Combined catalog and upstream statistics.
#[derive(Debug, Clone, Copy)]
pub struct UpdateStats {
    pub db: CatalogStats,
    /// The upstream source's last comic id.
    pub comics_total: i64,
}

/// Errors for update pipeline operations.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// Another update pass holds the writer lock.
    #[error("update already running")]
    AlreadyRunning,

    #[error("update concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
