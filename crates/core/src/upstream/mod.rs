//! Upstream comic source - the external catalog the update pipeline
//! reconciles against.

mod xkcd;

pub use xkcd::XkcdClient;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// One upstream comic as fetched from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComicInfo {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub description: String,
}

/// Errors for upstream fetches.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source has no comic with this id. Terminal, never retried.
    #[error("comic not found")]
    NotFound,

    #[error("unexpected status: {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("operation cancelled")]
    Cancelled,
}

/// Trait for the upstream comic source.
#[async_trait]
pub trait ComicSource: Send + Sync {
    /// The highest comic id the source currently has.
    async fn last_id(&self, cancel: &CancellationToken) -> Result<i64, SourceError>;

    /// Fetch one comic by id.
    async fn get(&self, id: i64, cancel: &CancellationToken) -> Result<ComicInfo, SourceError>;
}
