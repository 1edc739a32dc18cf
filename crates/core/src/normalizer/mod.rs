//! Phrase normalization - the contract every search phrase and every ingested
//! comic text goes through before it touches the catalog or the index.

mod english;
mod stopwords;

pub use english::EnglishNormalizer;

use async_trait::async_trait;
use thiserror::Error;

/// Hard cap on the byte length of a phrase submitted for normalization.
pub const MAX_PHRASE_BYTES: usize = 4096;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("phrase is empty")]
    EmptyPhrase,

    #[error("phrase exceeds {MAX_PHRASE_BYTES} bytes")]
    PhraseTooLarge,
}

/// Turns free text into a sequence of canonical terms: lowercased,
/// stop-word-filtered, stemmed. Deterministic.
#[async_trait]
pub trait Normalizer: Send + Sync {
    async fn normalize(&self, phrase: &str) -> Result<Vec<String>, NormalizeError>;
}
