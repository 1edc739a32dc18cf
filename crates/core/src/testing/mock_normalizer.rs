//! Mock normalizer for testing.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::normalizer::{NormalizeError, Normalizer, MAX_PHRASE_BYTES};

/// A predictable normalizer: lowercases and splits on whitespace, no
/// stop-words, no stemming. Can be switched into a failing mode.
pub struct MockNormalizer {
    failing: AtomicBool,
}

impl MockNormalizer {
    pub fn new() -> Self {
        Self {
            failing: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `normalize` call fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Default for MockNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Normalizer for MockNormalizer {
    async fn normalize(&self, phrase: &str) -> Result<Vec<String>, NormalizeError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NormalizeError::PhraseTooLarge);
        }
        if phrase.is_empty() {
            return Err(NormalizeError::EmptyPhrase);
        }
        if phrase.len() > MAX_PHRASE_BYTES {
            return Err(NormalizeError::PhraseTooLarge);
        }
        Ok(phrase
            .to_lowercase()
            .split_whitespace()
            .map(String::from)
            .collect())
    }
}
