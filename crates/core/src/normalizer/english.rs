//! English normalizer: regex tokenizer + stop-word filter + Snowball stemmer.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use rust_stemmers::{Algorithm, Stemmer};

use super::stopwords::is_stop_word;
use super::{NormalizeError, Normalizer, MAX_PHRASE_BYTES};

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new("[a-z0-9]+").unwrap());

/// The in-process English normalizer.
pub struct EnglishNormalizer {
    stemmer: Stemmer,
}

impl EnglishNormalizer {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    fn normalize_sync(&self, phrase: &str) -> Result<Vec<String>, NormalizeError> {
        if phrase.is_empty() {
            return Err(NormalizeError::EmptyPhrase);
        }
        if phrase.len() > MAX_PHRASE_BYTES {
            return Err(NormalizeError::PhraseTooLarge);
        }

        let lowered = phrase.to_lowercase();
        let terms = WORD_RE
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|token| !is_stop_word(token))
            .map(|token| self.stemmer.stem(token).to_string())
            .filter(|stem| !stem.is_empty())
            .collect();
        Ok(terms)
    }
}

impl Default for EnglishNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Normalizer for EnglishNormalizer {
    async fn normalize(&self, phrase: &str) -> Result<Vec<String>, NormalizeError> {
        self.normalize_sync(phrase)
    }
}
