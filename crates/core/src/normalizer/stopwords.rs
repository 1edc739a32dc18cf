//! English stop-word list (Snowball).

use std::collections::HashSet;

use once_cell::sync::Lazy;

// The Snowball English stop-word list, minus apostrophe forms: the tokenizer
// only emits [a-z0-9]+ runs, so contractions arrive pre-split.
const STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "would",
    "should", "could", "ought", "a", "an", "the", "and", "but", "if", "or", "because", "as",
    "until", "while", "of", "at", "by", "for", "with", "about", "against", "between", "into",
    "through", "during", "before", "after", "above", "below", "to", "from", "up", "down", "in",
    "out", "on", "off", "over", "under", "again", "further", "then", "once", "here", "there",
    "when", "where", "why", "how", "all", "any", "both", "each", "few", "more", "most", "other",
    "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very",
    "s", "t", "d", "ll", "m", "re", "ve", "can", "will", "just", "don", "aren", "couldn",
    "didn", "doesn", "hadn", "hasn", "haven", "isn", "mustn", "needn", "shan", "shouldn",
    "wasn", "weren", "won", "wouldn",
];

static STOPWORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOPWORDS.iter().copied().collect());

pub fn is_stop_word(word: &str) -> bool {
    STOPWORD_SET.contains(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_stop_words() {
        for word in ["the", "a", "is", "and", "of", "to", "in", "not"] {
            assert!(is_stop_word(word), "{word} should be a stop word");
        }
    }

    #[test]
    fn test_content_words_pass() {
        for word in ["sandwich", "velociraptor", "foo", "bar", "42"] {
            assert!(!is_stop_word(word), "{word} should not be a stop word");
        }
    }
}
