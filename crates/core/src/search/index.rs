//! The in-memory inverted index.

use std::collections::HashMap;

/// Map from term to the ascending ids of comics containing it.
pub type Index = HashMap<String, Vec<i64>>;

/// Build a fresh index from a catalog dump.
///
/// Rows with no terms are skipped, terms are deduplicated within a row,
/// empty terms are dropped, and every posting list comes out sorted
/// ascending. The result is a pure function of the input snapshot.
pub fn build_index(data: HashMap<i64, Vec<String>>) -> Index {
    let mut index = Index::new();

    for (id, words) in data {
        if words.is_empty() {
            continue;
        }
        let mut seen = std::collections::HashSet::with_capacity(words.len());
        for word in words {
            if word.is_empty() {
                continue;
            }
            if !seen.insert(word.clone()) {
                continue;
            }
            index.entry(word).or_insert_with(Vec::new).push(id);
        }
    }

    for ids in index.values_mut() {
        ids.sort_unstable();
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(rows: &[(i64, &[&str])]) -> HashMap<i64, Vec<String>> {
        rows.iter()
            .map(|(id, words)| (*id, words.iter().map(|w| w.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_builds_postings() {
        let index = build_index(data(&[
            (1, &["foo", "bar"]),
            (2, &["bar", "baz"]),
            (3, &["qux"]),
        ]));

        assert_eq!(index["foo"], vec![1]);
        assert_eq!(index["bar"], vec![1, 2]);
        assert_eq!(index["baz"], vec![2]);
        assert_eq!(index["qux"], vec![3]);
    }

    #[test]
    fn test_postings_sorted_ascending() {
        let index = build_index(data(&[(9, &["foo"]), (1, &["foo"]), (5, &["foo"])]));
        assert_eq!(index["foo"], vec![1, 5, 9]);
    }

    #[test]
    fn test_row_duplicates_collapse() {
        let index = build_index(data(&[(1, &["foo", "foo", "foo"])]));
        assert_eq!(index["foo"], vec![1]);
    }

    #[test]
    fn test_empty_terms_and_rows_skipped() {
        let index = build_index(data(&[(1, &["", "foo"]), (2, &[])]));
        assert_eq!(index.len(), 1);
        assert_eq!(index["foo"], vec![1]);
        assert!(!index.contains_key(""));
    }

    #[test]
    fn test_empty_input_yields_empty_index() {
        assert!(build_index(HashMap::new()).is_empty());
    }
}
