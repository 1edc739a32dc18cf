//! SQLite-backed comic catalog implementation.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, params_from_iter, Connection};

use super::{CatalogError, CatalogStats, Comic, ComicCatalog, ComicRef};

/// SQLite-backed comic catalog.
///
/// Terms live in a `comic_words` join table so the overlap search can rank
/// with a single grouped query.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Open (or create) a catalog database at the given path.
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory catalog (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS comics (
                id INTEGER PRIMARY KEY,
                img_url TEXT NOT NULL
            );

            -- One row per (comic, term); a comic's terms form a set
            CREATE TABLE IF NOT EXISTS comic_words (
                comic_id INTEGER NOT NULL REFERENCES comics(id) ON DELETE CASCADE,
                word TEXT NOT NULL,
                UNIQUE(comic_id, word)
            );

            CREATE INDEX IF NOT EXISTS idx_comic_words_word ON comic_words(word);
            "#,
        )?;
        Ok(())
    }
}

impl ComicCatalog for SqliteCatalog {
    fn add(&self, comic: &Comic) -> Result<(), CatalogError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO comics (id, img_url) VALUES (?1, ?2)",
            params![comic.id, comic.url],
        )?;

        // Existing row: insert-if-absent means no change at all.
        if inserted == 1 {
            for word in &comic.words {
                if word.is_empty() {
                    continue;
                }
                tx.execute(
                    "INSERT OR IGNORE INTO comic_words (comic_id, word) VALUES (?1, ?2)",
                    params![comic.id, word],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn ids(&self) -> Result<Vec<i64>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id FROM comics ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    fn drop_all(&self) -> Result<(), CatalogError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "DELETE FROM comic_words;
             DELETE FROM comics;",
        )?;
        Ok(())
    }

    fn stats(&self) -> Result<CatalogStats, CatalogError> {
        let conn = self.conn.lock().unwrap();

        let words_total: u64 =
            conn.query_row("SELECT COUNT(*) FROM comic_words", [], |row| row.get(0))?;
        let words_unique: u64 = conn.query_row(
            "SELECT COUNT(DISTINCT word) FROM comic_words",
            [],
            |row| row.get(0),
        )?;
        let comics_fetched: u64 =
            conn.query_row("SELECT COUNT(*) FROM comics", [], |row| row.get(0))?;

        Ok(CatalogStats {
            words_total,
            words_unique,
            comics_fetched,
        })
    }

    fn search_comics(
        &self,
        terms: &[String],
        limit: i64,
    ) -> Result<(Vec<ComicRef>, u64), CatalogError> {
        if terms.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let conn = self.conn.lock().unwrap();
        let placeholders = vec!["?"; terms.len()].join(", ");

        let query = format!(
            "SELECT c.id, c.img_url
             FROM comics c
             JOIN comic_words w ON w.comic_id = c.id
             WHERE w.word IN ({placeholders})
             GROUP BY c.id
             ORDER BY COUNT(*) DESC, c.id ASC
             LIMIT {limit}"
        );
        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(params_from_iter(terms.iter()), |row| {
            Ok(ComicRef {
                id: row.get(0)?,
                url: row.get(1)?,
            })
        })?;

        let mut comics = Vec::new();
        for row in rows {
            comics.push(row?);
        }

        let count_query = format!(
            "SELECT COUNT(DISTINCT comic_id) FROM comic_words WHERE word IN ({placeholders})"
        );
        let mut total: u64 = conn.query_row(&count_query, params_from_iter(terms.iter()), |row| {
            row.get(0)
        })?;

        // Compatibility: the database path reports at most `limit` matches.
        if limit > 0 && total > limit as u64 {
            total = limit as u64;
        }

        Ok((comics, total))
    }

    fn load_index_data(&self) -> Result<HashMap<i64, Vec<String>>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT c.id, w.word
             FROM comics c
             LEFT JOIN comic_words w ON w.comic_id = c.id",
        )?;
        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let word: Option<String> = row.get(1)?;
            Ok((id, word))
        })?;

        let mut data: HashMap<i64, Vec<String>> = HashMap::new();
        for row in rows {
            let (id, word) = row?;
            let entry = data.entry(id).or_default();
            if let Some(word) = word {
                entry.push(word);
            }
        }
        Ok(data)
    }

    fn comics_by_ids(&self, ids: &[i64]) -> Result<Vec<ComicRef>, CatalogError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn.lock().unwrap();
        let placeholders = vec!["?"; ids.len()].join(", ");
        let query = format!(
            "SELECT id, img_url FROM comics WHERE id IN ({placeholders}) ORDER BY id ASC"
        );
        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(params_from_iter(ids.iter()), |row| {
            Ok(ComicRef {
                id: row.get(0)?,
                url: row.get(1)?,
            })
        })?;

        let mut comics = Vec::new();
        for row in rows {
            comics.push(row?);
        }
        Ok(comics)
    }

    fn ping(&self) -> Result<(), CatalogError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_catalog() -> SqliteCatalog {
        SqliteCatalog::in_memory().unwrap()
    }

    fn comic(id: i64, url: &str, words: &[&str]) -> Comic {
        Comic {
            id,
            url: url.to_string(),
            words: words.iter().map(|w| w.to_string()).collect(),
        }
    }

    #[test]
    fn test_add_and_ids() {
        let catalog = create_test_catalog();
        catalog.add(&comic(3, "u3", &["foo"])).unwrap();
        catalog.add(&comic(1, "u1", &["bar"])).unwrap();
        catalog.add(&comic(2, "u2", &[])).unwrap();

        assert_eq!(catalog.ids().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_add_is_idempotent() {
        let catalog = create_test_catalog();
        catalog.add(&comic(1, "original", &["foo", "bar"])).unwrap();
        catalog.add(&comic(1, "changed", &["baz"])).unwrap();

        let refs = catalog.comics_by_ids(&[1]).unwrap();
        assert_eq!(refs[0].url, "original");

        let stats = catalog.stats().unwrap();
        assert_eq!(stats.comics_fetched, 1);
        assert_eq!(stats.words_total, 2);
    }

    #[test]
    fn test_add_filters_empty_words() {
        let catalog = create_test_catalog();
        catalog.add(&comic(1, "u1", &["foo", "", "bar"])).unwrap();

        let data = catalog.load_index_data().unwrap();
        let mut words = data[&1].clone();
        words.sort();
        assert_eq!(words, vec!["bar", "foo"]);
    }

    #[test]
    fn test_add_deduplicates_words() {
        let catalog = create_test_catalog();
        catalog.add(&comic(1, "u1", &["foo", "foo", "bar"])).unwrap();

        let stats = catalog.stats().unwrap();
        assert_eq!(stats.words_total, 2);
    }

    #[test]
    fn test_stats() {
        let catalog = create_test_catalog();

        let stats = catalog.stats().unwrap();
        assert_eq!(stats.comics_fetched, 0);
        assert_eq!(stats.words_total, 0);
        assert_eq!(stats.words_unique, 0);

        catalog.add(&comic(1, "u1", &["foo", "bar"])).unwrap();
        catalog.add(&comic(2, "u2", &["bar", "baz"])).unwrap();
        catalog.add(&comic(3, "u3", &[])).unwrap();

        let stats = catalog.stats().unwrap();
        assert_eq!(stats.comics_fetched, 3);
        assert_eq!(stats.words_total, 4);
        assert_eq!(stats.words_unique, 3); // foo, bar, baz
    }

    #[test]
    fn test_search_ranks_by_match_count_then_id() {
        let catalog = create_test_catalog();
        catalog.add(&comic(1, "u1", &["foo", "bar"])).unwrap();
        catalog.add(&comic(2, "u2", &["bar", "baz"])).unwrap();
        catalog.add(&comic(3, "u3", &["qux"])).unwrap();

        let terms = vec!["bar".to_string(), "baz".to_string()];
        let (comics, total) = catalog.search_comics(&terms, 10).unwrap();

        assert_eq!(total, 2);
        assert_eq!(comics.len(), 2);
        // Comic 2 matches both terms, comic 1 only one.
        assert_eq!(comics[0].id, 2);
        assert_eq!(comics[1].id, 1);
    }

    #[test]
    fn test_search_tie_breaks_by_id_ascending() {
        let catalog = create_test_catalog();
        catalog.add(&comic(5, "u5", &["foo"])).unwrap();
        catalog.add(&comic(2, "u2", &["foo"])).unwrap();

        let terms = vec!["foo".to_string()];
        let (comics, _) = catalog.search_comics(&terms, 10).unwrap();
        assert_eq!(comics[0].id, 2);
        assert_eq!(comics[1].id, 5);
    }

    #[test]
    fn test_search_total_clamped_to_limit() {
        let catalog = create_test_catalog();
        catalog.add(&comic(1, "u1", &["foo", "bar"])).unwrap();
        catalog.add(&comic(2, "u2", &["bar", "baz"])).unwrap();

        let terms = vec!["bar".to_string()];
        let (comics, total) = catalog.search_comics(&terms, 1).unwrap();

        assert_eq!(comics.len(), 1);
        assert_eq!(total, 1);
    }

    #[test]
    fn test_search_empty_terms_short_circuits() {
        let catalog = create_test_catalog();
        catalog.add(&comic(1, "u1", &["foo"])).unwrap();

        let (comics, total) = catalog.search_comics(&[], 10).unwrap();
        assert!(comics.is_empty());
        assert_eq!(total, 0);
    }

    #[test]
    fn test_search_excludes_non_matching() {
        let catalog = create_test_catalog();
        catalog.add(&comic(1, "u1", &["foo"])).unwrap();
        catalog.add(&comic(2, "u2", &["bar"])).unwrap();

        let terms = vec!["foo".to_string()];
        let (comics, total) = catalog.search_comics(&terms, 10).unwrap();
        assert_eq!(comics.len(), 1);
        assert_eq!(comics[0].id, 1);
        assert_eq!(total, 1);
    }

    #[test]
    fn test_load_index_data_includes_wordless_rows() {
        let catalog = create_test_catalog();
        catalog.add(&comic(1, "u1", &["foo", "bar"])).unwrap();
        catalog.add(&comic(2, "missing", &[])).unwrap();

        let data = catalog.load_index_data().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[&1].len(), 2);
        assert!(data[&2].is_empty());
    }

    #[test]
    fn test_comics_by_ids_ordered_and_filtered() {
        let catalog = create_test_catalog();
        catalog.add(&comic(1, "u1", &[])).unwrap();
        catalog.add(&comic(2, "u2", &[])).unwrap();
        catalog.add(&comic(3, "u3", &[])).unwrap();

        let refs = catalog.comics_by_ids(&[3, 1, 99]).unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].id, 1);
        assert_eq!(refs[1].id, 3);
    }

    #[test]
    fn test_comics_by_ids_empty_input() {
        let catalog = create_test_catalog();
        assert!(catalog.comics_by_ids(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_drop_all() {
        let catalog = create_test_catalog();
        catalog.add(&comic(1, "u1", &["foo"])).unwrap();
        catalog.add(&comic(2, "u2", &["bar"])).unwrap();

        catalog.drop_all().unwrap();

        let stats = catalog.stats().unwrap();
        assert_eq!(stats.comics_fetched, 0);
        assert_eq!(stats.words_total, 0);
        assert!(catalog.ids().unwrap().is_empty());
    }

    #[test]
    fn test_ping() {
        let catalog = create_test_catalog();
        catalog.ping().unwrap();
    }

    #[test]
    fn test_persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");

        {
            let catalog = SqliteCatalog::new(&path).unwrap();
            catalog.add(&comic(1, "u1", &["foo"])).unwrap();
        }

        let catalog = SqliteCatalog::new(&path).unwrap();
        assert_eq!(catalog.ids().unwrap(), vec![1]);
    }
}
