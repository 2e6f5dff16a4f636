use anyhow::Result;
use chrono::{DateTime, Utc};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};

use crate::storage::JsonStore;

pub const HISTORY_STORAGE_KEY: &str = "sql_query_history";

/// History keeps the last 50 executed queries, newest first.
const MAX_HISTORY_ENTRIES: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub query: String,
    pub timestamp: DateTime<Utc>,
    pub rows_affected: usize,
    /// Milliseconds.
    pub execution_time: f64,
}

#[derive(Debug, Clone)]
pub struct HistoryMatch {
    pub entry: HistoryEntry,
    pub score: i64,
}

/// Executed-query history, persisted as a JSON array under
/// [`HISTORY_STORAGE_KEY`].
pub struct QueryHistory {
    entries: Vec<HistoryEntry>,
    store: JsonStore,
    matcher: SkimMatcherV2,
}

impl QueryHistory {
    pub fn load(store: JsonStore) -> Result<Self> {
        let entries = store.load(HISTORY_STORAGE_KEY)?;
        Ok(Self {
            entries,
            store,
            matcher: SkimMatcherV2::default(),
        })
    }

    /// Record an executed query. Empty queries and repeats of the newest
    /// entry are skipped; the list is truncated to the cap.
    pub fn add(&mut self, query: &str, rows_affected: usize, execution_time: f64) -> Result<()> {
        if query.trim().is_empty() {
            return Ok(());
        }
        if self.entries.first().is_some_and(|e| e.query == query) {
            return Ok(());
        }

        let now = Utc::now();
        // Ids are timestamps, nudged to stay unique within one millisecond.
        let id = self
            .entries
            .iter()
            .map(|e| e.id + 1)
            .max()
            .unwrap_or(0)
            .max(now.timestamp_millis());

        self.entries.insert(
            0,
            HistoryEntry {
                id,
                query: query.to_string(),
                timestamp: now,
                rows_affected,
                execution_time,
            },
        );
        self.entries.truncate(MAX_HISTORY_ENTRIES);
        self.save()
    }

    pub fn remove(&mut self, id: i64) -> Result<()> {
        self.entries.retain(|e| e.id != id);
        self.save()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.store.remove(HISTORY_STORAGE_KEY)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fuzzy search over stored queries, best match first. An empty term
    /// returns everything in recency order.
    pub fn search(&self, term: &str) -> Vec<HistoryMatch> {
        if term.is_empty() {
            return self
                .entries
                .iter()
                .map(|entry| HistoryMatch {
                    entry: entry.clone(),
                    score: 0,
                })
                .collect();
        }

        let mut matches: Vec<HistoryMatch> = self
            .entries
            .iter()
            .filter_map(|entry| {
                self.matcher
                    .fuzzy_match(&entry.query, term)
                    .map(|score| HistoryMatch {
                        entry: entry.clone(),
                        score,
                    })
            })
            .collect();
        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches
    }

    fn save(&self) -> Result<()> {
        self.store.save(HISTORY_STORAGE_KEY, &self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> QueryHistory {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::at(dir.path().to_path_buf()).unwrap();
        // Keep the tempdir alive for the test by leaking it; each test gets
        // its own directory.
        std::mem::forget(dir);
        QueryHistory::load(store).unwrap()
    }

    #[test]
    fn test_add_newest_first() {
        let mut h = history();
        h.add("SELECT * FROM users", 10, 1.0).unwrap();
        h.add("SELECT * FROM orders", 5, 2.0).unwrap();
        assert_eq!(h.entries()[0].query, "SELECT * FROM orders");
        assert_eq!(h.entries()[1].query, "SELECT * FROM users");
    }

    #[test]
    fn test_skips_empty_and_consecutive_duplicates() {
        let mut h = history();
        h.add("  ", 0, 0.0).unwrap();
        h.add("SELECT 1", 1, 1.0).unwrap();
        h.add("SELECT 1", 1, 1.0).unwrap();
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn test_capped_at_fifty() {
        let mut h = history();
        for i in 0..60 {
            h.add(&format!("SELECT {}", i), i, 0.0).unwrap();
        }
        assert_eq!(h.len(), 50);
        // Newest survives, oldest ten dropped.
        assert_eq!(h.entries()[0].query, "SELECT 59");
        assert_eq!(h.entries()[49].query, "SELECT 10");
    }

    #[test]
    fn test_remove_by_id() {
        let mut h = history();
        h.add("SELECT a", 0, 0.0).unwrap();
        h.add("SELECT b", 0, 0.0).unwrap();
        let id = h.entries()[1].id;
        h.remove(id).unwrap();
        assert_eq!(h.len(), 1);
        assert_eq!(h.entries()[0].query, "SELECT b");
    }

    #[test]
    fn test_ids_are_unique() {
        let mut h = history();
        for i in 0..10 {
            h.add(&format!("q{}", i), 0, 0.0).unwrap();
        }
        let mut ids: Vec<i64> = h.entries().iter().map(|e| e.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_fuzzy_search() {
        let mut h = history();
        h.add("SELECT * FROM users", 0, 0.0).unwrap();
        h.add("SELECT * FROM orders", 0, 0.0).unwrap();
        let matches = h.search("usr");
        assert_eq!(matches.len(), 1);
        assert!(matches[0].entry.query.contains("users"));
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = JsonStore::at(dir.path().to_path_buf()).unwrap();
            let mut h = QueryHistory::load(store).unwrap();
            h.add("SELECT persisted", 3, 1.5).unwrap();
        }
        let store = JsonStore::at(dir.path().to_path_buf()).unwrap();
        let h = QueryHistory::load(store).unwrap();
        assert_eq!(h.len(), 1);
        assert_eq!(h.entries()[0].rows_affected, 3);
    }
}
