use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::JsonStore;

pub const FAVORITES_STORAGE_KEY: &str = "sql_query_favorites";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub id: i64,
    pub name: String,
    pub query: String,
    pub timestamp: DateTime<Utc>,
}

/// Named saved queries, newest first, unbounded. Same storage shape as
/// history, its own key.
pub struct QueryFavorites {
    entries: Vec<FavoriteEntry>,
    store: JsonStore,
}

impl QueryFavorites {
    pub fn load(store: JsonStore) -> Result<Self> {
        let entries = store.load(FAVORITES_STORAGE_KEY)?;
        Ok(Self { entries, store })
    }

    /// Save a query under a name; a missing name gets "Query N".
    pub fn add(&mut self, query: &str, name: Option<&str>) -> Result<()> {
        if query.trim().is_empty() {
            return Ok(());
        }
        let now = Utc::now();
        let id = self
            .entries
            .iter()
            .map(|e| e.id + 1)
            .max()
            .unwrap_or(0)
            .max(now.timestamp_millis());
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| format!("Query {}", self.entries.len() + 1));

        self.entries.insert(
            0,
            FavoriteEntry {
                id,
                name,
                query: query.to_string(),
                timestamp: now,
            },
        );
        self.save()
    }

    pub fn remove(&mut self, id: i64) -> Result<()> {
        self.entries.retain(|e| e.id != id);
        self.save()
    }

    pub fn is_favorite(&self, query: &str) -> bool {
        self.entries.iter().any(|e| e.query == query)
    }

    pub fn entries(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn save(&self) -> Result<()> {
        self.store.save(FAVORITES_STORAGE_KEY, &self.entries)
    }
}
