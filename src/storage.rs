use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Local key-value persistence: each key maps to one JSON file holding an
/// array of objects. This is the whole storage contract; callers own the
/// keys and the entry shapes.
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Store rooted at the platform data directory
    /// (falls back to `~/.sql-runner`).
    pub fn open_default() -> Result<Self> {
        let dir = dirs::data_local_dir()
            .map(|d| d.join("sql-runner"))
            .or_else(|| dirs::home_dir().map(|d| d.join(".sql-runner")))
            .context("No usable storage directory")?;
        Self::at(dir)
    }

    pub fn at(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Creating storage directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Load the array stored under `key`; a missing or empty file is an
    /// empty list, not an error.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("Parsing stored blob '{}'", key))
    }

    pub fn save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let content = serde_json::to_string_pretty(items)?;
        fs::write(self.path_for(key), content)?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}
