use anyhow::Result;
use std::path::PathBuf;

/// Maximum number of remembered searches.
pub const MAX_ENTRIES: usize = 10;

/// How many entries are offered as suggestions.
pub const SUGGESTION_COUNT: usize = 5;

/// Most-recent-first list of searched city names.
///
/// Never holds duplicates (exact match) and never more than [`MAX_ENTRIES`].
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<String>,
}

impl HistoryStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut entries = super::dedup_in_order(super::load(&path));
        entries.truncate(MAX_ENTRIES);
        Self { path, entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn suggestions(&self) -> &[String] {
        &self.entries[..self.entries.len().min(SUGGESTION_COUNT)]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e == name)
    }

    /// Record a search. A name already present keeps its position.
    ///
    /// Returns `true` when the list changed.
    pub fn add(&mut self, name: &str) -> Result<bool> {
        if self.contains(name) {
            return Ok(false);
        }

        self.entries.insert(0, name.to_string());
        self.entries.truncate(MAX_ENTRIES);
        self.persist()?;
        tracing::info!(city = name, "added to search history");
        Ok(true)
    }

    /// Returns `true` when `name` was present.
    pub fn remove(&mut self, name: &str) -> Result<bool> {
        let before = self.entries.len();
        self.entries.retain(|e| e != name);
        if self.entries.len() == before {
            return Ok(false);
        }

        self.persist()?;
        tracing::info!(city = name, "removed from search history");
        Ok(true)
    }

    fn persist(&self) -> Result<()> {
        super::persist(&self.path, &self.entries)
    }
}
