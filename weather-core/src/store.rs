//! Small persisted lists of city names.
//!
//! Each store is a flat JSON array of strings on disk. The file is read once
//! when the store is opened and fully rewritten after every change.

use anyhow::{Context, Result};
use std::{fs, path::Path};

pub mod favorites;
pub mod history;

pub use favorites::FavoritesStore;
pub use history::HistoryStore;

/// Read a list from `path`.
///
/// An absent file is an empty list. So is a file that can't be read or
/// doesn't hold a JSON array of strings; that case is logged and otherwise
/// ignored.
pub fn load(path: &Path) -> Vec<String> {
    if !path.exists() {
        return Vec::new();
    }

    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read store, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "malformed store file, starting empty");
            Vec::new()
        }
    }
}

/// Overwrite `path` with `entries`, creating parent directories as needed.
pub fn persist(path: &Path, entries: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
    }

    let json = serde_json::to_string(entries).context("Failed to serialize store")?;

    fs::write(path, json).with_context(|| format!("Failed to write store: {}", path.display()))
}

/// Drop repeated names, keeping the first occurrence.
pub(crate) fn dedup_in_order(entries: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(entries.len());
    for entry in entries {
        if !out.contains(&entry) {
            out.push(entry);
        }
    }
    out
}
