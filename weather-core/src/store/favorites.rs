use anyhow::Result;
use std::path::PathBuf;

/// User-pinned cities in the order they were added.
#[derive(Debug)]
pub struct FavoritesStore {
    path: PathBuf,
    entries: Vec<String>,
}

impl FavoritesStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = super::dedup_in_order(super::load(&path));
        Self { path, entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e == name)
    }

    /// Append `name` unless already pinned. Returns `true` when the list changed.
    pub fn add(&mut self, name: &str) -> Result<bool> {
        if self.contains(name) {
            return Ok(false);
        }

        self.entries.push(name.to_string());
        super::persist(&self.path, &self.entries)?;
        tracing::info!(city = name, "added to favorites");
        Ok(true)
    }

    /// Returns `true` when `name` was present.
    pub fn remove(&mut self, name: &str) -> Result<bool> {
        let Some(pos) = self.entries.iter().position(|e| e == name) else {
            return Ok(false);
        };

        self.entries.remove(pos);
        super::persist(&self.path, &self.entries)?;
        tracing::info!(city = name, "removed from favorites");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut favorites = FavoritesStore::open(dir.path().join("cities.json"));

        assert!(favorites.add("Manila").expect("add"));
        assert!(!favorites.add("Manila").expect("add"));

        assert_eq!(favorites.entries(), ["Manila"]);
    }

    #[test]
    fn keeps_insertion_order_without_cap() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut favorites = FavoritesStore::open(dir.path().join("cities.json"));

        for i in 0..25 {
            favorites.add(&format!("City{i}")).expect("add");
        }

        assert_eq!(favorites.entries().len(), 25);
        assert_eq!(favorites.entries()[0], "City0");
        assert_eq!(favorites.entries()[24], "City24");
    }

    #[test]
    fn remove_is_a_noop_when_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cities.json");
        let mut favorites = FavoritesStore::open(&path);

        assert!(!favorites.remove("Nowhere").expect("remove"));
        assert!(!path.exists());
    }

    #[test]
    fn persisted_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cities.json");
        {
            let mut favorites = FavoritesStore::open(&path);
            favorites.add("Seoul").expect("add");
            favorites.add("Accra").expect("add");
            favorites.add("Perth").expect("add");
            favorites.remove("Accra").expect("remove");
        }

        let reopened = FavoritesStore::open(&path);
        assert_eq!(reopened.entries(), ["Seoul", "Perth"]);
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cities.json");
        std::fs::write(&path, "not json at all").expect("write");

        let mut favorites = FavoritesStore::open(&path);
        assert!(favorites.entries().is_empty());

        favorites.add("Dakar").expect("add");
        assert_eq!(FavoritesStore::open(&path).entries(), ["Dakar"]);
    }
}
