//! Persistent key/value store for cached responses
//!
//! The whole mapping lives in memory and is written back to a single JSON file
//! on every save. Reading never fails: a missing or unreadable file is an empty
//! cache.

use directories::ProjectDirs;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name used for the cache when no explicit path is configured
pub const DEFAULT_CACHE_FILENAME: &str = "sites_mapping_cache.json";

/// Errors that can occur when persisting the cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// Creating the cache directory or writing the file failed
    #[error("Failed to write cache file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The mapping could not be serialized
    #[error("Failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// In-memory mapping from request identity to payload, backed by one file
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Location of the backing file
    path: PathBuf,
    /// Cached payloads keyed by request identity
    entries: BTreeMap<String, Value>,
}

impl CacheStore {
    /// Returns the default cache file location
    ///
    /// Uses `~/.cache/npsites/sites_mapping_cache.json` on Linux, or the
    /// equivalent XDG path on other platforms. Returns `None` if no home
    /// directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "npsites")?;
        Some(project_dirs.cache_dir().join(DEFAULT_CACHE_FILENAME))
    }

    /// Creates an empty store that will be saved to `path`
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Loads the store from `path`
    ///
    /// Returns an empty store if the file doesn't exist, can't be read, or
    /// doesn't contain a JSON object. The file itself is never modified.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_entries(&path) {
            Some(entries) => {
                tracing::debug!(path = %path.display(), entries = entries.len(), "Loaded cache");
                entries
            }
            None => {
                tracing::debug!(path = %path.display(), "No usable cache file, starting empty");
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    /// Writes the complete mapping to the backing file
    ///
    /// The JSON is written to a temporary sibling first and then renamed over
    /// the target, so a later `load` sees either the previous file or the new
    /// one.
    pub fn save(&self) -> Result<(), CacheError> {
        let write_err = |source| CacheError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_string(&self.entries)?;
        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, json).map_err(write_err)?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(write_err(e));
        }
        Ok(())
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, identity: &str) -> Option<&Value> {
        self.entries.get(identity)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    /// Inserts a payload, returning the one it replaced
    pub fn insert(&mut self, identity: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(identity.into(), value)
    }

    pub fn remove(&mut self, identity: &str) -> Option<Value> {
        self.entries.remove(identity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PartialEq for CacheStore {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

fn read_entries(path: &Path) -> Option<BTreeMap<String, Value>> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_store() -> (CacheStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = CacheStore::load(temp_dir.path().join(DEFAULT_CACHE_FILENAME));
        (store, temp_dir)
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let (store, temp_dir) = create_test_store();

        assert!(store.is_empty());
        assert!(
            !temp_dir.path().join(DEFAULT_CACHE_FILENAME).exists(),
            "Loading should not create the file"
        );
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cache.json");
        fs::write(&path, "{\"https://example/a\": \"<html>").unwrap();

        let store = CacheStore::load(&path);

        assert!(store.is_empty());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "{\"https://example/a\": \"<html>",
            "Loading must leave a corrupt file untouched"
        );
    }

    #[test]
    fn test_load_non_object_json_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cache.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(CacheStore::load(&path).is_empty());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let (mut store, _temp_dir) = create_test_store();
        store.insert("https://example/a", json!("<html>a</html>"));
        store.insert(
            "https://example/radius_origin_49931",
            json!({"searchResults": [{"name": "Diner", "fields": {"city": ""}}]}),
        );

        store.save().expect("Save should succeed");
        let loaded = CacheStore::load(store.path());

        assert_eq!(loaded, store);
        assert_eq!(loaded.get("https://example/a"), Some(&json!("<html>a</html>")));
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("cache.json");
        let mut store = CacheStore::load(&path);
        store.insert("k", json!("v"));

        store.save().expect("Save should succeed");

        assert!(path.exists(), "Cache file should be created");
        assert!(
            !temp_dir.path().join("nested/dir/cache.json.tmp").exists(),
            "Temporary file should be renamed away"
        );
    }

    #[test]
    fn test_save_overwrites_with_full_mapping() {
        let (mut store, _temp_dir) = create_test_store();
        store.insert("first", json!("1"));
        store.save().unwrap();
        store.insert("second", json!("2"));
        store.save().unwrap();

        let loaded = CacheStore::load(store.path());

        assert_eq!(loaded.len(), 2);
        assert!(loaded.contains("first"));
        assert!(loaded.contains("second"));
    }

    #[test]
    fn test_save_into_directory_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = CacheStore::empty(temp_dir.path());
        store.insert("k", json!("v"));

        let err = store.save().expect_err("Saving over a directory should fail");

        assert!(matches!(err, CacheError::Write { .. }));
    }

    #[test]
    fn test_default_path_uses_project_name() {
        if let Some(path) = CacheStore::default_path() {
            let path_str = path.to_string_lossy();
            assert!(path_str.contains("npsites"));
            assert!(path_str.ends_with(DEFAULT_CACHE_FILENAME));
        }
        // Passes when no home directory is available (e.g., in CI)
    }
}
