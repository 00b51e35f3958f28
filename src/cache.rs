//! Persistent key -> value caches for geocoding and directions lookups.
//!
//! A cache is read in full at the start of a run and written in full after a
//! batch completes. Entries never expire within a run. The backing file is a
//! sorted, pretty-printed JSON object so diffs stay reviewable.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::PlannerError;

/// Place name -> (latitude, longitude).
pub type GeocodeCache = FileCache<(f64, f64)>;

/// Pair key -> distance in meters.
pub type DirectionsCache = FileCache<u32>;

/// In-memory mapping with file persistence.
///
/// Concurrent fetch tasks insert under independent keys, so the mapping is
/// guarded as a whole; callers check membership before scheduling a fetch to
/// keep writers off the same key.
#[derive(Debug, Default)]
pub struct FileCache<V> {
    entries: Mutex<BTreeMap<String, V>>,
}

impl<V> FileCache<V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    /// Loads the cache from `path`. A missing file yields an empty cache.
    pub fn load(path: &Path) -> Result<Self, PlannerError> {
        let entries = match fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(PlannerError::CacheIo(err)),
        };
        Ok(Self {
            entries: Mutex::new(entries),
        })
    }

    /// Writes the full mapping back to `path`.
    pub fn save(&self, path: &Path) -> Result<(), PlannerError> {
        let snapshot = self.lock().clone();
        let raw = serde_json::to_string_pretty(&snapshot)?;
        fs::write(path, raw)?;
        debug!(entries = snapshot.len(), path = %path.display(), "cache saved");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn insert(&self, key: String, value: V) {
        self.lock().insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, V>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = GeocodeCache::load(&dir.path().join("absent.json")).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geocode_cache.json");

        let cache = GeocodeCache::default();
        cache.insert("Louvre".to_string(), (48.8606, 2.3376));
        cache.insert("Eiffel Tower".to_string(), (48.8584, 2.2945));
        cache.save(&path).unwrap();

        let reloaded = GeocodeCache::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("Louvre"), Some((48.8606, 2.3376)));
    }

    #[test]
    fn test_saved_file_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("directions_cache.json");

        let cache = DirectionsCache::default();
        cache.insert("b|key".to_string(), 200);
        cache.insert("a|key".to_string(), 100);
        cache.save(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let a = raw.find("a|key").unwrap();
        let b = raw.find("b|key").unwrap();
        assert!(a < b, "keys should be written in sorted order");
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            DirectionsCache::load(&path),
            Err(PlannerError::CacheFormat(_))
        ));
    }

    #[test]
    fn test_contains_and_get() {
        let cache = DirectionsCache::default();
        assert!(!cache.contains("k"));
        cache.insert("k".to_string(), 5);
        assert!(cache.contains("k"));
        assert_eq!(cache.get("k"), Some(5));
        assert_eq!(cache.get("missing"), None);
    }
}
