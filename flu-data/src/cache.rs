//! File-backed cache of fetched observation batches, keyed by request range
//! and lag.
//!
//! The whole cache is one JSON object, `{"201430-201529": {"51": [...], ...}}`,
//! read once when opened and replaced atomically on [`LagCache::flush`].
//! Entries never expire.

use crate::artifact::write_atomically;
use crate::error::{DataError, Result};
use flu_epidata::observation::Observation;
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

type Batches = BTreeMap<String, BTreeMap<u32, Vec<Observation>>>;

/// Observation batches by range key and lag, with single-owner write back.
#[derive(Debug)]
pub struct LagCache {
    path: PathBuf,
    entries: Batches,
    dirty: bool,
}

impl LagCache {
    /// Load the cache at `path`. A missing file is an empty cache; an
    /// unreadable or unparsable one is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| {
                DataError::CacheCorrupt {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No cache at {}, starting empty", path.display());
                Batches::new()
            }
            Err(source) => {
                return Err(DataError::CacheRead {
                    path: path.clone(),
                    source,
                })
            }
        };
        Ok(LagCache {
            path,
            entries,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, range_key: &str, lag: u32) -> Option<&[Observation]> {
        self.entries
            .get(range_key)?
            .get(&lag)
            .map(Vec::as_slice)
    }

    pub fn put(&mut self, range_key: impl Into<String>, lag: u32, batch: Vec<Observation>) {
        self.entries
            .entry(range_key.into())
            .or_default()
            .insert(lag, batch);
        self.dirty = true;
    }

    /// Number of cached batches across all ranges.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when entries were added since the last load or flush.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Persist every entry, replacing the file in one step. No-op when clean.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            debug!("Cache {} unchanged, not writing", self.path.display());
            return Ok(());
        }
        let bytes = serde_json::to_vec(&self.entries).map_err(|source| DataError::Serialize {
            path: self.path.clone(),
            source,
        })?;
        write_atomically(&self.path, &bytes)?;
        self.dirty = false;
        info!(
            "Saved {} cached batches to {}",
            self.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flu_epidata::epiweek::EpiWeek;

    fn batch(value: f64) -> Vec<Observation> {
        vec![Observation {
            region: "nat".to_string(),
            epiweek: EpiWeek::from_raw(201505),
            lag: 3,
            value,
        }]
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LagCache::open(dir.path().join("cache.json")).unwrap();
        assert!(cache.is_empty());
        assert!(!cache.is_dirty());
        assert!(cache.get("201430-201529", 0).is_none());
    }

    #[test]
    fn test_put_flush_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let mut cache = LagCache::open(&path).unwrap();
        cache.put("201430-201529", 3, batch(2.5));
        cache.put("201430-201529", 2, Vec::new());
        assert!(cache.is_dirty());
        assert!(!path.exists());
        cache.flush().unwrap();
        assert!(!cache.is_dirty());

        let reopened = LagCache::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.get("201430-201529", 3), Some(batch(2.5).as_slice()));
        assert_eq!(reopened.get("201430-201529", 2), Some(&[][..]));
        assert!(reopened.get("201330-201429", 3).is_none());

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["201430-201529"]["3"][0]["value"], 2.5);
    }

    #[test]
    fn test_clean_flush_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let mut cache = LagCache::open(&path).unwrap();
        cache.flush().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_cache_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{\"201430-201529\": [truncated").unwrap();
        assert!(matches!(
            LagCache::open(&path),
            Err(DataError::CacheCorrupt { .. })
        ));
    }

    #[test]
    fn test_unreadable_cache_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // a directory where the cache file should be cannot be read as one
        let path = dir.path().join("cache.json");
        fs::create_dir(&path).unwrap();
        assert!(matches!(
            LagCache::open(&path),
            Err(DataError::CacheRead { .. })
        ));
    }
}
