//! Flat-file timestamp persistence.
//!
//! Both durable maps the bot keeps (ticket last-activity and per-user
//! cooldowns) share one shape: a JSON object of string identifiers to
//! epoch-millisecond timestamps. The whole file is rewritten on every
//! mutation; there is no incremental append. Keep it that way - a partial
//! write of a small map is how state gets corrupted on crash.

use crate::errors::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A durable map of numeric identifiers to epoch-millisecond timestamps,
/// mirrored to a JSON file on every mutation.
#[derive(Debug)]
pub struct TimestampStore {
    path: PathBuf,
    map: HashMap<String, i64>,
}

impl TimestampStore {
    /// Loads the store from `path`. A missing file yields an empty store;
    /// an unreadable or unparsable file is logged and also yields an empty
    /// store, so a damaged file never prevents startup.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let map = match fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str::<HashMap<String, i64>>(&data) {
                Ok(map) => {
                    info!("Loaded {} entries from {}", map.len(), path.display());
                    map
                }
                Err(e) => {
                    warn!("Could not parse {}: {e}. Starting empty.", path.display());
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self { path, map }
    }

    /// Returns the recorded timestamp for `key`, if any.
    #[must_use]
    pub fn get(&self, key: u64) -> Option<i64> {
        self.map.get(&key.to_string()).copied()
    }

    /// Whether `key` has a recorded timestamp.
    #[must_use]
    pub fn contains(&self, key: u64) -> bool {
        self.map.contains_key(&key.to_string())
    }

    /// Records `timestamp_ms` for `key` and rewrites the backing file.
    pub fn set(&mut self, key: u64, timestamp_ms: i64) -> Result<()> {
        self.map.insert(key.to_string(), timestamp_ms);
        self.save()
    }

    /// Removes `key`, rewriting the backing file if it was present.
    /// Returns whether an entry existed.
    pub fn remove(&mut self, key: u64) -> Result<bool> {
        if self.map.remove(&key.to_string()).is_some() {
            self.save()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Iterates over `(id, timestamp_ms)` pairs. Keys that are not valid
    /// numeric identifiers are skipped.
    pub fn entries(&self) -> impl Iterator<Item = (u64, i64)> + '_ {
        self.map
            .iter()
            .filter_map(|(k, v)| k.parse::<u64>().ok().map(|id| (id, *v)))
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the store has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.map)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
