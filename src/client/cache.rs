//! Local Result Cache
//!
//! One entry per normalized repository key, holding the complete result set
//! of a finished analysis. Writes replace the whole entry; there is no
//! merge and no expiry. Every read or write failure is swallowed: a broken
//! cache behaves like an empty one.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::CacheSettings;
use crate::domain::payloads::AnalysisResults;
use crate::domain::repository::RepoKey;
use crate::infrastructure::log_messages::client;

/// Bumped whenever the shape of a pass payload changes; older entries are
/// then treated as misses
pub const CACHE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub schema_version: u32,
    pub results: AnalysisResults,
    pub timestamp: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(results: AnalysisResults) -> Self {
        Self {
            schema_version: CACHE_SCHEMA_VERSION,
            results,
            timestamp: Utc::now(),
        }
    }

    fn into_current_results(self) -> Option<AnalysisResults> {
        if self.schema_version == CACHE_SCHEMA_VERSION {
            Some(self.results)
        } else {
            debug!(found = self.schema_version, expected = CACHE_SCHEMA_VERSION, "{}", client::CACHE_SCHEMA_MISMATCH);
            None
        }
    }
}

pub trait ResultCache: Send + Sync {
    fn get(&self, key: &RepoKey) -> Option<AnalysisResults>;

    fn put(&self, key: &RepoKey, results: &AnalysisResults);

    /// Look up by any URL naming the repository
    fn get_for_url(&self, url: &str) -> Option<AnalysisResults> {
        self.get(&RepoKey::from_url(url)?)
    }

    fn put_for_url(&self, url: &str, results: &AnalysisResults) {
        if let Some(key) = RepoKey::from_url(url) {
            self.put(&key, results);
        }
    }
}

/// One JSON file per repository under a directory
#[derive(Debug, Clone)]
pub struct FileResultCache {
    directory: PathBuf,
}

impl FileResultCache {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// `None` when caching is disabled
    pub fn from_settings(settings: &CacheSettings) -> Option<Self> {
        settings
            .enabled
            .then(|| Self::new(settings.directory.clone()))
    }

    fn entry_path(&self, key: &RepoKey) -> PathBuf {
        self.directory
            .join(format!("{}.json", urlencoding::encode(key.as_str())))
    }

    fn read(&self, key: &RepoKey) -> Result<Option<CacheEntry>, io::Error> {
        let path = self.entry_path(key);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Write to a sibling temp file, then rename over the entry
    fn write(&self, key: &RepoKey, entry: &CacheEntry) -> Result<(), io::Error> {
        fs::create_dir_all(&self.directory)?;
        let path = self.entry_path(key);
        let temp = path.with_extension(format!("json.{}.tmp", Uuid::now_v7()));

        let json = serde_json::to_vec(entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&temp, json)?;
        fs::rename(&temp, &path).inspect_err(|_| {
            let _ = fs::remove_file(&temp);
        })
    }
}

impl ResultCache for FileResultCache {
    fn get(&self, key: &RepoKey) -> Option<AnalysisResults> {
        match self.read(key) {
            Ok(entry) => entry?.into_current_results(),
            Err(e) => {
                warn!(key = %key, error = %e, "{}", client::CACHE_READ_FAILED);
                None
            }
        }
    }

    fn put(&self, key: &RepoKey, results: &AnalysisResults) {
        if let Err(e) = self.write(key, &CacheEntry::new(results.clone())) {
            warn!(key = %key, error = %e, "{}", client::CACHE_WRITE_FAILED);
        }
    }
}

/// Process-local cache, for tests and embedders without a writable disk
#[derive(Debug, Default)]
pub struct MemoryResultCache {
    entries: Mutex<HashMap<RepoKey, CacheEntry>>,
}

impl MemoryResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Insert a raw entry, bypassing the current schema version
    pub fn insert_entry(&self, key: RepoKey, entry: CacheEntry) {
        self.entries.lock().insert(key, entry);
    }
}

impl ResultCache for MemoryResultCache {
    fn get(&self, key: &RepoKey) -> Option<AnalysisResults> {
        self.entries
            .lock()
            .get(key)
            .cloned()
            .and_then(CacheEntry::into_current_results)
    }

    fn put(&self, key: &RepoKey, results: &AnalysisResults) {
        self.entries
            .lock()
            .insert(key.clone(), CacheEntry::new(results.clone()));
    }
}
