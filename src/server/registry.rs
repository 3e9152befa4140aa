use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::cache::CachedIndex;
use crate::config::{index_file, Config};
use crate::error::{QaError, Result};
use crate::index::{IndexState, SqliteIndex};

/// Index handle shared by every request naming the same index.
pub type SharedIndex = Arc<CachedIndex<SqliteIndex>>;

struct OpenIndex {
    index: SharedIndex,
    state: IndexState,
}

/// Named indexes under one root directory, opened on first use.
///
/// Requests pick their index by name; nothing here tracks a "current" one.
/// Each `get` compares the index's ingest state with the one seen last and
/// drops cached lookups when an ingest has changed it.
pub struct IndexRegistry {
    root: PathBuf,
    busy_timeout: Duration,
    cache_capacity: usize,
    indexes: Mutex<HashMap<String, OpenIndex>>,
}

impl IndexRegistry {
    pub fn new(root: impl Into<PathBuf>, busy_timeout: Duration, cache_capacity: usize) -> Self {
        Self {
            root: root.into(),
            busy_timeout,
            cache_capacity,
            indexes: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.index_root(),
            config.lookup_timeout(),
            config.server.lookup_cache_capacity,
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Handle for index `name`, opening it if needed.
    ///
    /// Runs a query against the index, so call it off the async workers.
    pub fn get(&self, name: &str) -> Result<SharedIndex> {
        let path = index_file(&self.root, name).ok_or_else(|| QaError::IndexUnavailable(name.to_string()))?;

        let mut indexes = self.indexes.lock().unwrap_or_else(|e| e.into_inner());
        if !path.is_file() {
            indexes.remove(name);
            return Err(QaError::IndexUnavailable(name.to_string()));
        }

        if let Some(open) = indexes.get_mut(name) {
            let current = open.index.inner().state()?;
            if current != open.state {
                log::info!("Index {} changed since it was opened; dropping cached lookups", name);
                open.index.clear();
                open.index.inner().release_connections();
                open.state = current;
            }
            return Ok(open.index.clone());
        }

        let index = Arc::new(CachedIndex::new(
            SqliteIndex::open(&path, self.busy_timeout)?,
            self.cache_capacity,
        ));
        let state = index.inner().state()?;
        log::info!("Opened index {} at {} ({} dumps, {} triples)", name, path.display(), state.dumps, state.triples);
        indexes.insert(name.to_string(), OpenIndex { index: index.clone(), state });
        Ok(index)
    }

    /// Names of the indexes opened so far.
    pub fn open_indexes(&self) -> Vec<String> {
        let indexes = self.indexes.lock().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = indexes.keys().cloned().collect();
        names.sort();
        names
    }
}
