//! Per-search seen-URL state, optionally backed by a JSON file.
//!
//! On-disk shape is `{ search url: { item url: true } }`. The whole document
//! is truncated and rewritten after every new item, so a crash loses at most
//! one poll's worth of state.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Read;
use std::path::PathBuf;

use tracing::warn;

use crate::error::MonitorError;

#[derive(Debug, Default)]
pub struct NoveltyTracker {
    seen: HashMap<String, HashMap<String, bool>>,
    store: Option<PathBuf>,
}

impl NoveltyTracker {
    /// Load tracker state. `None` keeps everything in memory.
    ///
    /// With a path, a file that cannot be opened (or created) is fatal;
    /// contents that fail to decode are treated as a cold start.
    pub fn load(store: Option<PathBuf>) -> Result<Self, MonitorError> {
        let Some(path) = store else {
            return Ok(Self::default());
        };

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .map_err(|source| MonitorError::Persistence {
                path: path.clone(),
                source,
            })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|source| MonitorError::Persistence {
                path: path.clone(),
                source,
            })?;

        let seen = match serde_json::from_str(&contents) {
            Ok(seen) => seen,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring undecodable scraped-url store");
                HashMap::new()
            }
        };

        Ok(Self {
            seen,
            store: Some(path),
        })
    }

    /// True iff `item_url` has never been processed for `search_url`.
    pub fn is_new(&self, search_url: &str, item_url: &str) -> bool {
        !self
            .seen
            .get(search_url)
            .map_or(false, |items| items.contains_key(item_url))
    }

    /// True iff `search_url` has no processed items yet. Evaluate before any
    /// mark in the current cycle to detect a search's very first poll.
    pub fn is_first_poll(&self, search_url: &str) -> bool {
        self.seen
            .get(search_url)
            .map_or(true, |items| items.is_empty())
    }

    /// Record `item_url` as processed for `search_url` and, when persistence
    /// is enabled, synchronously rewrite the store before returning.
    pub fn mark_seen(&mut self, search_url: &str, item_url: &str) -> Result<(), MonitorError> {
        self.seen
            .entry(search_url.to_string())
            .or_default()
            .insert(item_url.to_string(), true);
        self.persist()
    }

    fn persist(&self) -> Result<(), MonitorError> {
        let Some(path) = &self.store else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&self.seen).map_err(|err| {
            MonitorError::Persistence {
                path: path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
            }
        })?;
        fs::write(path, json).map_err(|source| MonitorError::Persistence {
            path: path.clone(),
            source,
        })
    }
}
