//! Query cache shared by the hooks.
//!
//! The cache is an explicit owned object: hooks receive it by handle
//! (`Arc<QueryCache>`) and nothing else writes to it. Entries are keyed by
//! [`QueryKey`], which combines the entity type with the owning notebook id
//! where one exists. Mutations never write entries directly; they mark keys
//! stale through [`QueryCache::invalidate`], and the next read refetches.
//!
//! Every store and invalidation is published as a typed [`CacheEvent`] on a
//! broadcast channel so views (and tests) can observe exactly what changed.
//!
//! Values are held as `serde_json::Value` and decoded on read, which keeps
//! the cache free of `Any` downcasts. A value that fails to decode is treated
//! as a miss.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 256;

/// Identity of one cached query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryKey {
    Notebook(String),
    Sources(String),
    Notes(String),
    /// Prompt list of one notebook.
    Prompts(String),
    Prompt(String),
    ActivePrompt(String),
    PromptPresets,
    DefaultPrompt,
    Transformations,
    Transformation(String),
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Notebook(id) => write!(f, "notebooks/{}", id),
            QueryKey::Sources(id) => write!(f, "notebooks/{}/sources", id),
            QueryKey::Notes(id) => write!(f, "notebooks/{}/notes", id),
            QueryKey::Prompts(id) => write!(f, "notebooks/{}/prompts", id),
            QueryKey::Prompt(id) => write!(f, "prompts/{}", id),
            QueryKey::ActivePrompt(id) => write!(f, "notebooks/{}/active-prompt", id),
            QueryKey::PromptPresets => write!(f, "transformations/prompts"),
            QueryKey::DefaultPrompt => write!(f, "transformations/default-prompt"),
            QueryKey::Transformations => write!(f, "transformations"),
            QueryKey::Transformation(id) => write!(f, "transformations/{}", id),
        }
    }
}

/// Change notification published by the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Stored(QueryKey),
    Invalidated(QueryKey),
}

#[derive(Debug, Clone)]
struct Entry {
    value: serde_json::Value,
    fetched_at: DateTime<Utc>,
    stale: bool,
}

pub struct QueryCache {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    events: broadcast::Sender<CacheEvent>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: Mutex::new(HashMap::new()),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Subscribe to stores and invalidations from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Return the cached value for `key` if present and not stale.
    pub fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entries = self.lock();
        let entry = entries.get(key).filter(|e| !e.stale)?;
        serde_json::from_value(entry.value.clone()).ok()
    }

    /// Return the cached value for `key` even if it has been invalidated.
    pub fn peek<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entries = self.lock();
        let entry = entries.get(key)?;
        serde_json::from_value(entry.value.clone()).ok()
    }

    /// Store a freshly fetched value.
    pub fn store<T: Serialize>(&self, key: QueryKey, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "value not cacheable");
                return;
            }
        };
        self.lock().insert(
            key.clone(),
            Entry {
                value,
                fetched_at: Utc::now(),
                stale: false,
            },
        );
        let _ = self.events.send(CacheEvent::Stored(key));
    }

    /// Mark every key in `keys` stale.
    ///
    /// An event is published for each key, whether or not it was cached, so
    /// observers that have not fetched yet still learn the data moved.
    pub fn invalidate(&self, keys: &[QueryKey]) {
        {
            let mut entries = self.lock();
            for key in keys {
                if let Some(entry) = entries.get_mut(key) {
                    entry.stale = true;
                }
            }
        }
        for key in keys {
            tracing::debug!(key = %key, "invalidated");
            let _ = self.events.send(CacheEvent::Invalidated(key.clone()));
        }
    }

    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        self.lock().get(key).map(|e| !e.stale).unwrap_or(false)
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.lock().contains_key(key)
    }

    pub fn fetched_at(&self, key: &QueryKey) -> Option<DateTime<Utc>> {
        self.lock().get(key).map(|e| e.fetched_at)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
