//! Cache Store Module
//!
//! Request-line to response mapping with insertion-ordered listing and
//! incremental byte accounting. Not synchronized; see [`SharedCache`](super::SharedCache).

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::cache::{CacheStats, InsertionOrder};
use crate::error::{ProxyError, Result};

// == Listed Entry ==
/// A key together with its 1-based position in listing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedEntry {
    pub position: usize,
    pub key: String,
}

impl fmt::Display for ListedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.position, self.key)
    }
}

// == Cache Store ==
/// Main cache storage keyed by the raw request line.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Request line -> response text
    entries: HashMap<String, String>,
    /// Listing order
    order: InsertionOrder,
    /// Performance statistics
    stats: CacheStats,
    /// Sum of key and value byte lengths
    total_bytes: usize,
}

impl CacheStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Put ==
    /// Stores a response under `key`, returning the previous value if any.
    ///
    /// Overwriting keeps the key's listing position.
    pub fn put(&mut self, key: String, value: String) -> Option<String> {
        let added = value.len();
        let previous = match self.entries.get_mut(&key) {
            Some(slot) => {
                self.total_bytes -= slot.len();
                Some(std::mem::replace(slot, value))
            }
            None => {
                self.total_bytes += key.len();
                self.order.push(&key);
                self.entries.insert(key, value);
                None
            }
        };
        self.total_bytes += added;
        previous
    }

    // == Get ==
    /// Looks up a response for the request path, recording a hit or miss.
    pub fn get(&mut self, key: &str) -> Option<String> {
        match self.entries.get(key) {
            Some(value) => {
                self.stats.record_hit();
                Some(value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Peek ==
    /// Looks up a response without touching statistics.
    pub fn peek(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Listing ==
    /// Returns all keys in listing order.
    pub fn keys(&self) -> Vec<String> {
        self.order.iter().map(str::to_string).collect()
    }

    /// Returns all keys with their 1-based positions.
    pub fn entries(&self) -> Vec<ListedEntry> {
        self.order
            .iter()
            .enumerate()
            .map(|(idx, key)| ListedEntry {
                position: idx + 1,
                key: key.to_string(),
            })
            .collect()
    }

    /// Returns all key/value pairs in listing order.
    pub fn snapshot(&self) -> Vec<(String, String)> {
        self.order
            .iter()
            .filter_map(|key| {
                self.entries
                    .get(key)
                    .map(|value| (key.to_string(), value.clone()))
            })
            .collect()
    }

    // == Search ==
    /// Returns every key containing `fragment`, in listing order.
    pub fn search(&self, fragment: &str) -> Vec<String> {
        self.order
            .iter()
            .filter(|key| key.contains(fragment))
            .map(str::to_string)
            .collect()
    }

    // == Remove At ==
    /// Removes the entry at a 1-based position.
    ///
    /// Fails with [`ProxyError::InvalidIndex`] when `position` is outside
    /// `1..=len`, leaving the store unchanged.
    pub fn remove_at(&mut self, position: i64) -> Result<(String, String)> {
        let count = self.entries.len();
        let invalid = ProxyError::InvalidIndex { position, count };
        let position = usize::try_from(position).map_err(|_| invalid)?;

        let key = self.order.remove_at(position).ok_or(ProxyError::InvalidIndex {
            position: position as i64,
            count,
        })?;
        let value = self.entries.remove(&key).unwrap_or_default();
        self.total_bytes -= key.len() + value.len();
        Ok((key, value))
    }

    // == Clear ==
    /// Removes every entry, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.order.clear();
        self.total_bytes = 0;
        removed
    }

    // == Size ==
    /// Aggregate UTF-8 byte length of all keys and values.
    pub fn size_bytes(&self) -> usize {
        self.total_bytes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_totals(self.entries.len(), self.total_bytes);
        stats
    }

    pub(crate) fn record_auto_clear(&mut self) {
        self.stats.record_auto_clear();
    }
}
