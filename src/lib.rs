//! # trie-again
//!
//! A concurrent prefix tree mapping byte-string keys to values, built for
//! autocomplete boxes, symbol tables and dictionary lookups over large,
//! heavily prefix-overlapping vocabularies.
//!
//! ## Features
//!
//! - **Shared-prefix storage**: memory grows with distinct path bytes, not
//!   total key bytes
//! - **Exact lookup, prefix test, prefix count**: O(key length) walks
//! - **Autocomplete**: bounded, deterministic (ascending byte order)
//!   enumeration under a prefix
//! - **Compacting delete**: emptied branches are pruned immediately
//! - **Bulk loading**: many inserts under one write lock
//! - **Unicode**: keys are UTF-8 bytes, so any text works unchanged
//!
//! ## Architecture
//!
//! [`TrieCore`] is the single-threaded engine: nodes live in an index
//! addressed [`arena::NodeArena`] and refer to children by [`NodeId`].
//! [`Trie`] wraps it in one reader/writer lock: lookups share the lock,
//! mutations take it exclusively.
//!
//! ## Example
//!
//! ```rust
//! use trie_again::Trie;
//!
//! let trie: Trie<String> = Trie::new();
//! trie.insert("car", "vehicle".to_string()).unwrap();
//! trie.insert("card", "payment".to_string()).unwrap();
//! trie.add_word_list(["cat", "dog"]).unwrap();
//!
//! assert_eq!(trie.get("card"), Some("payment".to_string()));
//! assert!(trie.prefix_search("ca"));
//! assert_eq!(trie.count_prefix("ca"), 3);
//! assert_eq!(trie.auto_complete("ca", 2).unwrap(), vec!["car", "card"]);
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod arena;
pub mod batch;
pub mod codec;
pub mod error;
pub mod node;
pub mod trie;

use std::time::Duration;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::warn;

pub use arena::NodeId;
pub use batch::Batch;
pub use error::{Result, TrieError};
pub use trie::{Iter, TrieCore};

/// Structure statistics for a trie.
#[derive(Debug, Clone, Default)]
pub struct TrieStats {
    /// Number of keys stored
    pub entries: usize,
    /// Nodes currently in use, root included
    pub live_nodes: usize,
    /// Vacated arena slots waiting for reuse
    pub free_slots: usize,
    /// Nodes whose children are kept in a sorted list
    pub sparse_nodes: usize,
    /// Nodes whose children are kept in a 256-entry table
    pub dense_nodes: usize,
    /// Approximate bytes held by the node structure
    pub memory_bytes: usize,
    /// Bytes per key (calculated)
    pub bytes_per_key: f64,
}

/// Configuration for a trie.
#[derive(Debug, Clone)]
pub struct Config {
    /// Node slots reserved up front
    pub initial_capacity: usize,
    /// Fan-out above which a node switches to a 256-entry child table.
    /// Clamped to `4..=256`; 256 keeps every node sparse.
    pub dense_threshold: usize,
    /// Recycle the slots of pruned nodes
    pub reuse_freed_slots: bool,
    /// Upper bound on node slots; inserts needing more fail with
    /// [`TrieError::ArenaExhausted`]
    pub max_nodes: usize,
}

impl Config {
    pub(crate) fn normalized(mut self) -> Self {
        self.dense_threshold = self
            .dense_threshold
            .clamp(node::MIN_DENSE_THRESHOLD, node::MAX_DENSE_THRESHOLD);
        self.max_nodes = self.max_nodes.clamp(1, arena::MAX_SLOTS);
        self.initial_capacity = self.initial_capacity.min(self.max_nodes);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            dense_threshold: 48,
            reuse_freed_slots: true,
            max_nodes: arena::MAX_SLOTS,
        }
    }
}

/// A prefix tree safe to share between threads.
///
/// All state sits behind one [`parking_lot::RwLock`]. `get`,
/// `prefix_search`, `enumerate`, `count_prefix` and friends take it
/// shared, so any number of them run at once; `insert`, `delete` and the
/// batch loaders take it exclusively. A write is never observed half
/// applied.
///
/// Every call blocks until the lock is available. The lock is task-fair:
/// once a writer is queued, newly arriving readers wait behind it, so
/// writers are not starved by a steady stream of readers.
/// [`Trie::try_read_for`] and [`Trie::try_write_for`] give up after a
/// timeout instead.
///
/// Share it with `Arc<Trie<V>>`.
pub struct Trie<V = String> {
    inner: RwLock<TrieCore<V>>,
}

impl<V> Trie<V> {
    /// Create an empty trie with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an empty trie with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            inner: RwLock::new(TrieCore::with_config(config)),
        }
    }

    /// Insert a key-value pair.
    ///
    /// Returns the previous value if the key already existed.
    pub fn insert(&self, key: impl AsRef<[u8]>, value: V) -> Result<Option<V>> {
        self.inner.write().insert(key.as_ref(), value)
    }

    /// Get a copy of the value for a key.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<V>
    where
        V: Clone,
    {
        self.inner.read().get(key.as_ref()).cloned()
    }

    /// Check if a key exists in the trie.
    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.inner.read().contains_key(key.as_ref())
    }

    /// Remove a key, returning its value if it was present.
    ///
    /// Deleting an absent key succeeds and changes nothing.
    pub fn delete(&self, key: impl AsRef<[u8]>) -> Option<V> {
        self.inner.write().remove(key.as_ref())
    }

    /// Whether any stored key starts with `prefix`.
    pub fn prefix_search(&self, prefix: impl AsRef<[u8]>) -> bool {
        self.inner.read().prefix_search(prefix.as_ref())
    }

    /// Up to `max_results` keys starting with `prefix`, ascending.
    pub fn enumerate(&self, prefix: impl AsRef<[u8]>, max_results: usize) -> Vec<Vec<u8>> {
        self.inner.read().enumerate(prefix.as_ref(), max_results)
    }

    /// Text form of [`Trie::enumerate`].
    ///
    /// Fails only if a matching key was stored as raw bytes that are not
    /// UTF-8.
    pub fn auto_complete(&self, prefix: &str, max_results: usize) -> Result<Vec<String>> {
        let keys = self.enumerate(codec::encode(prefix), max_results);
        codec::decode_all(keys)
    }

    /// Number of keys starting with `prefix`.
    pub fn count_prefix(&self, prefix: impl AsRef<[u8]>) -> usize {
        self.inner.read().count_prefix(prefix.as_ref())
    }

    /// Up to `max_results` `(key, value)` pairs under `prefix`, ascending.
    pub fn entries(&self, prefix: impl AsRef<[u8]>, max_results: usize) -> Vec<(Vec<u8>, V)>
    where
        V: Clone,
    {
        self.inner
            .read()
            .iter_prefix(prefix.as_ref())
            .take(max_results)
            .map(|(key, value)| (key, value.clone()))
            .collect()
    }

    /// Insert all pairs under one write lock, returning how many keys
    /// were new.
    pub fn insert_batch<I, K>(&self, entries: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<[u8]>,
    {
        self.inner.write().insert_all(entries)
    }

    /// Apply a prepared [`Batch`] under one write lock.
    ///
    /// Entries go in the batch's order; call [`Batch::sort`] first to
    /// share prefix walks between neighbouring keys.
    pub fn apply_batch(&self, batch: Batch<V>) -> Result<usize> {
        self.inner.write().insert_all(batch)
    }

    /// Insert each word with `value_of(word)` under one write lock.
    pub fn add_word_list_with<I, S, F>(&self, words: I, value_of: F) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnMut(&str) -> V,
    {
        self.inner.write().add_word_list_with(words, value_of)
    }

    /// Get the number of keys in the trie.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if the trie is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get structure statistics.
    pub fn stats(&self) -> TrieStats {
        self.inner.read().stats()
    }

    pub fn memory_usage(&self) -> usize {
        self.inner.read().memory_usage()
    }

    /// Remove every key.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn shrink_to_fit(&self) {
        self.inner.write().shrink_to_fit();
    }

    /// Hold the shared lock across several reads.
    pub fn read(&self) -> RwLockReadGuard<'_, TrieCore<V>> {
        self.inner.read()
    }

    /// Hold the exclusive lock across several mutations.
    pub fn write(&self) -> RwLockWriteGuard<'_, TrieCore<V>> {
        self.inner.write()
    }

    /// Like [`Trie::read`], but give up after `timeout`.
    pub fn try_read_for(&self, timeout: Duration) -> Result<RwLockReadGuard<'_, TrieCore<V>>> {
        self.inner.try_read_for(timeout).ok_or_else(|| {
            warn!(?timeout, "timed out waiting for shared trie lock");
            TrieError::LockTimeout(timeout)
        })
    }

    /// Like [`Trie::write`], but give up after `timeout`.
    pub fn try_write_for(&self, timeout: Duration) -> Result<RwLockWriteGuard<'_, TrieCore<V>>> {
        self.inner.try_write_for(timeout).ok_or_else(|| {
            warn!(?timeout, "timed out waiting for exclusive trie lock");
            TrieError::LockTimeout(timeout)
        })
    }

    /// Unwrap the engine, consuming the lock.
    pub fn into_inner(self) -> TrieCore<V> {
        self.inner.into_inner()
    }
}

impl Trie<String> {
    /// Insert each word with itself as the value, under one write lock.
    ///
    /// An empty list is a successful no-op.
    pub fn add_word_list<I, S>(&self, words: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.inner.write().add_word_list(words)
    }
}

impl<V> Default for Trie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> From<TrieCore<V>> for Trie<V> {
    fn from(core: TrieCore<V>) -> Self {
        Self {
            inner: RwLock::new(core),
        }
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for Trie<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trie")
            .field("inner", &*self.inner.read())
            .finish()
    }
}



#[cfg(test)]
mod proptests;
