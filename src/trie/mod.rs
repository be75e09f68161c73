//! Single-threaded prefix tree over byte keys.
//!
//! Every key is the path of edge bytes from the root to the node holding
//! its value, so keys that share a prefix share the nodes along it. Nodes
//! live in a [`NodeArena`] and refer to their children by [`NodeId`].
//!
//! Deleting a key prunes every node on its path that is left with neither
//! a value nor children. As a result a path exists exactly when some
//! stored key starts with it, which is what makes [`TrieCore::prefix_search`]
//! a plain walk.

mod debug;
mod iter;

use smallvec::{smallvec, SmallVec};
use tracing::{error, trace};

pub use iter::Iter;

use crate::arena::{NodeArena, NodeId};
use crate::error::{Result, TrieError};
use crate::node::Node;
use crate::{Config, TrieStats};

/// Root-to-node path: `path[i]` is the node reached after `i` key bytes.
pub(crate) type NodePath = SmallVec<[NodeId; 32]>;

/// The unsynchronized trie. Wrap it in a [`crate::Trie`] to share it
/// between threads.
#[derive(Clone)]
pub struct TrieCore<V> {
    nodes: NodeArena<Node<V>>,
    root: NodeId,
    count: usize,
    config: Config,
}

impl<V> TrieCore<V> {
    /// Create an empty trie with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an empty trie with the given configuration.
    pub fn with_config(config: Config) -> Self {
        let config = config.normalized();
        let mut nodes = NodeArena::with_capacity(config.initial_capacity)
            .with_max_slots(config.max_nodes)
            .with_reuse(config.reuse_freed_slots);
        let root = nodes.init_root(Node::new());
        Self {
            nodes,
            root,
            count: 0,
            config,
        }
    }

    /// Number of keys stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of live nodes, root included.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.live()
    }

    #[inline]
    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<V> {
        &self.nodes[id]
    }

    /// Walk `path` from the root, returning the node it ends at.
    fn find(&self, path: &[u8]) -> Option<NodeId> {
        let mut current = self.root;
        for &byte in path {
            current = self.nodes[current].child(byte)?;
        }
        Some(current)
    }

    /// Store `value` under `key`, returning the value it replaced.
    ///
    /// Missing edges are created on the way down. The empty key stores
    /// its value at the root. Fails only when the arena cannot hold the
    /// new nodes, in which case nothing is modified.
    pub fn insert(&mut self, key: &[u8], value: V) -> Result<Option<V>> {
        let mut path: NodePath = smallvec![self.root];
        self.insert_along(&mut path, key, value)
    }

    /// Insert `key` resuming from an already walked path.
    ///
    /// `path` must hold the nodes for `key[..path.len() - 1]`. On return it
    /// holds the full path for `key`, which lets a batch of sorted keys
    /// skip re-walking their shared prefixes.
    pub(crate) fn insert_along(
        &mut self,
        path: &mut NodePath,
        key: &[u8],
        value: V,
    ) -> Result<Option<V>> {
        debug_assert!(!path.is_empty() && path.len() <= key.len() + 1);
        debug_assert_eq!(path[0], self.root);

        let mut depth = path.len() - 1;
        let mut current = path[depth];
        while depth < key.len() {
            match self.nodes[current].child(key[depth]) {
                Some(child) => {
                    current = child;
                    path.push(child);
                    depth += 1;
                }
                None => break,
            }
        }

        let tail = &key[depth..];
        if !tail.is_empty() {
            if self.nodes.available() < tail.len() {
                error!(
                    needed = tail.len(),
                    available = self.nodes.available(),
                    "not enough node slots for insert"
                );
                return Err(TrieError::ArenaExhausted(self.nodes.slots()));
            }
            let threshold = self.config.dense_threshold;
            for &byte in tail {
                let child = self.nodes.allocate(Node::new())?;
                self.nodes[current].set_child(byte, child, threshold);
                path.push(child);
                current = child;
            }
        }

        let old = self.nodes[current].value.replace(value);
        if old.is_none() {
            self.count += 1;
        }
        Ok(old)
    }

    pub fn get(&self, key: &[u8]) -> Option<&V> {
        self.find(key).and_then(|id| self.nodes[id].value())
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        let id = self.find(key)?;
        self.nodes[id].value.as_mut()
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// Remove `key`, returning its value. Removing an absent key is a
    /// no-op that returns `None`.
    ///
    /// Nodes on the key's path that end up with no value and no children
    /// are freed, bottom-up, stopping at the first node still in use or
    /// at the root.
    pub fn remove(&mut self, key: &[u8]) -> Option<V> {
        let mut path: NodePath = SmallVec::with_capacity(key.len() + 1);
        let mut current = self.root;
        path.push(current);
        for &byte in key {
            current = self.nodes[current].child(byte)?;
            path.push(current);
        }

        let old = self.nodes[current].value.take()?;
        self.count -= 1;

        let threshold = self.config.dense_threshold;
        let mut freed = 0usize;
        for depth in (0..key.len()).rev() {
            let node = path[depth + 1];
            if !self.nodes[node].is_vacant() {
                break;
            }
            let parent = path[depth];
            let detached = self.nodes[parent].remove_child(key[depth], threshold);
            debug_assert_eq!(detached, Some(node));
            self.nodes.free(node);
            freed += 1;
        }
        if freed > 0 {
            trace!(freed, depth = key.len(), "pruned vacant nodes");
        }

        Some(old)
    }

    /// Whether any stored key starts with `prefix`.
    ///
    /// The empty prefix always matches: the root is always present.
    pub fn prefix_search(&self, prefix: &[u8]) -> bool {
        self.find(prefix).is_some()
    }

    /// Up to `max_results` stored keys starting with `prefix`, in
    /// ascending byte order.
    ///
    /// An unknown prefix or a zero limit yields an empty list.
    pub fn enumerate(&self, prefix: &[u8], max_results: usize) -> Vec<Vec<u8>> {
        if max_results == 0 {
            return Vec::new();
        }
        self.iter_prefix(prefix)
            .take(max_results)
            .map(|(key, _)| key)
            .collect()
    }

    /// Number of stored keys starting with `prefix`.
    ///
    /// Counts value-bearing nodes below the prefix without rebuilding any
    /// keys.
    pub fn count_prefix(&self, prefix: &[u8]) -> usize {
        let Some(start) = self.find(prefix) else {
            return 0;
        };
        if start == self.root {
            return self.count;
        }

        let mut count = 0;
        let mut stack: Vec<NodeId> = vec![start];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.has_value() {
                count += 1;
            }
            stack.extend(node.children.iter().map(|(_, child)| child));
        }
        count
    }

    /// All entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(self, &[], Some(self.root))
    }

    /// Entries whose key starts with `prefix`, in ascending key order.
    pub fn iter_prefix(&self, prefix: &[u8]) -> Iter<'_, V> {
        Iter::new(self, prefix, self.find(prefix))
    }

    /// Remove every entry, keeping only a fresh root.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.init_root(Node::new());
        self.count = 0;
    }

    pub fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
    }

    /// Approximate bytes held by the node structure.
    ///
    /// Counts the arena's slot table and spilled child maps; heap memory
    /// owned by the values themselves is not included.
    pub fn memory_usage(&self) -> usize {
        self.nodes.capacity_bytes()
            + self
                .nodes
                .iter()
                .map(|(_, node)| node.heap_bytes())
                .sum::<usize>()
    }

    pub fn stats(&self) -> TrieStats {
        let mut stats = TrieStats {
            entries: self.count,
            live_nodes: self.nodes.live(),
            free_slots: self.nodes.free_slots(),
            memory_bytes: self.memory_usage(),
            ..TrieStats::default()
        };
        for (_, node) in self.nodes.iter() {
            if node.children.is_dense() {
                stats.dense_nodes += 1;
            } else {
                stats.sparse_nodes += 1;
            }
        }
        stats.bytes_per_key = if stats.entries > 0 {
            stats.memory_bytes as f64 / stats.entries as f64
        } else {
            0.0
        };
        stats
    }
}

impl<V> Default for TrieCore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for TrieCore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, V> IntoIterator for &'a TrieCore<V> {
    type Item = (Vec<u8>, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
