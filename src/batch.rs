//! Bulk loading.
//!
//! A batch is applied under a single write-lock acquisition. Consecutive
//! keys that share a prefix also share the walk down to it: the loader
//! keeps the previous key's node path and resumes from the longest common
//! prefix, so sorted input is loaded without re-walking shared prefixes.

use smallvec::smallvec;
use tracing::debug;

use crate::codec::{common_prefix_len, KeyBuf};
use crate::error::Result;
use crate::trie::{NodePath, TrieCore};

/// Key/value pairs collected ahead of a bulk insert.
#[derive(Clone, Debug)]
pub struct Batch<V> {
    entries: Vec<(Vec<u8>, V)>,
}

impl<V> Batch<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, key: impl AsRef<[u8]>, value: V) -> &mut Self {
        self.entries.push((key.as_ref().to_vec(), value));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Order entries by key so shared prefixes are walked once.
    ///
    /// The sort is stable: for duplicate keys the last pushed value still
    /// wins.
    pub fn sort(&mut self) -> &mut Self {
        self.entries.sort_by(|a, b| a.0.cmp(&b.0));
        self
    }

    pub fn into_entries(self) -> Vec<(Vec<u8>, V)> {
        self.entries
    }
}

impl Batch<String> {
    /// Add a word stored under itself.
    pub fn push_word(&mut self, word: impl Into<String>) -> &mut Self {
        let word = word.into();
        self.entries.push((word.as_bytes().to_vec(), word));
        self
    }
}

impl<V> Default for Batch<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: AsRef<[u8]>, V> FromIterator<(K, V)> for Batch<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut batch = Batch::new();
        batch.extend(iter);
        batch
    }
}

impl<K: AsRef<[u8]>, V> Extend<(K, V)> for Batch<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.push(key, value);
        }
    }
}

impl<V> IntoIterator for Batch<V> {
    type Item = (Vec<u8>, V);
    type IntoIter = std::vec::IntoIter<(Vec<u8>, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<V> TrieCore<V> {
    /// Insert every entry, returning how many keys were new.
    ///
    /// Stops at the first failure; entries before it stay inserted.
    pub fn insert_all<I, K>(&mut self, entries: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<[u8]>,
    {
        let mut path: NodePath = smallvec![self.root()];
        let mut prev = KeyBuf::new();
        let mut added = 0usize;
        let mut total = 0usize;

        for (key, value) in entries {
            let key = key.as_ref();
            let shared = common_prefix_len(&prev, key).min(path.len() - 1);
            path.truncate(shared + 1);
            if self.insert_along(&mut path, key, value)?.is_none() {
                added += 1;
            }
            prev.clear();
            prev.extend_from_slice(key);
            total += 1;
        }

        debug!(total, added, "applied batch");
        Ok(added)
    }

    /// Insert each word with `value_of(word)` as its value.
    pub fn add_word_list_with<I, S, F>(&mut self, words: I, mut value_of: F) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnMut(&str) -> V,
    {
        self.insert_all(words.into_iter().map(|word| {
            let value = value_of(word.as_ref());
            (WordKey(word), value)
        }))
    }
}

impl TrieCore<String> {
    /// Insert each word with itself as the value.
    pub fn add_word_list<I, S>(&mut self, words: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_word_list_with(words, |word| word.to_owned())
    }
}

/// Views a word as its byte key.
struct WordKey<S>(S);

impl<S: AsRef<str>> AsRef<[u8]> for WordKey<S> {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref().as_bytes()
    }
}
