use crate::arena::NodeId;
use crate::codec::KeyBuf;

use super::TrieCore;

/// Depth-first, ascending-order iterator over `(key, value)` pairs.
///
/// A node's own key is yielded before any key below it and children are
/// visited in ascending byte order, which is exactly lexicographic order.
pub struct Iter<'a, V> {
    trie: &'a TrieCore<V>,
    /// Pending nodes with the key length at that node and the edge byte
    /// leading into it.
    stack: Vec<(NodeId, usize, u8)>,
    key: KeyBuf,
    base: usize,
}

impl<'a, V> Iter<'a, V> {
    pub(super) fn new(trie: &'a TrieCore<V>, prefix: &[u8], start: Option<NodeId>) -> Self {
        let mut stack = Vec::new();
        if let Some(id) = start {
            stack.push((id, prefix.len(), 0));
        }
        Self {
            trie,
            stack,
            key: KeyBuf::from_slice(prefix),
            base: prefix.len(),
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (Vec<u8>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let trie = self.trie;
        while let Some((id, depth, byte)) = self.stack.pop() {
            if depth > self.base {
                self.key.truncate(depth - 1);
                self.key.push(byte);
            }

            let node = trie.node(id);
            self.stack.extend(
                node.children
                    .iter()
                    .rev()
                    .map(|(edge, child)| (child, depth + 1, edge)),
            );

            if let Some(value) = node.value() {
                return Some((self.key.to_vec(), value));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::trie::TrieCore;

    #[test]
    fn test_lexicographic_order() {
        let mut t: TrieCore<u8> = TrieCore::new();
        for (i, key) in ["b", "a", "ab", "", "abc", "ba", "aa"].iter().enumerate() {
            t.insert(key.as_bytes(), i as u8).unwrap();
        }
        let keys: Vec<String> = t
            .iter()
            .map(|(k, _)| String::from_utf8(k).unwrap())
            .collect();
        assert_eq!(keys, ["", "a", "aa", "ab", "abc", "b", "ba"]);
    }

    #[test]
    fn test_prefix_iter() {
        let mut t: TrieCore<u8> = TrieCore::new();
        t.insert(b"apple", 1).unwrap();
        t.insert(b"apply", 2).unwrap();
        t.insert(b"banana", 3).unwrap();

        let got: Vec<(Vec<u8>, u8)> = t.iter_prefix(b"app").map(|(k, v)| (k, *v)).collect();
        assert_eq!(got, vec![(b"apple".to_vec(), 1), (b"apply".to_vec(), 2)]);
        assert_eq!(t.iter_prefix(b"cherry").count(), 0);
        assert_eq!(t.iter_prefix(b"banana").count(), 1);
    }

    #[test]
    fn test_long_keys_spill_buffer() {
        let mut t: TrieCore<usize> = TrieCore::new();
        let long = "x".repeat(200);
        t.insert(long.as_bytes(), 1).unwrap();
        t.insert(format!("{long}y").as_bytes(), 2).unwrap();

        let keys: Vec<Vec<u8>> = (&t).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys[0].len(), 200);
        assert_eq!(keys[1].len(), 201);
    }
}
