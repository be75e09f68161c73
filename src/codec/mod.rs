//! Byte-key codec.
//!
//! The trie is byte-oriented: every edge is one byte of the key's UTF-8
//! encoding, so a multi-byte character simply occupies several edges.
//! Text keys go in through [`encode`] and come back out through [`decode`];
//! raw byte keys bypass the codec entirely and are stored unchanged.

use smallvec::SmallVec;

use crate::error::{Result, TrieError};

/// Inline capacity of [`KeyBuf`]. Keys up to this length are rebuilt
/// without touching the heap.
pub const INLINE_KEY_LEN: usize = 64;

/// Scratch buffer holding the path from the root while walking a subtree.
pub type KeyBuf = SmallVec<[u8; INLINE_KEY_LEN]>;

/// Borrow the byte sequence of a text key.
#[inline]
pub fn encode(key: &str) -> &[u8] {
    key.as_bytes()
}

/// Turn a stored byte key back into text.
///
/// Lossless for every key that entered through [`encode`]. Byte keys that
/// are not UTF-8 are rejected rather than mangled.
pub fn decode(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| TrieError::InvalidKey {
        valid_up_to: e.utf8_error().valid_up_to(),
    })
}

/// Decode a batch of keys, failing on the first non-text key.
pub fn decode_all(keys: Vec<Vec<u8>>) -> Result<Vec<String>> {
    keys.into_iter().map(decode).collect()
}

/// Compute the shared prefix length between two byte slices.
pub fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}
