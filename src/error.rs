use std::time::Duration;

use thiserror::Error;

/// Failures the trie can report.
///
/// Missing keys, deleting an absent key and empty inputs are not errors;
/// they surface as `None`, `0` or an empty `Vec`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrieError {
    /// Every addressable node slot is in use.
    #[error("node arena exhausted after {0} slots")]
    ArenaExhausted(usize),
    /// A stored byte key could not be decoded back into text.
    #[error("key is not valid UTF-8 at byte {valid_up_to}")]
    InvalidKey { valid_up_to: usize },
    /// A bounded-wait lock acquisition gave up.
    #[error("timed out after {0:?} waiting for the trie lock")]
    LockTimeout(Duration),
}

pub type Result<T, E = TrieError> = std::result::Result<T, E>;
