//! Trie nodes with adaptive child maps.
//!
//! Most nodes have one or two children, so children start out in a small
//! sorted vector searched by binary search. Once fan-out passes the dense
//! threshold the node switches to a 256-entry table indexed by byte, and
//! it falls back to the sorted form when fan-out drops below half of it.
//! Both forms iterate in ascending byte order.

use smallvec::SmallVec;

use crate::arena::NodeId;

/// Smallest accepted dense threshold.
pub const MIN_DENSE_THRESHOLD: usize = 4;
/// Largest accepted dense threshold; at 256 a node never goes dense.
pub const MAX_DENSE_THRESHOLD: usize = 256;

type SparseChildren = SmallVec<[(u8, NodeId); 4]>;

#[derive(Clone, Debug)]
pub(crate) enum Children {
    /// Sorted by edge byte, no duplicates.
    Sparse(SparseChildren),
    /// Indexed by edge byte.
    Dense {
        table: Box<[Option<NodeId>; 256]>,
        len: u16,
    },
}

impl Children {
    fn new() -> Self {
        Children::Sparse(SmallVec::new())
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        match self {
            Children::Sparse(entries) => entries.len(),
            Children::Dense { len, .. } => *len as usize,
        }
    }

    #[inline]
    pub(crate) fn is_dense(&self) -> bool {
        matches!(self, Children::Dense { .. })
    }

    #[inline]
    fn get(&self, byte: u8) -> Option<NodeId> {
        match self {
            Children::Sparse(entries) => entries
                .binary_search_by_key(&byte, |&(b, _)| b)
                .ok()
                .map(|i| entries[i].1),
            Children::Dense { table, .. } => table[byte as usize],
        }
    }

    fn insert(&mut self, byte: u8, child: NodeId, dense_threshold: usize) -> Option<NodeId> {
        let old = match self {
            Children::Sparse(entries) => {
                match entries.binary_search_by_key(&byte, |&(b, _)| b) {
                    Ok(i) => Some(std::mem::replace(&mut entries[i].1, child)),
                    Err(i) => {
                        entries.insert(i, (byte, child));
                        None
                    }
                }
            }
            Children::Dense { table, len } => {
                let old = table[byte as usize].replace(child);
                if old.is_none() {
                    *len += 1;
                }
                old
            }
        };
        if !self.is_dense() && self.len() > dense_threshold {
            self.grow();
        }
        old
    }

    fn remove(&mut self, byte: u8, dense_threshold: usize) -> Option<NodeId> {
        let old = match self {
            Children::Sparse(entries) => entries
                .binary_search_by_key(&byte, |&(b, _)| b)
                .ok()
                .map(|i| entries.remove(i).1),
            Children::Dense { table, len } => {
                let old = table[byte as usize].take();
                if old.is_some() {
                    *len -= 1;
                }
                old
            }
        };
        if self.is_dense() && self.len() < dense_threshold / 2 {
            self.shrink();
        }
        old
    }

    fn grow(&mut self) {
        let Children::Sparse(entries) = self else {
            return;
        };
        let mut table = Box::new([None; 256]);
        for &(byte, child) in entries.iter() {
            table[byte as usize] = Some(child);
        }
        let len = entries.len() as u16;
        *self = Children::Dense { table, len };
    }

    fn shrink(&mut self) {
        let Children::Dense { table, .. } = self else {
            return;
        };
        let entries: SparseChildren = table
            .iter()
            .enumerate()
            .filter_map(|(byte, child)| child.map(|c| (byte as u8, c)))
            .collect();
        *self = Children::Sparse(entries);
    }

    pub(crate) fn iter(&self) -> ChildIter<'_> {
        match self {
            Children::Sparse(entries) => ChildIter::Sparse(entries.iter()),
            Children::Dense { table, len } => ChildIter::Dense {
                table,
                front: 0,
                back: 256,
                remaining: *len as usize,
            },
        }
    }

    fn heap_bytes(&self) -> usize {
        match self {
            Children::Sparse(entries) if entries.spilled() => {
                entries.capacity() * std::mem::size_of::<(u8, NodeId)>()
            }
            Children::Sparse(_) => 0,
            Children::Dense { .. } => std::mem::size_of::<[Option<NodeId>; 256]>(),
        }
    }
}

/// Ascending `(edge byte, child)` iterator over a node's children.
pub(crate) enum ChildIter<'a> {
    Sparse(std::slice::Iter<'a, (u8, NodeId)>),
    Dense {
        table: &'a [Option<NodeId>; 256],
        front: usize,
        back: usize,
        remaining: usize,
    },
}

impl Iterator for ChildIter<'_> {
    type Item = (u8, NodeId);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            ChildIter::Sparse(it) => it.next().copied(),
            ChildIter::Dense {
                table,
                front,
                back,
                remaining,
            } => {
                while *front < *back {
                    let byte = *front;
                    *front += 1;
                    if let Some(child) = table[byte] {
                        *remaining -= 1;
                        return Some((byte as u8, child));
                    }
                }
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            ChildIter::Sparse(it) => it.size_hint(),
            ChildIter::Dense { remaining, .. } => (*remaining, Some(*remaining)),
        }
    }
}

impl DoubleEndedIterator for ChildIter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        match self {
            ChildIter::Sparse(it) => it.next_back().copied(),
            ChildIter::Dense {
                table,
                front,
                back,
                remaining,
            } => {
                while *back > *front {
                    *back -= 1;
                    if let Some(child) = table[*back] {
                        *remaining -= 1;
                        return Some((*back as u8, child));
                    }
                }
                None
            }
        }
    }
}

impl ExactSizeIterator for ChildIter<'_> {}

/// One position in the trie: the edges leaving it and, if a key ends
/// here, that key's value.
#[derive(Clone, Debug)]
pub struct Node<V> {
    pub(crate) children: Children,
    pub(crate) value: Option<V>,
}

impl<V> Node<V> {
    pub fn new() -> Self {
        Self {
            children: Children::new(),
            value: None,
        }
    }

    #[inline]
    pub fn child(&self, byte: u8) -> Option<NodeId> {
        self.children.get(byte)
    }

    /// Attach `child` under `byte`, replacing and returning any previous
    /// child on that edge.
    #[inline]
    pub fn set_child(&mut self, byte: u8, child: NodeId, dense_threshold: usize) -> Option<NodeId> {
        self.children.insert(byte, child, dense_threshold)
    }

    #[inline]
    pub fn remove_child(&mut self, byte: u8, dense_threshold: usize) -> Option<NodeId> {
        self.children.remove(byte, dense_threshold)
    }

    #[inline]
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    #[inline]
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// A node that holds nothing and leads nowhere.
    #[inline]
    pub fn is_vacant(&self) -> bool {
        self.value.is_none() && self.children.len() == 0
    }

    /// Heap bytes owned by the child map (values are not counted).
    pub(crate) fn heap_bytes(&self) -> usize {
        self.children.heap_bytes()
    }
}

impl<V> Default for Node<V> {
    fn default() -> Self {
        Self::new()
    }
}
