//! Index-addressed node storage.
//!
//! Nodes refer to each other through [`NodeId`]s instead of pointers. A
//! freed slot goes on a free-list and its generation is bumped, so an id
//! handed out before the free no longer resolves once the slot is reused.
//!
//! The arena is not synchronized on its own; it is only reached through
//! the trie's lock.

use std::ops::{Index, IndexMut};

use tracing::error;

use crate::error::{Result, TrieError};

/// Hard upper bound on the number of slots: indices are 32-bit.
pub const MAX_SLOTS: usize = u32::MAX as usize;

/// Stable handle to a slot in a [`NodeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Slot index of this handle.
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Clone)]
struct Slot<T> {
    generation: u32,
    item: Option<T>,
}

/// Slot arena with a free-list and per-slot generations.
#[derive(Clone)]
pub struct NodeArena<T> {
    slots: Vec<Slot<T>>,
    /// Indices of vacated slots, reused LIFO.
    free: Vec<u32>,
    live: usize,
    max_slots: usize,
    reuse_freed: bool,
}

impl<T> NodeArena<T> {
    /// Create an empty arena with room for `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            live: 0,
            max_slots: MAX_SLOTS,
            reuse_freed: true,
        }
    }

    /// Cap the number of slots this arena may ever hold (at least one).
    pub fn with_max_slots(mut self, max_slots: usize) -> Self {
        self.max_slots = max_slots.clamp(1, MAX_SLOTS);
        self
    }

    /// Toggle free-list reuse. When off, freed slots are abandoned.
    pub fn with_reuse(mut self, reuse_freed: bool) -> Self {
        self.reuse_freed = reuse_freed;
        self
    }

    /// Store `item` and return its handle.
    pub fn allocate(&mut self, item: T) -> Result<NodeId> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.item.is_none());
            slot.item = Some(item);
            self.live += 1;
            return Ok(NodeId {
                index,
                generation: slot.generation,
            });
        }

        if self.slots.len() >= self.max_slots {
            error!(slots = self.slots.len(), "node arena exhausted");
            return Err(TrieError::ArenaExhausted(self.slots.len()));
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            item: Some(item),
        });
        self.live += 1;
        Ok(NodeId {
            index,
            generation: 0,
        })
    }

    /// Place `item` in the first slot of an empty arena.
    ///
    /// The first slot is always available, so this cannot fail.
    pub fn init_root(&mut self, item: T) -> NodeId {
        debug_assert!(self.slots.is_empty());
        self.slots.clear();
        self.free.clear();
        self.slots.push(Slot {
            generation: 0,
            item: Some(item),
        });
        self.live = 1;
        NodeId {
            index: 0,
            generation: 0,
        }
    }

    /// How many more items can be allocated before hitting the slot cap.
    #[inline]
    pub fn available(&self) -> usize {
        self.free.len() + self.max_slots.saturating_sub(self.slots.len())
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.item.as_ref())
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.item.as_mut())
    }

    /// Check whether `id` still refers to a live slot.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Vacate a slot and return what it held.
    ///
    /// Returns `None` for stale handles. The slot's generation is bumped
    /// either way it is vacated, so `id` stops resolving immediately.
    pub fn free(&mut self, id: NodeId) -> Option<T> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        let item = slot.item.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.live -= 1;
        if self.reuse_freed {
            self.free.push(id.index);
        }
        Some(item)
    }

    /// Number of occupied slots.
    #[inline]
    pub fn live(&self) -> usize {
        self.live
    }

    /// Number of vacated slots waiting for reuse.
    #[inline]
    pub fn free_slots(&self) -> usize {
        self.free.len()
    }

    /// Total slots ever created, occupied or not.
    #[inline]
    pub fn slots(&self) -> usize {
        self.slots.len()
    }

    /// Bytes reserved by the slot table and free-list, excluding anything
    /// the stored items own on the heap.
    pub fn capacity_bytes(&self) -> usize {
        self.slots.capacity() * std::mem::size_of::<Slot<T>>()
            + self.free.capacity() * std::mem::size_of::<u32>()
    }

    /// Release spare capacity. Vacated slots are kept so their
    /// generations keep stale handles from resolving.
    pub fn shrink_to_fit(&mut self) {
        self.slots.shrink_to_fit();
        self.free.shrink_to_fit();
    }

    /// Drop every slot and reset generations. Handles issued before the
    /// clear must not be used afterwards.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }

    /// Iterate over live `(id, item)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.item.as_ref().map(|item| {
                (
                    NodeId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    item,
                )
            })
        })
    }
}

impl<T> Index<NodeId> for NodeArena<T> {
    type Output = T;

    #[inline]
    fn index(&self, id: NodeId) -> &T {
        match self.get(id) {
            Some(item) => item,
            None => panic!("stale or foreign NodeId {id:?}"),
        }
    }
}

impl<T> IndexMut<NodeId> for NodeArena<T> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        match self.get_mut(id) {
            Some(item) => item,
            None => panic!("stale or foreign NodeId {id:?}"),
        }
    }
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}
