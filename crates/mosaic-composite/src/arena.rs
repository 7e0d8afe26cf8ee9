//! Append-only node storage addressed by generational handles.
//!
//! Handles stay valid while the arena grows. [`Arena::clear`] starts a new
//! generation, so handles from before the clear resolve to nothing instead of
//! silently aliasing new nodes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable reference to a node of a composite network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    /// Position of the node in insertion order.
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Growable storage that never removes or reorders its items.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    items: Vec<T>,
    generation: u32,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            generation: 0,
        }
    }

    pub fn push(&mut self, item: T) -> Handle {
        let handle = self.next_handle(0);
        self.items.push(item);
        handle
    }

    /// Handle the `offset`-th item pushed from now on will receive.
    pub(crate) fn next_handle(&self, offset: usize) -> Handle {
        Handle {
            index: (self.items.len() + offset) as u32,
            generation: self.generation,
        }
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.position(handle).map(|i| &self.items[i])
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.position(handle).map(move |i| &mut self.items[i])
    }

    /// Backing position of a live handle.
    pub fn position(&self, handle: Handle) -> Option<usize> {
        let index = handle.index();
        (handle.generation == self.generation && index < self.items.len()).then_some(index)
    }

    /// Live handle of the item at a backing position.
    pub fn handle_at(&self, position: usize) -> Option<Handle> {
        (position < self.items.len()).then(|| Handle {
            index: position as u32,
            generation: self.generation,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        (0..self.items.len()).map(move |i| Handle {
            index: i as u32,
            generation: self.generation,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.handles().zip(self.items.iter())
    }

    /// Drop every item and invalidate all outstanding handles.
    pub fn clear(&mut self) {
        self.items.clear();
        self.generation = self.generation.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_survive_growth() {
        let mut arena = Arena::new();
        let first = arena.push("a");
        for i in 0..100 {
            arena.push(if i % 2 == 0 { "b" } else { "c" });
        }
        assert_eq!(arena.get(first), Some(&"a"));
        assert_eq!(arena.position(first), Some(0));
        assert_eq!(arena.len(), 101);
    }

    #[test]
    fn next_handle_predicts_push() {
        let mut arena = Arena::new();
        arena.push(1);
        let predicted = [arena.next_handle(0), arena.next_handle(1)];
        assert_eq!(arena.push(2), predicted[0]);
        assert_eq!(arena.push(3), predicted[1]);
    }

    #[test]
    fn clear_invalidates_handles() {
        let mut arena = Arena::new();
        let old = arena.push(1);
        arena.clear();
        assert!(arena.is_empty());
        let new = arena.push(2);
        assert_eq!(old.index(), new.index());
        assert_eq!(arena.get(old), None);
        assert_eq!(arena.get(new), Some(&2));
    }

    #[test]
    fn handle_at_and_iter_agree() {
        let mut arena = Arena::new();
        let handles: Vec<_> = (0..5).map(|i| arena.push(i * 10)).collect();
        for (pos, handle) in handles.iter().enumerate() {
            assert_eq!(arena.handle_at(pos), Some(*handle));
        }
        assert_eq!(arena.handle_at(5), None);
        let collected: Vec<_> = arena.iter().map(|(h, v)| (h, *v)).collect();
        assert_eq!(collected[3], (handles[3], 30));
        if let Some(v) = arena.get_mut(handles[1]) {
            *v = 11;
        }
        assert_eq!(arena.get(handles[1]), Some(&11));
    }
}
