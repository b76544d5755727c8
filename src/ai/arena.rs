//! Guard storage keyed by stable integer ids

use serde::{Deserialize, Serialize};

/// Stable guard identifier. Never reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GuardId(pub u32);

impl GuardId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Slot storage indexed by `GuardId`, iterated in id order
#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Option<T>>,
    len: usize,
}

impl<T> Arena<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            len: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> GuardId {
        let id = GuardId(self.slots.len() as u32);
        self.slots.push(Some(value));
        self.len += 1;
        id
    }

    pub fn remove(&mut self, id: GuardId) -> Option<T> {
        let removed = self.slots.get_mut(id.index())?.take();
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    #[must_use]
    pub fn get(&self, id: GuardId) -> Option<&T> {
        self.slots.get(id.index())?.as_ref()
    }

    pub fn get_mut(&mut self, id: GuardId) -> Option<&mut T> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    #[must_use]
    pub fn contains(&self, id: GuardId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (GuardId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (GuardId(i as u32), v)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (GuardId, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|v| (GuardId(i as u32), v)))
    }

    pub fn ids(&self) -> impl Iterator<Item = GuardId> + '_ {
        self.iter().map(|(id, _)| id)
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}
