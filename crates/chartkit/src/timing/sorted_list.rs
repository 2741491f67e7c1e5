//! Beat-ordered event storage.

use serde::{Deserialize, Serialize};

use super::Beat;

/// Anything positioned on the beat axis.
pub trait HasBeat {
    fn beat(&self) -> Beat;
}

/// Events kept in ascending beat order, at most one per beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortedList<T> {
    items: Vec<T>,
}

impl<T> Default for SortedList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: HasBeat> SortedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entry at the same beat, otherwise inserts in order.
    pub fn insert_or_update(&mut self, value: T) {
        let beat = value.beat();
        // Appending is the common case for converters walking forward.
        if self.items.last().is_none_or(|last| last.beat() < beat) {
            self.items.push(value);
            return;
        }
        match self.items.binary_search_by(|probe| probe.beat().cmp(&beat)) {
            Ok(index) => self.items[index] = value,
            Err(index) => self.items.insert(index, value),
        }
    }

    /// Entry with the greatest beat not after `beat`, i.e. the value in effect there.
    pub fn try_find_last_at_beat(&self, beat: Beat) -> Option<&T> {
        let index = self.items.partition_point(|item| item.beat() <= beat);
        index.checked_sub(1).map(|i| &self.items[i])
    }

    pub fn try_find_last_at_beat_mut(&mut self, beat: Beat) -> Option<&mut T> {
        let index = self.items.partition_point(|item| item.beat() <= beat);
        index.checked_sub(1).map(move |i| &mut self.items[i])
    }

    pub fn try_find_exact(&self, beat: Beat) -> Option<&T> {
        self.items
            .binary_search_by(|probe| probe.beat().cmp(&beat))
            .ok()
            .map(|i| &self.items[i])
    }

    pub fn remove_at_beat(&mut self, beat: Beat) -> Option<T> {
        self.items
            .binary_search_by(|probe| probe.beat().cmp(&beat))
            .ok()
            .map(|i| self.items.remove(i))
    }
}

impl<T> SortedList<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.items.last_mut()
    }

    /// Mutable access to every entry. Callers must not move entries across beats.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: HasBeat> FromIterator<T> for SortedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        for item in iter {
            list.insert_or_update(item);
        }
        list
    }
}

impl<T: HasBeat> From<Vec<T>> for SortedList<T> {
    fn from(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

impl<'a, T> IntoIterator for &'a SortedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> std::ops::Index<usize> for SortedList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

/// Monotonic lookup over a sorted slice for callers visiting beats in order.
///
/// Each call only moves forward from where the previous call stopped, so a
/// full pass over `n` queries and `m` entries costs `O(n + m)`.
#[derive(Debug, Default, Clone)]
pub struct SortedCursor {
    next: usize,
}

impl SortedCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry in effect at `beat`, assuming `beat` never decreases between calls.
    pub fn next<'a, T: HasBeat>(&mut self, items: &'a [T], beat: Beat) -> Option<&'a T> {
        while self.next < items.len() && items[self.next].beat() <= beat {
            self.next += 1;
        }
        self.next.checked_sub(1).map(|i| &items[i])
    }
}
