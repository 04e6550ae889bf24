// SPDX-License-Identifier: MPL-2.0

//! A fixed-capacity table whose slots are addressed by stable indices.

/// A fixed-capacity arena indexed by `usize`.
///
/// Unlike a `Vec`, an item never moves to another index once it is put into a slot, so the index
/// can be handed out as an identifier (e.g., a pty number). The backing storage grows lazily up to
/// the capacity, so an empty table with a large capacity costs nothing.
#[derive(Debug)]
pub struct SlotTable<T> {
    slots: Vec<Option<T>>,
    capacity: usize,
}

impl<T> SlotTable<T> {
    /// Creates an empty table that can hold items at indices `0..capacity`.
    pub const fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the item at `idx`, if any.
    pub fn get(&self, idx: usize) -> Option<&T> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    /// Puts `item` at `idx` and returns the item previously stored there.
    ///
    /// # Panics
    ///
    /// This method panics if `idx` is not less than the capacity.
    pub fn put(&mut self, idx: usize, item: T) -> Option<T> {
        assert!(idx < self.capacity, "the slot index is out of range");
        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, || None);
        }
        self.slots[idx].replace(item)
    }

    /// Returns the first index in `from..capacity` whose slot satisfies `is_free`.
    ///
    /// Slots that have never been written are always free.
    pub fn find_free_from<F>(&self, from: usize, mut is_free: F) -> Option<usize>
    where
        F: FnMut(&T) -> bool,
    {
        (from..self.capacity).find(|&idx| self.get(idx).is_none_or(&mut is_free))
    }

    /// Returns the first index in `from..capacity` holding an item that satisfies `is_used`.
    pub fn find_used_from<F>(&self, from: usize, mut is_used: F) -> Option<usize>
    where
        F: FnMut(&T) -> bool,
    {
        let end = self.slots.len().min(self.capacity);
        (from..end).find(|&idx| self.get(idx).is_some_and(&mut is_used))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn put_and_get() {
        let mut table = SlotTable::new(8);
        assert_eq!(table.capacity(), 8);
        assert!(table.get(3).is_none());

        assert_eq!(table.put(3, "three"), None);
        assert_eq!(table.get(3), Some(&"three"));
        assert_eq!(table.put(3, "drei"), Some("three"));
        assert!(table.get(100).is_none());
    }

    #[test]
    #[should_panic]
    fn put_out_of_range() {
        let mut table = SlotTable::new(2);
        table.put(2, ());
    }

    #[test]
    fn find_free_skips_used_slots() {
        let mut table = SlotTable::new(4);
        table.put(0, true);
        table.put(1, false);
        table.put(2, true);

        // A slot is free if it is empty or if the predicate says so.
        assert_eq!(table.find_free_from(0, |live| !*live), Some(1));
        assert_eq!(table.find_free_from(2, |live| !*live), Some(3));

        table.put(1, true);
        table.put(3, true);
        assert_eq!(table.find_free_from(0, |live| !*live), None);
    }

    #[test]
    fn find_used_walks_forward() {
        let mut table = SlotTable::new(16);
        table.put(2, 'a');
        table.put(7, 'b');
        table.put(9, 'c');

        assert_eq!(table.find_used_from(0, |_| true), Some(2));
        assert_eq!(table.find_used_from(3, |_| true), Some(7));
        assert_eq!(table.find_used_from(8, |ch| *ch != 'c'), None);
        assert_eq!(table.find_used_from(10, |_| true), None);
    }
}
