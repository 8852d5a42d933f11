//! The array part: a dense, zero-based vector of value slots.

use crate::slot::Slot;

/// The dense array part of a [`Table`](crate::Table).
///
/// Holds slots for integer keys `0 .. len()`. Growth and shrinkage are
/// driven entirely by the repartitioner (see [`crate::rehash`]); the array
/// part itself performs no policy decisions.
pub(crate) struct ArrayPart {
    slots: Vec<Slot>,
    value_size: usize,
}

impl ArrayPart {
    #[inline]
    #[must_use]
    pub(crate) fn new(value_size: usize) -> Self {
        Self {
            slots: Vec::new(),
            value_size,
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if `idx` names a live slot, in range or not.
    #[inline]
    #[must_use]
    pub(crate) fn in_range(&self, idx: i64) -> bool {
        idx >= 0 && (idx as usize) < self.slots.len()
    }

    #[inline]
    #[must_use]
    pub(crate) fn get(&self, idx: usize) -> Option<&[u8]> {
        self.slots.get(idx).and_then(Slot::payload)
    }

    #[inline]
    #[must_use]
    pub(crate) fn occupied(&self, idx: usize) -> bool {
        self.slots.get(idx).is_some_and(Slot::is_occupied)
    }

    /// Marks the slot at `idx` occupied and returns its payload for the
    /// caller to write into. Panics if `idx` is out of range; callers must
    /// check [`ArrayPart::in_range`] first.
    #[inline]
    pub(crate) fn set(&mut self, idx: usize) -> &mut [u8] {
        self.slots[idx].occupy()
    }

    #[inline]
    pub(crate) fn delete(&mut self, idx: usize) {
        if let Some(slot) = self.slots.get_mut(idx) {
            slot.vacate();
        }
    }

    /// Resizes the array part to `new_len`, zero-filling any newly added
    /// slots. Shrinking drops the vacating tail entries; callers are
    /// responsible for relocating any occupied slots in that tail into the
    /// hash part *before* calling this (see [`crate::rehash`]).
    pub(crate) fn resize(&mut self, new_len: usize) {
        if new_len < self.slots.len() {
            self.slots.truncate(new_len);
        } else {
            let value_size = self.value_size;
            self.slots.resize_with(new_len, || Slot::empty(value_size));
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &[u8])> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.payload().map(|p| (i, p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_array_is_empty() {
        let array = ArrayPart::new(4);
        assert_eq!(array.len(), 0);
        assert!(!array.in_range(0));
    }

    #[test]
    fn resize_grows_with_zeroed_slots() {
        let mut array = ArrayPart::new(2);
        array.resize(3);
        assert_eq!(array.len(), 3);
        assert!(!array.occupied(0));
        array.set(0).copy_from_slice(&[1, 2]);
        assert_eq!(array.get(0), Some(&[1, 2][..]));
    }

    #[test]
    fn resize_shrink_truncates() {
        let mut array = ArrayPart::new(1);
        array.resize(4);
        array.set(3).copy_from_slice(&[7]);
        array.resize(2);
        assert_eq!(array.len(), 2);
        assert!(!array.in_range(3));
    }

    #[test]
    fn delete_clears_occupancy_but_keeps_slot() {
        let mut array = ArrayPart::new(1);
        array.resize(1);
        array.set(0).copy_from_slice(&[5]);
        array.delete(0);
        assert_eq!(array.get(0), None);
        assert_eq!(array.len(), 1);
    }

    #[test]
    fn iter_only_yields_occupied_slots() {
        let mut array = ArrayPart::new(1);
        array.resize(3);
        array.set(0).copy_from_slice(&[1]);
        array.set(2).copy_from_slice(&[3]);
        let got: Vec<_> = array.iter().map(|(i, v)| (i, v[0])).collect();
        assert_eq!(got, vec![(0, 1), (2, 3)]);
    }
}
