//! Fixed-size inline value storage.
//!
//! Both the array part and the hash part store values as [`Slot`]s: a byte
//! region of a table-wide fixed width `V` plus an occupancy flag. Callers
//! never own this storage directly; they receive a borrow into it that is
//! valid until the next invalidating mutation (see the crate-level docs).

/// A single fixed-width value slot plus its occupancy flag.
///
/// The C original appends value bytes past the end of a `struct
/// ltable_value` using a variable-length trailing array sized at runtime.
/// Rust has no equivalent of a runtime-sized trailing array behind a
/// pointer-stable handle, so each `Slot` instead owns a heap-allocated
/// `Box<[u8]>` of length `V`, and the array/hash parts are plain `Vec<Slot>`
/// rather than a single flat buffer of `struct { value; bytes[V] }`. `V`
/// itself is a runtime parameter (chosen at [`Table::new`](crate::Table::new)
/// time), never encoded in the type system.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    bytes: Box<[u8]>,
    occupied: bool,
}

impl Slot {
    /// Creates a new, unoccupied slot of the given width, zero-filled.
    #[inline]
    #[must_use]
    pub(crate) fn empty(value_size: usize) -> Self {
        Self {
            bytes: vec![0_u8; value_size].into_boxed_slice(),
            occupied: false,
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn is_occupied(&self) -> bool {
        self.occupied
    }

    /// Marks the slot occupied and returns a mutable view of its payload for
    /// the caller to write into.
    #[inline]
    pub(crate) fn occupy(&mut self) -> &mut [u8] {
        self.occupied = true;
        &mut self.bytes
    }

    /// Clears the occupancy flag. The payload bytes are left as-is (they are
    /// overwritten on the next `occupy`), matching the C original's
    /// `setted = false` semantics: presence is solely determined by the flag.
    #[inline]
    pub(crate) fn vacate(&mut self) {
        self.occupied = false;
    }

    #[inline]
    #[must_use]
    pub(crate) fn payload(&self) -> Option<&[u8]> {
        self.occupied.then_some(&*self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_slot_is_unoccupied() {
        let slot = Slot::empty(4);
        assert!(!slot.is_occupied());
        assert_eq!(slot.payload(), None);
    }

    #[test]
    fn occupy_exposes_zeroed_payload_of_requested_width() {
        let mut slot = Slot::empty(4);
        let payload = slot.occupy();
        assert_eq!(payload.len(), 4);
        assert_eq!(payload, &[0, 0, 0, 0]);
    }

    #[test]
    fn vacate_hides_payload_without_losing_width() {
        let mut slot = Slot::empty(2);
        slot.occupy().copy_from_slice(&[9, 9]);
        slot.vacate();
        assert_eq!(slot.payload(), None);
        slot.occupy();
        assert_eq!(slot.payload().unwrap().len(), 2);
    }
}
