//! Iteration cursor for [`crate::Table::next`].

/// Iteration state threaded through successive [`Table::next`](crate::Table::next) calls.
///
/// A cursor is a single index in `[0, size_array + hash_capacity)`: values
/// below `size_array` address the array part, values at or above it address
/// the hash part (offset by `size_array`). Created positioned before the
/// first entry; `next` advances it past unoccupied slots and returns the
/// first occupied one it finds.
///
/// # Examples
///
/// ```
/// use luatable::{Cursor, Key, Table};
///
/// let mut table = Table::new(4, 0);
/// table.set(&Key::Int(0)).copy_from_slice(&1_i32.to_ne_bytes());
///
/// let mut cursor = Cursor::new();
/// assert!(table.next(&mut cursor).is_some());
/// assert!(table.next(&mut cursor).is_none());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Cursor(pub(crate) usize);

impl Cursor {
    /// Creates a cursor positioned before the first entry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
