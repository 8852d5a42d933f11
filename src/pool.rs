//! A grow-only arena for string-key bytes, with a free list permitting reuse.
//!
//! `Table` copies string keys into this pool on first insertion so that it
//! owns its keys independently of the caller's buffers (see [`crate::Key`]).
//! The pool never returns memory to the global allocator except on drop;
//! freed slots are kept around and matched against future allocations by a
//! first-fit scan, exactly as the original C `pool_alloc`/`pool_free` pair
//! does over a singly-linked list of `malloc`'d nodes.

/// Minimum backing capacity for a newly allocated pool slot. Mirrors the
/// `SHORTSTR_LEN` floor in the source implementation: short keys still get a
/// slot large enough to absorb a later, slightly longer key of the same
/// identity without reallocating.
const SHORTSTR_LEN: usize = 128;

struct PoolSlot {
    buf: String,
}

/// An opaque reference into a [`StringPool`], returned by [`StringPool::alloc`].
///
/// `PoolRef` is only meaningful when paired with the `StringPool` that
/// produced it; it is stored inside hash nodes in place of an owned `String`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PoolRef(usize);

/// Grow-only string arena backing string-keyed hash nodes.
#[derive(Default)]
pub(crate) struct StringPool {
    slots: Vec<PoolSlot>,
    /// Indices into `slots` that are free, in first-free-first-reused order.
    free: Vec<usize>,
}

impl StringPool {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Copies `s` into the pool, reusing a freed slot with sufficient
    /// capacity if one is available, and returns a reference to it.
    #[must_use]
    pub(crate) fn alloc(&mut self, s: &str) -> PoolRef {
        let needed = s.len();
        if let Some(pos) = self
            .free
            .iter()
            .position(|&idx| self.slots[idx].buf.capacity() >= needed)
        {
            let idx = self.free.remove(pos);
            let slot = &mut self.slots[idx];
            slot.buf.clear();
            slot.buf.push_str(s);
            return PoolRef(idx);
        }
        let mut buf = String::with_capacity(needed.max(SHORTSTR_LEN));
        buf.push_str(s);
        self.slots.push(PoolSlot { buf });
        PoolRef(self.slots.len() - 1)
    }

    /// Returns a previously allocated slot's bytes to the free list.
    pub(crate) fn free(&mut self, r: PoolRef) {
        self.slots[r.0].buf.clear();
        self.free.push(r.0);
    }

    /// Returns the string content referenced by `r`.
    #[inline]
    #[must_use]
    pub(crate) fn get(&self, r: PoolRef) -> &str {
        &self.slots[r.0].buf
    }
}
