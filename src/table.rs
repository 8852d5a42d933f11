//! The public table facade: dispatches between the array and hash parts,
//! drives insertion-triggered rehash, and exposes iteration.

use crate::array::ArrayPart;
use crate::hash::{HashPart, InsertOutcome};
use crate::iter::Cursor;
use crate::key::Key;
use crate::pool::StringPool;
use crate::rehash;

/// Default hash seed used when the caller passes `0` to [`Table::new`].
///
/// An arbitrary nonzero constant, not a secret: this container is not
/// hardened against adversarial input (see the crate-level docs).
const DEFAULT_SEED: u32 = 0x9E37_79B9;

/// A hybrid array/hash associative container with fixed-width inline values.
///
/// Integer keys in the dense prefix `0..size_array` live in the array part;
/// every other key lives in the hash part. The split is maintained
/// automatically by the repartitioner (`crate::rehash`) as the table grows.
///
/// # Examples
///
/// ```
/// use luatable::{Key, Table};
///
/// let mut table = Table::new(4, 0);
/// table.set(&Key::Int(0)).copy_from_slice(&1_i32.to_ne_bytes());
/// table.set(&Key::Str("name")).copy_from_slice(&2_i32.to_ne_bytes());
///
/// assert_eq!(table.get(&Key::Int(0)), Some(&1_i32.to_ne_bytes()[..]));
/// assert_eq!(table.get(&Key::Str("name")), Some(&2_i32.to_ne_bytes()[..]));
/// assert_eq!(table.get(&Key::Int(1)), None);
/// ```
pub struct Table {
    array: ArrayPart,
    hash: HashPart,
    pool: StringPool,
    value_size: usize,
    seed: u32,
}

impl Table {
    /// Creates an empty table holding values of `value_size` bytes each.
    ///
    /// `seed` controls hash distribution; `0` selects an implementation
    /// chosen nonzero default. Distinct tables may share a seed safely; the
    /// seed only affects bucket placement, not correctness.
    ///
    /// # Panics
    ///
    /// Panics if `value_size` is `0`.
    #[must_use]
    pub fn new(value_size: usize, seed: u32) -> Self {
        assert!(value_size > 0, "value_size must be nonzero");
        Self {
            array: ArrayPart::new(value_size),
            hash: HashPart::new(value_size, 1),
            pool: StringPool::new(),
            value_size,
            seed: if seed == 0 { DEFAULT_SEED } else { seed },
        }
    }

    /// Looks up `key`, returning its payload slice if present.
    ///
    /// The returned slice is valid until the next call to [`Table::set`]
    /// with a key not already present, or to [`Table::resize`].
    #[must_use]
    pub fn get(&self, key: &Key<'_>) -> Option<&[u8]> {
        if let Some(i) = key.array_index() {
            if self.array.in_range(i) {
                return self.array.get(i as usize);
            }
        }
        let idx = self.hash.find(key, self.seed, &self.pool)?;
        self.hash.payload(idx)
    }

    /// Returns the payload slice for `key`, creating an empty slot for it
    /// if absent. The caller is responsible for writing the bytes.
    ///
    /// Triggers a rehash (§4.5) when the hash part has no free slot for a
    /// genuinely new key; this is amortised O(1) and transparent to callers
    /// beyond invalidating previously returned payload slices.
    ///
    /// # Panics
    ///
    /// Panics if satisfying the insert would require an array or hash part
    /// larger than `2^30` entries.
    pub fn set(&mut self, key: &Key<'_>) -> &mut [u8] {
        loop {
            if let Some(i) = key.array_index() {
                if self.array.in_range(i) {
                    return self.array.set(i as usize);
                }
            }
            if let Some(idx) = self.hash.find(key, self.seed, &self.pool) {
                return self.hash.payload_mut(idx);
            }
            match self.hash.insert(key, self.seed, &mut self.pool) {
                InsertOutcome::Inserted(idx) => return self.hash.payload_mut(idx),
                InsertOutcome::NeedsRehash => self.rehash_for(key),
            }
        }
    }

    /// Removes `key` if present. A no-op if `key` is absent.
    pub fn delete(&mut self, key: &Key<'_>) {
        if let Some(i) = key.array_index() {
            if self.array.in_range(i) {
                self.array.delete(i as usize);
                return;
            }
        }
        if let Some(freed) = self.hash.delete(key, self.seed, &self.pool) {
            self.pool.free(freed);
        }
    }

    /// Forces a repartition to the given array and hash sizes, rounding the
    /// hash size up to a power of two (minimum 1).
    ///
    /// # Panics
    ///
    /// Panics if either requested size exceeds `2^30`.
    pub fn resize(&mut self, narray: usize, nhash: usize) {
        let nhash = nhash.max(1).next_power_of_two();
        rehash::validate_explicit_sizes(narray, nhash);
        self.apply_resize(narray, nhash);
    }

    /// Reads the array part directly at `index`, bypassing the hash part
    /// entirely. Returns `None` if `index` is out of range or unoccupied.
    #[must_use]
    pub fn getn(&self, index: usize) -> Option<&[u8]> {
        self.array.get(index)
    }

    /// Advances `cursor` to the next occupied slot, returning its key and
    /// payload, or `None` once the whole table has been visited.
    ///
    /// Iteration order is the array part in ascending index order, followed
    /// by the hash part in node-vector order. Mutating the table between
    /// calls does not cause memory unsafety, but may cause the cursor to
    /// skip or repeat entries (see the crate-level docs).
    #[must_use]
    pub fn next(&self, cursor: &mut Cursor) -> Option<(Key<'_>, &[u8])> {
        let array_len = self.array.len();
        while cursor.0 < array_len {
            let i = cursor.0;
            cursor.0 += 1;
            if let Some(payload) = self.array.get(i) {
                return Some((Key::Int(i as i64), payload));
            }
        }
        let hash_len = self.hash.len();
        while cursor.0 - array_len < hash_len {
            let node_idx = cursor.0 - array_len;
            cursor.0 += 1;
            if self.hash.occupied(node_idx) {
                let key = self.hash.key(node_idx).as_key(&self.pool);
                let payload = self
                    .hash
                    .payload(node_idx)
                    .expect("occupied node must have a payload");
                return Some((key, payload));
            }
        }
        None
    }

    fn rehash_for(&mut self, pending_key: &Key<'_>) {
        let plan = rehash::plan(&self.array, &self.hash, pending_key);
        self.apply_resize(plan.array_len, plan.hash_len);
    }

    /// Carries out §4.5's resize algorithm: builds the new hash vector,
    /// relocates the array's vanishing tail into it, resizes the array, then
    /// walks the old hash vector into the new structure.
    fn apply_resize(&mut self, new_array_len: usize, new_hash_len: usize) {
        let mut new_hash = HashPart::new(self.value_size, new_hash_len.max(1));

        if new_array_len < self.array.len() {
            for idx in new_array_len..self.array.len() {
                if let Some(bytes) = self.array.get(idx) {
                    let bytes = bytes.to_vec();
                    let key = Key::Int(idx as i64);
                    match new_hash.insert(&key, self.seed, &mut self.pool) {
                        InsertOutcome::Inserted(node) => {
                            new_hash.payload_mut(node).copy_from_slice(&bytes);
                        }
                        InsertOutcome::NeedsRehash => {
                            unreachable!("repartitioner must size the hash part to fit array overflow")
                        }
                    }
                }
            }
        }

        self.array.resize(new_array_len);

        let old_hash = core::mem::replace(&mut self.hash, new_hash);
        let relocations: Vec<_> = old_hash
            .iter()
            .map(|(_, key, payload)| (*key, payload.to_vec()))
            .collect();

        for (owned_key, bytes) in relocations {
            if let crate::key::OwnedKey::Int(i) = owned_key {
                if i >= 0 && (i as usize) < self.array.len() {
                    self.array.set(i as usize).copy_from_slice(&bytes);
                    continue;
                }
            }
            match self.hash.insert_owned(owned_key, self.seed, &self.pool) {
                InsertOutcome::Inserted(node) => {
                    self.hash.payload_mut(node).copy_from_slice(&bytes);
                }
                InsertOutcome::NeedsRehash => {
                    unreachable!("repartitioner must size the hash part to fit its own prior occupants")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn val(n: u8) -> [u8; 1] {
        [n]
    }

    #[test]
    fn set_then_get_round_trips_for_each_key_kind() {
        let mut table = Table::new(1, 1);
        table.set(&Key::Int(3)).copy_from_slice(&val(1));
        table.set(&Key::Num(2.5)).copy_from_slice(&val(2));
        table.set(&Key::Str("x")).copy_from_slice(&val(3));
        let obj_target = 7_u8;
        let obj_ptr = std::ptr::addr_of!(obj_target).cast::<()>();
        table.set(&Key::Obj(obj_ptr)).copy_from_slice(&val(4));

        assert_eq!(table.get(&Key::Int(3)), Some(&val(1)[..]));
        assert_eq!(table.get(&Key::Num(2.5)), Some(&val(2)[..]));
        assert_eq!(table.get(&Key::Str("x")), Some(&val(3)[..]));
        assert_eq!(table.get(&Key::Obj(obj_ptr)), Some(&val(4)[..]));
    }

    #[test]
    fn int_and_num_with_equal_value_are_distinct_entries() {
        let mut table = Table::new(1, 1);
        table.set(&Key::Int(1)).copy_from_slice(&val(1));
        table.set(&Key::Num(1.0)).copy_from_slice(&val(2));
        assert_eq!(table.get(&Key::Int(1)), Some(&val(1)[..]));
        assert_eq!(table.get(&Key::Num(1.0)), Some(&val(2)[..]));
    }

    #[test]
    fn delete_then_get_is_absent() {
        let mut table = Table::new(1, 1);
        table.set(&Key::Str("k")).copy_from_slice(&val(9));
        table.delete(&Key::Str("k"));
        assert_eq!(table.get(&Key::Str("k")), None);
    }

    #[test]
    fn delete_of_absent_key_is_a_no_op() {
        let mut table = Table::new(1, 1);
        table.delete(&Key::Int(42));
        assert_eq!(table.get(&Key::Int(42)), None);
    }

    #[test]
    fn reinsert_after_delete_yields_new_value() {
        let mut table = Table::new(1, 1);
        table.set(&Key::Str("k")).copy_from_slice(&val(1));
        table.delete(&Key::Str("k"));
        table.set(&Key::Str("k")).copy_from_slice(&val(2));
        assert_eq!(table.get(&Key::Str("k")), Some(&val(2)[..]));
    }

    #[test]
    fn many_consecutive_integer_keys_land_in_the_array_part() {
        let mut table = Table::new(1, 1);
        for i in 0..64_i64 {
            table.set(&Key::Int(i)).copy_from_slice(&val(i as u8));
        }
        for i in 0..64_i64 {
            assert_eq!(table.get(&Key::Int(i)), Some(&val(i as u8)[..]));
            assert_eq!(table.getn(i as usize), Some(&val(i as u8)[..]));
        }
    }

    #[test]
    fn a_single_large_integer_key_does_not_grow_the_array() {
        let mut table = Table::new(1, 1);
        table.set(&Key::Int(1_000_000)).copy_from_slice(&val(1));
        assert!(table.array.len() < 1_000_000);
        assert_eq!(table.get(&Key::Int(1_000_000)), Some(&val(1)[..]));
    }

    #[test]
    fn iteration_visits_every_distinct_key_exactly_once() {
        let mut table = Table::new(1, 1);
        let keys = [
            Key::Int(0),
            Key::Int(1),
            Key::Str("a"),
            Key::Str("b"),
            Key::Num(9.5),
        ];
        for (i, k) in keys.iter().enumerate() {
            table.set(k).copy_from_slice(&val(i as u8));
        }

        let mut cursor = Cursor::new();
        let mut seen = Vec::new();
        while let Some((key, payload)) = table.next(&mut cursor) {
            seen.push((format!("{key:?}"), payload[0]));
        }
        assert_eq!(seen.len(), keys.len());
        for (i, k) in keys.iter().enumerate() {
            assert!(seen.contains(&(format!("{k:?}"), i as u8)));
        }
    }

    #[test]
    fn explicit_resize_preserves_existing_entries() {
        let mut table = Table::new(1, 1);
        table.set(&Key::Str("hello")).copy_from_slice(&val(1));
        table.set(&Key::Int(0)).copy_from_slice(&val(2));
        table.resize(8, 8);
        assert_eq!(table.get(&Key::Str("hello")), Some(&val(1)[..]));
        assert_eq!(table.get(&Key::Int(0)), Some(&val(2)[..]));
    }

    #[test]
    fn shrinking_array_relocates_tail_into_hash_part() {
        let mut table = Table::new(1, 1);
        table.resize(4, 1);
        table.set(&Key::Int(3)).copy_from_slice(&val(9));
        table.resize(1, 4);
        assert_eq!(table.get(&Key::Int(3)), Some(&val(9)[..]));
        assert_eq!(table.getn(3), None);
    }
}
