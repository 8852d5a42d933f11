//! The hash part: a power-of-two-sized open-addressed table using
//! Brent-variant main-position chaining.
//!
//! See the crate-level docs and `SPEC_FULL.md` §4.3–§4.4 for the algorithm.
//! This module only implements the collision discipline and free-slot
//! cursor; deciding *when* and *how large* to grow is the repartitioner's
//! job (`crate::rehash`).

use crate::key::{Key, OwnedKey};
use crate::pool::StringPool;
use crate::slot::Slot;

struct Node {
    key: Option<OwnedKey>,
    value: Slot,
    /// Index of the next node in this bucket's collision chain, or `None`
    /// at the end of the chain. Represented as a vector index rather than a
    /// pointer so that rehash-triggered relocation (which reallocates the
    /// node vector) cannot leave dangling references (see the design notes
    /// on intrusive collision chains).
    next: Option<usize>,
}

impl Node {
    fn empty(value_size: usize) -> Self {
        Self {
            key: None,
            value: Slot::empty(value_size),
            next: None,
        }
    }
}

/// Outcome of attempting to insert into the hash part.
pub(crate) enum InsertOutcome {
    /// The key now occupies `nodes[.0]`; write the value through it.
    Inserted(usize),
    /// No free slot was available; the caller must rehash and retry.
    NeedsRehash,
}

pub(crate) struct HashPart {
    nodes: Vec<Node>,
    value_size: usize,
    /// Descending free-slot cursor. Starts one past the end of `nodes` and
    /// only decreases (invariant I4); reset to `nodes.len()` whenever the
    /// hash part is reallocated.
    lastfree: usize,
}

impl HashPart {
    /// Creates a hash part with `len` nodes. `len` must already be a power
    /// of two of at least 1; the repartitioner is responsible for that.
    #[must_use]
    pub(crate) fn new(value_size: usize, len: usize) -> Self {
        debug_assert!(len >= 1 && len.is_power_of_two());
        let nodes = (0..len).map(|_| Node::empty(value_size)).collect();
        Self {
            nodes,
            value_size,
            lastfree: len,
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    fn main_position_for_hash(&self, hash: u32) -> usize {
        (hash as usize) & (self.nodes.len() - 1)
    }

    #[must_use]
    fn main_position(&self, key: &Key<'_>, seed: u32) -> usize {
        self.main_position_for_hash(key.hash(seed))
    }

    #[must_use]
    fn main_position_of_owned(&self, owned: &OwnedKey, seed: u32, pool: &StringPool) -> usize {
        self.main_position_for_hash(owned.hash(seed, pool))
    }

    #[inline]
    #[must_use]
    pub(crate) fn occupied(&self, idx: usize) -> bool {
        self.nodes[idx].value.is_occupied()
    }

    #[inline]
    #[must_use]
    pub(crate) fn key(&self, idx: usize) -> &OwnedKey {
        self.nodes[idx]
            .key
            .as_ref()
            .expect("occupied node must carry a key")
    }

    #[inline]
    #[must_use]
    pub(crate) fn payload(&self, idx: usize) -> Option<&[u8]> {
        self.nodes[idx].value.payload()
    }

    #[inline]
    #[must_use]
    pub(crate) fn payload_mut(&mut self, idx: usize) -> &mut [u8] {
        self.nodes[idx].value.occupy()
    }

    /// Walks the chain from `key`'s main position, returning the index of
    /// the occupied node whose key matches, if any.
    #[must_use]
    pub(crate) fn find(&self, key: &Key<'_>, seed: u32, pool: &StringPool) -> Option<usize> {
        let mut cursor = Some(self.main_position(key, seed));
        while let Some(idx) = cursor {
            let node = &self.nodes[idx];
            if node.value.is_occupied() {
                if let Some(owned) = &node.key {
                    if owned.matches(key, pool) {
                        return Some(idx);
                    }
                }
            }
            cursor = node.next;
        }
        None
    }

    /// Decrements the free-slot cursor until a key-less node is found,
    /// returning its index, or `None` if the cursor is exhausted.
    ///
    /// Freedom is judged by the key field, not the value's occupancy flag: a
    /// deleted node keeps its key (see [`HashPart::delete`]) so that other
    /// chains still reach through it via `next`. Reusing it here would sever
    /// those chains.
    fn get_free_pos(&mut self) -> Option<usize> {
        while self.lastfree > 0 {
            self.lastfree -= 1;
            if self.nodes[self.lastfree].key.is_none() {
                return Some(self.lastfree);
            }
        }
        None
    }

    /// Inserts `key` per the Brent-variant collision policy (§4.3). Returns
    /// the node index to write the value through, or signals that a rehash
    /// is needed. Does not check for an existing entry; callers must do a
    /// `find` first if update-in-place semantics are wanted (the table
    /// facade always does, since it must return the existing slot on `set`
    /// for an already-present key).
    pub(crate) fn insert(
        &mut self,
        key: &Key<'_>,
        seed: u32,
        pool: &mut StringPool,
    ) -> InsertOutcome {
        let mp = self.main_position(key, seed);
        if !self.nodes[mp].value.is_occupied() {
            self.place_key(mp, key, pool);
            return InsertOutcome::Inserted(mp);
        }

        let Some(free) = self.get_free_pos() else {
            return InsertOutcome::NeedsRehash;
        };

        let resident = self.nodes[mp]
            .key
            .clone()
            .expect("occupied main position must carry a key");
        let resident_main = self.main_position_of_owned(&resident, seed, pool);

        if resident_main != mp {
            // The resident is displaced from its own main position; it is
            // reachable from `resident_main` by following `next`. Relink its
            // predecessor to `free`, move the resident there, and reclaim
            // `mp` for the new key.
            let mut pred = resident_main;
            while self.nodes[pred].next != Some(mp) {
                pred = self.nodes[pred]
                    .next
                    .expect("resident's main-position chain must reach mp");
            }
            self.nodes[pred].next = Some(free);
            self.move_node(mp, free);
            self.nodes[mp].next = None;
            self.place_key(mp, key, pool);
            InsertOutcome::Inserted(mp)
        } else {
            // The resident is already in its own main position; splice the
            // new key in at `free`, right after `mp` in the chain.
            self.nodes[free].next = self.nodes[mp].next;
            self.nodes[mp].next = Some(free);
            self.place_key(free, key, pool);
            InsertOutcome::Inserted(free)
        }
    }

    fn place_key(&mut self, idx: usize, key: &Key<'_>, pool: &mut StringPool) {
        let owned = key.to_owned_key(|s| pool.alloc(s));
        self.nodes[idx].key = Some(owned);
        self.nodes[idx].value.occupy();
    }

    /// Inserts an already-owned key, exactly as [`HashPart::insert`] does for
    /// a borrowed [`Key`], except it never touches the string pool: used by
    /// the repartitioner to relocate nodes between hash vectors without
    /// re-interning string keys (which would leak the original pool slot).
    pub(crate) fn insert_owned(
        &mut self,
        owned: OwnedKey,
        seed: u32,
        pool: &StringPool,
    ) -> InsertOutcome {
        let mp = self.main_position_of_owned(&owned, seed, pool);
        if !self.nodes[mp].value.is_occupied() {
            self.place_owned(mp, owned);
            return InsertOutcome::Inserted(mp);
        }

        let Some(free) = self.get_free_pos() else {
            return InsertOutcome::NeedsRehash;
        };

        let resident = self.nodes[mp]
            .key
            .clone()
            .expect("occupied main position must carry a key");
        let resident_main = self.main_position_of_owned(&resident, seed, pool);

        if resident_main != mp {
            let mut pred = resident_main;
            while self.nodes[pred].next != Some(mp) {
                pred = self.nodes[pred]
                    .next
                    .expect("resident's main-position chain must reach mp");
            }
            self.nodes[pred].next = Some(free);
            self.move_node(mp, free);
            self.nodes[mp].next = None;
            self.place_owned(mp, owned);
            InsertOutcome::Inserted(mp)
        } else {
            self.nodes[free].next = self.nodes[mp].next;
            self.nodes[mp].next = Some(free);
            self.place_owned(free, owned);
            InsertOutcome::Inserted(free)
        }
    }

    fn place_owned(&mut self, idx: usize, owned: OwnedKey) {
        self.nodes[idx].key = Some(owned);
        self.nodes[idx].value.occupy();
    }

    /// Moves node `from`'s key, value, and chain link into node `to`,
    /// leaving `from`'s value unoccupied (its key/next are overwritten by
    /// the caller immediately afterward).
    fn move_node(&mut self, from: usize, to: usize) {
        let key = self.nodes[from].key.take();
        let next = self.nodes[from].next;
        let value_size = self.value_size;
        let from_value = core::mem::replace(&mut self.nodes[from].value, Slot::empty(value_size));
        self.nodes[to] = Node {
            key,
            value: from_value,
            next,
        };
    }

    /// Vacates the value at `key`'s node if present, returning the freed
    /// string pool reference (if the key was a string key) so the caller
    /// can return it to the pool.
    ///
    /// The node's key field is left in place rather than cleared: other
    /// chains may still reach through this node via `next` (invariant I3),
    /// and `find` already gates key comparison on the value's occupancy
    /// flag, so a stale key here is never mistaken for a live entry.
    pub(crate) fn delete(
        &mut self,
        key: &Key<'_>,
        seed: u32,
        pool: &StringPool,
    ) -> Option<crate::pool::PoolRef> {
        let idx = self.find(key, seed, pool)?;
        self.nodes[idx].value.vacate();
        match self.nodes[idx].key {
            Some(OwnedKey::Str(r)) => Some(r),
            _ => None,
        }
    }

    /// Resets the free-slot cursor to one past the end of the vector.
    /// Called after the hash part is reallocated by the repartitioner.
    pub(crate) fn reset_free_cursor(&mut self) {
        self.lastfree = self.nodes.len();
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &OwnedKey, &[u8])> {
        self.nodes.iter().enumerate().filter_map(|(i, node)| {
            let payload = node.value.payload()?;
            let key = node.key.as_ref()?;
            Some((i, key, payload))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> StringPool {
        StringPool::new()
    }

    #[test]
    fn insert_into_empty_main_position() {
        let mut hp = HashPart::new(4, 4);
        let mut pool = pool();
        match hp.insert(&Key::Int(1), 7, &mut pool) {
            InsertOutcome::Inserted(idx) => {
                assert!(hp.occupied(idx));
            }
            InsertOutcome::NeedsRehash => panic!("should not need rehash on empty table"),
        }
    }

    #[test]
    fn find_after_insert() {
        let mut hp = HashPart::new(1, 4);
        let mut pool = pool();
        if let InsertOutcome::Inserted(idx) = hp.insert(&Key::Int(9), 7, &mut pool) {
            hp.payload_mut(idx).copy_from_slice(&[42]);
        }
        let found = hp.find(&Key::Int(9), 7, &pool).unwrap();
        assert_eq!(hp.payload(found), Some(&[42][..]));
    }

    #[test]
    fn colliding_keys_are_all_reachable_from_main_position() {
        // 0, 4, and 8 all byte-sum-hash to a multiple of 4, so with a
        // 4-node table they all share main position 0 and must be resolved
        // by the Brent-variant displacement policy rather than by growing.
        let mut hp = HashPart::new(1, 4);
        let mut pool = pool();
        let keys = [Key::Int(0), Key::Int(4), Key::Int(8)];
        for (i, k) in keys.iter().enumerate() {
            match hp.insert(k, 0, &mut pool) {
                InsertOutcome::Inserted(idx) => hp.payload_mut(idx)[0] = i as u8,
                InsertOutcome::NeedsRehash => panic!("4-node table must fit 3 entries"),
            }
        }
        for k in &keys {
            assert!(hp.find(k, 0, &pool).is_some());
        }
    }

    #[test]
    fn delete_vacates_and_returns_pool_ref_for_strings() {
        let mut hp = HashPart::new(1, 4);
        let mut pool = pool();
        if let InsertOutcome::Inserted(idx) = hp.insert(&Key::Str("hi"), 0, &mut pool) {
            hp.payload_mut(idx)[0] = 1;
        }
        assert!(hp.find(&Key::Str("hi"), 0, &pool).is_some());
        let freed = hp.delete(&Key::Str("hi"), 0, &pool);
        assert!(freed.is_some());
        assert!(hp.find(&Key::Str("hi"), 0, &pool).is_none());
    }

    #[test]
    fn free_cursor_only_decreases_until_reset() {
        let mut hp = HashPart::new(1, 4);
        assert_eq!(hp.lastfree, 4);
        let _ = hp.get_free_pos();
        assert!(hp.lastfree < 4);
        hp.reset_free_cursor();
        assert_eq!(hp.lastfree, 4);
    }
}
