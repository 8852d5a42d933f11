//! The repartitioner: decides the array/hash capacity split on rehash.
//!
//! This module is pure calculation — it reads the current array and hash
//! parts (plus the key that triggered the rehash) and returns a [`Plan`].
//! Actually carrying out the plan (reallocating and moving entries) is
//! [`crate::table::Table::apply_resize`]'s job, since that requires mutable
//! access to the array part, hash part, and string pool all at once.

use crate::array::ArrayPart;
use crate::hash::HashPart;
use crate::key::Key;

/// Maximum log2 capacity for either the array or hash part. Matches the
/// `MAXBITS` constant in the source implementation.
pub(crate) const MAXBITS: u32 = 30;

/// Maximum number of slots in the array part or nodes in the hash part.
pub(crate) const MAXASIZE: usize = 1 << MAXBITS;

/// The new `(array_len, hash_len)` split chosen by the repartitioner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Plan {
    pub(crate) array_len: usize,
    pub(crate) hash_len: usize,
}

/// Smallest `n` such that `2^n >= k`, for `k >= 1`. Mirrors the source's
/// `_ceillog2`, implemented directly via `leading_zeros` instead of a
/// table-driven bit scan.
#[must_use]
pub(crate) fn ceil_log2(k: usize) -> u32 {
    debug_assert!(k >= 1);
    usize::BITS - (k - 1).leading_zeros()
}

/// Classifies an integer key into its census slice, per §4.5: slice `g`
/// holds keys in `[2^(g-1), 2^g)`, with slice `0` reserved for the key `0`.
/// Returns `None` if the key is negative or exceeds the maximum array size.
#[must_use]
fn slice_of(k: i64) -> Option<usize> {
    if k < 0 || (k as u128) > (MAXASIZE as u128) {
        return None;
    }
    Some(if k == 0 {
        0
    } else {
        (ceil_log2(k as usize) + 1) as usize
    })
}

/// Rounds `n` up to a power of two, with a floor of 1 (a hash part always
/// has at least one node).
#[must_use]
fn pow2_at_least_one(n: usize) -> usize {
    if n == 0 {
        1
    } else {
        n.next_power_of_two()
    }
}

/// Sweeps the census and finds the largest power-of-two array size whose
/// load factor stays above one half, per §4.5's "optimal array size" rule.
///
/// `nums[g]` is the number of integer keys in slice `g`; `total_int_keys` is
/// the total count of integer-keyed entries (array part + hash part +
/// pending key) being redistributed. Returns `(new_array_len, na)` where
/// `na` is the number of integer keys that will live in the array part.
#[must_use]
fn compute_sizes(nums: &[usize], total_int_keys: usize) -> (usize, usize) {
    let mut a = 0_usize; // running count of integer keys <= 2^g
    let mut n = 0_usize; // best array size so far
    let mut na = 0_usize; // keys assigned to the array part at that size
    let mut twotoi = 1_usize;
    for &count in nums.iter() {
        if count > 0 {
            a += count;
            if a > twotoi / 2 {
                n = twotoi;
                na = a;
            }
        }
        if a == total_int_keys {
            break;
        }
        twotoi *= 2;
    }
    debug_assert!(n / 2 <= na && na <= n, "computed array size must honor the load-factor invariant");
    (n, na)
}

/// Builds the repartition plan for a rehash triggered by inserting
/// `pending_key` into a table whose current occupancy is `array`/`hash`.
#[must_use]
pub(crate) fn plan(array: &ArrayPart, hash: &HashPart, pending_key: &Key<'_>) -> Plan {
    let mut nums = vec![0_usize; MAXBITS as usize + 2];
    let mut nasize = 0_usize;

    for (i, _) in array.iter() {
        if let Some(slice) = slice_of(i as i64) {
            nums[slice] += 1;
            nasize += 1;
        }
    }

    let mut total = nasize;
    for (_, key, _) in hash.iter() {
        total += 1;
        if let crate::key::OwnedKey::Int(k) = *key {
            if let Some(slice) = slice_of(k) {
                nums[slice] += 1;
                nasize += 1;
            }
        }
    }

    if let Some(slice) = pending_key.array_index().and_then(slice_of) {
        nums[slice] += 1;
        nasize += 1;
    }
    total += 1;

    let (array_len, na) = compute_sizes(&nums, nasize);
    let hash_len = pow2_at_least_one(total - na);

    assert!(
        array_len <= MAXASIZE,
        "array part would need {} slots, exceeding the maximum of 2^{}",
        array_len,
        MAXBITS
    );
    assert!(
        hash_len <= MAXASIZE,
        "hash part would need {} nodes, exceeding the maximum of 2^{}",
        hash_len,
        MAXBITS
    );

    Plan {
        array_len,
        hash_len,
    }
}

/// Validates an explicit, caller-requested `resize(na, nh)` call, panicking
/// per §7's "capacity-exceeded" fatal condition if either size would exceed
/// `2^MAXBITS`.
pub(crate) fn validate_explicit_sizes(array_len: usize, hash_len: usize) {
    assert!(
        array_len <= MAXASIZE,
        "requested array size {} exceeds the maximum of 2^{}",
        array_len,
        MAXBITS
    );
    assert!(
        hash_len <= MAXASIZE,
        "requested hash size {} exceeds the maximum of 2^{}",
        hash_len,
        MAXBITS
    );
}
