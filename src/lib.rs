//! A hybrid array/hash associative container modeled on the Lua table.
//!
//! [`Table`] stores fixed-width values behind a tagged [`Key`] (signed
//! integer, double, string, or opaque object pointer). Internally it keeps
//! two cooperating parts:
//!
//! ```text
//!   array part:                      hash part:
//!   -----------------------         -----------------------------------
//!  | 0 | 1 | 2 | 3 | ... |         | node: key, value, next ----.      |
//!   -----------------------        |  ^                        |      |
//!                                  |  |_ main position    other |      |
//!                                  |                     node --'      |
//!                                   -----------------------------------
//! ```
//!
//! Integer keys in the dense prefix `0..size_array` live in the array part,
//! a plain `Vec` of value slots indexed directly. Every other key — a
//! larger or negative integer, a float, a string, or an object pointer —
//! lives in the hash part: a power-of-two-sized vector of nodes addressed
//! by `hash(key) mod len`, with collisions resolved by relocating the
//! *displaced* occupant rather than chaining through new allocations (see
//! [`crate::hash`]). A repartitioner ([`crate::rehash`]) periodically
//! recomputes the array/hash split so that the array part never drops below
//! 50% occupancy and the hash part never runs out of free slots for long.
//!
//! This container has no built-in thread safety, no persistence, and does
//! not shrink automatically on deletion; see the module docs for
//! [`hash`] and [`rehash`] for the collision and repartitioning
//! algorithms in full.

mod array;
mod hash;
mod iter;
mod key;
mod pool;
mod rehash;
mod slot;
mod table;

pub use iter::Cursor;
pub use key::Key;
pub use table::Table;
