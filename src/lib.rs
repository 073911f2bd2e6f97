//! primehash: open-addressing hash maps and sets over prime-sized slot
//! arrays, with tombstone deletion, pluggable hashing strategies, no-entry
//! sentinels and live key/value/entry views.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one generic engine instead of a map type per key/value pairing.
//!   `HashMap<i32, i64>` and `HashSet<u8>` are monomorphizations of the same
//!   code; values are stored unboxed.
//! - Layers:
//!   - `primes`: capacity sizing. Every table length is a tabulated prime
//!     (or, past the table, the next prime found by search).
//!   - `HashingStrategy<T>`: hash and equality capability fixed per table.
//!     `Natural` uses `Hash`/`Eq`; `SequenceStrategy` compares element
//!     slices; `IdentityStrategy` compares `Rc` pointers.
//!   - `RawTable<K, H>`: slot array of EMPTY / FULL / REMOVED, double-hash
//!     probing, growth, tombstone purge and compaction. Knows nothing about
//!     values.
//!   - `HashMap<K, V, H>` / `HashSet<K, H>`: containers over `RawTable`. The
//!     map keeps values in a parallel column and owns the sentinels.
//!   - `KeySet`, `ValueCollection`, `EntrySet`: live views that borrow the
//!     map and route removals back into it.
//!
//! Constraints
//! - Single-threaded; nothing is synchronized.
//! - `size <= max_size < capacity`, so a probe always reaches a non-FULL
//!   slot. At load factor 1.0 one slot is held back.
//! - Removal only tombstones. It never moves entries and never rehashes, so
//!   slot indices stay valid during a removal-capable walk (`Cursor`).
//! - Compaction is explicit (`compact`); nothing shrinks on its own.
//!
//! Probing
//! - Double hashing: start at `h mod capacity`, step back by
//!   `1 + h mod (capacity - 2)`. With a prime capacity the sequence covers
//!   every slot.
//! - Inserts walk past tombstones (the key may sit further on) and reuse the
//!   first tombstone seen when the key is absent. Removing a key and then
//!   inserting a colliding one therefore lands in the same slot.
//! - After an insert: `size > max_size` grows the table; otherwise, running
//!   out of EMPTY slots rehashes at the same capacity to purge tombstones.
//!
//! Sentinels
//! - The sentinel API (`put`, `get`, `remove`, `put_if_absent`) reports
//!   "absent" as the map's no-entry value. Storing that value makes those
//!   answers ambiguous; the `Option` API (`insert`, `get_ref`,
//!   `remove_entry`) is always exact.
//!
//! Reentrancy
//! - Strategies run while a probe is in progress. In debug builds a latch
//!   panics if a strategy reaches back into the same table. Rehashing runs
//!   every strategy call before moving any slot, so a panicking strategy
//!   leaves the table untouched.
//!
//! Views and fail-fast
//! - Views and cursors hold `&mut HashMap`, so outside modification during
//!   iteration is rejected at compile time. Additions through views return
//!   `Error::UnsupportedMutation`.
//!
//! Notes and non-goals
//! - No thread-safety, persistence or concurrent probing.
//! - `hash_code` is an order-independent sum of fixed-key element hashes;
//!   it agrees across instances with equal contents.

pub mod config;
pub mod error;
pub mod hash_map;
pub mod hash_set;
pub mod primes;
mod raw_table;
mod reentrancy;
#[cfg(feature = "serde")]
mod serde_impls;
pub mod strategy;
mod table_proptest;
pub mod views;

// Public surface
pub use config::{HashConfig, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR};
pub use error::{Error, Result};
pub use hash_map::{Cursor, HashMap};
pub use hash_set::HashSet;
pub use strategy::{FnStrategy, HashingStrategy, IdentityStrategy, Natural, SequenceStrategy};
pub use views::{EntryMut, EntrySet, KeySet, Membership, ValueCollection};
