//! RawTable: the open-addressing engine shared by maps and sets.
//!
//! The table owns a slot array whose entries are EMPTY, FULL (holding a key)
//! or REMOVED (a tombstone). It knows nothing about values: containers keep
//! any per-slot payload in a parallel array indexed exactly like `slots` and
//! are told how entries move when the table is rebuilt.
//!
//! Probing is double hashing over a prime-length array:
//! `index_0 = h mod capacity`, `step = 1 + h mod (capacity - 2)`, and each
//! following index is `step` slots further back, wrapping around. Since the
//! capacity is prime, the sequence visits every slot exactly once.
//!
//! Removal only tombstones a slot; nothing is shifted. A later insert walks
//! past tombstones (the key may live further along the sequence) but reuses
//! the first tombstone it saw when the key turns out to be absent.

use crate::config::HashConfig;
use crate::error::Result;
use crate::primes;
use crate::reentrancy::ProbeLatch;
use crate::strategy::HashingStrategy;
use core::borrow::Borrow;
use core::iter::{Enumerate, FusedIterator};
use core::mem;
use core::slice;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Slot<K> {
    Empty,
    Full(K),
    Removed,
}

/// Outcome of [`RawTable::insert_slot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InsertSlot {
    /// The key is already stored at this index.
    Occupied(usize),
    /// The key is absent; this index (EMPTY or a reusable tombstone) takes it.
    Vacant(usize),
}

/// Index sequence for one hash value. Yields exactly `capacity` indices.
struct ProbeSeq {
    index: usize,
    step: usize,
    capacity: usize,
    remaining: usize,
}

impl ProbeSeq {
    fn new(hash: u64, capacity: usize) -> Self {
        debug_assert!(capacity >= primes::MIN_PRIME);
        let cap = capacity as u64;
        Self {
            index: (hash % cap) as usize,
            step: 1 + (hash % (cap - 2)) as usize,
            capacity,
            remaining: capacity,
        }
    }
}

impl Iterator for ProbeSeq {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.index;
        self.index = if self.index >= self.step {
            self.index - self.step
        } else {
            self.index + self.capacity - self.step
        };
        Some(current)
    }
}

fn empty_slots<K>(capacity: usize) -> Vec<Slot<K>> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, || Slot::Empty);
    slots
}

/// `floor(capacity * load_factor)`, but always leaves one slot that is never
/// FULL so probe sequences reach a non-FULL slot.
fn max_size_for(capacity: usize, load_factor: f32) -> usize {
    let scaled = (capacity as f64 * f64::from(load_factor)).floor() as usize;
    scaled.min(capacity - 1)
}

/// Smallest slot count whose load-factor budget covers `entries`.
fn slots_for(entries: usize, load_factor: f32) -> usize {
    ((entries as f64) / f64::from(load_factor)).ceil() as usize
}

#[derive(Clone, Debug)]
pub(crate) struct RawTable<K, H> {
    slots: Vec<Slot<K>>,
    size: usize,
    removed: usize,
    // EMPTY slots; when it reaches zero the tombstones are purged.
    free: usize,
    max_size: usize,
    load_factor: f32,
    strategy: H,
    latch: ProbeLatch,
}

impl<K, H> RawTable<K, H> {
    pub(crate) fn new(config: &HashConfig, strategy: H) -> Result<Self> {
        config.validate()?;
        Ok(Self::sized(config, strategy))
    }

    /// Default sizing, built the same way as [`new`](Self::new). The default
    /// configuration always validates.
    pub(crate) fn with_default_config(strategy: H) -> Self {
        let config = HashConfig::default();
        debug_assert!(config.validate().is_ok());
        Self::sized(&config, strategy)
    }

    // `config` must already be validated.
    fn sized(config: &HashConfig, strategy: H) -> Self {
        let capacity = primes::next_prime(config.initial_capacity);
        let load_factor = config.load_factor;
        log::trace!(
            "allocating table: {} slots, load factor {}",
            capacity,
            load_factor
        );
        Self {
            slots: empty_slots(capacity),
            size: 0,
            removed: 0,
            free: capacity,
            max_size: max_size_for(capacity, load_factor),
            load_factor,
            strategy,
            latch: ProbeLatch::new(),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn max_size(&self) -> usize {
        self.max_size
    }

    pub(crate) fn removed(&self) -> usize {
        self.removed
    }

    #[cfg(test)]
    pub(crate) fn free(&self) -> usize {
        self.free
    }

    pub(crate) fn load_factor(&self) -> f32 {
        self.load_factor
    }

    pub(crate) fn strategy(&self) -> &H {
        &self.strategy
    }

    pub(crate) fn slot(&self, index: usize) -> &Slot<K> {
        &self.slots[index]
    }

    pub(crate) fn slots(&self) -> &[Slot<K>] {
        &self.slots
    }

    pub(crate) fn key_at(&self, index: usize) -> Option<&K> {
        match self.slots.get(index) {
            Some(Slot::Full(key)) => Some(key),
            _ => None,
        }
    }

    pub(crate) fn into_slots(self) -> Vec<Slot<K>> {
        self.slots
    }

    /// FULL slots in slot-array order.
    pub(crate) fn iter(&self) -> FullSlots<'_, K> {
        FullSlots {
            slots: self.slots.iter().enumerate(),
            remaining: self.size,
        }
    }

    /// Marks every slot EMPTY. Capacity is kept.
    pub(crate) fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = Slot::Empty;
        }
        self.size = 0;
        self.removed = 0;
        self.free = self.capacity();
    }

    /// Stores `key` at a slot obtained from `insert_slot` as `Vacant`.
    ///
    /// Returns a requested capacity when the insert leaves the table in need
    /// of a rehash: a grown capacity once `size > max_size`, or the current
    /// capacity when no EMPTY slot is left. The caller must follow up with
    /// `rehash_to(primes::next_prime(requested), ..)`.
    pub(crate) fn occupy(&mut self, index: usize, key: K) -> Option<usize> {
        match mem::replace(&mut self.slots[index], Slot::Full(key)) {
            Slot::Empty => self.free -= 1,
            Slot::Removed => self.removed -= 1,
            Slot::Full(_) => unreachable!("occupy on a FULL slot"),
        }
        self.size += 1;

        if self.size > self.max_size {
            Some(self.grown_capacity())
        } else if self.free == 0 {
            Some(self.capacity())
        } else {
            None
        }
    }

    /// Turns a FULL slot into a tombstone and hands back its key.
    pub(crate) fn vacate(&mut self, index: usize) -> K {
        match mem::replace(&mut self.slots[index], Slot::Removed) {
            Slot::Full(key) => {
                self.size -= 1;
                self.removed += 1;
                key
            }
            _ => unreachable!("vacate on a slot that is not FULL"),
        }
    }

    fn grown_capacity(&self) -> usize {
        let doubled = self.capacity().saturating_mul(2);
        let needed = slots_for(self.size, self.load_factor).saturating_add(1);
        doubled.max(needed)
    }

    /// Capacity for a tombstone-free table sized to the current `size`: the
    /// smallest prime whose budget covers it, never above the current
    /// capacity while that still covers it.
    pub(crate) fn compact_capacity(&self) -> usize {
        let fitting = fitting_capacity(self.size, self.load_factor);
        if self.max_size >= self.size {
            fitting.min(self.capacity())
        } else {
            fitting
        }
    }

    /// Requested capacity when `additional` more entries would overflow the
    /// current load-factor budget, `None` when they already fit.
    pub(crate) fn reserve_capacity(&self, additional: usize) -> Option<usize> {
        if additional <= self.max_size.saturating_sub(self.size) {
            return None;
        }
        Some(fitting_capacity(
            additional.saturating_add(self.size),
            self.load_factor,
        ))
    }
}

/// Smallest prime capacity whose `max_size` is at least `entries`.
fn fitting_capacity(entries: usize, load_factor: f32) -> usize {
    // Lower bound only; the loop settles float rounding either way.
    let lower = ((entries as f64) / f64::from(load_factor)).floor() as usize;
    let mut capacity = primes::next_prime(lower.max(entries.saturating_add(1)));
    while max_size_for(capacity, load_factor) < entries && capacity < usize::MAX {
        capacity = primes::next_prime(capacity + 1);
    }
    capacity
}

impl<K, H> RawTable<K, H> {
    /// Find-only probe: the index holding a key equal to `key`.
    pub(crate) fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashingStrategy<Q>,
    {
        let _g = self.latch.enter();
        let hash = self.strategy.hash(key);
        for index in ProbeSeq::new(hash, self.capacity()) {
            match &self.slots[index] {
                Slot::Empty => return None,
                Slot::Full(stored) if self.strategy.equals(stored.borrow(), key) => {
                    return Some(index)
                }
                _ => {}
            }
        }
        None
    }

    /// Locates `key` or the slot it should be inserted into.
    ///
    /// Tombstones do not stop the walk, since the key may sit further along
    /// the sequence, but the first one seen is remembered and preferred over
    /// the EMPTY slot that ends the walk.
    pub(crate) fn insert_slot(&self, key: &K) -> InsertSlot
    where
        H: HashingStrategy<K>,
    {
        let _g = self.latch.enter();
        let hash = self.strategy.hash(key);
        let mut first_removed = None;
        for index in ProbeSeq::new(hash, self.capacity()) {
            match &self.slots[index] {
                Slot::Empty => return InsertSlot::Vacant(first_removed.unwrap_or(index)),
                Slot::Full(stored) => {
                    if self.strategy.equals(stored, key) {
                        return InsertSlot::Occupied(index);
                    }
                }
                Slot::Removed => {
                    if first_removed.is_none() {
                        first_removed = Some(index);
                    }
                }
            }
        }
        // `size <= max_size < capacity` keeps at least one slot non-FULL.
        match first_removed {
            Some(index) => InsertSlot::Vacant(index),
            None => unreachable!("probe sequence found no free slot"),
        }
    }

    /// Rebuilds the slot array with exactly `capacity` slots, dropping every
    /// tombstone. `relocate(from, to)` is called once per live key so the
    /// caller can move its parallel payload.
    ///
    /// All strategy calls happen before any slot moves, so a panicking
    /// strategy leaves the table as it was.
    pub(crate) fn rehash_to(&mut self, capacity: usize, mut relocate: impl FnMut(usize, usize))
    where
        H: HashingStrategy<K>,
    {
        debug_assert!(capacity > self.size);
        let old_capacity = self.capacity();
        let dropped = self.removed;

        let mut taken = vec![false; capacity];
        let mut moves = Vec::with_capacity(self.size);
        {
            let _g = self.latch.enter();
            for (from, key) in self.iter() {
                let hash = self.strategy.hash(key);
                let to = ProbeSeq::new(hash, capacity)
                    .find(|&i| !taken[i])
                    .unwrap_or_else(|| unreachable!("rehash target has no free slot"));
                taken[to] = true;
                moves.push((from, to));
            }
        }

        let mut old = mem::replace(&mut self.slots, empty_slots(capacity));
        for (from, to) in moves {
            self.slots[to] = mem::replace(&mut old[from], Slot::Empty);
            relocate(from, to);
        }

        self.removed = 0;
        self.free = capacity - self.size;
        self.max_size = max_size_for(capacity, self.load_factor);
        log::debug!(
            "rehashed table: {} -> {} slots, {} live, {} tombstones dropped",
            old_capacity,
            capacity,
            self.size,
            dropped
        );
    }
}

/// Iterator over `(index, key)` for every FULL slot, in slot order.
pub(crate) struct FullSlots<'a, K> {
    slots: Enumerate<slice::Iter<'a, Slot<K>>>,
    remaining: usize,
}

impl<K> Clone for FullSlots<'_, K> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K> Iterator for FullSlots<'a, K> {
    type Item = (usize, &'a K);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for (index, slot) in self.slots.by_ref() {
            if let Slot::Full(key) = slot {
                self.remaining -= 1;
                return Some((index, key));
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for FullSlots<'_, K> {}
impl<K> FusedIterator for FullSlots<'_, K> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{FnStrategy, Natural};
    use std::collections::BTreeSet;

    type Table<K> = RawTable<K, Natural>;

    fn table<K>(capacity: usize, load_factor: f32) -> Table<K> {
        RawTable::new(&HashConfig::new(capacity, load_factor), Natural::default()).unwrap()
    }

    // Insert driver mirroring what the containers do.
    fn add<K, H: HashingStrategy<K>>(t: &mut RawTable<K, H>, key: K) -> bool {
        match t.insert_slot(&key) {
            InsertSlot::Occupied(_) => false,
            InsertSlot::Vacant(i) => {
                if let Some(requested) = t.occupy(i, key) {
                    t.rehash_to(primes::next_prime(requested), |_, _| {});
                }
                true
            }
        }
    }

    fn remove<K, H: HashingStrategy<K>>(t: &mut RawTable<K, H>, key: &K) -> bool {
        match t.find(key) {
            Some(i) => {
                t.vacate(i);
                true
            }
            None => false,
        }
    }

    fn tombstones<K, H>(t: &RawTable<K, H>) -> usize {
        t.slots().iter().filter(|s| matches!(s, Slot::Removed)).count()
    }

    /// Invariant: a probe sequence over a prime capacity visits every slot once.
    #[test]
    fn probe_sequence_is_a_permutation() {
        for &cap in &[3usize, 5, 11, 13, 23, 97] {
            for hash in [0u64, 1, 4, 17, u64::MAX, 0xdead_beef] {
                let seen: BTreeSet<usize> = ProbeSeq::new(hash, cap).collect();
                assert_eq!(seen.len(), cap, "cap {} hash {}", cap, hash);
                assert_eq!(ProbeSeq::new(hash, cap).count(), cap);
            }
        }
    }

    /// Invariant: `max_size = floor(capacity * lf)`, capped at `capacity - 1`.
    #[test]
    fn max_size_from_load_factor() {
        let t: Table<i32> = table(11, 0.5);
        assert_eq!(t.capacity(), 11);
        assert_eq!(t.max_size(), 5);

        let t: Table<i32> = table(11, 1.0);
        assert_eq!(t.max_size(), 10);

        let t: Table<i32> = table(20, 0.75);
        assert_eq!(t.capacity(), 23);
        assert_eq!(t.max_size(), 17);
    }

    /// Invariant: a removed colliding key leaves a tombstone that the next
    /// colliding key reclaims at exactly the same index.
    #[test]
    fn tombstone_reused_on_collision() {
        let strategy = FnStrategy::new(|_: &u32| 4, |a: &u32, b: &u32| a == b);
        let mut t: RawTable<u32, _> = RawTable::new(&HashConfig::new(11, 0.5), strategy).unwrap();

        assert!(add(&mut t, 1));
        let idx = match t.insert_slot(&2) {
            InsertSlot::Vacant(i) => i,
            other => panic!("unexpected {:?}", other),
        };
        assert!(add(&mut t, 2));
        assert_eq!(t.slot(idx), &Slot::Full(2));

        assert!(remove(&mut t, &2));
        assert_eq!(t.slot(idx), &Slot::Removed);
        assert_eq!(t.removed(), 1);

        assert_eq!(t.insert_slot(&3), InsertSlot::Vacant(idx));
        assert!(add(&mut t, 3));
        assert_eq!(t.slot(idx), &Slot::Full(3));
        assert_eq!(t.removed(), 0);
    }

    /// Invariant: keys behind a tombstone stay reachable, and inserting one of
    /// them again reports `Occupied` rather than reusing the tombstone.
    #[test]
    fn probing_continues_past_tombstones() {
        let strategy = FnStrategy::new(|_: &u32| 7, |a: &u32, b: &u32| a == b);
        let mut t: RawTable<u32, _> = RawTable::new(&HashConfig::new(11, 0.5), strategy).unwrap();
        for k in 1..=4 {
            assert!(add(&mut t, k));
        }
        assert!(remove(&mut t, &1));
        assert!(remove(&mut t, &2));
        let at = t.find(&4).expect("key after tombstones");
        assert_eq!(t.insert_slot(&4), InsertSlot::Occupied(at));
        assert!(!add(&mut t, 4));
        assert_eq!(t.len(), 2);
    }

    /// Invariant: growth lands on a prime capacity with `max_size >= size`.
    #[test]
    fn growth_keeps_budget_above_size() {
        let mut t: Table<i32> = table(11, 0.5);
        for i in 0..6 {
            add(&mut t, i);
        }
        assert_eq!(t.len(), 6);
        assert!(t.max_size() > 6);
        assert!(primes::is_prime(t.capacity() as u64));

        let mut t: Table<i32> = table(11, 1.0);
        assert_eq!(t.max_size(), 10);
        for i in 0..12 {
            add(&mut t, i);
        }
        assert!(t.max_size() > 12);

        let mut t: Table<i32> = table(3, 0.05);
        for i in 0..50 {
            add(&mut t, i);
            assert!(t.max_size() >= t.len());
        }
    }

    /// Invariant: rehashing drops tombstones and keeps every live key findable;
    /// the relocation callback sees each live key exactly once.
    #[test]
    fn rehash_drops_tombstones() {
        let mut t: Table<i32> = table(11, 0.5);
        for i in 0..5 {
            add(&mut t, i);
        }
        remove(&mut t, &1);
        remove(&mut t, &3);
        assert_eq!(tombstones(&t), 2);

        let before: Vec<(usize, i32)> = t.iter().map(|(i, k)| (i, *k)).collect();
        let mut moved = Vec::new();
        t.rehash_to(23, |from, to| moved.push((from, to)));

        assert_eq!(t.capacity(), 23);
        assert_eq!(tombstones(&t), 0);
        assert_eq!(t.removed(), 0);
        assert_eq!(moved.len(), 3);
        for (from, to) in moved {
            let key = before.iter().find(|(i, _)| *i == from).unwrap().1;
            assert_eq!(t.key_at(to), Some(&key));
        }
        for k in [0, 2, 4] {
            assert!(t.find(&k).is_some());
        }
        for k in [1, 3] {
            assert!(t.find(&k).is_none());
        }
    }

    /// Invariant: insert/remove churn never exhausts EMPTY slots; the table
    /// purges tombstones instead, and bookkeeping always sums to capacity.
    #[test]
    fn churn_purges_tombstones() {
        let mut t: Table<u64> = table(11, 1.0);
        for k in 0..9 {
            add(&mut t, k);
        }
        for k in 100..400u64 {
            add(&mut t, k);
            remove(&mut t, &k);
            assert_eq!(t.len(), 9);
            assert!(t.free() >= 1);
            assert_eq!(t.len() + t.removed() + t.free(), t.capacity());
            assert_eq!(tombstones(&t), t.removed());
        }
        for k in 0..9 {
            assert!(t.find(&k).is_some());
        }
    }

    #[test]
    fn clear_resets_bookkeeping() {
        let mut t: Table<i32> = table(11, 0.5);
        for i in 0..4 {
            add(&mut t, i);
        }
        remove(&mut t, &0);
        t.clear();
        assert_eq!(t.len(), 0);
        assert_eq!(t.removed(), 0);
        assert_eq!(t.capacity(), 11);
        assert!(t.slots().iter().all(|s| *s == Slot::Empty));
        assert!(t.find(&1).is_none());
    }

    /// Invariant: compaction sizes for the live count, not the historical peak.
    #[test]
    fn compact_capacity_tracks_live_size() {
        let mut t: Table<i32> = table(11, 0.5);
        for i in 0..1000 {
            add(&mut t, i);
        }
        assert!(t.max_size() > 1000);
        for i in (0..1000).step_by(2) {
            remove(&mut t, &i);
        }
        let cap = primes::next_prime(t.compact_capacity());
        t.rehash_to(cap, |_, _| {});
        assert_eq!(t.len(), 500);
        assert_eq!(t.capacity(), 1009);
        assert!(t.max_size() < 1000);
        assert!(t.max_size() >= 500);
    }

    /// Invariant: when `capacity * lf` is a whole number, compaction keeps
    /// the capacity instead of stepping to the next prime.
    #[test]
    fn compact_keeps_capacity_on_exact_budget() {
        let mut t: Table<i32> = table(5, 0.2);
        assert_eq!(t.max_size(), 1);
        add(&mut t, 7);
        assert_eq!(t.compact_capacity(), 5);
        t.rehash_to(primes::next_prime(t.compact_capacity()), |_, _| {});
        assert_eq!(t.capacity(), 5);

        let mut t: Table<i32> = table(3, 1.0 / 3.0);
        assert_eq!(t.max_size(), 1);
        add(&mut t, 7);
        assert_eq!(t.compact_capacity(), 3);
    }

    /// Invariant: the compaction target is the smallest tabulated prime whose
    /// budget covers the live size, and never exceeds the current capacity.
    #[test]
    fn compact_capacity_is_smallest_fitting_prime() {
        for &lf in &[0.05f32, 0.2, 1.0 / 3.0, 0.5, 0.7, 0.75, 1.0] {
            let mut t: Table<u32> = table(3, lf);
            for k in 0..300u32 {
                add(&mut t, k);
                let before = t.capacity();
                let cap = t.compact_capacity();
                assert!(cap <= before, "lf {} size {}: {} > {}", lf, t.len(), cap, before);
                assert!(primes::is_prime(cap as u64));
                assert!(max_size_for(cap, lf) >= t.len());
                if let Some(&smaller) = primes::PRIMES.iter().rev().find(|&&p| (p as usize) < cap) {
                    assert!(max_size_for(smaller as usize, lf) < t.len());
                }
            }
        }
    }

    #[test]
    fn reserve_capacity_only_when_needed() {
        let t: Table<i32> = table(11, 0.5);
        assert_eq!(t.reserve_capacity(5), None);
        let requested = t.reserve_capacity(100).unwrap();
        assert!(max_size_for(primes::next_prime(requested), 0.5) >= 100);
    }

    /// Invariant (debug-only): a strategy that probes the same table from
    /// inside `equals` trips the probe latch.
    #[cfg(debug_assertions)]
    #[test]
    fn reentrant_strategy_panics() {
        use core::cell::Cell;

        struct Key {
            id: u32,
            table: Cell<*const RawTable<Key, Reenter>>,
        }
        struct Reenter;
        impl HashingStrategy<Key> for Reenter {
            fn hash(&self, _: &Key) -> u64 {
                0
            }
            fn equals(&self, a: &Key, b: &Key) -> bool {
                let t = b.table.get();
                if !t.is_null() {
                    // Probe the same table while it is mid-probe.
                    let probe = Key {
                        id: a.id,
                        table: Cell::new(core::ptr::null()),
                    };
                    unsafe {
                        let _ = (*t).find(&probe);
                    }
                }
                a.id == b.id
            }
        }

        let mut t: RawTable<Key, Reenter> =
            RawTable::new(&HashConfig::default(), Reenter).unwrap();
        let stored = Key {
            id: 1,
            table: Cell::new(core::ptr::null()),
        };
        add(&mut t, stored);

        let query = Key {
            id: 2,
            table: Cell::new(&t as *const _),
        };
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = t.find(&query);
        }));
        assert!(res.is_err(), "expected re-entry to panic in debug builds");
    }
}
