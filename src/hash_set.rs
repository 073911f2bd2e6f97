//! HashSet: the bare key table with a set-shaped API.

use crate::config::HashConfig;
use crate::error::Result;
use crate::primes;
use crate::raw_table::{FullSlots, InsertSlot, RawTable, Slot};
use crate::strategy::{stable_hash, HashingStrategy, Natural};
use crate::views::{fill_array, Membership};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;

/// Open-addressing set over a prime-sized slot array.
#[derive(Clone)]
pub struct HashSet<K, H = Natural> {
    table: RawTable<K, H>,
}

impl<K> HashSet<K> {
    /// Empty set with 11 slots and load factor 0.5.
    pub fn new() -> Self {
        Self::with_strategy(Natural::default())
    }

    pub fn with_capacity(initial_capacity: usize) -> Result<Self> {
        Self::with_config(
            HashConfig::default().with_capacity(initial_capacity),
            Natural::default(),
        )
    }

    pub fn with_capacity_and_load_factor(initial_capacity: usize, load_factor: f32) -> Result<Self> {
        Self::with_config(
            HashConfig::new(initial_capacity, load_factor),
            Natural::default(),
        )
    }
}

impl<K, H: Default> Default for HashSet<K, H> {
    fn default() -> Self {
        Self::with_strategy(H::default())
    }
}

impl<K, H> HashSet<K, H> {
    pub fn with_strategy(strategy: H) -> Self {
        Self {
            table: RawTable::with_default_config(strategy),
        }
    }

    pub fn with_config(config: HashConfig, strategy: H) -> Result<Self> {
        Ok(Self {
            table: RawTable::new(&config, strategy)?,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of slots, always prime.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Element count above which the next insert grows the table.
    pub fn max_size(&self) -> usize {
        self.table.max_size()
    }

    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    pub fn strategy(&self) -> &H {
        self.table.strategy()
    }

    /// Elements in slot order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            slots: self.table.iter(),
        }
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn to_vec(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Copies the elements into `dest`; see [`KeySet::to_array_in`] for the
    /// sizing contract.
    ///
    /// [`KeySet::to_array_in`]: crate::KeySet::to_array_in
    pub fn to_array_in(&self, dest: Vec<Option<K>>) -> Vec<Option<K>>
    where
        K: Clone,
    {
        fill_array(self.iter().cloned(), dest)
    }

    /// Wrapping sum of the element hashes.
    pub fn hash_code(&self) -> u64
    where
        K: Hash,
    {
        self.iter()
            .fold(0u64, |acc, k| acc.wrapping_add(stable_hash(k)))
    }

    /// Slot index of `key`; test hook for probing behavior.
    #[cfg(test)]
    pub(crate) fn slot_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashingStrategy<Q>,
    {
        self.table.find(key)
    }
}

impl<K, H> HashSet<K, H> {
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashingStrategy<Q>,
    {
        self.table.find(key).is_some()
    }

    /// The stored element equal to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashingStrategy<Q>,
    {
        self.table.find(key).and_then(|index| self.table.key_at(index))
    }

    pub fn contains_all<'b, I>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = &'b K>,
        K: 'b,
        H: HashingStrategy<K>,
    {
        keys.into_iter().all(|k| self.contains(k))
    }

    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashingStrategy<Q>,
    {
        self.take(key).is_some()
    }

    /// Removes and returns the stored element equal to `key`.
    pub fn take<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashingStrategy<Q>,
    {
        self.table.find(key).map(|index| self.table.vacate(index))
    }

    /// Keeps the elements for which `keep` returns true. Returns whether
    /// anything was removed.
    pub fn retain<F>(&mut self, mut keep: F) -> bool
    where
        F: FnMut(&K) -> bool,
    {
        let before = self.table.len();
        for index in 0..self.table.capacity() {
            let drop_it = match self.table.slot(index) {
                Slot::Full(key) => !keep(key),
                _ => false,
            };
            if drop_it {
                self.table.vacate(index);
            }
        }
        before != self.table.len()
    }

    pub fn remove_all<M>(&mut self, other: &M) -> bool
    where
        M: Membership<K> + ?Sized,
    {
        self.retain(|k| !other.has(k))
    }

    pub fn retain_all<M>(&mut self, other: &M) -> bool
    where
        M: Membership<K> + ?Sized,
    {
        self.retain(|k| other.has(k))
    }
}

impl<K, H> HashSet<K, H>
where
    H: HashingStrategy<K>,
{
    fn rehash(&mut self, requested: usize) {
        self.table
            .rehash_to(primes::next_prime(requested), |_, _| {});
    }

    /// Adds `key`. Returns false, keeping the stored element, when an equal
    /// element is already present.
    pub fn insert(&mut self, key: K) -> bool {
        match self.table.insert_slot(&key) {
            InsertSlot::Occupied(_) => false,
            InsertSlot::Vacant(index) => {
                if let Some(requested) = self.table.occupy(index, key) {
                    self.rehash(requested);
                }
                true
            }
        }
    }

    /// Inserts every element. Returns whether the set changed.
    pub fn add_all<I>(&mut self, keys: I) -> bool
    where
        I: IntoIterator<Item = K>,
    {
        let iter = keys.into_iter();
        self.ensure_capacity(iter.size_hint().0);
        let mut changed = false;
        for k in iter {
            changed |= self.insert(k);
        }
        changed
    }

    /// Rebuilds at the smallest prime capacity that fits the current size,
    /// dropping every tombstone.
    pub fn compact(&mut self) {
        let requested = self.table.compact_capacity();
        self.rehash(requested);
    }

    /// Makes room for `additional` more elements without intermediate growth.
    pub fn ensure_capacity(&mut self, additional: usize) {
        if let Some(requested) = self.table.reserve_capacity(additional) {
            self.rehash(requested);
        }
    }
}

impl<K, H: HashingStrategy<K>> Membership<K> for HashSet<K, H> {
    fn has(&self, item: &K) -> bool {
        self.contains(item)
    }
}

impl<K, H: HashingStrategy<K>> Extend<K> for HashSet<K, H> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl<K, H: HashingStrategy<K> + Default> FromIterator<K> for HashSet<K, H> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::default();
        set.add_all(iter);
        set
    }
}

/// Same size and every element of `self` is in `other` (under `other`'s
/// strategy).
impl<K, H: HashingStrategy<K>> PartialEq for HashSet<K, H> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|k| other.contains(k))
    }
}

impl<K, H: HashingStrategy<K>> Eq for HashSet<K, H> {}

impl<K: Hash, H> Hash for HashSet<K, H> {
    fn hash<S: Hasher>(&self, state: &mut S) {
        state.write_u64(self.hash_code());
    }
}

impl<K: fmt::Debug, H> fmt::Debug for HashSet<K, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// `{a,b,c}` in slot order.
impl<K: fmt::Display, H> fmt::Display for HashSet<K, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, k) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", k)?;
        }
        f.write_str("}")
    }
}

impl<'a, K, H> IntoIterator for &'a HashSet<K, H> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, H> IntoIterator for HashSet<K, H> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    fn into_iter(self) -> Self::IntoIter {
        let remaining = self.table.len();
        IntoIter {
            slots: self.table.into_slots().into_iter(),
            remaining,
        }
    }
}

pub struct Iter<'a, K> {
    slots: FullSlots<'a, K>,
}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<&'a K> {
        self.slots.next().map(|(_, k)| k)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}
impl<K> FusedIterator for Iter<'_, K> {}

pub struct IntoIter<K> {
    slots: std::vec::IntoIter<Slot<K>>,
    remaining: usize,
}

impl<K> Iterator for IntoIter<K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        for slot in self.slots.by_ref() {
            if let Slot::Full(key) = slot {
                self.remaining -= 1;
                return Some(key);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for IntoIter<K> {}
impl<K> FusedIterator for IntoIter<K> {}
