//! HashMap: key table plus a parallel value column and no-entry sentinels.
//!
//! Values live in a `Vec<V>` indexed exactly like the key slots. Slots that
//! are not FULL hold a clone of the no-entry value, so a removed value is
//! dropped at removal time rather than lingering in the column.
//!
//! Two lookup styles are offered:
//!
//! - The sentinel API (`put`, `get`, `remove`, `put_if_absent`) returns the
//!   no-entry value for "absent". Storing that value yourself makes those
//!   results ambiguous; use the `Option` API to tell the cases apart.
//! - The `Option` API (`insert`, `get_ref`, `get_mut`, `remove_entry`).

use crate::config::HashConfig;
use crate::error::Result;
use crate::primes;
use crate::raw_table::{FullSlots, InsertSlot, RawTable, Slot};
use crate::strategy::{stable_hash, HashingStrategy, Natural};
use crate::views::{EntrySet, KeySet, ValueCollection};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::{FusedIterator, Zip};
use core::mem;
use core::ops::{AddAssign, Index};
use core::slice;

/// Open-addressing map over a prime-sized slot array.
///
/// `H` decides key hashing and equality. Lookups accept any borrowed form
/// `Q` of the key that the strategy also understands.
#[derive(Clone)]
pub struct HashMap<K, V, H = Natural> {
    table: RawTable<K, H>,
    values: Vec<V>,
    no_entry_key: Option<K>,
    no_entry_value: V,
}

impl<K, V> HashMap<K, V>
where
    V: Clone + Default,
{
    /// Empty map with 11 slots and load factor 0.5.
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

impl<K, V, H> Default for HashMap<K, V, H>
where
    V: Clone + Default,
    H: Default,
{
    fn default() -> Self {
        Self::with_strategy(H::default())
    }
}

impl<K, V, H> HashMap<K, V, H>
where
    V: Clone + Default,
{
    /// Default sizing with a caller-supplied strategy.
    pub fn with_strategy(strategy: H) -> Self {
        let table = RawTable::with_default_config(strategy);
        Self::from_table(table, None, V::default())
    }

    pub fn with_config(config: HashConfig, strategy: H) -> Result<Self> {
        Self::with_no_entry(config, strategy, None, V::default())
    }
}

impl<K, V, H> HashMap<K, V, H>
where
    V: Clone,
{
    /// Fully specified construction.
    ///
    /// `no_entry_value` is returned by the sentinel API for absent keys.
    /// `no_entry_key` is only recorded (and reported back through
    /// [`no_entry_key`](Self::no_entry_key)); the map never checks keys
    /// against it.
    pub fn with_no_entry(
        config: HashConfig,
        strategy: H,
        no_entry_key: Option<K>,
        no_entry_value: V,
    ) -> Result<Self> {
        let table = RawTable::new(&config, strategy)?;
        Ok(Self::from_table(table, no_entry_key, no_entry_value))
    }

    fn from_table(table: RawTable<K, H>, no_entry_key: Option<K>, no_entry_value: V) -> Self {
        let values = vec![no_entry_value.clone(); table.capacity()];
        Self {
            table,
            values,
            no_entry_key,
            no_entry_value,
        }
    }
}

impl<K, V, H> HashMap<K, V, H> {
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

    /// Entry count above which the next insert grows the table.
    pub fn max_size(&self) -> usize {
        self.table.max_size()
    }

    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    pub fn no_entry_key(&self) -> Option<&K> {
        self.no_entry_key.as_ref()
    }

    pub fn no_entry_value(&self) -> &V {
        &self.no_entry_value
    }

    pub fn strategy(&self) -> &H {
        self.table.strategy()
    }

    /// Entries in slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.table.iter(),
            values: &self.values,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.slots().iter().zip(self.values.iter_mut()),
            remaining: self.table.len(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K> {
        Keys {
            slots: self.table.iter(),
        }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Walks the entries in slot order and allows removing the current one.
    pub fn cursor(&mut self) -> Cursor<'_, K, V, H> {
        Cursor {
            map: self,
            next: 0,
            current: None,
        }
    }

    /// Live key view.
    pub fn key_set(&mut self) -> KeySet<'_, K, V, H> {
        KeySet::new(self)
    }

    /// Live value view.
    pub fn value_collection(&mut self) -> ValueCollection<'_, K, V, H> {
        ValueCollection::new(self)
    }

    /// Live entry view.
    pub fn entry_set(&mut self) -> EntrySet<'_, K, V, H> {
        EntrySet::new(self)
    }

    pub(crate) fn entry_at(&self, index: usize) -> Option<(&K, &V)> {
        self.table.key_at(index).map(|k| (k, &self.values[index]))
    }

    #[cfg(test)]
    pub(crate) fn table(&self) -> &RawTable<K, H> {
        &self.table
    }

    /// Slot index of the first entry, in slot order, matching `pred`.
    pub(crate) fn position<F>(&self, mut pred: F) -> Option<usize>
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.table
            .iter()
            .find(|&(index, key)| pred(key, &self.values[index]))
            .map(|(index, _)| index)
    }

    pub(crate) fn entry_at_mut(&mut self, index: usize) -> Option<(&K, &mut V)> {
        match self.table.slot(index) {
            Slot::Full(key) => Some((key, &mut self.values[index])),
            _ => None,
        }
    }
}

impl<K, V, H> HashMap<K, V, H>
where
    V: Clone,
{
    /// Takes the entry at a FULL slot, leaving a tombstone and a sentinel
    /// value behind.
    pub(crate) fn remove_at(&mut self, index: usize) -> (K, V) {
        let key = self.table.vacate(index);
        let value = mem::replace(&mut self.values[index], self.no_entry_value.clone());
        (key, value)
    }

    pub fn clear(&mut self) {
        self.table.clear();
        for value in &mut self.values {
            *value = self.no_entry_value.clone();
        }
    }

    /// Keeps the entries for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        for index in 0..self.table.capacity() {
            let drop_it = match self.table.slot(index) {
                Slot::Full(key) => !keep(key, &mut self.values[index]),
                _ => false,
            };
            if drop_it {
                self.remove_at(index);
            }
        }
    }

    /// Replaces every value with `f(value)`.
    pub fn transform_values<F>(&mut self, mut f: F)
    where
        F: FnMut(&V) -> V,
    {
        for (_, value) in self.iter_mut() {
            *value = f(&*value);
        }
    }

    /// True when some entry holds `value`. Linear in the number of slots.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }
}

impl<K, V, H> HashMap<K, V, H>
where
    V: Clone,
    H: HashingStrategy<K>,
{
    fn rehash(&mut self, requested: usize) {
        let capacity = primes::next_prime(requested);
        let mut values = vec![self.no_entry_value.clone(); capacity];
        let old = &mut self.values;
        self.table
            .rehash_to(capacity, |from, to| mem::swap(&mut values[to], &mut old[from]));
        self.values = values;
    }

    fn fill(&mut self, index: usize, key: K, value: V) {
        self.values[index] = value;
        if let Some(requested) = self.table.occupy(index, key) {
            self.rehash(requested);
        }
    }

    /// Inserts or overwrites. Returns the previous value, if any. An existing
    /// key keeps its originally stored instance.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.table.insert_slot(&key) {
            InsertSlot::Occupied(index) => Some(mem::replace(&mut self.values[index], value)),
            InsertSlot::Vacant(index) => {
                self.fill(index, key, value);
                None
            }
        }
    }

    /// Like [`insert`](Self::insert) but reports absence as the no-entry value.
    pub fn put(&mut self, key: K, value: V) -> V {
        self.insert(key, value)
            .unwrap_or_else(|| self.no_entry_value.clone())
    }

    /// Stores `value` only when `key` is absent. Returns the value already
    /// present, or the no-entry value when the insert happened.
    pub fn put_if_absent(&mut self, key: K, value: V) -> V {
        match self.table.insert_slot(&key) {
            InsertSlot::Occupied(index) => self.values[index].clone(),
            InsertSlot::Vacant(index) => {
                self.fill(index, key, value);
                self.no_entry_value.clone()
            }
        }
    }

    pub fn put_all<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.extend(entries);
    }

    /// Adds `amount` to the value stored under `key`. Returns false, changing
    /// nothing, when the key is absent.
    pub fn adjust_value<Q>(&mut self, key: &Q, amount: V) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashingStrategy<Q>,
        V: AddAssign,
    {
        match self.get_mut(key) {
            Some(value) => {
                *value += amount;
                true
            }
            None => false,
        }
    }

    /// Adds `adjust_amount` to an existing value or stores `put_amount` for a
    /// new key. Returns the value now stored.
    pub fn adjust_or_put_value(&mut self, key: K, adjust_amount: V, put_amount: V) -> V
    where
        V: AddAssign,
    {
        match self.table.insert_slot(&key) {
            InsertSlot::Occupied(index) => {
                self.values[index] += adjust_amount;
                self.values[index].clone()
            }
            InsertSlot::Vacant(index) => {
                self.fill(index, key, put_amount.clone());
                put_amount
            }
        }
    }

    /// Rebuilds the table at the smallest prime capacity that fits the
    /// current size under the load factor, dropping every tombstone.
    pub fn compact(&mut self) {
        let requested = self.table.compact_capacity();
        self.rehash(requested);
    }

    /// Makes room for `additional` more entries without intermediate growth.
    pub fn ensure_capacity(&mut self, additional: usize) {
        if let Some(requested) = self.table.reserve_capacity(additional) {
            self.rehash(requested);
        }
    }
}

impl<K, V, H> HashMap<K, V, H>
where
    V: Clone,
{
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashingStrategy<Q>,
    {
        self.table.find(key).is_some()
    }

    /// Stored value, or the no-entry value when `key` is absent.
    pub fn get<Q>(&self, key: &Q) -> V
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashingStrategy<Q>,
    {
        self.get_ref(key)
            .cloned()
            .unwrap_or_else(|| self.no_entry_value.clone())
    }

    pub fn get_ref<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashingStrategy<Q>,
    {
        self.table.find(key).map(|index| &self.values[index])
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashingStrategy<Q>,
    {
        self.table.find(key).map(|index| &mut self.values[index])
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashingStrategy<Q>,
    {
        self.table.find(key).and_then(|index| self.entry_at(index))
    }

    /// Removes `key`, returning its value or the no-entry value when absent.
    pub fn remove<Q>(&mut self, key: &Q) -> V
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashingStrategy<Q>,
    {
        match self.remove_entry(key) {
            Some((_, value)) => value,
            None => self.no_entry_value.clone(),
        }
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashingStrategy<Q>,
    {
        self.table.find(key).map(|index| self.remove_at(index))
    }
}

impl<K, V, H> HashMap<K, V, H> {
    /// Order-independent content hash: the wrapping sum over entries of
    /// `hash(key) ^ hash(value)`.
    pub fn hash_code(&self) -> u64
    where
        K: Hash,
        V: Hash,
    {
        self.iter()
            .fold(0u64, |acc, (k, v)| acc.wrapping_add(entry_hash(k, v)))
    }
}

pub(crate) fn entry_hash<K: Hash + ?Sized, V: Hash + ?Sized>(key: &K, value: &V) -> u64 {
    stable_hash(key) ^ stable_hash(value)
}

impl<K, V, H> Extend<(K, V)> for HashMap<K, V, H>
where
    V: Clone,
    H: HashingStrategy<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.ensure_capacity(iter.size_hint().0);
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, H> FromIterator<(K, V)> for HashMap<K, V, H>
where
    V: Clone + Default,
    H: HashingStrategy<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

/// Equal when both hold the same keys (under `self`'s strategy) mapped to
/// equal values. Sizing and sentinels are not compared.
impl<K, V, H> PartialEq for HashMap<K, V, H>
where
    V: Clone + PartialEq,
    H: HashingStrategy<K>,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get_ref(k).map_or(false, |o| o == v))
    }
}

impl<K, V, H> Eq for HashMap<K, V, H>
where
    V: Clone + Eq,
    H: HashingStrategy<K>,
{
}

impl<K: Hash, V: Hash, H> Hash for HashMap<K, V, H> {
    fn hash<S: Hasher>(&self, state: &mut S) {
        state.write_u64(self.hash_code());
    }
}

impl<K: fmt::Debug, V: fmt::Debug, H> fmt::Debug for HashMap<K, V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// `{k=v,k=v}` in slot order.
impl<K: fmt::Display, V: fmt::Display, H> fmt::Display for HashMap<K, V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        f.write_str("}")
    }
}

impl<K, V, H, Q> Index<&Q> for HashMap<K, V, H>
where
    K: Borrow<Q>,
    Q: ?Sized,
    V: Clone,
    H: HashingStrategy<Q>,
{
    type Output = V;

    /// Panics when `key` is absent.
    fn index(&self, key: &Q) -> &V {
        match self.get_ref(key) {
            Some(value) => value,
            None => panic!("key not present in map"),
        }
    }
}

impl<'a, K, V, H> IntoIterator for &'a HashMap<K, V, H> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, H> IntoIterator for &'a mut HashMap<K, V, H> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, H> IntoIterator for HashMap<K, V, H> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let remaining = self.table.len();
        IntoIter {
            inner: self.table.into_slots().into_iter().zip(self.values),
            remaining,
        }
    }
}

/// Iterator over `(&K, &V)` in slot order.
pub struct Iter<'a, K, V> {
    slots: FullSlots<'a, K>,
    values: &'a [V],
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            values: self.values,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let values = self.values;
        self.slots.next().map(|(index, key)| (key, &values[index]))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over `(&K, &mut V)` in slot order.
pub struct IterMut<'a, K, V> {
    inner: Zip<slice::Iter<'a, Slot<K>>, slice::IterMut<'a, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for (slot, value) in self.inner.by_ref() {
            if let Slot::Full(key) = slot {
                self.remaining -= 1;
                return Some((key, value));
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Owning iterator over `(K, V)` in slot order.
pub struct IntoIter<K, V> {
    inner: Zip<std::vec::IntoIter<Slot<K>>, std::vec::IntoIter<V>>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        for (slot, value) in self.inner.by_ref() {
            if let Slot::Full(key) = slot {
                self.remaining -= 1;
                return Some((key, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

pub struct Keys<'a, K> {
    slots: FullSlots<'a, K>,
}

impl<K> Clone for Keys<'_, K> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
        }
    }
}

impl<'a, K> Iterator for Keys<'a, K> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<&'a K> {
        self.slots.next().map(|(_, key)| key)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<K> ExactSizeIterator for Keys<'_, K> {}
impl<K> FusedIterator for Keys<'_, K> {}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, v)| v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// Removal-capable walk over a map.
///
/// The cursor holds the map mutably, so nothing else can change the map
/// while it is alive; [`remove`](Cursor::remove) is the only structural
/// change possible mid-walk. Removal never moves other entries, so the walk
/// continues where it left off.
pub struct Cursor<'a, K, V, H> {
    map: &'a mut HashMap<K, V, H>,
    next: usize,
    current: Option<usize>,
}

impl<K, V, H> Cursor<'_, K, V, H> {
    /// Advances to the next entry.
    pub fn next(&mut self) -> Option<(&K, &mut V)> {
        let capacity = self.map.capacity();
        while self.next < capacity {
            let index = self.next;
            self.next += 1;
            if self.map.entry_at(index).is_some() {
                self.current = Some(index);
                return self.map.entry_at_mut(index);
            }
        }
        self.current = None;
        None
    }

    /// The entry last returned by `next`, unless it was removed.
    pub fn current(&mut self) -> Option<(&K, &mut V)> {
        match self.current {
            Some(index) => self.map.entry_at_mut(index),
            None => None,
        }
    }
}

impl<K, V: Clone, H> Cursor<'_, K, V, H> {
    /// Removes the entry last returned by `next`. Returns `None` if there is
    /// no such entry or it was already removed.
    pub fn remove(&mut self) -> Option<(K, V)> {
        let index = self.current.take()?;
        Some(self.map.remove_at(index))
    }
}
