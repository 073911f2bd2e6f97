//! Live key, value and entry views over a [`HashMap`].
//!
//! A view holds the map by mutable reference. Every query reads the map's
//! current state and every removal goes straight to the map, so the effect
//! is visible through the map and through any view created afterwards.
//! Additions fail with [`Error::UnsupportedMutation`]: a bare key or value
//! cannot form a complete entry, and entry views do not add either.
//!
//! Bulk operations take any [`Membership`] implementor as "the other
//! collection".

use crate::error::{Error, Result};
use crate::hash_map::{entry_hash, HashMap, Iter, IterMut, Keys, Values};
use crate::strategy::{stable_hash, HashingStrategy, Natural};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};
use std::collections::BTreeSet;

/// A collection that can answer "is this item in you?".
pub trait Membership<T: ?Sized> {
    fn has(&self, item: &T) -> bool;
}

impl<T: PartialEq> Membership<T> for [T] {
    fn has(&self, item: &T) -> bool {
        self.contains(item)
    }
}

impl<T: PartialEq, const N: usize> Membership<T> for [T; N] {
    fn has(&self, item: &T) -> bool {
        self.contains(item)
    }
}

impl<T: PartialEq> Membership<T> for Vec<T> {
    fn has(&self, item: &T) -> bool {
        self.contains(item)
    }
}

impl<T: Hash + Eq, S: BuildHasher> Membership<T> for std::collections::HashSet<T, S> {
    fn has(&self, item: &T) -> bool {
        self.contains(item)
    }
}

impl<T: Hash + Eq, S: BuildHasher> Membership<T> for hashbrown::HashSet<T, S> {
    fn has(&self, item: &T) -> bool {
        self.contains(item)
    }
}

impl<T: Ord> Membership<T> for BTreeSet<T> {
    fn has(&self, item: &T) -> bool {
        self.contains(item)
    }
}

/// Copies `items` into `dest`, reallocating when `dest` is too short.
///
/// When `dest` is longer than the item count, the slot right after the last
/// item is set to `None` and the remainder is left as it was.
pub(crate) fn fill_array<T, I>(items: I, mut dest: Vec<Option<T>>) -> Vec<Option<T>>
where
    I: ExactSizeIterator<Item = T>,
{
    let len = items.len();
    if dest.len() < len {
        return items.map(Some).collect();
    }
    for (slot, item) in dest.iter_mut().zip(items) {
        *slot = Some(item);
    }
    if dest.len() > len {
        dest[len] = None;
    }
    dest
}

/// [`fill_array`] for plain values, with `marker` after the last item.
fn fill_sentinel_array<T, I>(items: I, mut dest: Vec<T>, marker: &T) -> Vec<T>
where
    T: Clone,
    I: ExactSizeIterator<Item = T>,
{
    let len = items.len();
    if dest.len() < len {
        return items.collect();
    }
    for (slot, item) in dest.iter_mut().zip(items) {
        *slot = item;
    }
    if dest.len() > len {
        dest[len] = marker.clone();
    }
    dest
}

fn sum_hashes<T: Hash, I: Iterator<Item = T>>(items: I) -> u64 {
    items.fold(0u64, |acc, item| acc.wrapping_add(stable_hash(&item)))
}

/// Live set of the map's keys.
pub struct KeySet<'a, K, V, H = Natural> {
    map: &'a mut HashMap<K, V, H>,
}

impl<'a, K, V, H> KeySet<'a, K, V, H> {
    pub(crate) fn new(map: &'a mut HashMap<K, V, H>) -> Self {
        Self { map }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> Keys<'_, K> {
        self.map.keys()
    }

    pub fn add(&mut self, _key: K) -> Result<bool> {
        Err(Error::UnsupportedMutation("KeySet::add"))
    }

    pub fn add_all<I: IntoIterator<Item = K>>(&mut self, _keys: I) -> Result<bool> {
        Err(Error::UnsupportedMutation("KeySet::add_all"))
    }

    pub fn to_vec(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.iter().cloned().collect()
    }

    pub fn to_array_in(&self, dest: Vec<Option<K>>) -> Vec<Option<K>>
    where
        K: Clone,
    {
        fill_array(self.iter().cloned(), dest)
    }

    /// Wrapping sum of the key hashes.
    pub fn hash_code(&self) -> u64
    where
        K: Hash,
    {
        sum_hashes(self.iter())
    }
}

impl<K, V: Clone, H> KeySet<'_, K, V, H> {
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashingStrategy<Q>,
    {
        self.map.contains_key(key)
    }

    pub fn contains_all<'b, I>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = &'b K>,
        K: 'b,
        H: HashingStrategy<K>,
    {
        keys.into_iter().all(|k| self.map.contains_key(k))
    }

    /// Removes `key` and its value from the map.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashingStrategy<Q>,
    {
        self.map.remove_entry(key).is_some()
    }

    /// Keeps the keys for which `keep` returns true. Returns whether
    /// anything was removed.
    pub fn retain<F>(&mut self, mut keep: F) -> bool
    where
        F: FnMut(&K) -> bool,
    {
        let before = self.map.len();
        self.map.retain(|k, _| keep(k));
        before != self.map.len()
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

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl<K, V: Clone, H: HashingStrategy<K>> Membership<K> for KeySet<'_, K, V, H> {
    fn has(&self, item: &K) -> bool {
        self.map.contains_key(item)
    }
}

/// Set equality: same size and every key of `self` is in `other`.
impl<K, V: Clone, H: HashingStrategy<K>> PartialEq for KeySet<'_, K, V, H> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|k| other.map.contains_key(k))
    }
}

impl<K, V, H, H2> PartialEq<crate::hash_set::HashSet<K, H2>> for KeySet<'_, K, V, H>
where
    H2: HashingStrategy<K>,
{
    fn eq(&self, other: &crate::hash_set::HashSet<K, H2>) -> bool {
        self.len() == other.len() && self.iter().all(|k| other.contains(k))
    }
}

impl<K: Hash, V, H> Hash for KeySet<'_, K, V, H> {
    fn hash<S: Hasher>(&self, state: &mut S) {
        state.write_u64(self.hash_code());
    }
}

impl<K: fmt::Debug, V, H> fmt::Debug for KeySet<'_, K, V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'b, K, V, H> IntoIterator for &'b KeySet<'_, K, V, H> {
    type Item = &'b K;
    type IntoIter = Keys<'b, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Live collection of the map's values. Duplicates are kept.
pub struct ValueCollection<'a, K, V, H = Natural> {
    map: &'a mut HashMap<K, V, H>,
}

impl<'a, K, V, H> ValueCollection<'a, K, V, H> {
    pub(crate) fn new(map: &'a mut HashMap<K, V, H>) -> Self {
        Self { map }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> Values<'_, K, V> {
        self.map.values()
    }

    pub fn add(&mut self, _value: V) -> Result<bool> {
        Err(Error::UnsupportedMutation("ValueCollection::add"))
    }

    pub fn add_all<I: IntoIterator<Item = V>>(&mut self, _values: I) -> Result<bool> {
        Err(Error::UnsupportedMutation("ValueCollection::add_all"))
    }

    /// Wrapping sum of the value hashes.
    pub fn hash_code(&self) -> u64
    where
        V: Hash,
    {
        sum_hashes(self.iter())
    }
}

impl<K, V: Clone, H> ValueCollection<'_, K, V, H> {
    pub fn contains(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.map.contains_value(value)
    }

    pub fn contains_all<'b, I>(&self, values: I) -> bool
    where
        I: IntoIterator<Item = &'b V>,
        V: PartialEq + 'b,
    {
        values.into_iter().all(|v| self.map.contains_value(v))
    }

    /// Removes the first entry, in slot order, holding `value`.
    pub fn remove(&mut self, value: &V) -> bool
    where
        V: PartialEq,
    {
        match self.map.position(|_, v| v == value) {
            Some(index) => {
                self.map.remove_at(index);
                true
            }
            None => false,
        }
    }

    /// Keeps the entries whose value passes `keep`. Returns whether anything
    /// was removed.
    pub fn retain<F>(&mut self, mut keep: F) -> bool
    where
        F: FnMut(&V) -> bool,
    {
        let before = self.map.len();
        self.map.retain(|_, v| keep(v));
        before != self.map.len()
    }

    /// Removes every entry whose value is in `other`.
    pub fn remove_all<M>(&mut self, other: &M) -> bool
    where
        M: Membership<V> + ?Sized,
    {
        self.retain(|v| !other.has(v))
    }

    /// Removes every entry whose value is not in `other`.
    pub fn retain_all<M>(&mut self, other: &M) -> bool
    where
        M: Membership<V> + ?Sized,
    {
        self.retain(|v| other.has(v))
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn to_vec(&self) -> Vec<V> {
        self.iter().cloned().collect()
    }

    pub fn to_array_in(&self, dest: Vec<Option<V>>) -> Vec<Option<V>> {
        fill_array(self.iter().cloned(), dest)
    }

    /// Like [`to_array_in`](Self::to_array_in) for callers without an
    /// absent marker: the slot after the last value gets the no-entry value.
    pub fn to_sentinel_array_in(&self, dest: Vec<V>) -> Vec<V> {
        fill_sentinel_array(self.iter().cloned(), dest, self.map.no_entry_value())
    }
}

impl<K, V: Clone + PartialEq, H> Membership<V> for ValueCollection<'_, K, V, H> {
    fn has(&self, item: &V) -> bool {
        self.map.contains_value(item)
    }
}

/// Bag equality: same values with the same multiplicities.
impl<K, V: Clone + PartialEq, H> PartialEq for ValueCollection<'_, K, V, H> {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        fn count<K, V: PartialEq>(it: Values<'_, K, V>, v: &V) -> usize {
            it.filter(|x| *x == v).count()
        }
        self.iter()
            .all(|v| count(self.iter(), v) == count(other.iter(), v))
    }
}

impl<K, V: Hash, H> Hash for ValueCollection<'_, K, V, H> {
    fn hash<S: Hasher>(&self, state: &mut S) {
        state.write_u64(self.hash_code());
    }
}

impl<K, V: fmt::Debug, H> fmt::Debug for ValueCollection<'_, K, V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'b, K, V, H> IntoIterator for &'b ValueCollection<'_, K, V, H> {
    type Item = &'b V;
    type IntoIter = Values<'b, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Live set of `(key, value)` entries.
pub struct EntrySet<'a, K, V, H = Natural> {
    map: &'a mut HashMap<K, V, H>,
}

impl<'a, K, V, H> EntrySet<'a, K, V, H> {
    pub(crate) fn new(map: &'a mut HashMap<K, V, H>) -> Self {
        Self { map }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.map.iter()
    }

    /// Entries whose values can be replaced in place.
    pub fn iter_mut(&mut self) -> EntriesMut<'_, K, V> {
        EntriesMut {
            inner: self.map.iter_mut(),
        }
    }

    pub fn add(&mut self, _entry: (K, V)) -> Result<bool> {
        Err(Error::UnsupportedMutation("EntrySet::add"))
    }

    pub fn add_all<I: IntoIterator<Item = (K, V)>>(&mut self, _entries: I) -> Result<bool> {
        Err(Error::UnsupportedMutation("EntrySet::add_all"))
    }

    /// Same value as the map's `hash_code`.
    pub fn hash_code(&self) -> u64
    where
        K: Hash,
        V: Hash,
    {
        self.map.hash_code()
    }
}

impl<K, V: Clone, H> EntrySet<'_, K, V, H> {
    /// True when the map holds `entry.0` mapped to a value equal to `entry.1`.
    pub fn contains(&self, entry: &(K, V)) -> bool
    where
        V: PartialEq,
        H: HashingStrategy<K>,
    {
        self.map.get_ref(&entry.0) == Some(&entry.1)
    }

    pub fn contains_all<'b, I>(&self, entries: I) -> bool
    where
        I: IntoIterator<Item = &'b (K, V)>,
        K: 'b,
        V: PartialEq + 'b,
        H: HashingStrategy<K>,
    {
        entries.into_iter().all(|e| self.contains(e))
    }

    /// Removes the entry only when both key and value match.
    pub fn remove(&mut self, entry: &(K, V)) -> bool
    where
        V: PartialEq,
        H: HashingStrategy<K>,
    {
        self.contains(entry) && self.map.remove_entry(&entry.0).is_some()
    }

    /// Keeps the entries for which `keep` returns true. Returns whether
    /// anything was removed.
    pub fn retain<F>(&mut self, keep: F) -> bool
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let before = self.map.len();
        self.map.retain(keep);
        before != self.map.len()
    }

    pub fn remove_all<M>(&mut self, other: &M) -> bool
    where
        K: Clone,
        M: Membership<(K, V)> + ?Sized,
    {
        self.retain(|k, v| !other.has(&(k.clone(), v.clone())))
    }

    pub fn retain_all<M>(&mut self, other: &M) -> bool
    where
        K: Clone,
        M: Membership<(K, V)> + ?Sized,
    {
        self.retain(|k, v| other.has(&(k.clone(), v.clone())))
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn to_vec(&self) -> Vec<(K, V)>
    where
        K: Clone,
    {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    pub fn to_array_in(&self, dest: Vec<Option<(K, V)>>) -> Vec<Option<(K, V)>>
    where
        K: Clone,
    {
        fill_array(self.iter().map(|(k, v)| (k.clone(), v.clone())), dest)
    }
}

impl<K, V, H> Membership<(K, V)> for EntrySet<'_, K, V, H>
where
    V: Clone + PartialEq,
    H: HashingStrategy<K>,
{
    fn has(&self, item: &(K, V)) -> bool {
        self.contains(item)
    }
}

impl<K, V, H> PartialEq for EntrySet<'_, K, V, H>
where
    V: Clone + PartialEq,
    H: HashingStrategy<K>,
{
    fn eq(&self, other: &Self) -> bool {
        *self.map == *other.map
    }
}

impl<K: Hash, V: Hash, H> Hash for EntrySet<'_, K, V, H> {
    fn hash<S: Hasher>(&self, state: &mut S) {
        state.write_u64(self.hash_code());
    }
}

impl<K: fmt::Debug, V: fmt::Debug, H> fmt::Debug for EntrySet<'_, K, V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'b, K, V, H> IntoIterator for &'b EntrySet<'_, K, V, H> {
    type Item = (&'b K, &'b V);
    type IntoIter = Iter<'b, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One map entry with a writable value.
pub struct EntryMut<'a, K, V> {
    key: &'a K,
    value: &'a mut V,
}

impl<K, V> EntryMut<'_, K, V> {
    pub fn key(&self) -> &K {
        self.key
    }

    pub fn value(&self) -> &V {
        &*self.value
    }

    pub fn value_mut(&mut self) -> &mut V {
        &mut *self.value
    }

    /// Writes through to the map. Returns the replaced value.
    pub fn set_value(&mut self, value: V) -> V {
        core::mem::replace(self.value, value)
    }

    /// `hash(key) ^ hash(value)`.
    pub fn hash_code(&self) -> u64
    where
        K: Hash,
        V: Hash,
    {
        entry_hash(self.key, &*self.value)
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for EntryMut<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && *self.value == *other.value
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq<(K, V)> for EntryMut<'_, K, V> {
    fn eq(&self, other: &(K, V)) -> bool {
        *self.key == other.0 && *self.value == other.1
    }
}

impl<K: Hash, V: Hash> Hash for EntryMut<'_, K, V> {
    fn hash<S: Hasher>(&self, state: &mut S) {
        state.write_u64(self.hash_code());
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for EntryMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntryMut")
            .field(self.key)
            .field(&*self.value)
            .finish()
    }
}

pub struct EntriesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for EntriesMut<'a, K, V> {
    type Item = EntryMut<'a, K, V>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| EntryMut { key, value })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for EntriesMut<'_, K, V> {}
