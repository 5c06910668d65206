//! [PrimitiveMap] is an unordered hash map with integer keys.
use std::{
    fmt,
    hash::{Hash, Hasher},
};

use crate::{
    error::CapacityError,
    guard::CursorGuard,
    identity::{matches, Identity},
    object_map::Pair,
    table::{RawCursor, RawIntoIter, RawIter, RawIterMut, RawTable},
    util::{hash_unordered, join},
    Array, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR,
};

/// Integer types usable as keys of a [`PrimitiveMap`] or [`PrimitiveSet`](crate::PrimitiveSet).
///
/// The zero key is never stored in the table, the containers keep it in a dedicated field.
pub trait PrimitiveKey: Copy + Eq + Hash + fmt::Debug + fmt::Display {
    /// The key kept outside of the table.
    const ZERO: Self;

    /// Returns the hash that is spread across the table by Fibonacci hashing.
    fn placement_hash(self) -> u64;
}

impl PrimitiveKey for i32 {
    const ZERO: i32 = 0;

    #[inline(always)]
    fn placement_hash(self) -> u64 {
        self as i64 as u64
    }
}

impl PrimitiveKey for i64 {
    const ZERO: i64 = 0;

    #[inline(always)]
    fn placement_hash(self) -> u64 {
        let bits = self as u64;
        bits ^ (bits >> 32)
    }
}

#[inline(always)]
pub(crate) fn placement_hash<K: PrimitiveKey>(key: &K) -> u64 {
    key.placement_hash()
}

/// An unordered map from `i32` keys to values.
pub type IntMap<V> = PrimitiveMap<i32, V>;

/// An unordered map from `i64` keys to values.
pub type LongMap<V> = PrimitiveMap<i64, V>;

/// An unordered hash map with integer keys.
///
/// Uses the same table as [`ObjectMap`](crate::ObjectMap) but hashes the key value directly. The
/// entry for key zero is kept outside of the table and always comes first during iteration.
#[derive(Clone)]
pub struct PrimitiveMap<K, V> {
    table: RawTable<K, V>,
    zero_value: Option<V>,
    guard: CursorGuard,
}

impl<K: PrimitiveKey, V> Default for PrimitiveMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PrimitiveKey, V> PrimitiveMap<K, V> {
    /// Returns an empty map with a capacity of 51 entries and a load factor of 0.8.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Returns an empty map that holds `capacity` entries before growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_load_factor(capacity, DEFAULT_LOAD_FACTOR)
    }

    /// Returns an empty map with the specified capacity and load factor.
    ///
    /// Panics if the load factor is not strictly between 0 and 1 or the capacity is too large.
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f32) -> Self {
        match Self::try_with_capacity_and_load_factor(capacity, load_factor) {
            Ok(map) => map,
            Err(err) => panic!("{err}"),
        }
    }

    /// Returns an empty map with the specified capacity and load factor.
    pub fn try_with_capacity_and_load_factor(
        capacity: usize,
        load_factor: f32,
    ) -> Result<Self, CapacityError> {
        Ok(PrimitiveMap {
            table: RawTable::try_new(capacity, load_factor)?,
            zero_value: None,
            guard: CursorGuard::default(),
        })
    }

    /// Returns the number of entries, including the zero key.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.table.len() + self.zero_value.is_some() as usize
    }

    /// Returns `true` if the map contains no entries.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the length of the backing table.
    #[inline(always)]
    pub fn table_len(&self) -> usize {
        self.table.table_len()
    }

    /// Returns the number of entries at which the table grows.
    #[inline(always)]
    pub fn threshold(&self) -> usize {
        self.table.threshold()
    }

    /// Inserts a key-value pair, returning the previous value of the key.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if key == K::ZERO {
            return self.zero_value.replace(value);
        }
        match self.table.find(key.placement_hash(), |k| *k == key) {
            Ok(slot) => Some(std::mem::replace(
                &mut self.table.occupied_mut(slot).1,
                value,
            )),
            Err(slot) => {
                let outside = self.zero_value.is_some() as usize;
                self.table
                    .insert_vacant(slot, key, value, outside, placement_hash);
                None
            }
        }
    }

    /// Inserts every entry of `other`, growing the table once up front.
    pub fn insert_all(&mut self, other: &PrimitiveMap<K, V>)
    where
        V: Clone,
    {
        self.ensure_capacity(other.len());
        for (key, value) in other.iter() {
            self.insert(key, value.clone());
        }
    }

    /// Returns a reference to the value of the key.
    pub fn get(&self, key: K) -> Option<&V> {
        if key == K::ZERO {
            return self.zero_value.as_ref();
        }
        let slot = self.table.find(key.placement_hash(), |k| *k == key).ok()?;
        Some(&self.table.occupied(slot).1)
    }

    /// Returns the value of the key, or `default` if the key is absent.
    pub fn get_or<'a>(&'a self, key: K, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    /// Returns a mutable reference to the value of the key.
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        if key == K::ZERO {
            return self.zero_value.as_mut();
        }
        let slot = self.table.find(key.placement_hash(), |k| *k == key).ok()?;
        Some(&mut self.table.occupied_mut(slot).1)
    }

    /// Returns `true` if the map contains the key.
    pub fn contains_key(&self, key: K) -> bool {
        if key == K::ZERO {
            return self.zero_value.is_some();
        }
        self.table
            .find(key.placement_hash(), |k| *k == key)
            .is_ok()
    }

    /// Removes a key, returning its value.
    pub fn remove(&mut self, key: K) -> Option<V> {
        if key == K::ZERO {
            return self.zero_value.take();
        }
        let slot = self.table.find(key.placement_hash(), |k| *k == key).ok()?;
        let ((_, value), _) = self.table.remove_at(slot, placement_hash);
        Some(value)
    }

    /// Returns `true` if the map contains the value.
    ///
    /// This compares every value. With `identity` set, values are compared using
    /// [`Identity::identical`].
    pub fn contains_value(&self, value: &V, identity: bool) -> bool
    where
        V: Identity,
    {
        self.find_key(value, identity).is_some()
    }

    /// Returns a key mapped to the value, or `None` if no key maps to it.
    pub fn find_key(&self, value: &V, identity: bool) -> Option<K>
    where
        V: Identity,
    {
        self.iter()
            .find(|(_, stored)| matches(identity, *stored, value))
            .map(|(key, _)| key)
    }

    /// Grows the table so that `additional` more entries fit without resizing.
    ///
    /// Panics if the resulting table would be too large.
    pub fn ensure_capacity(&mut self, additional: usize) {
        if let Err(err) = self.try_ensure_capacity(additional) {
            panic!("{err}");
        }
    }

    /// Grows the table so that `additional` more entries fit without resizing.
    pub fn try_ensure_capacity(&mut self, additional: usize) -> Result<(), CapacityError> {
        self.table.reserve(self.len(), additional, placement_hash)
    }

    /// Reduces the table to what `maximum_capacity` entries need, if it is larger.
    ///
    /// The table never shrinks below what the current entries need.
    pub fn shrink(&mut self, maximum_capacity: usize) {
        let live = self.len();
        if let Err(err) = self.table.shrink_to(maximum_capacity, live, placement_hash) {
            panic!("{err}");
        }
    }

    /// Removes all entries, keeping the backing table.
    pub fn clear(&mut self) {
        self.zero_value = None;
        self.table.clear();
    }

    /// Removes all entries and reduces the backing table to what `maximum_capacity` entries
    /// need, if it is larger.
    pub fn clear_to(&mut self, maximum_capacity: usize) {
        self.zero_value = None;
        if let Err(err) = self.table.clear_to(maximum_capacity) {
            panic!("{err}");
        }
    }

    /// Returns `true` if both maps contain the same keys, mapped to identical values.
    pub fn equals_identity(&self, other: &Self) -> bool
    where
        V: Identity,
    {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|v| v.identical(value)))
    }

    /// Returns the entries formatted as `key=value` with `separator` between them.
    pub fn join(&self, separator: &str) -> String
    where
        V: fmt::Display,
    {
        struct Joined<'a, K, V>(&'a PrimitiveMap<K, V>, &'a str);
        impl<K: PrimitiveKey, V: fmt::Display> fmt::Display for Joined<'_, K, V> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                join(f, self.0.iter().map(|(k, v)| Pair(k, v)), self.1)
            }
        }
        Joined(self, separator).to_string()
    }

    /// Returns an iterator over the entries, starting with the zero key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            zero: self.zero_value.as_ref(),
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the entries, allowing mutation of the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            zero: self.zero_value.as_mut(),
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Returns an iterator over the values, allowing mutation.
    pub fn values_mut(&mut self) -> impl ExactSizeIterator<Item = &mut V> + '_ {
        self.iter_mut().map(|(_, value)| value)
    }

    /// Returns the keys collected into an [`Array`].
    pub fn key_array(&self) -> Array<K> {
        self.keys().collect()
    }

    /// Returns the entries collected into an [`Array`].
    pub fn to_array(&self) -> Array<(K, V)>
    where
        V: Clone,
    {
        self.iter().map(|(k, v)| (k, v.clone())).collect()
    }

    /// Returns a cursor that can remove entries while enumerating them.
    ///
    /// Panics if an earlier cursor of this map was leaked.
    pub fn cursor(&mut self) -> Cursor<'_, K, V> {
        self.guard.enter();
        Cursor {
            raw: RawCursor::new(&self.table),
            zero: ZeroState::Pending,
            map: self,
        }
    }

    /// Asserts the structural invariants of the backing table.
    #[cfg(test)]
    pub(crate) fn check(&self) {
        self.table.check(placement_hash);
        assert!(self.table.iter().all(|(key, _)| *key != K::ZERO));
        assert!(self.len() <= self.threshold());
    }
}

/// Maps are equal when they contain the same keys mapped to equal values.
impl<K: PrimitiveKey, V: PartialEq> PartialEq for PrimitiveMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: PrimitiveKey, V: Eq> Eq for PrimitiveMap<K, V> {}

impl<K: PrimitiveKey, V: Hash> Hash for PrimitiveMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_unordered(state, self.len(), self.iter());
    }
}

impl<K: PrimitiveKey, V: fmt::Debug> fmt::Debug for PrimitiveMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PrimitiveKey, V: fmt::Display> fmt::Display for PrimitiveMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        join(f, self.iter().map(|(k, v)| Pair(k, v)), ", ")?;
        f.write_str("}")
    }
}

impl<K: PrimitiveKey, V> Extend<(K, V)> for PrimitiveMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.ensure_capacity(iter.size_hint().0);
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: PrimitiveKey, V> FromIterator<(K, V)> for PrimitiveMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

/// An iterator over the entries of a [`PrimitiveMap`].
///
/// This struct is created by the [`iter`](`PrimitiveMap::iter`) method on [`PrimitiveMap`].
pub struct Iter<'a, K, V> {
    zero: Option<&'a V>,
    inner: RawIter<'a, K, V>,
}

impl<'a, K: PrimitiveKey, V> Iterator for Iter<'a, K, V> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(value) = self.zero.take() {
            return Some((K::ZERO, value));
        }
        self.inner.next().map(|(key, value)| (*key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.inner.len() + self.zero.is_some() as usize;
        (len, Some(len))
    }
}

impl<K: PrimitiveKey, V> ExactSizeIterator for Iter<'_, K, V> {}

/// An iterator over the entries of a [`PrimitiveMap`], allowing mutation of the values.
///
/// This struct is created by the [`iter_mut`](`PrimitiveMap::iter_mut`) method on
/// [`PrimitiveMap`].
pub struct IterMut<'a, K, V> {
    zero: Option<&'a mut V>,
    inner: RawIterMut<'a, K, V>,
}

impl<'a, K: PrimitiveKey, V> Iterator for IterMut<'a, K, V> {
    type Item = (K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(value) = self.zero.take() {
            return Some((K::ZERO, value));
        }
        self.inner.next().map(|(key, value)| (*key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.inner.len() + self.zero.is_some() as usize;
        (len, Some(len))
    }
}

impl<K: PrimitiveKey, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// An iterator moving entries out of a [`PrimitiveMap`], starting with the zero key.
pub struct IntoIter<K, V> {
    zero: Option<V>,
    inner: RawIntoIter<K, V>,
}

impl<K: PrimitiveKey, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(value) = self.zero.take() {
            return Some((K::ZERO, value));
        }
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.inner.len() + self.zero.is_some() as usize;
        (len, Some(len))
    }
}

impl<K: PrimitiveKey, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K: PrimitiveKey, V> IntoIterator for PrimitiveMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            zero: self.zero_value,
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K: PrimitiveKey, V> IntoIterator for &'a PrimitiveMap<K, V> {
    type Item = (K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum ZeroState {
    Pending,
    Current,
    Done,
}

/// A cursor over a [`PrimitiveMap`] that can remove the entry it last returned.
///
/// This struct is created by the [`cursor`](`PrimitiveMap::cursor`) method on [`PrimitiveMap`].
pub struct Cursor<'a, K, V> {
    map: &'a mut PrimitiveMap<K, V>,
    raw: RawCursor,
    zero: ZeroState,
}

impl<K: PrimitiveKey, V> Cursor<'_, K, V> {
    /// Advances to the next entry and returns it, or `None` when all entries were visited.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(K, &mut V)> {
        if self.zero == ZeroState::Pending {
            if let Some(value) = self.map.zero_value.as_mut() {
                self.zero = ZeroState::Current;
                return Some((K::ZERO, value));
            }
        }
        self.zero = ZeroState::Done;
        let slot = self.raw.next_slot(&self.map.table)?;
        let (key, value) = self.map.table.occupied_mut(slot);
        Some((*key, value))
    }

    /// Removes the entry returned by the last call to [`next`](Self::next).
    pub fn remove(&mut self) -> (K, V) {
        if self.zero == ZeroState::Current {
            self.zero = ZeroState::Done;
            if let Some(value) = self.map.zero_value.take() {
                return (K::ZERO, value);
            }
        }
        self.raw.remove(&mut self.map.table, placement_hash)
    }

    /// Restarts the enumeration.
    pub fn reset(&mut self) {
        self.zero = ZeroState::Pending;
        self.raw.reset();
    }
}

impl<K, V> Drop for Cursor<'_, K, V> {
    fn drop(&mut self) {
        self.map.guard.exit();
    }
}
