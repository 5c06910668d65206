//! [ArrayMap] is a map backed by parallel key and value arrays, without hashing.
use std::{
    fmt,
    hash::{Hash, Hasher},
};

use rand::Rng;

use crate::{
    array::{self, DEFAULT_ARRAY_CAPACITY},
    guard::CursorGuard,
    identity::{matches, Identity},
    object_map::Pair,
    util::{hash_unordered, join},
    Array,
};

/// A map stored as two parallel arrays.
///
/// Lookups compare keys linearly, so the map suits small maps and maps that are iterated far more
/// often than they are searched. Entries are kept in insertion order. An unordered map trades
/// that order for constant time removal, see [`Array`].
#[derive(Clone)]
pub struct ArrayMap<K, V> {
    keys: Array<K>,
    values: Array<V>,
    guard: CursorGuard,
}

impl<K, V> Default for ArrayMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ArrayMap<K, V> {
    /// Returns an empty ordered map with a capacity of 16.
    pub fn new() -> Self {
        Self::with_order(true, DEFAULT_ARRAY_CAPACITY)
    }

    /// Returns an empty ordered map with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_order(true, capacity)
    }

    /// Returns an empty map with the specified ordering and capacity.
    pub fn with_order(ordered: bool, capacity: usize) -> Self {
        ArrayMap {
            keys: Array::with_order(ordered, capacity),
            values: Array::with_order(ordered, capacity),
            guard: CursorGuard::default(),
        }
    }

    /// Returns `true` if removals preserve the order of the remaining entries.
    pub fn is_ordered(&self) -> bool {
        self.keys.is_ordered()
    }

    /// Returns the number of entries.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if the map contains no entries.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the length of the backing arrays.
    pub fn capacity(&self) -> usize {
        self.keys.capacity()
    }

    /// Returns the keys in map order.
    pub fn keys(&self) -> &[K] {
        self.keys.as_slice()
    }

    /// Returns the values in map order.
    pub fn values(&self) -> &[V] {
        self.values.as_slice()
    }

    /// Returns the key at `index`, panics if out-of-bounds.
    pub fn key_at(&self, index: usize) -> &K {
        self.keys.get(index)
    }

    /// Returns the value at `index`, panics if out-of-bounds.
    pub fn value_at(&self, index: usize) -> &V {
        self.values.get(index)
    }

    /// Returns a mutable reference to the value at `index`, panics if out-of-bounds.
    pub fn value_at_mut(&mut self, index: usize) -> &mut V {
        self.values.get_mut(index)
    }

    /// Replaces the key at `index`, returning the previous key. Panics if out-of-bounds.
    pub fn set_key(&mut self, index: usize, key: K) -> K {
        self.keys.set(index, key)
    }

    /// Replaces the value at `index`, returning the previous value. Panics if out-of-bounds.
    pub fn set_value(&mut self, index: usize, value: V) -> V {
        self.values.set(index, value)
    }

    /// Returns the first key, panics if the map is empty.
    pub fn first_key(&self) -> &K {
        self.check_not_empty();
        self.keys.first()
    }

    /// Returns the first value, panics if the map is empty.
    pub fn first_value(&self) -> &V {
        self.check_not_empty();
        self.values.first()
    }

    /// Returns the last key, panics if the map is empty.
    pub fn peek_key(&self) -> &K {
        self.check_not_empty();
        self.keys.peek()
    }

    /// Returns the last value, panics if the map is empty.
    pub fn peek_value(&self) -> &V {
        self.check_not_empty();
        self.values.peek()
    }

    #[inline(always)]
    fn check_not_empty(&self) {
        if self.keys.is_empty() {
            panic!("Map is empty.");
        }
    }

    /// Inserts an entry at `index` without checking for an existing key.
    ///
    /// An ordered map shifts the following entries, an unordered map moves the entry previously
    /// at `index` to the end.
    pub fn insert(&mut self, index: usize, key: K, value: V) {
        self.keys.insert(index, key);
        self.values.insert(index, value);
    }

    /// Removes and returns the entry at `index`, panics if out-of-bounds.
    pub fn remove_index(&mut self, index: usize) -> (K, V) {
        (self.keys.remove_index(index), self.values.remove_index(index))
    }

    /// Returns the index of the first entry holding the value.
    ///
    /// With `identity` set, values are compared using [`Identity::identical`].
    pub fn index_of_value(&self, value: &V, identity: bool) -> Option<usize>
    where
        V: Identity,
    {
        self.values.index_of(value, identity)
    }

    /// Returns `true` if the map contains the value.
    pub fn contains_value(&self, value: &V, identity: bool) -> bool
    where
        V: Identity,
    {
        self.values.contains(value, identity)
    }

    /// Returns the key of the last entry holding the value.
    pub fn find_key(&self, value: &V, identity: bool) -> Option<&K>
    where
        V: Identity,
    {
        let index = self
            .values
            .iter()
            .rposition(|stored| matches(identity, stored, value))?;
        Some(self.keys.get(index))
    }

    /// Removes the first entry holding the value, returning `true` if one was found.
    pub fn remove_value(&mut self, value: &V, identity: bool) -> bool
    where
        V: Identity,
    {
        match self.index_of_value(value, identity) {
            Some(index) => {
                self.remove_index(index);
                true
            }
            None => false,
        }
    }

    /// Removes all entries, keeping the backing arrays.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.values.clear();
    }

    /// Removes all entries and reduces the backing arrays to `maximum_capacity`, if they are
    /// larger.
    pub fn clear_to(&mut self, maximum_capacity: usize) {
        self.clear();
        if self.keys.capacity() > maximum_capacity {
            self.keys.resize(maximum_capacity);
            self.values.resize(maximum_capacity);
            log::debug!("array map cleared and shrunk to {maximum_capacity} slots");
        }
    }

    /// Reduces the backing arrays to the number of entries.
    pub fn shrink(&mut self) {
        self.keys.shrink();
        self.values.shrink();
    }

    /// Grows the backing arrays to hold `additional` more entries without reallocating.
    pub fn ensure_capacity(&mut self, additional: usize) {
        self.keys.ensure_capacity(additional);
        self.values.ensure_capacity(additional);
    }

    /// Removes all entries past `new_len`.
    pub fn truncate(&mut self, new_len: usize) {
        self.keys.truncate(new_len);
        self.values.truncate(new_len);
    }

    /// Reverses the order of the entries.
    pub fn reverse(&mut self) {
        self.keys.reverse();
        self.values.reverse();
    }

    /// Shuffles the entries using the provided random number generator.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let keys = self.keys.as_mut_slice();
        let values = self.values.as_mut_slice();
        for i in (1..keys.len()).rev() {
            let j = rng.gen_range(0..=i);
            keys.swap(i, j);
            values.swap(i, j);
        }
    }

    /// Returns the entries formatted as `key=value` with `separator` between them.
    pub fn join(&self, separator: &str) -> String
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        struct Joined<'a, K, V>(&'a ArrayMap<K, V>, &'a str);
        impl<K: fmt::Display, V: fmt::Display> fmt::Display for Joined<'_, K, V> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                join(f, self.0.iter().map(|(k, v)| Pair(k, v)), self.1)
            }
        }
        Joined(self, separator).to_string()
    }

    /// Returns an iterator over the entries in map order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.keys.iter().zip(self.values.iter()),
        }
    }

    /// Returns an iterator over the entries in map order, allowing mutation of the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.keys.iter().zip(self.values.iter_mut()),
        }
    }

    /// Returns a cursor that can remove entries while enumerating them.
    ///
    /// Panics if an earlier cursor of this map was leaked.
    pub fn cursor(&mut self) -> Cursor<'_, K, V> {
        self.guard.enter();
        Cursor {
            map: self,
            index: 0,
            can_remove: false,
        }
    }
}

impl<K: PartialEq, V> ArrayMap<K, V> {
    /// Sets the value of the key, appending a new entry if the key is absent.
    ///
    /// Returns the index of the entry.
    pub fn put(&mut self, key: K, value: V) -> usize {
        match self.index_of_key(&key) {
            Some(index) => {
                self.values.set(index, value);
                index
            }
            None => {
                self.keys.add(key);
                self.values.add(value);
                self.keys.len() - 1
            }
        }
    }

    /// Places the entry at `index`, shifting the following entries.
    ///
    /// An existing entry for the key is removed first, `index` refers to the positions after that
    /// removal.
    pub fn put_at(&mut self, key: K, value: V, index: usize) -> usize {
        if let Some(existing) = self.index_of_key(&key) {
            self.remove_index(existing);
        }
        self.keys.insert_shifted(index, key);
        self.values.insert_shifted(index, value);
        index
    }

    /// Puts `len` entries of `other` starting at `offset`.
    ///
    /// Panics if `offset + len` exceeds the length of `other`.
    pub fn put_all(&mut self, other: &ArrayMap<K, V>, offset: usize, len: usize)
    where
        K: Clone,
        V: Clone,
    {
        assert!(
            offset + len <= other.len(),
            "offset + length must be <= size: {offset} + {len} <= {}",
            other.len()
        );
        self.ensure_capacity(len);
        for (key, value) in other.iter().skip(offset).take(len) {
            self.put(key.clone(), value.clone());
        }
    }

    /// Returns the index of the key.
    pub fn index_of_key(&self, key: &K) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    /// Returns `true` if the map contains the key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Returns the value of the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        let index = self.keys.iter().rposition(|k| k == key)?;
        Some(self.values.get(index))
    }

    /// Returns the value of the key, or `default` if the key is absent.
    pub fn get_or<'a>(&'a self, key: &K, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    /// Returns a mutable reference to the value of the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let index = self.keys.iter().rposition(|k| k == key)?;
        Some(self.values.get_mut(index))
    }

    /// Removes the key, returning its value.
    pub fn remove_key(&mut self, key: &K) -> Option<V> {
        let index = self.index_of_key(key)?;
        Some(self.remove_index(index).1)
    }

    /// Returns `true` if both maps hold the same keys mapped to identical values, in any order.
    pub fn equals_identity(&self, other: &Self) -> bool
    where
        V: Identity,
    {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|v| v.identical(value)))
    }
}

/// Maps are equal when they hold the same keys mapped to equal values, in any order.
impl<K: PartialEq, V: PartialEq> PartialEq for ArrayMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Hash, V: Hash> Hash for ArrayMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_unordered(state, self.len(), self.iter());
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ArrayMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for ArrayMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        join(f, self.iter().map(|(k, v)| Pair(k, v)), ", ")?;
        f.write_str("}")
    }
}

impl<K: PartialEq, V> Extend<(K, V)> for ArrayMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<K: PartialEq, V> FromIterator<(K, V)> for ArrayMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

/// An iterator over the entries of an [`ArrayMap`].
///
/// This struct is created by the [`iter`](`ArrayMap::iter`) method on [`ArrayMap`].
pub struct Iter<'a, K, V> {
    inner: std::iter::Zip<array::Iter<'a, K>, array::Iter<'a, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// An iterator over the entries of an [`ArrayMap`], allowing mutation of the values.
///
/// This struct is created by the [`iter_mut`](`ArrayMap::iter_mut`) method on [`ArrayMap`].
pub struct IterMut<'a, K, V> {
    inner: std::iter::Zip<array::Iter<'a, K>, array::IterMut<'a, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a ArrayMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A cursor over an [`ArrayMap`] that can remove the entry it last returned.
///
/// This struct is created by the [`cursor`](`ArrayMap::cursor`) method on [`ArrayMap`].
pub struct Cursor<'a, K, V> {
    map: &'a mut ArrayMap<K, V>,
    index: usize,
    can_remove: bool,
}

impl<K, V> Cursor<'_, K, V> {
    /// Advances to the next entry and returns it, or `None` when all entries were visited.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(&K, &mut V)> {
        if self.index >= self.map.len() {
            self.can_remove = false;
            return None;
        }
        self.index += 1;
        self.can_remove = true;
        let index = self.index - 1;
        Some((self.map.keys.get(index), self.map.values.get_mut(index)))
    }

    /// Removes the entry returned by the last call to [`next`](Self::next).
    ///
    /// The following call to `next` continues with the entry that took its place.
    pub fn remove(&mut self) -> (K, V) {
        assert!(self.can_remove, "next must be called before remove.");
        self.can_remove = false;
        self.index -= 1;
        self.map.remove_index(self.index)
    }

    /// Restarts the enumeration at the first entry.
    pub fn reset(&mut self) {
        self.index = 0;
        self.can_remove = false;
    }
}

impl<K, V> Drop for Cursor<'_, K, V> {
    fn drop(&mut self) {
        self.map.guard.exit();
    }
}
