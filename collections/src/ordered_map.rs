//! [OrderedMap] is a hash map that remembers the insertion order of its keys.
use std::{
    borrow::Borrow,
    fmt,
    hash::{BuildHasher, Hash, Hasher},
};

use crate::{
    array,
    error::CapacityError,
    guard::CursorGuard,
    identity::Identity,
    object_map::Pair,
    util::join,
    Array, DefaultBuildHasher, ObjectMap, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR,
};

/// A hash map that iterates its entries in insertion order.
///
/// An [`ObjectMap`] provides the lookups while an ordered [`Array`] of the keys provides the
/// order. Removing an entry shifts the keys after it, so removal is linear in the number of
/// entries.
#[derive(Clone)]
pub struct OrderedMap<K, V, S = DefaultBuildHasher> {
    map: ObjectMap<K, V, S>,
    keys: Array<K>,
    guard: CursorGuard,
}

impl<K, V, S: Default> Default for OrderedMap<K, V, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S: Default> OrderedMap<K, V, S> {
    /// Returns an empty map with a capacity of 51 entries and a load factor of 0.8.
    pub fn new() -> Self {
        OrderedMap {
            map: ObjectMap::with_capacity(DEFAULT_CAPACITY),
            keys: Array::new(),
            guard: CursorGuard::default(),
        }
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
        Ok(OrderedMap {
            map: ObjectMap::try_with_capacity_and_load_factor(capacity, load_factor)?,
            keys: Array::with_capacity(capacity),
            guard: CursorGuard::default(),
        })
    }
}

impl<K, V, S> OrderedMap<K, V, S> {
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

    /// Returns the keys in insertion order.
    pub fn ordered_keys(&self) -> &Array<K> {
        &self.keys
    }

    /// Returns the unordered map holding the entries.
    pub fn as_map(&self) -> &ObjectMap<K, V, S> {
        &self.map
    }

    /// Removes all entries, keeping the backing storage.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.map.clear();
    }

    /// Removes all entries and reduces the backing table to what `maximum_capacity` entries
    /// need, if it is larger.
    pub fn clear_to(&mut self, maximum_capacity: usize) {
        self.keys.clear();
        self.map.clear_to(maximum_capacity);
    }

    /// Returns an iterator over the keys in insertion order.
    pub fn keys(&self) -> array::Iter<'_, K> {
        self.keys.iter()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> OrderedMap<K, V, S> {
    /// Inserts a key-value pair, returning the previous value of the key.
    ///
    /// A new key is appended to the order, replacing the value of an existing key keeps its
    /// position.
    pub fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        K: Clone,
    {
        if let Some(stored) = self.map.get_mut(&key) {
            return Some(std::mem::replace(stored, value));
        }
        self.keys.add(key.clone());
        self.map.insert(key, value);
        None
    }

    /// Inserts every entry of `other` in the order of `other`.
    pub fn insert_all(&mut self, other: &OrderedMap<K, V, S>)
    where
        K: Clone,
        V: Clone,
    {
        self.map.ensure_capacity(other.len());
        for (key, value) in other.iter() {
            self.insert(key.clone(), value.clone());
        }
    }

    /// Returns a reference to the value of the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        self.map.get(key)
    }

    /// Returns the value of the key, or `default` if the key is absent.
    pub fn get_or<'a, Q>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        self.map.get_or(key, default)
    }

    /// Returns a mutable reference to the value of the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        self.map.get_mut(key)
    }

    /// Returns the entry at `index` of the insertion order.
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        let key = self.keys.as_slice().get(index)?;
        self.map.get(key).map(|value| (key, value))
    }

    /// Returns `true` if the map contains the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        self.map.contains_key(key)
    }

    /// Returns `true` if the map contains the value, see [`ObjectMap::contains_value`].
    pub fn contains_value(&self, value: &V, identity: bool) -> bool
    where
        V: Identity,
    {
        self.map.contains_value(value, identity)
    }

    /// Returns a key mapped to the value, see [`ObjectMap::find_key`].
    pub fn find_key(&self, value: &V, identity: bool) -> Option<&K>
    where
        V: Identity,
    {
        self.map.find_key(value, identity)
    }

    /// Removes a key, returning its value. The keys after it move up by one position.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        let value = self.map.remove(key)?;
        if let Some(index) = self.keys.iter().position(|k| k.borrow() == key) {
            self.keys.remove_index(index);
        }
        Some(value)
    }

    /// Removes the entry at `index` of the insertion order. Panics if out-of-bounds.
    pub fn remove_index(&mut self, index: usize) -> (K, V) {
        let key = self.keys.remove_index(index);
        match self.map.remove(&key) {
            Some(value) => (key, value),
            None => unreachable!("ordered key without entry"),
        }
    }

    /// Renames the key `before` to `after`, keeping its value and position.
    ///
    /// Returns `false` without changing anything if `after` is already present or `before` is
    /// absent.
    pub fn alter<Q>(&mut self, before: &Q, after: K) -> bool
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q> + Clone,
    {
        match self.keys.iter().position(|k| k.borrow() == before) {
            Some(index) => self.alter_index(index, after),
            None => false,
        }
    }

    /// Renames the key at `index` of the insertion order to `after`, keeping its value and
    /// position.
    ///
    /// Returns `false` without changing anything if `index` is out-of-bounds or `after` is
    /// already present.
    pub fn alter_index(&mut self, index: usize, after: K) -> bool
    where
        K: Clone,
    {
        if index >= self.keys.len() || self.map.contains_key(&after) {
            return false;
        }
        let Some(value) = self.map.remove(self.keys.get(index)) else {
            unreachable!("ordered key without entry")
        };
        self.keys.set(index, after.clone());
        self.map.insert(after, value);
        true
    }

    /// Grows the table so that `additional` more entries fit without resizing.
    pub fn ensure_capacity(&mut self, additional: usize) {
        self.map.ensure_capacity(additional);
        self.keys.ensure_capacity(additional);
    }

    /// Reduces the table to what `maximum_capacity` entries need, if it is larger.
    pub fn shrink(&mut self, maximum_capacity: usize) {
        self.map.shrink(maximum_capacity);
    }

    /// Returns the entries formatted as `key=value` in insertion order, with `separator` between
    /// them.
    pub fn join(&self, separator: &str) -> String
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        struct Joined<'a, K, V, S>(&'a OrderedMap<K, V, S>, &'a str);
        impl<K, V, S> fmt::Display for Joined<'_, K, V, S>
        where
            K: Hash + Eq + fmt::Display,
            V: fmt::Display,
            S: BuildHasher,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                join(f, self.0.iter().map(|(k, v)| Pair(k, v)), self.1)
            }
        }
        Joined(self, separator).to_string()
    }

    /// Returns an iterator over the entries in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V, S> {
        Iter {
            keys: self.keys.iter(),
            map: &self.map,
        }
    }

    /// Returns an iterator over the values in insertion order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Returns the entries collected into an [`Array`], in insertion order.
    pub fn to_array(&self) -> Array<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Returns a cursor that can remove entries while enumerating them in insertion order.
    ///
    /// Panics if an earlier cursor of this map was leaked.
    pub fn cursor(&mut self) -> Cursor<'_, K, V, S> {
        self.guard.enter();
        Cursor {
            map: self,
            index: 0,
            can_remove: false,
        }
    }

    /// Asserts that the key order and the table hold the same keys.
    #[cfg(test)]
    pub(crate) fn check(&self) {
        self.map.check();
        assert_eq!(self.keys.len(), self.map.len());
        assert!(self.keys.iter().all(|key| self.map.contains_key(key)));
    }
}

/// Maps are equal when they contain the same keys mapped to equal values, regardless of order.
impl<K: Hash + Eq, V: PartialEq, S: BuildHasher> PartialEq for OrderedMap<K, V, S> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<K: Hash + Eq, V: Eq, S: BuildHasher> Eq for OrderedMap<K, V, S> {}

impl<K: Hash, V: Hash, S> Hash for OrderedMap<K, V, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.map.hash(state);
    }
}

impl<K, V, S> fmt::Debug for OrderedMap<K, V, S>
where
    K: Hash + Eq + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> fmt::Display for OrderedMap<K, V, S>
where
    K: Hash + Eq + fmt::Display,
    V: fmt::Display,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        join(f, self.iter().map(|(k, v)| Pair(k, v)), ", ")?;
        f.write_str("}")
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> Extend<(K, V)> for OrderedMap<K, V, S> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for OrderedMap<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

/// An iterator over the entries of an [`OrderedMap`] in insertion order.
///
/// This struct is created by the [`iter`](`OrderedMap::iter`) method on [`OrderedMap`].
pub struct Iter<'a, K, V, S> {
    keys: array::Iter<'a, K>,
    map: &'a ObjectMap<K, V, S>,
}

impl<'a, K: Hash + Eq, V, S: BuildHasher> Iterator for Iter<'a, K, V, S> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.keys.next()?;
        self.map.get(key).map(|value| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> ExactSizeIterator for Iter<'_, K, V, S> {}

impl<'a, K: Hash + Eq, V, S: BuildHasher> IntoIterator for &'a OrderedMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, S>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A cursor over an [`OrderedMap`] that can remove the entry it last returned.
///
/// This struct is created by the [`cursor`](`OrderedMap::cursor`) method on [`OrderedMap`].
pub struct Cursor<'a, K, V, S> {
    map: &'a mut OrderedMap<K, V, S>,
    index: usize,
    can_remove: bool,
}

impl<K: Hash + Eq, V, S: BuildHasher> Cursor<'_, K, V, S> {
    /// Advances to the next entry in insertion order and returns it, or `None` when all entries
    /// were visited.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(&K, &mut V)> {
        if self.index >= self.map.keys.len() {
            self.can_remove = false;
            return None;
        }
        self.index += 1;
        self.can_remove = true;
        let key = self.map.keys.get(self.index - 1);
        let value = self.map.map.get_mut(key)?;
        Some((key, value))
    }

    /// Removes the entry returned by the last call to [`next`](Self::next).
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

impl<K, V, S> Drop for Cursor<'_, K, V, S> {
    fn drop(&mut self) {
        self.map.guard.exit();
    }
}
