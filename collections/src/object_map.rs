//! [ObjectMap] is an unordered hash map using open addressing with linear probing.
use std::{
    borrow::Borrow,
    fmt,
    hash::{BuildHasher, Hash, Hasher},
    ops::Index,
};

use crate::{
    error::CapacityError,
    guard::CursorGuard,
    identity::{matches, Identity},
    table::{RawCursor, RawIntoIter, RawIter, RawIterMut, RawTable},
    util::{hash_unordered, impl_iterator, join},
    Array, DefaultBuildHasher, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR,
};

/// An unordered hash map.
///
/// Entries live directly in a power-of-two sized table. Lookups probe linearly from the slot
/// picked by Fibonacci hashing the key's hash. Once the number of entries reaches
/// `load_factor * table length`, the table doubles and every entry is rehashed.
///
/// Iteration order depends on the table layout and changes whenever the table is resized.
#[derive(Clone)]
pub struct ObjectMap<K, V, S = DefaultBuildHasher> {
    table: RawTable<K, V>,
    build_hasher: S,
    guard: CursorGuard,
}

impl<K, V, S: Default> Default for ObjectMap<K, V, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S: Default> ObjectMap<K, V, S> {
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
    /// Panics if the load factor is not strictly between 0 and 1 or the capacity is too large,
    /// see [`try_with_capacity_and_load_factor`](Self::try_with_capacity_and_load_factor).
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
        Self::try_with_config(capacity, load_factor, S::default())
    }
}

impl<K, V, S> ObjectMap<K, V, S> {
    /// Returns an empty map with the specified capacity, load factor and `BuildHasher`.
    pub fn try_with_config(
        capacity: usize,
        load_factor: f32,
        build_hasher: S,
    ) -> Result<Self, CapacityError> {
        Ok(ObjectMap {
            table: RawTable::try_new(capacity, load_factor)?,
            build_hasher,
            guard: CursorGuard::default(),
        })
    }

    /// Returns the number of entries.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
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

    /// Returns the load factor the table was created with.
    #[inline(always)]
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Returns the `BuildHasher` used by the map.
    pub fn hasher(&self) -> &S {
        &self.build_hasher
    }

    /// Removes all entries, keeping the backing table.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Removes all entries and reduces the backing table to what `maximum_capacity` entries
    /// need, if it is larger.
    pub fn clear_to(&mut self, maximum_capacity: usize) {
        if let Err(err) = self.table.clear_to(maximum_capacity) {
            panic!("{err}");
        }
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
    ///
    /// This compares every value. With `identity` set, values are compared using
    /// [`Identity::identical`].
    pub fn find_key(&self, value: &V, identity: bool) -> Option<&K>
    where
        V: Identity,
    {
        self.iter()
            .find(|(_, stored)| matches(identity, *stored, value))
            .map(|(key, _)| key)
    }

    /// Returns `true` if both maps contain the same keys, mapped to identical values.
    pub fn equals_identity(&self, other: &Self) -> bool
    where
        K: Hash + Eq,
        V: Identity,
        S: BuildHasher,
    {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|v| v.identical(value)))
    }

    /// Returns the entries formatted as `key=value` with `separator` between them.
    pub fn join(&self, separator: &str) -> String
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        struct Joined<'a, K, V, S>(&'a ObjectMap<K, V, S>, &'a str);
        impl<K: fmt::Display, V: fmt::Display, S> fmt::Display for Joined<'_, K, V, S> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                join(f, self.0.iter().map(|(k, v)| Pair(k, v)), self.1)
            }
        }
        Joined(self, separator).to_string()
    }

    /// Returns an iterator over the entries.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the entries, allowing mutation of the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> Values<'_, K, V> {
        Values {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the values, allowing mutation.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns the entries collected into an [`Array`].
    pub fn to_array(&self) -> Array<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Returns a cursor that can remove entries while enumerating them.
    ///
    /// Panics if an earlier cursor of this map was leaked.
    pub fn cursor(&mut self) -> Cursor<'_, K, V, S> {
        self.guard.enter();
        Cursor {
            raw: RawCursor::new(&self.table),
            map: self,
        }
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> ObjectMap<K, V, S> {
    #[inline(always)]
    fn find<Q>(&self, key: &Q) -> Result<usize, usize>
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        let hash = self.build_hasher.hash_one(key);
        self.table.find(hash, |k| k.borrow() == key)
    }

    /// Inserts a key-value pair, returning the previous value of the key.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.find(&key) {
            Ok(slot) => Some(std::mem::replace(
                &mut self.table.occupied_mut(slot).1,
                value,
            )),
            Err(slot) => {
                let build_hasher = &self.build_hasher;
                self.table
                    .insert_vacant(slot, key, value, 0, |k| build_hasher.hash_one(k));
                None
            }
        }
    }

    /// Inserts every entry of `other`, growing the table once up front.
    pub fn insert_all(&mut self, other: &ObjectMap<K, V, S>)
    where
        K: Clone,
        V: Clone,
    {
        self.ensure_capacity(other.len());
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
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the value of the key, or `default` if the key is absent.
    pub fn get_or<'a, Q>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        self.get(key).unwrap_or(default)
    }

    /// Returns the stored key and the value of the key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        let slot = self.find(key).ok()?;
        let (k, v) = self.table.occupied(slot);
        Some((k, v))
    }

    /// Returns a mutable reference to the value of the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        let slot = self.find(key).ok()?;
        Some(&mut self.table.occupied_mut(slot).1)
    }

    /// Returns `true` if the map contains the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        self.find(key).is_ok()
    }

    /// Removes a key, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key, returning the stored key and its value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        let slot = self.find(key).ok()?;
        let build_hasher = &self.build_hasher;
        let (entry, _) = self.table.remove_at(slot, |k| build_hasher.hash_one(k));
        Some(entry)
    }

    /// Grows the table so that `additional` more entries fit without resizing.
    ///
    /// Panics if the resulting table would be too large, see
    /// [`try_ensure_capacity`](Self::try_ensure_capacity).
    pub fn ensure_capacity(&mut self, additional: usize) {
        if let Err(err) = self.try_ensure_capacity(additional) {
            panic!("{err}");
        }
    }

    /// Grows the table so that `additional` more entries fit without resizing.
    pub fn try_ensure_capacity(&mut self, additional: usize) -> Result<(), CapacityError> {
        let build_hasher = &self.build_hasher;
        self.table
            .reserve(self.table.len(), additional, |k| build_hasher.hash_one(k))
    }

    /// Reduces the table to what `maximum_capacity` entries need, if it is larger.
    ///
    /// The table never shrinks below what the current entries need.
    pub fn shrink(&mut self, maximum_capacity: usize) {
        let build_hasher = &self.build_hasher;
        let live = self.table.len();
        if let Err(err) = self
            .table
            .shrink_to(maximum_capacity, live, |k| build_hasher.hash_one(k))
        {
            panic!("{err}");
        }
    }

    /// Asserts the structural invariants of the backing table.
    #[cfg(test)]
    pub(crate) fn check(&self) {
        let build_hasher = &self.build_hasher;
        self.table.check(|k| build_hasher.hash_one(k));
        assert!(self.len() <= self.threshold());
    }
}

/// Formats an entry as `key=value`.
pub(crate) struct Pair<K, V>(pub K, pub V);

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Pair<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.0, self.1)
    }
}

/// Maps are equal when they contain the same keys mapped to equal values.
impl<K: Hash + Eq, V: PartialEq, S: BuildHasher> PartialEq for ObjectMap<K, V, S> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Hash + Eq, V: Eq, S: BuildHasher> Eq for ObjectMap<K, V, S> {}

impl<K: Hash, V: Hash, S> Hash for ObjectMap<K, V, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_unordered(state, self.len(), self.iter());
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for ObjectMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display, S> fmt::Display for ObjectMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        join(f, self.iter().map(|(k, v)| Pair(k, v)), ", ")?;
        f.write_str("}")
    }
}

impl<K, Q, V, S> Index<&Q> for ObjectMap<K, V, S>
where
    K: Hash + Eq + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key not found"),
        }
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> Extend<(K, V)> for ObjectMap<K, V, S> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.ensure_capacity(iter.size_hint().0);
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Hash + Eq, V, S: BuildHasher + Default> FromIterator<(K, V)> for ObjectMap<K, V, S> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

/// An iterator over the entries of an [`ObjectMap`].
///
/// This struct is created by the [`iter`](`ObjectMap::iter`) method on [`ObjectMap`].
pub struct Iter<'a, K, V> {
    inner: RawIter<'a, K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    impl_iterator!(|entry| (&entry.0, &entry.1));
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// An iterator over the entries of an [`ObjectMap`], allowing mutation of the values.
///
/// This struct is created by the [`iter_mut`](`ObjectMap::iter_mut`) method on [`ObjectMap`].
pub struct IterMut<'a, K, V> {
    inner: RawIterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    impl_iterator!(|entry| (&entry.0, &mut entry.1));
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of an [`ObjectMap`].
///
/// This struct is created by the [`keys`](`ObjectMap::keys`) method on [`ObjectMap`].
pub struct Keys<'a, K, V> {
    inner: RawIter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;
    impl_iterator!(|entry| &entry.0);
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K: Clone, V> Keys<'_, K, V> {
    /// Collects the remaining keys into an [`Array`].
    pub fn to_array(self) -> Array<K> {
        self.cloned().collect()
    }
}

/// An iterator over the values of an [`ObjectMap`].
///
/// This struct is created by the [`values`](`ObjectMap::values`) method on [`ObjectMap`].
pub struct Values<'a, K, V> {
    inner: RawIter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;
    impl_iterator!(|entry| &entry.1);
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V: Clone> Values<'_, K, V> {
    /// Collects the remaining values into an [`Array`].
    pub fn to_array(self) -> Array<V> {
        self.cloned().collect()
    }
}

/// An iterator over the values of an [`ObjectMap`], allowing mutation.
///
/// This struct is created by the [`values_mut`](`ObjectMap::values_mut`) method on [`ObjectMap`].
pub struct ValuesMut<'a, K, V> {
    inner: RawIterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;
    impl_iterator!(|entry| &mut entry.1);
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

/// An iterator moving entries out of an [`ObjectMap`].
pub struct IntoIter<K, V> {
    inner: RawIntoIter<K, V>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);
    impl_iterator!();
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V, S> IntoIterator for ObjectMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a ObjectMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ObjectMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A cursor over an [`ObjectMap`] that can remove the entry it last returned.
///
/// This struct is created by the [`cursor`](`ObjectMap::cursor`) method on [`ObjectMap`].
pub struct Cursor<'a, K, V, S> {
    map: &'a mut ObjectMap<K, V, S>,
    raw: RawCursor,
}

impl<K, V, S> Cursor<'_, K, V, S> {
    /// Advances to the next entry and returns it, or `None` when all entries were visited.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(&K, &mut V)> {
        let slot = self.raw.next_slot(&self.map.table)?;
        let (key, value) = self.map.table.occupied_mut(slot);
        Some((&*key, value))
    }

    /// Restarts the enumeration.
    pub fn reset(&mut self) {
        self.raw.reset();
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> Cursor<'_, K, V, S> {
    /// Removes the entry returned by the last call to [`next`](Self::next).
    pub fn remove(&mut self) -> (K, V) {
        let build_hasher = &self.map.build_hasher;
        self.raw
            .remove(&mut self.map.table, |k| build_hasher.hash_one(k))
    }
}

impl<K, V, S> Drop for Cursor<'_, K, V, S> {
    fn drop(&mut self) {
        self.map.guard.exit();
    }
}
