//! [ObjectSet] is an unordered hash set using open addressing with linear probing.
use std::{
    borrow::Borrow,
    fmt,
    hash::{BuildHasher, Hash, Hasher},
};

use crate::{
    error::CapacityError,
    guard::CursorGuard,
    table::{RawCursor, RawIntoIter, RawIter, RawTable},
    util::{hash_unordered, join},
    Array, DefaultBuildHasher, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR,
};

/// An unordered hash set.
///
/// Shares its table with [`ObjectMap`](crate::ObjectMap), without storing any values.
#[derive(Clone)]
pub struct ObjectSet<T, S = DefaultBuildHasher> {
    table: RawTable<T, ()>,
    build_hasher: S,
    guard: CursorGuard,
}

impl<T, S: Default> Default for ObjectSet<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S: Default> ObjectSet<T, S> {
    /// Returns an empty set with a capacity of 51 items and a load factor of 0.8.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Returns an empty set that holds `capacity` items before growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_load_factor(capacity, DEFAULT_LOAD_FACTOR)
    }

    /// Returns an empty set with the specified capacity and load factor.
    ///
    /// Panics if the load factor is not strictly between 0 and 1 or the capacity is too large.
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f32) -> Self {
        match Self::try_with_capacity_and_load_factor(capacity, load_factor) {
            Ok(set) => set,
            Err(err) => panic!("{err}"),
        }
    }

    /// Returns an empty set with the specified capacity and load factor.
    pub fn try_with_capacity_and_load_factor(
        capacity: usize,
        load_factor: f32,
    ) -> Result<Self, CapacityError> {
        Self::try_with_config(capacity, load_factor, S::default())
    }
}

impl<T, S> ObjectSet<T, S> {
    /// Returns an empty set with the specified capacity, load factor and `BuildHasher`.
    pub fn try_with_config(
        capacity: usize,
        load_factor: f32,
        build_hasher: S,
    ) -> Result<Self, CapacityError> {
        Ok(ObjectSet {
            table: RawTable::try_new(capacity, load_factor)?,
            build_hasher,
            guard: CursorGuard::default(),
        })
    }

    /// Returns the number of items.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no items.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Returns the length of the backing table.
    #[inline(always)]
    pub fn table_len(&self) -> usize {
        self.table.table_len()
    }

    /// Returns the number of items at which the table grows.
    #[inline(always)]
    pub fn threshold(&self) -> usize {
        self.table.threshold()
    }

    /// Returns some item of the set, panics if the set is empty.
    pub fn first(&self) -> &T {
        match self.iter().next() {
            Some(item) => item,
            None => panic!("ObjectSet is empty."),
        }
    }

    /// Removes all items, keeping the backing table.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Removes all items and reduces the backing table to what `maximum_capacity` items need, if
    /// it is larger.
    pub fn clear_to(&mut self, maximum_capacity: usize) {
        if let Err(err) = self.table.clear_to(maximum_capacity) {
            panic!("{err}");
        }
    }

    /// Returns the items formatted with `separator` between them.
    pub fn join(&self, separator: &str) -> String
    where
        T: fmt::Display,
    {
        struct Joined<'a, T, S>(&'a ObjectSet<T, S>, &'a str);
        impl<T: fmt::Display, S> fmt::Display for Joined<'_, T, S> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                join(f, self.0.iter(), self.1)
            }
        }
        Joined(self, separator).to_string()
    }

    /// Returns an iterator over the items.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns the items collected into an [`Array`].
    pub fn to_array(&self) -> Array<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Returns a cursor that can remove items while enumerating them.
    ///
    /// Panics if an earlier cursor of this set was leaked.
    pub fn cursor(&mut self) -> Cursor<'_, T, S> {
        self.guard.enter();
        Cursor {
            raw: RawCursor::new(&self.table),
            set: self,
        }
    }
}

impl<T: Hash + Eq, S: BuildHasher> ObjectSet<T, S> {
    #[inline(always)]
    fn find<Q>(&self, key: &Q) -> Result<usize, usize>
    where
        Q: Hash + Eq + ?Sized,
        T: Borrow<Q>,
    {
        let hash = self.build_hasher.hash_one(key);
        self.table.find(hash, |k| k.borrow() == key)
    }

    /// Adds an item, returning `true` if it was not already present.
    ///
    /// An equal item that is already present is kept.
    pub fn add(&mut self, item: T) -> bool {
        match self.find(&item) {
            Ok(_) => false,
            Err(slot) => {
                let build_hasher = &self.build_hasher;
                self.table
                    .insert_vacant(slot, item, (), 0, |k| build_hasher.hash_one(k));
                true
            }
        }
    }

    /// Adds every item of the slice, growing the table once up front.
    pub fn add_all(&mut self, items: &[T])
    where
        T: Clone,
    {
        self.ensure_capacity(items.len());
        for item in items {
            self.add(item.clone());
        }
    }

    /// Adds every item of `other`, growing the table once up front.
    pub fn add_set(&mut self, other: &ObjectSet<T, S>)
    where
        T: Clone,
    {
        self.ensure_capacity(other.len());
        for item in other.iter() {
            self.add(item.clone());
        }
    }

    /// Returns the stored item equal to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        Q: Hash + Eq + ?Sized,
        T: Borrow<Q>,
    {
        let slot = self.find(key).ok()?;
        Some(&self.table.occupied(slot).0)
    }

    /// Returns `true` if the set contains the item.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Eq + ?Sized,
        T: Borrow<Q>,
    {
        self.find(key).is_ok()
    }

    /// Removes an item, returning `true` if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        Q: Hash + Eq + ?Sized,
        T: Borrow<Q>,
    {
        self.take(key).is_some()
    }

    /// Removes an item, returning the stored item.
    pub fn take<Q>(&mut self, key: &Q) -> Option<T>
    where
        Q: Hash + Eq + ?Sized,
        T: Borrow<Q>,
    {
        let slot = self.find(key).ok()?;
        let build_hasher = &self.build_hasher;
        let ((item, ()), _) = self.table.remove_at(slot, |k| build_hasher.hash_one(k));
        Some(item)
    }

    /// Grows the table so that `additional` more items fit without resizing.
    ///
    /// Panics if the resulting table would be too large.
    pub fn ensure_capacity(&mut self, additional: usize) {
        if let Err(err) = self.try_ensure_capacity(additional) {
            panic!("{err}");
        }
    }

    /// Grows the table so that `additional` more items fit without resizing.
    pub fn try_ensure_capacity(&mut self, additional: usize) -> Result<(), CapacityError> {
        let build_hasher = &self.build_hasher;
        self.table
            .reserve(self.table.len(), additional, |k| build_hasher.hash_one(k))
    }

    /// Reduces the table to what `maximum_capacity` items need, if it is larger.
    ///
    /// The table never shrinks below what the current items need.
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

/// Sets are equal when they contain the same items.
impl<T: Hash + Eq, S: BuildHasher> PartialEq for ObjectSet<T, S> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|item| other.contains(item))
    }
}

impl<T: Hash + Eq, S: BuildHasher> Eq for ObjectSet<T, S> {}

impl<T: Hash, S> Hash for ObjectSet<T, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_unordered(state, self.len(), self.iter());
    }
}

impl<T: fmt::Debug, S> fmt::Debug for ObjectSet<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display, S> fmt::Display for ObjectSet<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        join(f, self.iter(), ", ")?;
        f.write_str("}")
    }
}

impl<T: Hash + Eq, S: BuildHasher> Extend<T> for ObjectSet<T, S> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.ensure_capacity(iter.size_hint().0);
        for item in iter {
            self.add(item);
        }
    }
}

impl<T: Hash + Eq, S: BuildHasher + Default> FromIterator<T> for ObjectSet<T, S> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

/// An iterator over the items of an [`ObjectSet`].
///
/// This struct is created by the [`iter`](`ObjectSet::iter`) method on [`ObjectSet`].
pub struct Iter<'a, T> {
    inner: RawIter<'a, T, ()>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(item, ())| item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

/// An iterator moving items out of an [`ObjectSet`].
pub struct IntoIter<T> {
    inner: RawIntoIter<T, ()>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(item, ())| item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T, S> IntoIterator for ObjectSet<T, S> {
    type Item = T;
    type IntoIter = IntoIter<T>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a ObjectSet<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A cursor over an [`ObjectSet`] that can remove the item it last returned.
///
/// This struct is created by the [`cursor`](`ObjectSet::cursor`) method on [`ObjectSet`].
pub struct Cursor<'a, T, S> {
    set: &'a mut ObjectSet<T, S>,
    raw: RawCursor,
}

impl<T, S> Cursor<'_, T, S> {
    /// Advances to the next item and returns it, or `None` when all items were visited.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&T> {
        let slot = self.raw.next_slot(&self.set.table)?;
        Some(&self.set.table.occupied(slot).0)
    }

    /// Restarts the enumeration.
    pub fn reset(&mut self) {
        self.raw.reset();
    }
}

impl<T: Hash + Eq, S: BuildHasher> Cursor<'_, T, S> {
    /// Removes the item returned by the last call to [`next`](Self::next).
    pub fn remove(&mut self) -> T {
        let build_hasher = &self.set.build_hasher;
        let (item, ()) = self
            .raw
            .remove(&mut self.set.table, |k| build_hasher.hash_one(k));
        item
    }
}

impl<T, S> Drop for Cursor<'_, T, S> {
    fn drop(&mut self) {
        self.set.guard.exit();
    }
}
