//! [PrimitiveSet] is an unordered hash set of integers.
use std::{
    fmt,
    hash::{Hash, Hasher},
};

use crate::{
    error::CapacityError,
    guard::CursorGuard,
    primitive_map::{placement_hash, PrimitiveKey, ZeroState},
    table::{RawCursor, RawIter, RawTable},
    util::{hash_unordered, join},
    Array, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR,
};

/// An unordered set of `i32` values.
pub type IntSet = PrimitiveSet<i32>;

/// An unordered set of `i64` values.
pub type LongSet = PrimitiveSet<i64>;

/// An unordered hash set of integers.
///
/// Zero is tracked by a flag instead of being stored in the table, and always comes first during
/// iteration.
#[derive(Clone)]
pub struct PrimitiveSet<K> {
    table: RawTable<K, ()>,
    has_zero: bool,
    guard: CursorGuard,
}

impl<K: PrimitiveKey> Default for PrimitiveSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PrimitiveKey> PrimitiveSet<K> {
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
        Ok(PrimitiveSet {
            table: RawTable::try_new(capacity, load_factor)?,
            has_zero: false,
            guard: CursorGuard::default(),
        })
    }

    /// Returns the number of items, including zero.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.table.len() + self.has_zero as usize
    }

    /// Returns `true` if the set contains no items.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
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

    /// Adds an item, returning `true` if it was not already present.
    pub fn add(&mut self, key: K) -> bool {
        if key == K::ZERO {
            return !std::mem::replace(&mut self.has_zero, true);
        }
        match self.table.find(key.placement_hash(), |k| *k == key) {
            Ok(_) => false,
            Err(slot) => {
                let outside = self.has_zero as usize;
                self.table
                    .insert_vacant(slot, key, (), outside, placement_hash);
                true
            }
        }
    }

    /// Adds every item of the slice, growing the table once up front.
    pub fn add_all(&mut self, keys: &[K]) {
        self.ensure_capacity(keys.len());
        for &key in keys {
            self.add(key);
        }
    }

    /// Adds every item of `other`, growing the table once up front.
    pub fn add_set(&mut self, other: &PrimitiveSet<K>) {
        self.ensure_capacity(other.len());
        for key in other.iter() {
            self.add(key);
        }
    }

    /// Returns `true` if the set contains the item.
    pub fn contains(&self, key: K) -> bool {
        if key == K::ZERO {
            return self.has_zero;
        }
        self.table
            .find(key.placement_hash(), |k| *k == key)
            .is_ok()
    }

    /// Removes an item, returning `true` if it was present.
    pub fn remove(&mut self, key: K) -> bool {
        if key == K::ZERO {
            return std::mem::replace(&mut self.has_zero, false);
        }
        match self.table.find(key.placement_hash(), |k| *k == key) {
            Ok(slot) => {
                self.table.remove_at(slot, placement_hash);
                true
            }
            Err(_) => false,
        }
    }

    /// Returns some item of the set, zero if present. Panics if the set is empty.
    pub fn first(&self) -> K {
        match self.iter().next() {
            Some(key) => key,
            None => panic!("IntSet is empty."),
        }
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
        self.table.reserve(self.len(), additional, placement_hash)
    }

    /// Reduces the table to what `maximum_capacity` items need, if it is larger.
    ///
    /// The table never shrinks below what the current items need.
    pub fn shrink(&mut self, maximum_capacity: usize) {
        let live = self.len();
        if let Err(err) = self.table.shrink_to(maximum_capacity, live, placement_hash) {
            panic!("{err}");
        }
    }

    /// Removes all items, keeping the backing table.
    pub fn clear(&mut self) {
        self.has_zero = false;
        self.table.clear();
    }

    /// Removes all items and reduces the backing table to what `maximum_capacity` items need, if
    /// it is larger.
    pub fn clear_to(&mut self, maximum_capacity: usize) {
        self.has_zero = false;
        if let Err(err) = self.table.clear_to(maximum_capacity) {
            panic!("{err}");
        }
    }

    /// Returns the items formatted with `separator` between them.
    pub fn join(&self, separator: &str) -> String {
        struct Joined<'a, K>(&'a PrimitiveSet<K>, &'a str);
        impl<K: PrimitiveKey> fmt::Display for Joined<'_, K> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                join(f, self.0.iter(), self.1)
            }
        }
        Joined(self, separator).to_string()
    }

    /// Returns an iterator over the items, starting with zero.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            zero: self.has_zero,
            inner: self.table.iter(),
        }
    }

    /// Returns the items collected into an [`Array`].
    pub fn to_array(&self) -> Array<K> {
        self.iter().collect()
    }

    /// Returns a cursor that can remove items while enumerating them.
    ///
    /// Panics if an earlier cursor of this set was leaked.
    pub fn cursor(&mut self) -> Cursor<'_, K> {
        self.guard.enter();
        Cursor {
            raw: RawCursor::new(&self.table),
            zero: ZeroState::Pending,
            set: self,
        }
    }

    /// Asserts the structural invariants of the backing table.
    #[cfg(test)]
    pub(crate) fn check(&self) {
        self.table.check(placement_hash);
        assert!(self.table.iter().all(|(key, ())| *key != K::ZERO));
        assert!(self.len() <= self.threshold());
    }
}

/// Sets are equal when they contain the same items.
impl<K: PrimitiveKey> PartialEq for PrimitiveSet<K> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|key| other.contains(key))
    }
}

impl<K: PrimitiveKey> Eq for PrimitiveSet<K> {}

impl<K: PrimitiveKey> Hash for PrimitiveSet<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_unordered(state, self.len(), self.iter());
    }
}

impl<K: PrimitiveKey> fmt::Debug for PrimitiveSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: PrimitiveKey> fmt::Display for PrimitiveSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        join(f, self.iter(), ", ")?;
        f.write_str("}")
    }
}

impl<K: PrimitiveKey> Extend<K> for PrimitiveSet<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.ensure_capacity(iter.size_hint().0);
        for key in iter {
            self.add(key);
        }
    }
}

impl<K: PrimitiveKey> FromIterator<K> for PrimitiveSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

/// An iterator over the items of a [`PrimitiveSet`].
///
/// This struct is created by the [`iter`](`PrimitiveSet::iter`) method on [`PrimitiveSet`].
pub struct Iter<'a, K> {
    zero: bool,
    inner: RawIter<'a, K, ()>,
}

impl<K: PrimitiveKey> Iterator for Iter<'_, K> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        if std::mem::take(&mut self.zero) {
            return Some(K::ZERO);
        }
        self.inner.next().map(|(key, ())| *key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.inner.len() + self.zero as usize;
        (len, Some(len))
    }
}

impl<K: PrimitiveKey> ExactSizeIterator for Iter<'_, K> {}

impl<'a, K: PrimitiveKey> IntoIterator for &'a PrimitiveSet<K> {
    type Item = K;
    type IntoIter = Iter<'a, K>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A cursor over a [`PrimitiveSet`] that can remove the item it last returned.
///
/// This struct is created by the [`cursor`](`PrimitiveSet::cursor`) method on [`PrimitiveSet`].
pub struct Cursor<'a, K> {
    set: &'a mut PrimitiveSet<K>,
    raw: RawCursor,
    zero: ZeroState,
}

impl<K: PrimitiveKey> Cursor<'_, K> {
    /// Advances to the next item and returns it, or `None` when all items were visited.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<K> {
        if self.zero == ZeroState::Pending && self.set.has_zero {
            self.zero = ZeroState::Current;
            return Some(K::ZERO);
        }
        self.zero = ZeroState::Done;
        let slot = self.raw.next_slot(&self.set.table)?;
        Some(self.set.table.occupied(slot).0)
    }

    /// Removes the item returned by the last call to [`next`](Self::next).
    pub fn remove(&mut self) -> K {
        if self.zero == ZeroState::Current {
            self.zero = ZeroState::Done;
            self.set.has_zero = false;
            return K::ZERO;
        }
        let (key, ()) = self.raw.remove(&mut self.set.table, placement_hash);
        key
    }

    /// Restarts the enumeration.
    pub fn reset(&mut self) {
        self.zero = ZeroState::Pending;
        self.raw.reset();
    }
}

impl<K> Drop for Cursor<'_, K> {
    fn drop(&mut self) {
        self.set.guard.exit();
    }
}
