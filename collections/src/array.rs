//! [Array] is a growable array whose removals either preserve the order of the remaining items or
//! trade it for constant time removal.
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    ops::{Index, IndexMut},
};

use rand::Rng;

use crate::{
    guard::CursorGuard,
    identity::{matches, Identity},
    util::{grown_capacity, grown_capacity_by, grown_capacity_for, impl_iterator, join},
};

/// Capacity used by [`Array::new`].
pub const DEFAULT_ARRAY_CAPACITY: usize = 16;

/// A growable array.
///
/// The backing buffer grows to `max(8, len * 1.75)` whenever it is full, its capacity is otherwise
/// only changed by the explicit capacity management methods.
///
/// An unordered array does not preserve the order of its items on insertion and removal. Instead
/// [`insert`](Array::insert) moves the displaced item to the end and
/// [`remove_index`](Array::remove_index) moves the last item into the hole, so both run in
/// constant time.
#[derive(Clone)]
pub struct Array<T> {
    items: Vec<T>,
    ordered: bool,
    guard: CursorGuard,
}

impl<T> Default for Array<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Array<T> {
    /// Returns an empty ordered array with a capacity of 16.
    pub fn new() -> Self {
        Self::with_order(true, DEFAULT_ARRAY_CAPACITY)
    }

    /// Returns an empty ordered array with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_order(true, capacity)
    }

    /// Returns an empty array with the specified ordering and capacity.
    pub fn with_order(ordered: bool, capacity: usize) -> Self {
        Array {
            items: Vec::with_capacity(capacity),
            ordered,
            guard: CursorGuard::default(),
        }
    }

    /// Returns an ordered array containing the items of `vec`, using its buffer as backing store.
    pub fn from_vec(vec: Vec<T>) -> Self {
        Array {
            items: vec,
            ordered: true,
            guard: CursorGuard::default(),
        }
    }

    /// Returns `true` if removals preserve the order of the remaining items.
    #[inline(always)]
    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    /// Changes whether future insertions and removals preserve order.
    pub fn set_ordered(&mut self, ordered: bool) {
        self.ordered = ordered;
    }

    /// Returns the number of items.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the array contains no items.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the length of the backing buffer.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Returns the items as a slice.
    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Returns the items as a mutable slice.
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    /// Consumes the array, returning its items.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// Reallocates the backing buffer to hold exactly `new_capacity` items.
    ///
    /// The capacity never drops below the current length.
    pub(crate) fn resize(&mut self, new_capacity: usize) {
        let old_capacity = self.items.capacity();
        if new_capacity > old_capacity {
            self.items.reserve_exact(new_capacity - self.items.len());
        } else {
            self.items.shrink_to(new_capacity);
        }
        log::trace!(
            "array resized from {old_capacity} to {} slots",
            self.items.capacity()
        );
    }

    #[inline(always)]
    fn check_index(&self, index: usize) {
        if index >= self.items.len() {
            index_out_of_bounds(index, self.items.len());
        }
    }

    /// Appends a value.
    pub fn add(&mut self, value: T) {
        let len = self.items.len();
        if len == self.items.capacity() {
            self.resize(grown_capacity(len));
        }
        self.items.push(value);
    }

    /// Appends a small batch of values with a single capacity check.
    ///
    /// Batches of two to three values grow the buffer by the usual factor of 1.75, batches of four
    /// grow it by 1.8.
    pub fn add_batch<const N: usize>(&mut self, values: [T; N]) {
        let len = self.items.len();
        if N > 0 && len + N - 1 >= self.items.capacity() {
            let factor = if N >= 4 { 1.8 } else { 1.75 };
            let mut new_capacity = grown_capacity_by(len, factor);
            if new_capacity < len + N {
                new_capacity = grown_capacity_for(len, len + N);
            }
            self.resize(new_capacity);
        }
        self.items.extend(values);
    }

    /// Appends all values of the slice.
    pub fn add_all(&mut self, values: &[T])
    where
        T: Clone,
    {
        self.reserve_for(values.len());
        self.items.extend_from_slice(values);
    }

    /// Appends `count` items of `array` starting at `start`.
    ///
    /// Panics if `start + count` exceeds the length of `array`.
    pub fn add_all_from(&mut self, array: &Array<T>, start: usize, count: usize)
    where
        T: Clone,
    {
        assert!(
            start + count <= array.len(),
            "start + count must be <= size: {start} + {count} <= {}",
            array.len()
        );
        self.add_all(&array.items[start..start + count]);
    }

    fn reserve_for(&mut self, additional: usize) {
        let len = self.items.len();
        let needed = len + additional;
        if needed > self.items.capacity() {
            self.resize(grown_capacity_for(len, needed));
        }
    }

    /// Returns a reference to the item at `index`, panics if out-of-bounds.
    #[inline(always)]
    pub fn get(&self, index: usize) -> &T {
        self.check_index(index);
        &self.items[index]
    }

    /// Returns a mutable reference to the item at `index`, panics if out-of-bounds.
    #[inline(always)]
    pub fn get_mut(&mut self, index: usize) -> &mut T {
        self.check_index(index);
        &mut self.items[index]
    }

    /// Replaces the item at `index`, returning the previous item. Panics if out-of-bounds.
    pub fn set(&mut self, index: usize, value: T) -> T {
        std::mem::replace(self.get_mut(index), value)
    }

    /// Inserts a value at `index`, which may be equal to the length.
    ///
    /// An ordered array shifts the following items. An unordered array moves the item previously
    /// at `index` to the end.
    pub fn insert(&mut self, index: usize, value: T) {
        let len = self.items.len();
        assert!(index <= len, "index can't be > size: {index} > {len}");
        if len == self.items.capacity() {
            self.resize(grown_capacity(len));
        }
        if self.ordered {
            self.items.insert(index, value);
        } else if index == len {
            self.items.push(value);
        } else {
            let displaced = std::mem::replace(&mut self.items[index], value);
            self.items.push(displaced);
        }
    }

    /// Inserts a value at `index`, shifting the following items even if the array is unordered.
    pub(crate) fn insert_shifted(&mut self, index: usize, value: T) {
        let len = self.items.len();
        assert!(index <= len, "index can't be > size: {index} > {len}");
        if len == self.items.capacity() {
            self.resize(grown_capacity(len));
        }
        self.items.insert(index, value);
    }

    /// Inserts `count` copies of `value` at `index`, shifting the following items.
    pub fn insert_range(&mut self, index: usize, count: usize, value: T)
    where
        T: Clone,
    {
        let len = self.items.len();
        assert!(index <= len, "index can't be > size: {index} > {len}");
        self.reserve_for(count);
        self.items
            .splice(index..index, std::iter::repeat(value).take(count));
    }

    /// Swaps two items, panics if either index is out-of-bounds.
    pub fn swap(&mut self, first: usize, second: usize) {
        let len = self.items.len();
        assert!(first < len, "first can't be >= size: {first} >= {len}");
        assert!(second < len, "second can't be >= size: {second} >= {len}");
        self.items.swap(first, second);
    }

    /// Returns `true` if the array contains the value.
    ///
    /// With `identity` set, items are compared using [`Identity::identical`].
    pub fn contains(&self, value: &T, identity: bool) -> bool
    where
        T: Identity,
    {
        self.items
            .iter()
            .rev()
            .any(|item| matches(identity, item, value))
    }

    /// Returns `true` if the array contains every item of `values`.
    pub fn contains_all(&self, values: &Array<T>, identity: bool) -> bool
    where
        T: Identity,
    {
        values.iter().all(|value| self.contains(value, identity))
    }

    /// Returns `true` if the array contains any item of `values`.
    pub fn contains_any(&self, values: &Array<T>, identity: bool) -> bool
    where
        T: Identity,
    {
        values.iter().any(|value| self.contains(value, identity))
    }

    /// Returns the index of the first occurrence of the value.
    pub fn index_of(&self, value: &T, identity: bool) -> Option<usize>
    where
        T: Identity,
    {
        self.items
            .iter()
            .position(|item| matches(identity, item, value))
    }

    /// Returns the index of the last occurrence of the value.
    pub fn last_index_of(&self, value: &T, identity: bool) -> Option<usize>
    where
        T: Identity,
    {
        self.items
            .iter()
            .rposition(|item| matches(identity, item, value))
    }

    /// Removes the first occurrence of the value, returning `true` if it was found.
    pub fn remove_value(&mut self, value: &T, identity: bool) -> bool
    where
        T: Identity,
    {
        match self.index_of(value, identity) {
            Some(index) => {
                self.remove_index(index);
                true
            }
            None => false,
        }
    }

    /// Removes and returns the item at `index`, panics if out-of-bounds.
    ///
    /// An ordered array shifts the following items, an unordered array moves the last item into
    /// the hole.
    pub fn remove_index(&mut self, index: usize) -> T {
        self.check_index(index);
        if self.ordered {
            self.items.remove(index)
        } else {
            self.items.swap_remove(index)
        }
    }

    /// Removes the items from `start` to `end`, inclusive.
    ///
    /// An unordered array fills the gap with items taken from the end.
    pub fn remove_range(&mut self, start: usize, end: usize) {
        let len = self.items.len();
        assert!(end < len, "end can't be >= size: {end} >= {len}");
        assert!(start <= end, "start can't be > end: {start} > {end}");
        if self.ordered {
            self.items.drain(start..=end);
        } else {
            let count = end - start + 1;
            let keep_from = (len - count).max(end + 1);
            let moved: Vec<T> = self.items.drain(keep_from..).collect();
            let moved_len = moved.len();
            self.items.splice(start..start + moved_len, moved);
            self.items.truncate(len - count);
        }
    }

    /// Removes one occurrence of every item of `values`, returning `true` if anything was
    /// removed.
    pub fn remove_all(&mut self, values: &Array<T>, identity: bool) -> bool
    where
        T: Identity,
    {
        let start_len = self.items.len();
        for value in values.iter() {
            if let Some(index) = self.index_of(value, identity) {
                self.remove_index(index);
            }
        }
        self.items.len() != start_len
    }

    /// Removes and returns the last item, panics if the array is empty.
    pub fn pop(&mut self) -> T {
        match self.items.pop() {
            Some(item) => item,
            None => empty_array(),
        }
    }

    /// Returns the last item, panics if the array is empty.
    pub fn peek(&self) -> &T {
        match self.items.last() {
            Some(item) => item,
            None => empty_array(),
        }
    }

    /// Returns the first item, panics if the array is empty.
    pub fn first(&self) -> &T {
        match self.items.first() {
            Some(item) => item,
            None => empty_array(),
        }
    }

    /// Removes all items, keeping the backing buffer.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Reduces the backing buffer to the number of items.
    pub fn shrink(&mut self) {
        if self.items.capacity() != self.items.len() {
            self.resize(self.items.len());
        }
    }

    /// Grows the backing buffer to hold `additional` more items without reallocating.
    pub fn ensure_capacity(&mut self, additional: usize) {
        self.reserve_for(additional);
    }

    /// Truncates or extends the array to `new_len` items, filling new slots with defaults.
    pub fn set_size(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.truncate(new_len);
        if new_len > self.items.capacity() {
            self.resize(8.max(new_len));
        }
        self.items.resize_with(new_len, T::default);
    }

    /// Removes all items past `new_len`.
    pub fn truncate(&mut self, new_len: usize) {
        self.items.truncate(new_len);
    }

    /// Reverses the order of the items.
    pub fn reverse(&mut self) {
        self.items.reverse();
    }

    /// Shuffles the items using the provided random number generator.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for i in (1..self.items.len()).rev() {
            let j = rng.gen_range(0..=i);
            self.items.swap(i, j);
        }
    }

    /// Returns a random item, or `None` if the array is empty.
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
        if self.items.is_empty() {
            None
        } else {
            Some(&self.items[rng.gen_range(0..self.items.len())])
        }
    }

    /// Sorts the items. The sort is stable.
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.items.sort();
    }

    /// Sorts the items with a comparator. The sort is stable.
    pub fn sort_by(&mut self, compare: impl FnMut(&T, &T) -> Ordering) {
        self.items.sort_by(compare);
    }

    /// Returns the `kth_lowest` item according to the comparator, where 1 is the lowest.
    ///
    /// The array itself is left untouched.
    pub fn select_ranked(&self, compare: impl FnMut(&T, &T) -> Ordering, kth_lowest: usize) -> &T {
        &self.items[self.select_ranked_index(compare, kth_lowest)]
    }

    /// Returns the index of the `kth_lowest` item according to the comparator, where 1 is the
    /// lowest.
    pub fn select_ranked_index(
        &self,
        mut compare: impl FnMut(&T, &T) -> Ordering,
        kth_lowest: usize,
    ) -> usize {
        assert!(
            kth_lowest >= 1,
            "nth_lowest must be greater than 0, 1 = first, 2 = second..."
        );
        let len = self.items.len();
        assert!(kth_lowest <= len, "nth_lowest can't be > size: {kth_lowest} > {len}");
        if kth_lowest == 1 {
            let mut lowest = 0;
            for index in 1..len {
                if compare(&self.items[index], &self.items[lowest]) == Ordering::Less {
                    lowest = index;
                }
            }
            return lowest;
        }
        let mut indices: Vec<usize> = (0..len).collect();
        let (_, &mut index, _) = indices.select_nth_unstable_by(kth_lowest - 1, |&a, &b| {
            compare(&self.items[a], &self.items[b])
        });
        index
    }

    /// Returns `true` if both arrays are ordered and hold identical items in the same order.
    pub fn equals_identity(&self, other: &Array<T>) -> bool
    where
        T: Identity,
    {
        self.ordered
            && other.ordered
            && self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .zip(other.items.iter())
                .all(|(a, b)| a.identical(b))
    }

    /// Returns the items formatted with `separator` between them.
    pub fn join(&self, separator: &str) -> String
    where
        T: fmt::Display,
    {
        struct Joined<'a, T>(&'a [T], &'a str);
        impl<T: fmt::Display> fmt::Display for Joined<'_, T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                join(f, self.0, self.1)
            }
        }
        Joined(&self.items, separator).to_string()
    }

    /// Returns an iterator over the items.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.items.iter(),
        }
    }

    /// Returns an iterator over the items, allowing mutation.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            inner: self.items.iter_mut(),
        }
    }

    /// Returns a cursor that can remove items while enumerating them.
    ///
    /// Panics if an earlier cursor of this array was leaked.
    pub fn cursor(&mut self) -> ArrayCursor<'_, T> {
        self.guard.enter();
        ArrayCursor {
            array: self,
            index: 0,
            can_remove: false,
        }
    }
}

#[cold]
#[inline(never)]
#[track_caller]
fn index_out_of_bounds(index: usize, len: usize) -> ! {
    panic!("index can't be >= size: {index} >= {len}")
}

#[cold]
#[inline(never)]
#[track_caller]
fn empty_array() -> ! {
    panic!("Array is empty.")
}

impl<T> Index<usize> for Array<T> {
    type Output = T;

    #[inline(always)]
    fn index(&self, index: usize) -> &T {
        self.get(index)
    }
}

impl<T> IndexMut<usize> for Array<T> {
    #[inline(always)]
    fn index_mut(&mut self, index: usize) -> &mut T {
        self.get_mut(index)
    }
}

/// Arrays are only equal if both are ordered.
impl<T: PartialEq> PartialEq for Array<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ordered && other.ordered && self.items == other.items
    }
}

impl<T: Hash> Hash for Array<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.items.hash(state);
    }
}

impl<T: fmt::Debug> fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        join(f, &self.items, ", ")?;
        f.write_str("]")
    }
}

impl<T> From<Vec<T>> for Array<T> {
    fn from(vec: Vec<T>) -> Self {
        Self::from_vec(vec)
    }
}

impl<T, const N: usize> From<[T; N]> for Array<T> {
    fn from(items: [T; N]) -> Self {
        Self::from_vec(Vec::from(items))
    }
}

impl<T> Extend<T> for Array<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve_for(iter.size_hint().0);
        for value in iter {
            self.add(value);
        }
    }
}

impl<T> FromIterator<T> for Array<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut array = Array::with_capacity(iter.size_hint().0);
        array.extend(iter);
        array
    }
}

/// An iterator over the items of an [`Array`].
///
/// This struct is created by the [`iter`](`Array::iter`) method on [`Array`].
pub struct Iter<'a, T> {
    inner: std::slice::Iter<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    impl_iterator!();
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

/// An iterator over the items of an [`Array`], allowing mutation.
///
/// This struct is created by the [`iter_mut`](`Array::iter_mut`) method on [`Array`].
pub struct IterMut<'a, T> {
    inner: std::slice::IterMut<'a, T>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;
    impl_iterator!();
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

/// An iterator moving items out of an [`Array`].
pub struct IntoIter<T> {
    inner: std::vec::IntoIter<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;
    impl_iterator!();
}

impl<T> IntoIterator for Array<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.items.into_iter(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Array<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Array<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A cursor over an [`Array`] that can remove the item it last returned.
///
/// This struct is created by the [`cursor`](`Array::cursor`) method on [`Array`].
pub struct ArrayCursor<'a, T> {
    array: &'a mut Array<T>,
    index: usize,
    can_remove: bool,
}

impl<T> ArrayCursor<'_, T> {
    /// Advances to the next item and returns it, or `None` when all items were visited.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&mut T> {
        if self.index >= self.array.len() {
            self.can_remove = false;
            return None;
        }
        self.index += 1;
        self.can_remove = true;
        Some(&mut self.array.items[self.index - 1])
    }

    /// Removes the item returned by the last call to [`next`](Self::next).
    ///
    /// The following call to `next` continues with the item that took its place.
    pub fn remove(&mut self) -> T {
        assert!(self.can_remove, "next must be called before remove.");
        self.can_remove = false;
        self.index -= 1;
        self.array.remove_index(self.index)
    }

    /// Restarts the enumeration at the first item.
    pub fn reset(&mut self) {
        self.index = 0;
        self.can_remove = false;
    }
}

impl<T> Drop for ArrayCursor<'_, T> {
    fn drop(&mut self) {
        self.array.guard.exit();
    }
}
