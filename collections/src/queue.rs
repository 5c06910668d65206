//! [Queue] is a double-ended queue backed by a circular buffer.
use std::{
    fmt,
    hash::{Hash, Hasher},
};

use crate::{
    guard::CursorGuard,
    identity::{matches, Identity},
    util::join,
};

/// Capacity used by [`Queue::new`].
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// A double-ended queue with amortized constant time insertion and removal at both ends.
///
/// The items occupy the slots from `head` walking forward to `tail`, wrapping around at the end
/// of the buffer. A full buffer is doubled and unwrapped so the items start at slot 0 again.
#[derive(Clone)]
pub struct Queue<T> {
    values: Box<[Option<T>]>,
    head: usize,
    tail: usize,
    size: usize,
    guard: CursorGuard,
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Queue<T> {
    /// Returns an empty queue with a capacity of 16.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Returns an empty queue with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Queue {
            values: empty_slots(capacity),
            head: 0,
            tail: 0,
            size: 0,
            guard: CursorGuard::default(),
        }
    }

    /// Returns the number of items.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the queue contains no items.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the length of the backing buffer.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    /// Maps a logical index to its slot in the backing buffer.
    #[inline(always)]
    fn slot(&self, index: usize) -> usize {
        let slot = self.head + index;
        if slot >= self.values.len() {
            slot - self.values.len()
        } else {
            slot
        }
    }

    #[inline(always)]
    fn grow_if_full(&mut self) {
        if self.size == self.values.len() {
            self.resize((self.values.len() << 1).max(1));
        }
    }

    /// Moves the items into a fresh buffer of `new_len` slots, starting at slot 0.
    fn resize(&mut self, new_len: usize) {
        let old_len = self.values.len();
        let mut new_values = empty_slots(new_len);
        for (index, target) in new_values.iter_mut().take(self.size).enumerate() {
            let slot = self.slot(index);
            *target = self.values[slot].take();
        }
        self.values = new_values;
        self.head = 0;
        self.tail = self.size;
        log::trace!("queue resized from {old_len} to {new_len} slots");
    }

    /// Appends a value to the back of the queue.
    pub fn add_last(&mut self, value: T) {
        self.grow_if_full();
        self.values[self.tail] = Some(value);
        self.tail += 1;
        if self.tail == self.values.len() {
            self.tail = 0;
        }
        self.size += 1;
    }

    /// Prepends a value to the front of the queue.
    pub fn add_first(&mut self, value: T) {
        self.grow_if_full();
        self.head = if self.head == 0 {
            self.values.len() - 1
        } else {
            self.head - 1
        };
        self.values[self.head] = Some(value);
        self.size += 1;
    }

    /// Grows the backing buffer so `additional` more items fit without reallocating.
    pub fn ensure_capacity(&mut self, additional: usize) {
        let needed = self.size + additional;
        if self.values.len() < needed {
            self.resize(needed);
        }
    }

    /// Removes and returns the first item, panics if the queue is empty.
    pub fn remove_first(&mut self) -> T {
        if self.size == 0 {
            empty_queue();
        }
        let Some(value) = self.values[self.head].take() else {
            unreachable!("occupied slot at queue head")
        };
        self.head += 1;
        if self.head == self.values.len() {
            self.head = 0;
        }
        self.size -= 1;
        value
    }

    /// Removes and returns the last item, panics if the queue is empty.
    pub fn remove_last(&mut self) -> T {
        if self.size == 0 {
            empty_queue();
        }
        self.tail = if self.tail == 0 {
            self.values.len() - 1
        } else {
            self.tail - 1
        };
        let Some(value) = self.values[self.tail].take() else {
            unreachable!("occupied slot at queue tail")
        };
        self.size -= 1;
        value
    }

    /// Returns the index of the first occurrence of the value, counted from the front.
    ///
    /// With `identity` set, items are compared using [`Identity::identical`].
    pub fn index_of(&self, value: &T, identity: bool) -> Option<usize>
    where
        T: Identity,
    {
        let (front, back) = self.as_slot_slices();
        let found = |slots: &[Option<T>]| {
            slots
                .iter()
                .position(|slot| slot.as_ref().is_some_and(|item| matches(identity, item, value)))
        };
        match found(front) {
            Some(index) => Some(index),
            None => found(back).map(|index| front.len() + index),
        }
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

    /// Removes and returns the item at `index`, counted from the front.
    ///
    /// Only the items on the shorter side of `index` are moved.
    pub fn remove_index(&mut self, index: usize) -> T {
        self.check_index(index);
        let removed = self.slot(index);
        let Some(value) = self.values[removed].take() else {
            unreachable!("occupied slot inside the queue")
        };
        if index < self.size / 2 {
            for i in (0..index).rev() {
                let (from, to) = (self.slot(i), self.slot(i + 1));
                self.values.swap(from, to);
            }
            self.head = self.slot(1);
        } else {
            for i in index..self.size - 1 {
                let (to, from) = (self.slot(i), self.slot(i + 1));
                self.values.swap(from, to);
            }
            self.tail = self.slot(self.size - 1);
        }
        self.size -= 1;
        value
    }

    #[inline(always)]
    fn check_index(&self, index: usize) {
        if index >= self.size {
            index_out_of_bounds(index, self.size);
        }
    }

    /// Returns the item at `index`, counted from the front. Panics if out-of-bounds.
    pub fn get(&self, index: usize) -> &T {
        self.check_index(index);
        match &self.values[self.slot(index)] {
            Some(value) => value,
            None => unreachable!("occupied slot inside the queue"),
        }
    }

    /// Returns the item at `index` mutably, counted from the front. Panics if out-of-bounds.
    pub fn get_mut(&mut self, index: usize) -> &mut T {
        self.check_index(index);
        let slot = self.slot(index);
        match &mut self.values[slot] {
            Some(value) => value,
            None => unreachable!("occupied slot inside the queue"),
        }
    }

    /// Returns the first item, panics if the queue is empty.
    pub fn first(&self) -> &T {
        if self.size == 0 {
            empty_queue();
        }
        self.get(0)
    }

    /// Returns the last item, panics if the queue is empty.
    pub fn last(&self) -> &T {
        if self.size == 0 {
            empty_queue();
        }
        self.get(self.size - 1)
    }

    /// Removes all items, keeping the backing buffer.
    pub fn clear(&mut self) {
        for slot in self.values.iter_mut() {
            *slot = None;
        }
        self.head = 0;
        self.tail = 0;
        self.size = 0;
    }

    /// Returns `true` if both queues hold identical items in the same logical order.
    pub fn equals_identity(&self, other: &Queue<T>) -> bool
    where
        T: Identity,
    {
        self.size == other.size && self.iter().zip(other.iter()).all(|(a, b)| a.identical(b))
    }

    /// Returns the items formatted with `separator` between them.
    pub fn join(&self, separator: &str) -> String
    where
        T: fmt::Display,
    {
        struct Joined<'a, T>(&'a Queue<T>, &'a str);
        impl<T: fmt::Display> fmt::Display for Joined<'_, T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                join(f, self.0.iter(), self.1)
            }
        }
        Joined(self, separator).to_string()
    }

    /// Splits the occupied slots into the part before and after the wraparound.
    fn as_slot_slices(&self) -> (&[Option<T>], &[Option<T>]) {
        if self.size == 0 {
            (&[], &[])
        } else if self.head < self.tail {
            (&self.values[self.head..self.tail], &[])
        } else {
            (&self.values[self.head..], &self.values[..self.tail])
        }
    }

    /// Returns an iterator over the items from front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        let (front, back) = self.as_slot_slices();
        Iter {
            inner: front.iter().chain(back.iter()).flatten(),
            remaining: self.size,
        }
    }

    /// Returns an iterator over the items from front to back, allowing mutation.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let (head, tail, remaining) = (self.head, self.tail, self.size);
        let (front, back): (&mut [Option<T>], &mut [Option<T>]) = if remaining == 0 {
            (&mut [], &mut [])
        } else if head < tail {
            (&mut self.values[head..tail], &mut [])
        } else {
            let (back, front) = self.values.split_at_mut(head);
            (front, &mut back[..tail])
        };
        IterMut {
            inner: front.iter_mut().chain(back.iter_mut()).flatten(),
            remaining,
        }
    }

    /// Returns a cursor that can remove items while enumerating them from front to back.
    ///
    /// Panics if an earlier cursor of this queue was leaked.
    pub fn cursor(&mut self) -> QueueCursor<'_, T> {
        self.guard.enter();
        QueueCursor {
            queue: self,
            index: 0,
            can_remove: false,
        }
    }
}

fn empty_slots<T>(len: usize) -> Box<[Option<T>]> {
    std::iter::repeat_with(|| None).take(len).collect()
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
fn empty_queue() -> ! {
    panic!("Queue is empty.")
}

/// Queues are equal when they hold equal items in the same logical order, regardless of where
/// the items are placed in the backing buffer.
impl<T: PartialEq> PartialEq for Queue<T> {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for Queue<T> {}

impl<T: Hash> Hash for Queue<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.size);
        for value in self.iter() {
            value.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        join(f, self.iter(), ", ")?;
        f.write_str("]")
    }
}

impl<T> Extend<T> for Queue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.ensure_capacity(iter.size_hint().0);
        for value in iter {
            self.add_last(value);
        }
    }
}

impl<T> FromIterator<T> for Queue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut queue = Queue::new();
        queue.extend(iter);
        queue
    }
}

type SlotChain<I> = std::iter::Flatten<std::iter::Chain<I, I>>;

/// An iterator over the items of a [`Queue`].
///
/// This struct is created by the [`iter`](`Queue::iter`) method on [`Queue`].
pub struct Iter<'a, T> {
    inner: SlotChain<std::slice::Iter<'a, Option<T>>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.inner.next()?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// An iterator over the items of a [`Queue`], allowing mutation.
///
/// This struct is created by the [`iter_mut`](`Queue::iter_mut`) method on [`Queue`].
pub struct IterMut<'a, T> {
    inner: SlotChain<std::slice::IterMut<'a, Option<T>>>,
    remaining: usize,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.inner.next()?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

/// An iterator moving items out of a [`Queue`] from front to back.
pub struct IntoIter<T> {
    queue: Queue<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.queue.is_empty() {
            None
        } else {
            Some(self.queue.remove_first())
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.queue.len(), Some(self.queue.len()))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> IntoIterator for Queue<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter { queue: self }
    }
}

impl<'a, T> IntoIterator for &'a Queue<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A cursor over a [`Queue`] that can remove the item it last returned.
///
/// This struct is created by the [`cursor`](`Queue::cursor`) method on [`Queue`].
pub struct QueueCursor<'a, T> {
    queue: &'a mut Queue<T>,
    index: usize,
    can_remove: bool,
}

impl<T> QueueCursor<'_, T> {
    /// Advances to the next item and returns it, or `None` when all items were visited.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&mut T> {
        if self.index >= self.queue.len() {
            self.can_remove = false;
            return None;
        }
        self.index += 1;
        self.can_remove = true;
        Some(self.queue.get_mut(self.index - 1))
    }

    /// Removes the item returned by the last call to [`next`](Self::next).
    pub fn remove(&mut self) -> T {
        assert!(self.can_remove, "next must be called before remove.");
        self.can_remove = false;
        self.index -= 1;
        self.queue.remove_index(self.index)
    }

    /// Restarts the enumeration at the first item.
    pub fn reset(&mut self) {
        self.index = 0;
        self.can_remove = false;
    }
}

impl<T> Drop for QueueCursor<'_, T> {
    fn drop(&mut self) {
        self.queue.guard.exit();
    }
}
