//! Open addressing hash table engine shared by all maps and sets.
//!
//! The table is a power-of-two sized buffer of optional entries. Keys are placed using Fibonacci
//! hashing and collisions are resolved by linear probing. Removal shifts later entries of the
//! probe chain backwards, so no tombstones are ever written.
//!
//! The engine does not know how to hash its keys. Every operation that needs to place a key takes
//! a `hash` closure, which lets object keyed containers use a
//! [`BuildHasher`](std::hash::BuildHasher) while primitive keyed containers hash the key value
//! directly.
use crate::{error::CapacityError, GOLDEN_RATIO_64, MAX_TABLE_LEN};

/// Returns the table length needed to hold `capacity` entries at the given load factor.
pub(crate) fn table_len(capacity: usize, load_factor: f32) -> Result<usize, CapacityError> {
    let needed = (capacity as f32 / load_factor).ceil() as usize;
    match needed.max(2).checked_next_power_of_two() {
        Some(len) if len <= MAX_TABLE_LEN => Ok(len),
        _ => Err(CapacityError::TooLarge(capacity)),
    }
}

pub(crate) fn check_load_factor(load_factor: f32) -> Result<(), CapacityError> {
    if load_factor > 0.0 && load_factor < 1.0 {
        Ok(())
    } else {
        Err(CapacityError::InvalidLoadFactor(load_factor))
    }
}

fn allocate<K, V>(len: usize) -> Box<[Option<(K, V)>]> {
    std::iter::repeat_with(|| None).take(len).collect()
}

#[derive(Clone, Debug)]
pub(crate) struct RawTable<K, V> {
    slots: Box<[Option<(K, V)>]>,
    size: usize,
    mask: usize,
    shift: u32,
    threshold: usize,
    load_factor: f32,
}

impl<K, V> RawTable<K, V> {
    pub fn try_new(capacity: usize, load_factor: f32) -> Result<Self, CapacityError> {
        check_load_factor(load_factor)?;
        let len = table_len(capacity, load_factor)?;
        let mut table = RawTable {
            slots: allocate(len),
            size: 0,
            mask: 0,
            shift: 0,
            threshold: 0,
            load_factor,
        };
        table.set_len(len);
        Ok(table)
    }

    fn set_len(&mut self, len: usize) {
        debug_assert!(len.is_power_of_two());
        self.threshold = (len as f32 * self.load_factor) as usize;
        self.mask = len - 1;
        self.shift = (self.mask as u64).leading_zeros();
    }

    /// Number of entries stored in the table.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline(always)]
    pub fn table_len(&self) -> usize {
        self.slots.len()
    }

    #[inline(always)]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    #[inline(always)]
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Ideal slot of a key with the given hash.
    #[inline(always)]
    pub fn place(&self, hash: u64) -> usize {
        (hash.wrapping_mul(GOLDEN_RATIO_64) >> self.shift) as usize
    }

    /// Probes for a key, returning `Ok(slot)` if found or `Err(slot)` with the first empty slot
    /// otherwise.
    #[inline]
    pub fn find(&self, hash: u64, mut eq: impl FnMut(&K) -> bool) -> Result<usize, usize> {
        let mut i = self.place(hash);
        loop {
            match &self.slots[i] {
                None => return Err(i),
                Some((key, _)) if eq(key) => return Ok(i),
                Some(_) => i = (i + 1) & self.mask,
            }
        }
    }

    #[inline(always)]
    pub fn occupied(&self, slot: usize) -> &(K, V) {
        match &self.slots[slot] {
            Some(entry) => entry,
            None => unreachable!("slot {slot} is empty"),
        }
    }

    #[inline(always)]
    pub fn occupied_mut(&mut self, slot: usize) -> &mut (K, V) {
        match &mut self.slots[slot] {
            Some(entry) => entry,
            None => unreachable!("slot {slot} is empty"),
        }
    }

    /// Writes a new entry into an empty slot returned by [`find`](Self::find).
    ///
    /// The table doubles in length once the number of live entries reaches the threshold, where
    /// `outside` counts live entries the owner keeps outside of the table.
    pub fn insert_vacant(
        &mut self,
        slot: usize,
        key: K,
        value: V,
        outside: usize,
        hash: impl Fn(&K) -> u64,
    ) {
        debug_assert!(self.slots[slot].is_none());
        self.slots[slot] = Some((key, value));
        self.size += 1;
        if self.size + outside >= self.threshold {
            let mut len = self.slots.len() << 1;
            // tiny load factors need more than one doubling
            while ((len as f32 * self.load_factor) as usize) <= self.size + outside {
                len <<= 1;
            }
            self.resize(len, &hash);
        }
    }

    /// Removes the entry in `slot`, moving later entries of the probe chain backwards.
    ///
    /// Also returns `true` if another entry was moved into `slot`.
    pub fn remove_at(&mut self, slot: usize, hash: impl Fn(&K) -> u64) -> ((K, V), bool) {
        let Some(removed) = self.slots[slot].take() else {
            unreachable!("slot {slot} is empty")
        };
        let mask = self.mask;
        let mut i = slot;
        let mut next = (i + 1) & mask;
        while let Some((key, _)) = &self.slots[next] {
            let placement = self.place(hash(key));
            if (next.wrapping_sub(placement) & mask) > (i.wrapping_sub(placement) & mask) {
                self.slots[i] = self.slots[next].take();
                i = next;
            }
            next = (next + 1) & mask;
        }
        self.size -= 1;
        (removed, i != slot)
    }

    /// Grows the table so that `additional` entries fit next to `live` ones without another
    /// resize.
    pub fn reserve(
        &mut self,
        live: usize,
        additional: usize,
        hash: impl Fn(&K) -> u64,
    ) -> Result<(), CapacityError> {
        let needed = live
            .checked_add(additional)
            .ok_or(CapacityError::TooLarge(additional))?;
        let len = table_len(needed, self.load_factor)?;
        if self.slots.len() < len {
            self.resize(len, &hash);
        }
        Ok(())
    }

    /// Shrinks the table to the length needed for `maximum_capacity` entries, but never below
    /// what the `live` entries need.
    pub fn shrink_to(
        &mut self,
        maximum_capacity: usize,
        live: usize,
        hash: impl Fn(&K) -> u64,
    ) -> Result<(), CapacityError> {
        let len = table_len(maximum_capacity.max(live), self.load_factor)?;
        if self.slots.len() > len {
            let old_len = self.slots.len();
            self.resize(len, &hash);
            log::debug!("table shrunk from {old_len} to {len} slots");
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        if self.size == 0 {
            return;
        }
        self.size = 0;
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
    }

    /// Clears the table, reallocating it if it is longer than `maximum_capacity` entries need.
    pub fn clear_to(&mut self, maximum_capacity: usize) -> Result<(), CapacityError> {
        let len = table_len(maximum_capacity, self.load_factor)?;
        if self.slots.len() <= len {
            self.clear();
            return Ok(());
        }
        let old_len = self.slots.len();
        self.size = 0;
        self.slots = allocate(len);
        self.set_len(len);
        log::debug!("table cleared and shrunk from {old_len} to {len} slots");
        Ok(())
    }

    /// Rehashes every live entry into a fresh table of `new_len` slots.
    fn resize(&mut self, new_len: usize, hash: &impl Fn(&K) -> u64) {
        let old_slots = std::mem::replace(&mut self.slots, allocate(new_len));
        self.set_len(new_len);
        for (key, value) in old_slots.into_vec().into_iter().flatten() {
            let mut i = self.place(hash(&key));
            while self.slots[i].is_some() {
                i = (i + 1) & self.mask;
            }
            self.slots[i] = Some((key, value));
        }
        log::trace!(
            "table rehashed to {new_len} slots with {} entries",
            self.size
        );
    }

    /// Slot following the first empty slot, where a removing cursor starts.
    pub fn cursor_start(&self) -> usize {
        match self.slots.iter().position(Option::is_none) {
            Some(empty) => (empty + 1) & self.mask,
            None => 0,
        }
    }

    pub fn iter(&self) -> RawIter<'_, K, V> {
        RawIter {
            inner: self.slots.iter().flatten(),
            remaining: self.size,
        }
    }

    pub fn iter_mut(&mut self) -> RawIterMut<'_, K, V> {
        RawIterMut {
            inner: self.slots.iter_mut().flatten(),
            remaining: self.size,
        }
    }

    pub fn into_iter(self) -> RawIntoIter<K, V> {
        RawIntoIter {
            inner: self.slots.into_vec().into_iter().flatten(),
            remaining: self.size,
        }
    }

    /// Asserts the structural invariants of the table.
    #[cfg(test)]
    pub fn check(&self, hash: impl Fn(&K) -> u64) {
        let len = self.slots.len();
        assert!(len.is_power_of_two());
        assert_eq!(self.mask + 1, len);
        assert!(self.threshold < len);
        assert_eq!(self.slots.iter().flatten().count(), self.size);
        for (slot, entry) in self.slots.iter().enumerate() {
            if let Some((key, _)) = entry {
                // every slot between the ideal placement and the actual slot is occupied
                let mut i = self.place(hash(key));
                while i != slot {
                    assert!(self.slots[i].is_some(), "probe chain broken at {i}");
                    i = (i + 1) & self.mask;
                }
            }
        }
    }
}

pub(crate) struct RawIter<'a, K, V> {
    inner: std::iter::Flatten<std::slice::Iter<'a, Option<(K, V)>>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for RawIter<'a, K, V> {
    type Item = &'a (K, V);

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next()?;
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for RawIter<'_, K, V> {}

impl<K, V> Clone for RawIter<'_, K, V> {
    fn clone(&self) -> Self {
        RawIter {
            inner: self.inner.clone(),
            remaining: self.remaining,
        }
    }
}

pub(crate) struct RawIterMut<'a, K, V> {
    inner: std::iter::Flatten<std::slice::IterMut<'a, Option<(K, V)>>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for RawIterMut<'a, K, V> {
    type Item = &'a mut (K, V);

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next()?;
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for RawIterMut<'_, K, V> {}

pub(crate) struct RawIntoIter<K, V> {
    inner: std::iter::Flatten<std::vec::IntoIter<Option<(K, V)>>>,
    remaining: usize,
}

impl<K, V> Iterator for RawIntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next()?;
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for RawIntoIter<K, V> {}

/// Position of a removing cursor within a [`RawTable`].
///
/// The cursor walks the slots once, starting right after an empty slot. Removing an entry only
/// ever pulls entries from later in the walk back into the removed slot, which the cursor then
/// visits again, so every entry is returned exactly once.
#[derive(Debug)]
pub(crate) struct RawCursor {
    start: usize,
    step: usize,
    current: Option<usize>,
}

impl RawCursor {
    pub fn new<K, V>(table: &RawTable<K, V>) -> Self {
        RawCursor {
            start: table.cursor_start(),
            step: 0,
            current: None,
        }
    }

    /// Advances to the next occupied slot.
    pub fn next_slot<K, V>(&mut self, table: &RawTable<K, V>) -> Option<usize> {
        while self.step < table.table_len() {
            let slot = (self.start + self.step) & table.mask;
            self.step += 1;
            if table.slots[slot].is_some() {
                self.current = Some(slot);
                return Some(slot);
            }
        }
        self.current = None;
        None
    }

    /// Removes the entry at the current slot.
    pub fn remove<K, V>(&mut self, table: &mut RawTable<K, V>, hash: impl Fn(&K) -> u64) -> (K, V) {
        let Some(slot) = self.current.take() else {
            panic!("next must be called before remove.")
        };
        let (entry, refilled) = table.remove_at(slot, hash);
        if refilled {
            self.step -= 1;
        }
        entry
    }

    pub fn reset(&mut self) {
        self.step = 0;
        self.current = None;
    }
}
