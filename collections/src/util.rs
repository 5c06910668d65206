/// Capacity an array-backed container grows to when it is full.
#[inline(always)]
pub(crate) fn grown_capacity(len: usize) -> usize {
    grown_capacity_by(len, 1.75)
}

/// Like [`grown_capacity`] but with a custom growth factor.
///
/// Appending four values at once uses 1.8, as 1.75 isn't enough when `len == 5`.
#[inline(always)]
pub(crate) fn grown_capacity_by(len: usize, factor: f32) -> usize {
    8.max((len as f32 * factor) as usize)
}

/// Capacity used when `needed` slots are required in total, see [`grown_capacity`].
#[inline(always)]
pub(crate) fn grown_capacity_for(len: usize, needed: usize) -> usize {
    8.max(needed).max((len as f32 * 1.75) as usize)
}

macro_rules! impl_iterator {
    () => {
        impl_iterator!(|x| x);
    };
    ($f: expr) => {
        fn next(&mut self) -> Option<Self::Item> {
            self.inner.next().map($f)
        }
        fn size_hint(&self) -> (usize, Option<usize>) {
            self.inner.size_hint()
        }
        fn count(self) -> usize {
            self.inner.count()
        }
    };
}
pub(crate) use impl_iterator;

/// Formats `items` separated by `separator`, without surrounding brackets.
pub(crate) fn join<T: std::fmt::Display>(
    f: &mut std::fmt::Formatter<'_>,
    items: impl IntoIterator<Item = T>,
    separator: &str,
) -> std::fmt::Result {
    for (index, item) in items.into_iter().enumerate() {
        if index > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Feeds a hash of `items` into `state` that does not depend on their iteration order.
///
/// Each item is hashed on its own with a fixed hasher and the results are summed, so containers
/// that compare equal regardless of layout also hash equal.
pub(crate) fn hash_unordered<T: std::hash::Hash, H: std::hash::Hasher>(
    state: &mut H,
    len: usize,
    items: impl IntoIterator<Item = T>,
) {
    use std::hash::Hasher;
    let sum = items.into_iter().fold(0u64, |sum, item| {
        let mut hasher = zwohash::ZwoHasher::default();
        item.hash(&mut hasher);
        sum.wrapping_add(hasher.finish())
    });
    state.write_usize(len);
    state.write_u64(sum);
}
