//! Identity comparison for the `identity` toggle of value lookups.
use std::{rc::Rc, sync::Arc};

/// Values that can be compared by identity as well as by equality.
///
/// Lookups such as [`Array::contains`](crate::Array::contains) take an `identity` flag. When it
/// is set, values are compared with [`Identity::identical`] instead of [`PartialEq`]. For shared
/// pointers and references, identity means pointing to the same allocation. Plain values have no
/// identity distinct from their contents, so the default implementation falls back to equality.
pub trait Identity: PartialEq {
    /// Returns `true` if `self` and `other` are the same object.
    fn identical(&self, other: &Self) -> bool {
        self == other
    }
}

/// Compares `stored` against `value` by identity or by equality.
#[inline(always)]
pub(crate) fn matches<T: Identity + ?Sized>(identity: bool, stored: &T, value: &T) -> bool {
    if identity {
        stored.identical(value)
    } else {
        stored == value
    }
}

macro_rules! impl_value_identity {
    ($($t:ty),* $(,)?) => {
        $(impl Identity for $t {})*
    };
}

impl_value_identity!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, str,
    String, (),
);

impl<T: PartialEq + ?Sized> Identity for Rc<T> {
    fn identical(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl<T: PartialEq + ?Sized> Identity for Arc<T> {
    fn identical(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: PartialEq + ?Sized> Identity for &T {
    fn identical(&self, other: &Self) -> bool {
        std::ptr::eq(*self, *other)
    }
}

impl<T: PartialEq + ?Sized> Identity for Box<T> {
    fn identical(&self, other: &Self) -> bool {
        std::ptr::eq(&**self, &**other)
    }
}

impl<T: Identity> Identity for Option<T> {
    fn identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.identical(b),
            (None, None) => true,
            _ => false,
        }
    }
}
