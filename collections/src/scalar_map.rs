//! Object keyed maps with numeric values.
use std::hash::{BuildHasher, Hash};

use crate::{DefaultBuildHasher, ObjectMap};

/// An unordered map from objects to `i32` counters.
pub type ObjectIntMap<K, S = DefaultBuildHasher> = ObjectMap<K, i32, S>;

/// An unordered map from objects to `f32` values.
pub type ObjectFloatMap<K, S = DefaultBuildHasher> = ObjectMap<K, f32, S>;

impl<K: Hash + Eq, S: BuildHasher> ObjectMap<K, i32, S> {
    /// Adds `increment` to the value of the key, returning the value before the increment.
    ///
    /// An absent key is treated as mapping to `default`: it is inserted with
    /// `default + increment` and `default` is returned. Additions wrap around on overflow.
    pub fn get_and_increment(&mut self, key: K, default: i32, increment: i32) -> i32 {
        match self.get_mut(&key) {
            Some(value) => {
                let old_value = *value;
                *value = old_value.wrapping_add(increment);
                old_value
            }
            None => {
                self.insert(key, default.wrapping_add(increment));
                default
            }
        }
    }
}

impl<K: Hash + Eq, S: BuildHasher> ObjectMap<K, f32, S> {
    /// Adds `increment` to the value of the key, returning the value before the increment.
    ///
    /// An absent key is inserted with `default + increment` and `default` is returned.
    pub fn get_and_increment(&mut self, key: K, default: f32, increment: f32) -> f32 {
        match self.get_mut(&key) {
            Some(value) => {
                let old_value = *value;
                *value += increment;
                old_value
            }
            None => {
                self.insert(key, default + increment);
                default
            }
        }
    }
}

impl<K, S> ObjectMap<K, f32, S> {
    /// Returns `true` if any value lies within `epsilon` of `value`.
    pub fn contains_value_within(&self, value: f32, epsilon: f32) -> bool {
        self.find_key_within(value, epsilon).is_some()
    }

    /// Returns a key whose value lies within `epsilon` of `value`.
    pub fn find_key_within(&self, value: f32, epsilon: f32) -> Option<&K> {
        self.iter()
            .find(|(_, stored)| (**stored - value).abs() <= epsilon)
            .map(|(key, _)| key)
    }
}
