//! Allocation-conscious collections: a growable [Array], a ring buffer [Queue], and a family of
//! open addressing hash maps and sets.
//!
//! All hash containers share a single table engine. Tables have a power-of-two length and place
//! keys by multiplying their hash with the 64 bit golden ratio and keeping the top bits
//! (Fibonacci hashing), so even weak hash functions spread well. Collisions are resolved by
//! linear probing. Removal moves later entries of a probe chain backwards instead of leaving
//! tombstones, so lookups never slow down after many removals.
//!
//! The containers are:
//!
//! * [ObjectMap], [ObjectIntMap] and [ObjectFloatMap] for keys hashed with a
//!   [`BuildHasher`](std::hash::BuildHasher).
//! * [IntMap] and [LongMap] for integer keys, hashed by value. The zero key is kept outside of the
//!   table.
//! * [ObjectSet], [IntSet] and [LongSet], the set counterparts.
//! * [OrderedMap], an [ObjectMap] that remembers insertion order.
//! * [ArrayMap], parallel key and value arrays searched linearly.
//!
//! Besides plain iterators, every container hands out a cursor that can remove the entry it
//! returned last while enumerating.
//!
//! None of the containers are synchronized. Misuse such as out-of-bounds indices, access to an
//! empty container or an invalid load factor panics; the `try_*` constructors report invalid
//! table configurations as a [CapacityError] instead.

use std::hash::BuildHasherDefault;

mod guard;
mod table;
mod util;

pub mod array;
pub mod array_map;
pub mod error;
pub mod identity;
pub mod object_map;
pub mod object_set;
pub mod ordered_map;
pub mod primitive_map;
pub mod primitive_set;
pub mod queue;
pub mod scalar_map;

pub use array::Array;
pub use array_map::ArrayMap;
pub use error::CapacityError;
pub use identity::Identity;
pub use object_map::ObjectMap;
pub use object_set::ObjectSet;
pub use ordered_map::OrderedMap;
pub use primitive_map::{IntMap, LongMap, PrimitiveKey, PrimitiveMap};
pub use primitive_set::{IntSet, LongSet, PrimitiveSet};
pub use queue::Queue;
pub use scalar_map::{ObjectFloatMap, ObjectIntMap};

/// `BuildHasher` used by the object keyed containers unless another one is specified.
pub type DefaultBuildHasher = BuildHasherDefault<zwohash::ZwoHasher>;

/// Number of entries a hash container holds before its first resize, unless specified.
pub const DEFAULT_CAPACITY: usize = 51;

/// Load factor of hash containers, unless specified.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.8;

/// `2^64 / φ`, the multiplier used to spread hashes across a table.
pub const GOLDEN_RATIO_64: u64 = 0x9E37_79B9_7F4A_7C15;

/// Largest supported table length.
pub const MAX_TABLE_LEN: usize = 1 << 30;

#[cfg(test)]
mod test_array;
#[cfg(test)]
mod test_ordered;
#[cfg(test)]
mod test_set;
