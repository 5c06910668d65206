#![allow(missing_docs)]
use crate::test_util::{hash_of, weighted_choose};
use crate::{CapacityError, IntSet, LongSet, ObjectSet, PrimitiveKey, PrimitiveSet};
use hashbrown::HashSet;
use rand::prelude::*;
use std::{
    fmt::Debug,
    hash::{BuildHasherDefault, Hash},
};
use zwohash::ZwoHasher;

type ZwoSet<T> = HashSet<T, BuildHasherDefault<ZwoHasher>>;

struct CheckedSet<T> {
    dut: ObjectSet<T>,
    ref_set: ZwoSet<T>,
}

impl<T: Hash + Eq + Clone + Debug> CheckedSet<T> {
    fn new() -> Self {
        CheckedSet {
            dut: ObjectSet::with_capacity(0),
            ref_set: ZwoSet::default(),
        }
    }
    fn len(&self) -> usize {
        assert_eq!(self.ref_set.len(), self.dut.len());
        self.ref_set.len()
    }
    fn add(&mut self, item: T) -> bool {
        let ref_result = self.ref_set.insert(item.clone());
        let dut_result = self.dut.add(item);
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn contains(&self, item: &T) -> bool {
        let ref_result = self.ref_set.contains(item);
        let dut_result = self.dut.contains(item);
        assert_eq!(ref_result, dut_result);
        assert_eq!(self.ref_set.get(item), self.dut.get(item));
        ref_result
    }
    fn take(&mut self, item: &T) -> Option<T> {
        let ref_result = self.ref_set.take(item);
        let dut_result = self.dut.take(item);
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn cursor_retain(&mut self, keep: impl Fn(&T) -> bool) {
        let mut visited = 0;
        let mut cursor = self.dut.cursor();
        while let Some(item) = cursor.next() {
            visited += 1;
            if !keep(item) {
                cursor.remove();
            }
        }
        drop(cursor);
        assert_eq!(visited, self.ref_set.len());
        self.ref_set.retain(|item| keep(item));
        self.check();
    }
    fn clear_to(&mut self, maximum_capacity: usize) {
        self.ref_set.clear();
        self.dut.clear_to(maximum_capacity);
        self.check();
    }
    fn check(&self) {
        self.dut.check();
        assert_eq!(self.ref_set.len(), self.dut.len());
        assert_eq!(self.dut.iter().len(), self.ref_set.len());
        for item in self.ref_set.iter() {
            assert!(self.dut.contains(item));
        }
        for item in self.dut.iter() {
            assert!(self.ref_set.contains(item));
        }
    }
    /// NB: `random_likelihood` is **not** a probability, 2.0 means 2:1 odds random:present.
    fn present_or_random_item<R: Rng>(
        &self,
        random_likelihood: f64,
        rng: &mut R,
        mut rand_t: impl FnMut(&mut R) -> T,
    ) -> T {
        if self.len() == 0 || rng.gen_range(0.0..1.0 + random_likelihood) >= 1.0 {
            rand_t(rng)
        } else {
            self.ref_set.iter().choose(rng).unwrap().clone()
        }
    }
}

fn test_suite<T, R>(mut rand_t: impl FnMut(&mut R) -> T, keep_fn: impl Fn(&T) -> bool)
where
    T: Hash + Eq + Clone + Debug,
    R: Rng + SeedableRng,
{
    let mut set: CheckedSet<T> = CheckedSet::new();
    let mut rng = R::seed_from_u64(39);
    let mut max_size = 0;
    let verbosity = 1;
    for _ in 0..5000 {
        weighted_choose! {&mut rng,
            Add: 2.0 => {
                let item = set.present_or_random_item(4.0, &mut rng, &mut rand_t);
                let result = set.add(item.clone());
                if verbosity > 0 {
                    println!("adding {item:?} -> {result:?}");
                }
            },
            Contains: 0.5 => {
                let item = set.present_or_random_item(1.0, &mut rng, &mut rand_t);
                let result = set.contains(&item);
                if verbosity > 0 {
                    println!("looking up {item:?} -> {result:?}");
                }
            },
            Take: 1.2 => {
                let item = set.present_or_random_item(0.5, &mut rng, &mut rand_t);
                let result = set.take(&item);
                if verbosity > 0 {
                    println!("taking {item:?} -> {result:?}");
                }
                set.check();
            },
            CursorRetain: 0.05 => {
                set.cursor_retain(&keep_fn);
                if verbosity > 0 {
                    println!("retaining via cursor -> {}", set.len());
                }
            },
            ClearTo: 0.002 => {
                let maximum_capacity = rng.gen_range(0..100);
                set.clear_to(maximum_capacity);
                if verbosity > 0 {
                    println!("clearing to {maximum_capacity}");
                }
            },
            Check: 0.15 => {
                set.check();
            }
        };
        max_size = std::cmp::max(max_size, set.len());
    }
    set.check();
    println!("max size {max_size}");
}

#[test]
fn test_suite_usize() {
    test_suite::<usize, rand_pcg::Pcg64>(|rng| rng.gen_range(0..1000), |item| item % 4 != 1);
}

#[test]
fn test_suite_boxed_usize() {
    test_suite::<Box<usize>, rand_pcg::Pcg64>(
        |rng| Box::new(rng.gen_range(0..300)),
        |item| **item % 3 != 0,
    );
}

#[test]
fn test_suite_string() {
    test_suite::<String, rand_pcg::Pcg64>(
        |rng| {
            let len = rng.gen_range(1..4);
            String::from_iter((0..len).map(|_| rng.gen_range('a'..'k')))
        },
        |item| item.len() != 2,
    );
}

struct CheckedPrimitiveSet<K> {
    dut: PrimitiveSet<K>,
    ref_set: ZwoSet<K>,
}

impl<K: PrimitiveKey> CheckedPrimitiveSet<K> {
    fn add(&mut self, key: K) -> bool {
        let ref_result = self.ref_set.insert(key);
        let dut_result = self.dut.add(key);
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn contains(&self, key: K) -> bool {
        let ref_result = self.ref_set.contains(&key);
        let dut_result = self.dut.contains(key);
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn remove(&mut self, key: K) -> bool {
        let ref_result = self.ref_set.remove(&key);
        let dut_result = self.dut.remove(key);
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn cursor_retain(&mut self, keep: impl Fn(K) -> bool) {
        let mut cursor = self.dut.cursor();
        while let Some(key) = cursor.next() {
            if !keep(key) {
                assert_eq!(cursor.remove(), key);
            }
        }
        drop(cursor);
        self.ref_set.retain(|&key| keep(key));
        self.check();
    }
    fn check(&self) {
        self.dut.check();
        assert_eq!(self.ref_set.len(), self.dut.len());
        for &key in self.ref_set.iter() {
            assert!(self.dut.contains(key));
        }
        if self.ref_set.contains(&K::ZERO) {
            assert_eq!(self.dut.first(), K::ZERO);
        }
    }
}

fn test_primitive_suite<K, R>(mut rand_k: impl FnMut(&mut R) -> K, keep_fn: impl Fn(K) -> bool)
where
    K: PrimitiveKey,
    R: Rng + SeedableRng,
{
    let mut set = CheckedPrimitiveSet {
        dut: PrimitiveSet::with_capacity_and_load_factor(1, 0.6),
        ref_set: ZwoSet::default(),
    };
    let mut rng = R::seed_from_u64(40);
    let verbosity = 1;
    for _ in 0..5000 {
        weighted_choose! {&mut rng,
            Add: 2.0 => {
                let key = rand_k(&mut rng);
                let result = set.add(key);
                if verbosity > 0 {
                    println!("adding {key:?} -> {result:?}");
                }
            },
            Contains: 0.5 => {
                let key = rand_k(&mut rng);
                let result = set.contains(key);
                if verbosity > 0 {
                    println!("looking up {key:?} -> {result:?}");
                }
            },
            Remove: 1.5 => {
                let key = rand_k(&mut rng);
                let result = set.remove(key);
                if verbosity > 0 {
                    println!("removing {key:?} -> {result:?}");
                }
                set.check();
            },
            CursorRetain: 0.05 => {
                set.cursor_retain(&keep_fn);
            },
            Check: 0.15 => {
                set.check();
            }
        };
    }
    set.check();
}

#[test]
fn test_primitive_suite_i32() {
    test_primitive_suite::<i32, rand_pcg::Pcg64>(|rng| rng.gen_range(-500..500), |k| k % 5 != 0);
}

#[test]
fn test_primitive_suite_i64() {
    test_primitive_suite::<i64, rand_pcg::Pcg64>(
        |rng| rng.gen_range(-200..200) << 32,
        |k| (k >> 32) % 3 != 1,
    );
}

#[test]
fn test_basic() {
    let mut set: ObjectSet<&str> = ObjectSet::new();
    assert!(set.add("a"));
    assert!(set.add("b"));
    assert!(!set.add("a"));
    assert_eq!(set.len(), 2);
    assert!(set.contains("b"));
    assert!(set.remove("a"));
    assert!(!set.remove("a"));
    assert_eq!(set.first(), &"b");
    assert_eq!(set.to_string(), "{b}");
    set.check();
}

#[test]
#[should_panic(expected = "ObjectSet is empty.")]
fn test_first_of_empty_set() {
    let set: ObjectSet<u32> = ObjectSet::new();
    set.first();
}

#[test]
fn test_add_keeps_existing_item() {
    let mut set: ObjectSet<Box<u32>> = ObjectSet::new();
    let first = Box::new(7);
    let first_ptr: *const u32 = &*first;
    set.add(first);
    assert!(!set.add(Box::new(7)));
    assert!(std::ptr::eq(&**set.get(&7).unwrap(), first_ptr));
}

#[test]
fn test_add_all_and_equality() {
    let mut a: ObjectSet<u32> = ObjectSet::with_capacity(2);
    a.add_all(&[1, 2, 3, 4, 5, 6, 7, 8]);
    let b: ObjectSet<u32> = (1..=8).rev().collect();
    assert_ne!(a.table_len(), b.table_len());
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
    let mut c = ObjectSet::new();
    c.add_set(&a);
    c.add(9);
    assert_ne!(a, c);
    assert_ne!(hash_of(&a), hash_of(&c));
    assert_eq!(c.len(), 9);
    assert_eq!(c.to_array().len(), 9);
}

#[test]
fn test_shrink_and_clear_to() {
    let mut set: ObjectSet<u32> = (0..1000).collect();
    assert_eq!(set.table_len(), 2048);
    for item in 10..1000 {
        set.remove(&item);
    }
    set.shrink(0);
    assert_eq!(set.table_len(), 16);
    assert!((0..10).all(|item| set.contains(&item)));
    set.check();

    set.ensure_capacity(1000);
    assert_eq!(set.table_len(), 2048);
    set.clear_to(20);
    assert!(set.is_empty());
    assert_eq!(set.table_len(), 32);
}

#[test]
fn test_ensure_capacity_overflow_is_rejected() {
    let mut set: ObjectSet<u32> = [1, 2].into_iter().collect();
    assert_eq!(
        set.try_ensure_capacity(usize::MAX).err(),
        Some(CapacityError::TooLarge(usize::MAX))
    );
    let mut int_set = IntSet::new();
    int_set.add(3);
    assert!(int_set.try_ensure_capacity(usize::MAX).is_err());
    assert_eq!(set.len(), 2);
    set.check();
}

#[test]
fn test_int_set_zero() {
    let mut set = IntSet::new();
    set.add_all(&[3, 0, -4]);
    assert_eq!(set.len(), 3);
    assert_eq!(set.first(), 0);
    assert_eq!(set.iter().next(), Some(0));
    assert_eq!(set.to_string().find('0'), Some(1));
    assert!(set.remove(0));
    assert!(!set.contains(0));
    assert_eq!(set.len(), 2);
    set.check();

    let mut cursor = set.cursor();
    while let Some(key) = cursor.next() {
        if key < 0 {
            cursor.remove();
        }
    }
    drop(cursor);
    assert_eq!(set.to_array().as_slice(), &[3]);
}

#[test]
#[should_panic(expected = "IntSet is empty.")]
fn test_first_of_empty_int_set() {
    LongSet::new().first();
}

#[test]
fn test_long_set_equality() {
    let a: LongSet = [0, 1 << 40, -(1 << 40)].into_iter().collect();
    let mut b = LongSet::with_capacity(1);
    b.add_set(&a);
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
    b.clear();
    assert!(b.is_empty());
    assert_ne!(a, b);
}
