#![allow(missing_docs)]
use crate::test_util::{hash_of, weighted_choose};
use crate::{ArrayMap, OrderedMap};
use indexmap::IndexMap;
use rand::prelude::*;
use std::{
    fmt::Debug,
    hash::{BuildHasherDefault, Hash},
};
use zwohash::ZwoHasher;

type ZwoIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<ZwoHasher>>;

struct CheckedOrderedMap<K, V> {
    dut: OrderedMap<K, V>,
    ref_map: ZwoIndexMap<K, V>,
}

impl<K: Hash + Eq + Clone + Debug, V: PartialEq + Clone + Debug> CheckedOrderedMap<K, V> {
    fn new() -> Self {
        CheckedOrderedMap {
            dut: OrderedMap::with_capacity(0),
            ref_map: ZwoIndexMap::default(),
        }
    }
    fn len(&self) -> usize {
        assert_eq!(self.ref_map.len(), self.dut.len());
        self.ref_map.len()
    }
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        let ref_result = self.ref_map.insert(key.clone(), value.clone());
        let dut_result = self.dut.insert(key, value);
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn get(&self, key: &K) -> Option<&V> {
        let ref_result = self.ref_map.get(key);
        assert_eq!(ref_result, self.dut.get(key));
        ref_result
    }
    fn remove(&mut self, key: &K) -> Option<V> {
        let ref_result = self.ref_map.shift_remove(key);
        let dut_result = self.dut.remove(key);
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn remove_index(&mut self, index: usize) -> Option<(K, V)> {
        let ref_result = self.ref_map.shift_remove_index(index);
        if ref_result.is_some() {
            assert_eq!(ref_result.as_ref(), Some(&self.dut.remove_index(index)));
        }
        ref_result
    }
    fn alter_index(&mut self, index: usize, after: K) -> bool {
        let ref_result = index < self.ref_map.len() && !self.ref_map.contains_key(&after);
        if ref_result {
            let mut entries: Vec<(K, V)> = self.ref_map.drain(..).collect();
            entries[index].0 = after.clone();
            self.ref_map.extend(entries);
        }
        assert_eq!(ref_result, self.dut.alter_index(index, after));
        ref_result
    }
    fn cursor_retain(&mut self, keep: impl Fn(&K, &V) -> bool) {
        let mut cursor = self.dut.cursor();
        while let Some((key, value)) = cursor.next() {
            if !keep(key, value) {
                cursor.remove();
            }
        }
        drop(cursor);
        self.ref_map.retain(|key, value| keep(key, value));
        self.check();
    }
    fn check(&self) {
        self.dut.check();
        assert_eq!(self.ref_map.len(), self.dut.len());
        assert!(self.dut.iter().eq(self.ref_map.iter()));
        for (index, entry) in self.ref_map.iter().enumerate() {
            assert_eq!(self.dut.get_index(index), Some(entry));
        }
        assert_eq!(self.dut.get_index(self.ref_map.len()), None);
    }
    /// NB: `random_likelihood` is **not** a probability, 2.0 means 2:1 odds random:present.
    fn present_or_random_key<R: Rng>(
        &self,
        random_likelihood: f64,
        rng: &mut R,
        mut rand_k: impl FnMut(&mut R) -> K,
    ) -> K {
        if self.len() == 0 || rng.gen_range(0.0..1.0 + random_likelihood) >= 1.0 {
            rand_k(rng)
        } else {
            self.ref_map.keys().choose(rng).unwrap().clone()
        }
    }
}

fn test_suite<K, V, R>(
    mut rand_k: impl FnMut(&mut R) -> K,
    mut rand_v: impl FnMut(&mut R) -> V,
    keep_fn: impl Fn(&K, &V) -> bool,
) where
    K: Hash + Eq + Clone + Debug,
    V: PartialEq + Clone + Debug,
    R: Rng + SeedableRng,
{
    let mut map: CheckedOrderedMap<K, V> = CheckedOrderedMap::new();
    let mut rng = R::seed_from_u64(24);
    let mut max_size = 0;
    let verbosity = 1;
    for _ in 0..3000 {
        weighted_choose! {&mut rng,
            Insert: 2.0 => {
                let k = map.present_or_random_key(4.0, &mut rng, &mut rand_k);
                let v = rand_v(&mut rng);
                let result = map.insert(k.clone(), v.clone());
                if verbosity > 0 {
                    println!("inserting {k:?}: {v:?} -> {result:?}");
                }
            },
            Get: 0.5 => {
                let k = map.present_or_random_key(1.0, &mut rng, &mut rand_k);
                let result = map.get(&k);
                if verbosity > 0 {
                    println!("getting {k:?} -> {result:?}");
                }
            },
            Remove: 0.8 => {
                let k = map.present_or_random_key(0.5, &mut rng, &mut rand_k);
                let result = map.remove(&k);
                if verbosity > 0 {
                    println!("removing {k:?} -> {result:?}");
                }
            },
            RemoveIndex: 0.3 => {
                let index = rng.gen_range(0..map.len() + 1);
                let result = map.remove_index(index);
                if verbosity > 0 {
                    println!("removing index {index} -> {result:?}");
                }
            },
            AlterIndex: 0.1 => {
                let index = rng.gen_range(0..map.len() + 1);
                let after = map.present_or_random_key(2.0, &mut rng, &mut rand_k);
                let result = map.alter_index(index, after.clone());
                if verbosity > 0 {
                    println!("altering index {index} to {after:?} -> {result:?}");
                }
            },
            CursorRetain: 0.03 => {
                map.cursor_retain(&keep_fn);
                if verbosity > 0 {
                    println!("retaining via cursor -> {}", map.len());
                }
            },
            Check: 0.2 => {
                map.check();
            }
        };
        max_size = std::cmp::max(max_size, map.len());
    }
    map.check();
    println!("max size {max_size}");
}

#[test]
fn test_suite_u32_u32() {
    test_suite::<u32, u32, rand_pcg::Pcg64>(
        |rng| rng.gen_range(0..300),
        |rng| rng.gen_range(0..10),
        |k, v| (k + v) % 3 != 0,
    );
}

#[test]
fn test_suite_string_usize() {
    test_suite::<String, usize, rand_pcg::Pcg64>(
        |rng| {
            let len = rng.gen_range(1..3);
            String::from_iter((0..len).map(|_| rng.gen_range('a'..'p')))
        },
        |rng| rng.gen(),
        |k, _| !k.starts_with('b'),
    );
}

#[test]
fn test_ordered_basic() {
    let mut map: OrderedMap<&str, u32> = OrderedMap::new();
    map.insert("c", 3);
    map.insert("a", 1);
    map.insert("b", 2);
    assert_eq!(map.insert("a", 10), Some(1));
    assert_eq!(map.to_string(), "{c=3, a=10, b=2}");
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), ["c", "a", "b"]);
    assert_eq!(map.values().copied().collect::<Vec<_>>(), [3, 10, 2]);

    assert!(map.alter("a", "z"));
    assert!(!map.alter("a", "y"));
    assert!(!map.alter("z", "b"));
    assert_eq!(map.join(";"), "c=3;z=10;b=2");
    assert_eq!(map.get("z"), Some(&10));
    assert!(!map.contains_key("a"));

    assert_eq!(map.remove("c"), Some(3));
    assert_eq!(map.get_index(0), Some((&"z", &10)));
    assert_eq!(map.find_key(&2, false), Some(&"b"));
    map.check();
}

#[test]
fn test_ordered_equality_ignores_order() {
    let a: OrderedMap<u8, char> = [(1, 'a'), (2, 'b')].into_iter().collect();
    let b: OrderedMap<u8, char> = [(2, 'b'), (1, 'a')].into_iter().collect();
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
    assert_ne!(a.to_string(), b.to_string());
    let mut c = OrderedMap::with_capacity(2);
    c.insert_all(&b);
    assert_eq!(c.to_array().as_slice(), &[(2, 'b'), (1, 'a')]);
}

#[test]
fn test_ordered_cursor_in_order() {
    let mut map: OrderedMap<u32, u32> = (0..20).rev().map(|k| (k, k)).collect();
    let mut seen = vec![];
    let mut cursor = map.cursor();
    while let Some((&key, value)) = cursor.next() {
        seen.push(key);
        if key % 2 == 0 {
            assert_eq!(cursor.remove(), (key, key));
        } else {
            *value += 100;
        }
    }
    drop(cursor);
    assert_eq!(seen, (0..20).rev().collect::<Vec<u32>>());
    assert_eq!(
        map.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(),
        (0..20).rev().filter(|k| k % 2 == 1).map(|k| (k, k + 100)).collect::<Vec<_>>()
    );
    map.clear_to(0);
    assert!(map.is_empty());
    map.check();
}

#[test]
fn test_array_map_basic() {
    let mut map: ArrayMap<&str, u32> = ArrayMap::new();
    assert_eq!(map.put("a", 1), 0);
    assert_eq!(map.put("b", 2), 1);
    assert_eq!(map.put("a", 3), 0);
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&"a"), Some(&3));
    assert_eq!(map.get_or(&"x", &0), &0);
    assert_eq!(map.first_key(), &"a");
    assert_eq!(map.peek_value(), &2);
    assert_eq!(map.to_string(), "{a=3, b=2}");

    assert_eq!(map.put_at("c", 4, 0), 0);
    assert_eq!(map.keys(), &["c", "a", "b"]);
    assert_eq!(map.put_at("b", 5, 0), 0);
    assert_eq!(map.keys(), &["b", "c", "a"]);
    assert_eq!(map.values(), &[5, 4, 3]);

    assert_eq!(map.remove_key(&"c"), Some(4));
    assert_eq!(map.find_key(&3, false), Some(&"a"));
    assert!(map.remove_value(&5, false));
    assert_eq!(map.keys(), &["a"]);
}

#[test]
fn test_array_map_unordered_removal() {
    let mut map = ArrayMap::with_order(false, 4);
    map.extend([(1, 'a'), (2, 'b'), (3, 'c'), (4, 'd')]);
    assert_eq!(map.remove_index(0), (1, 'a'));
    assert_eq!(map.keys(), &[4, 2, 3]);
    assert_eq!(map.values(), &['d', 'b', 'c']);
}

#[test]
fn test_array_map_put_all() {
    let source: ArrayMap<u8, u8> = (0..6).map(|k| (k, k * 10)).collect();
    let mut target: ArrayMap<u8, u8> = [(1, 0), (9, 9)].into_iter().collect();
    target.put_all(&source, 1, 3);
    assert_eq!(target.keys(), &[1, 9, 2, 3]);
    assert_eq!(target.values(), &[10, 9, 20, 30]);

    let other: ArrayMap<u8, u8> = [(3, 30), (2, 20), (9, 9), (1, 10)].into_iter().collect();
    assert_eq!(target, other);
    assert_eq!(hash_of(&target), hash_of(&other));
    assert!(target.equals_identity(&other));
}

#[test]
#[should_panic(expected = "offset + length must be <= size")]
fn test_array_map_put_all_out_of_range() {
    let source: ArrayMap<u8, u8> = (0..3).map(|k| (k, k)).collect();
    ArrayMap::new().put_all(&source, 2, 2);
}

#[test]
#[should_panic(expected = "Map is empty.")]
fn test_array_map_peek_empty() {
    ArrayMap::<u8, u8>::new().peek_key();
}

#[test]
fn test_array_map_cursor_and_shuffle() {
    let mut map: ArrayMap<u32, u32> = (0..30).map(|k| (k, k * 2)).collect();
    let mut cursor = map.cursor();
    while let Some((&key, value)) = cursor.next() {
        if key % 3 == 0 {
            cursor.remove();
        } else {
            *value += 1;
        }
    }
    drop(cursor);
    assert_eq!(map.len(), 20);
    assert!(map.iter().all(|(k, v)| *v == k * 2 + 1));

    let mut rng = rand_pcg::Pcg64::seed_from_u64(5);
    map.shuffle(&mut rng);
    assert!(map.iter().all(|(k, v)| *v == k * 2 + 1));
    map.reverse();
    assert!(map.iter().all(|(k, v)| *v == k * 2 + 1));
    map.truncate(5);
    assert_eq!(map.len(), 5);
    map.clear();
    assert!(map.is_empty());
}
