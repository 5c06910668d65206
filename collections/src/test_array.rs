#![allow(missing_docs)]
use crate::test_util::{hash_of, weighted_choose};
use crate::{Array, Identity};
use rand::prelude::*;
use std::{fmt::Debug, rc::Rc};

struct CheckedArray<T> {
    dut: Array<T>,
    ref_vec: Vec<T>,
}

impl<T: Ord + Clone + Debug + Identity> CheckedArray<T> {
    fn new(ordered: bool) -> Self {
        CheckedArray {
            dut: Array::with_order(ordered, 0),
            ref_vec: vec![],
        }
    }
    fn len(&self) -> usize {
        assert_eq!(self.ref_vec.len(), self.dut.len());
        self.ref_vec.len()
    }
    fn add(&mut self, value: T) {
        self.ref_vec.push(value.clone());
        self.dut.add(value);
    }
    fn add_all(&mut self, values: &[T]) {
        self.ref_vec.extend_from_slice(values);
        self.dut.add_all(values);
    }
    fn insert(&mut self, index: usize, value: T) {
        if self.dut.is_ordered() {
            self.ref_vec.insert(index, value.clone());
        } else {
            self.ref_vec.push(value.clone());
        }
        self.dut.insert(index, value);
    }
    fn remove_index(&mut self, index: usize) -> T {
        let dut_result = self.dut.remove_index(index);
        let ref_result = if self.dut.is_ordered() {
            self.ref_vec.remove(index)
        } else {
            let position = self.ref_vec.iter().position(|item| *item == dut_result).unwrap();
            self.ref_vec.swap_remove(position)
        };
        assert_eq!(ref_result, dut_result);
        ref_result
    }
    fn remove_value(&mut self, value: &T) -> bool {
        let ref_result = match self.ref_vec.iter().position(|item| item == value) {
            Some(index) => {
                self.ref_vec.remove(index);
                true
            }
            None => false,
        };
        assert_eq!(ref_result, self.dut.remove_value(value, false));
        ref_result
    }
    fn remove_range(&mut self, start: usize, end: usize) {
        if self.dut.is_ordered() {
            self.ref_vec.drain(start..=end);
            self.dut.remove_range(start, end);
        } else {
            let removed: Vec<T> = self.dut.as_slice()[start..=end].to_vec();
            self.dut.remove_range(start, end);
            for item in removed {
                let position = self.ref_vec.iter().position(|x| *x == item).unwrap();
                self.ref_vec.swap_remove(position);
            }
        }
    }
    fn pop(&mut self) -> Option<T> {
        if self.ref_vec.is_empty() {
            return None;
        }
        let dut_result = self.dut.pop();
        if self.dut.is_ordered() {
            assert_eq!(self.ref_vec.pop().as_ref(), Some(&dut_result));
        } else {
            let position = self.ref_vec.iter().position(|x| *x == dut_result).unwrap();
            self.ref_vec.swap_remove(position);
        }
        Some(dut_result)
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
        assert_eq!(visited, self.ref_vec.len());
        self.ref_vec.retain(|item| keep(item));
        self.check();
    }
    fn truncate(&mut self, len: usize) {
        if !self.dut.is_ordered() {
            self.ref_vec.clear();
            self.ref_vec.extend_from_slice(&self.dut.as_slice()[..len.min(self.dut.len())]);
        } else {
            self.ref_vec.truncate(len);
        }
        self.dut.truncate(len);
    }
    fn check(&self) {
        assert_eq!(self.ref_vec.len(), self.dut.len());
        assert!(self.dut.len() <= self.dut.capacity());
        if self.dut.is_ordered() {
            assert_eq!(self.dut.as_slice(), &self.ref_vec[..]);
        } else {
            let mut dut_sorted = self.dut.as_slice().to_vec();
            let mut ref_sorted = self.ref_vec.clone();
            dut_sorted.sort();
            ref_sorted.sort();
            assert_eq!(dut_sorted, ref_sorted);
        }
        for item in self.ref_vec.iter() {
            assert!(self.dut.contains(item, false));
            let first = self.dut.index_of(item, false).unwrap();
            let last = self.dut.last_index_of(item, false).unwrap();
            assert!(first <= last);
            assert_eq!(self.dut.get(first), item);
        }
    }
}

fn test_suite<T, R>(
    ordered: bool,
    mut rand_t: impl FnMut(&mut R) -> T,
    keep_fn: impl Fn(&T) -> bool,
) where
    T: Ord + Clone + Debug + Identity,
    R: Rng + SeedableRng,
{
    let mut array: CheckedArray<T> = CheckedArray::new(ordered);
    let mut rng = R::seed_from_u64(8);
    let mut max_size = 0;
    let verbosity = 1;
    for _ in 0..5000 {
        weighted_choose! {&mut rng,
            Add: 2.0 => {
                let value = rand_t(&mut rng);
                if verbosity > 0 {
                    println!("adding {value:?}");
                }
                array.add(value);
            },
            AddAll: 0.2 => {
                let len = rng.gen_range(0..6);
                let values: Vec<T> = (0..len).map(|_| rand_t(&mut rng)).collect();
                if verbosity > 0 {
                    println!("adding all {values:?}");
                }
                array.add_all(&values);
            },
            Insert: 0.5 => {
                let index = rng.gen_range(0..=array.len());
                let value = rand_t(&mut rng);
                if verbosity > 0 {
                    println!("inserting {value:?} at {index}");
                }
                array.insert(index, value);
            },
            RemoveIndex: 1.0 => {
                if array.len() > 0 {
                    let index = rng.gen_range(0..array.len());
                    let result = array.remove_index(index);
                    if verbosity > 0 {
                        println!("removing index {index} -> {result:?}");
                    }
                }
            },
            RemoveValue: 0.7 => {
                let value = rand_t(&mut rng);
                let result = array.remove_value(&value);
                if verbosity > 0 {
                    println!("removing value {value:?} -> {result:?}");
                }
            },
            RemoveRange: 0.1 => {
                if array.len() > 0 {
                    let start = rng.gen_range(0..array.len());
                    let end = rng.gen_range(start..array.len().min(start + 8));
                    if verbosity > 0 {
                        println!("removing range {start}..={end}");
                    }
                    array.remove_range(start, end);
                }
            },
            Pop: 0.5 => {
                let result = array.pop();
                if verbosity > 0 {
                    println!("popping -> {result:?}");
                }
            },
            CursorRetain: 0.03 => {
                array.cursor_retain(&keep_fn);
                if verbosity > 0 {
                    println!("retaining via cursor -> {}", array.len());
                }
            },
            Truncate: 0.01 => {
                let len = rng.gen_range(0..=array.len());
                if verbosity > 0 {
                    println!("truncating to {len}");
                }
                array.truncate(len);
            },
            Check: 0.2 => {
                array.check();
            }
        };
        max_size = std::cmp::max(max_size, array.len());
    }
    array.check();
    println!("max size {max_size}");
}

#[test]
fn test_suite_ordered_u32() {
    test_suite::<u32, rand_pcg::Pcg64>(true, |rng| rng.gen_range(0..100), |v| v % 4 != 0);
}

#[test]
fn test_suite_unordered_u32() {
    test_suite::<u32, rand_pcg::Pcg64>(false, |rng| rng.gen_range(0..100), |v| v % 4 != 0);
}

#[test]
fn test_suite_unordered_string() {
    test_suite::<String, rand_pcg::Pcg64>(
        false,
        |rng| rng.gen_range(0..40u32).to_string(),
        |v| !v.starts_with('1'),
    );
}

#[test]
fn test_unordered_removal_moves_last_item() {
    let mut array = Array::with_order(false, 16);
    array.add_all(&['a', 'b', 'c', 'd']);
    assert_eq!(array.remove_index(1), 'b');
    assert_eq!(array.as_slice(), &['a', 'd', 'c']);
    array.insert(0, 'x');
    assert_eq!(array.as_slice(), &['x', 'd', 'c', 'a']);
}

#[test]
fn test_remove_range() {
    let mut ordered: Array<u32> = (0..10).collect();
    ordered.remove_range(2, 4);
    assert_eq!(ordered.as_slice(), &[0, 1, 5, 6, 7, 8, 9]);

    let mut unordered = Array::with_order(false, 10);
    unordered.extend(0..10);
    unordered.remove_range(2, 4);
    assert_eq!(unordered.as_slice(), &[0, 1, 7, 8, 9, 5, 6]);
    unordered.remove_range(5, 6);
    assert_eq!(unordered.as_slice(), &[0, 1, 7, 8, 9]);
}

#[test]
fn test_growth() {
    let mut array = Array::with_capacity(0);
    array.add(1u8);
    assert!(array.capacity() >= 8);
    for value in 2..=8 {
        array.add(value);
    }
    array.add(9);
    assert!(array.capacity() >= 14);

    let mut batched = Array::with_capacity(5);
    batched.add_all(&[0u8; 5]);
    batched.add_batch([1, 2, 3, 4]);
    assert!(batched.capacity() >= 9);
    assert_eq!(batched.len(), 9);
    assert_eq!(batched.peek(), &4);
    assert_eq!(batched.first(), &0);
}

#[test]
fn test_insert_range_and_set_size() {
    let mut array = Array::from([1, 2, 3]);
    array.insert_range(1, 2, 0);
    assert_eq!(array.as_slice(), &[1, 0, 0, 2, 3]);
    array.set_size(7);
    assert_eq!(array.as_slice(), &[1, 0, 0, 2, 3, 0, 0]);
    array.set_size(2);
    assert_eq!(array.as_slice(), &[1, 0]);
    array.shrink();
    assert_eq!(array.capacity(), 2);
}

#[test]
fn test_select_ranked() {
    let array = Array::from([5, 1, 4, 2, 3]);
    assert_eq!(array.select_ranked(Ord::cmp, 1), &1);
    assert_eq!(array.select_ranked(Ord::cmp, 2), &2);
    assert_eq!(array.select_ranked_index(Ord::cmp, 5), 0);
    assert_eq!(array.select_ranked(|a: &i32, b: &i32| b.cmp(a), 2), &4);
    assert_eq!(array.as_slice(), &[5, 1, 4, 2, 3]);
}

#[test]
#[should_panic(expected = "nth_lowest must be greater than 0")]
fn test_select_ranked_zero() {
    Array::from([1]).select_ranked(Ord::cmp, 0);
}

#[test]
#[should_panic(expected = "Array is empty.")]
fn test_pop_of_empty_array() {
    Array::<u8>::new().pop();
}

#[test]
#[should_panic(expected = "index can't be >= size: 3 >= 3")]
fn test_get_out_of_bounds() {
    Array::from([1, 2, 3]).get(3);
}

#[test]
fn test_shuffle_is_permutation() {
    let mut rng = rand_pcg::Pcg64::seed_from_u64(3);
    let mut array: Array<u32> = (0..50).collect();
    array.shuffle(&mut rng);
    assert_ne!(array.as_slice(), (0..50).collect::<Vec<u32>>().as_slice());
    array.sort();
    assert!(array.iter().copied().eq(0..50));
    assert!(array.random(&mut rng).is_some());
    assert!(Array::<u32>::new().random(&mut rng).is_none());
}

#[test]
fn test_equality_and_display() {
    let a = Array::from(["x", "y"]);
    let b: Array<&str> = ["x", "y"].into_iter().collect();
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
    assert_ne!(hash_of(&a), hash_of(&Array::from(["y", "x"])));
    assert_eq!(a.to_string(), "[x, y]");
    assert_eq!(a.join("+"), "x+y");

    let mut unordered = a.clone();
    unordered.set_ordered(false);
    assert_ne!(unordered, unordered.clone());
    assert!(!unordered.equals_identity(&a));
    assert_eq!(Array::<u8>::new().to_string(), "[]");
}

#[test]
fn test_identity_lookups() {
    let shared = Rc::new("x".to_string());
    let mut array = Array::new();
    array.add(Rc::new("x".to_string()));
    array.add(shared.clone());
    array.add(Rc::new("y".to_string()));
    assert_eq!(array.index_of(&shared, false), Some(0));
    assert_eq!(array.index_of(&shared, true), Some(1));
    assert_eq!(array.last_index_of(&Rc::new("x".to_string()), false), Some(1));
    assert!(!array.contains(&Rc::new("x".to_string()), true));

    let others = Array::from([shared.clone()]);
    assert!(array.contains_all(&others, true));
    assert!(array.contains_any(&others, false));
    assert!(array.remove_all(&others, true));
    assert_eq!(array.len(), 2);
    assert!(!array.contains(&shared, true));
}

#[test]
fn test_cursor_on_unordered_array() {
    let mut array = Array::with_order(false, 8);
    array.extend([1, 2, 3, 4, 5, 6]);
    let mut cursor = array.cursor();
    let mut visited = vec![];
    while let Some(value) = cursor.next() {
        visited.push(*value);
        if *value % 2 == 0 {
            cursor.remove();
        } else {
            *value *= 10;
        }
    }
    cursor.reset();
    assert_eq!(cursor.next().copied(), Some(10));
    drop(cursor);
    visited.sort();
    assert_eq!(visited, [1, 2, 3, 4, 5, 6]);
    let mut values = array.into_vec();
    values.sort();
    assert_eq!(values, [10, 30, 50]);
}

#[test]
#[should_panic(expected = "next must be called before remove.")]
fn test_cursor_double_remove() {
    let mut array = Array::from([1, 2]);
    let mut cursor = array.cursor();
    cursor.next();
    cursor.remove();
    cursor.remove();
}

#[test]
fn test_sort_by_is_stable() {
    let mut array = Array::from([(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')]);
    array.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(array.as_slice(), &[(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
    array.reverse();
    assert_eq!(array[0], (2, 'c'));
    array.swap(0, 3);
    assert_eq!(array.set(0, (0, 'z')), (1, 'b'));
    assert_eq!(array.select_ranked(|a, b| a.cmp(b), 1), &(0, 'z'));
}
