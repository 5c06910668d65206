#![allow(missing_docs)]

use clap::{Parser, ValueEnum};
use micro_collections::{
    Array, ArrayMap, IntMap, IntSet, LongMap, ObjectFloatMap, ObjectIntMap, ObjectMap, ObjectSet,
    OrderedMap, Queue,
};
use quanta::Instant;
use rand::{rngs::SmallRng, Rng, SeedableRng};

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum Container {
    Array,
    Queue,
    ObjectMap,
    IntMap,
    LongMap,
    ObjectIntMap,
    ObjectFloatMap,
    ObjectSet,
    IntSet,
    OrderedMap,
    ArrayMap,
    All,
}

impl Container {
    const EACH: [Container; 11] = [
        Container::Array,
        Container::Queue,
        Container::ObjectMap,
        Container::IntMap,
        Container::LongMap,
        Container::ObjectIntMap,
        Container::ObjectFloatMap,
        Container::ObjectSet,
        Container::IntSet,
        Container::OrderedMap,
        Container::ArrayMap,
    ];
}

/// Drives the collections with a seeded random workload and reports their table statistics.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[clap(short = 's', long, default_value = "0")]
    seed: u64,
    #[clap(short = 'n', long, default_value = "100000")]
    ops: usize,
    #[clap(short = 'c', long, default_value = "51")]
    capacity: usize,
    #[clap(short = 'l', long, default_value = "0.8")]
    load_factor: f32,
    #[clap(long, value_enum, default_value_t = Container::All)]
    container: Container,
}

struct Workload {
    rng: SmallRng,
    ops: usize,
    key_space: i64,
    capacity: usize,
    load_factor: f32,
}

impl Workload {
    fn key(&mut self) -> i64 {
        self.rng.gen_range(-self.key_space..self.key_space)
    }

    /// Keys for containers with linear lookups.
    fn small_key(&mut self) -> i64 {
        let key_space = self.key_space.min(512);
        self.rng.gen_range(-key_space..key_space)
    }

    fn inserting(&mut self) -> bool {
        self.rng.gen_bool(0.6)
    }
}

#[derive(Debug, Default)]
struct Outcome {
    len: usize,
    table_len: Option<usize>,
    checksum: u64,
}

fn run_array(w: &mut Workload) -> Outcome {
    let mut array = Array::with_capacity(w.capacity);
    let mut checksum = 0u64;
    for _ in 0..w.ops {
        let key = w.key();
        if w.inserting() || array.is_empty() {
            array.add(key);
        } else if w.rng.gen_bool(0.5) {
            let index = w.rng.gen_range(0..array.len());
            checksum = checksum.wrapping_add(array.remove_index(index) as u64);
        } else {
            let index = w.rng.gen_range(0..array.len());
            checksum = checksum.wrapping_add(*array.get(index) as u64);
        }
    }
    let mut cursor = array.cursor();
    while let Some(value) = cursor.next() {
        if *value < 0 {
            cursor.remove();
        }
    }
    drop(cursor);
    array.sort();
    log::debug!("array holds {} items, capacity {}", array.len(), array.capacity());
    Outcome {
        len: array.len(),
        table_len: None,
        checksum,
    }
}

fn run_queue(w: &mut Workload) -> Outcome {
    let mut queue = Queue::with_capacity(w.capacity);
    let mut checksum = 0u64;
    for _ in 0..w.ops {
        let key = w.key();
        let front = w.rng.gen_bool(0.5);
        match (w.inserting() || queue.is_empty(), front) {
            (true, true) => queue.add_first(key),
            (true, false) => queue.add_last(key),
            (false, true) => checksum = checksum.wrapping_add(queue.remove_first() as u64),
            (false, false) => checksum = checksum.wrapping_add(queue.remove_last() as u64),
        }
    }
    log::debug!("queue holds {} items, capacity {}", queue.len(), queue.capacity());
    Outcome {
        len: queue.len(),
        table_len: None,
        checksum,
    }
}

fn run_object_map(w: &mut Workload) -> color_eyre::Result<Outcome> {
    let mut map: ObjectMap<String, i64> =
        ObjectMap::try_with_capacity_and_load_factor(w.capacity, w.load_factor)?;
    let mut checksum = 0u64;
    for _ in 0..w.ops {
        let key = w.key();
        if w.inserting() {
            map.insert(key.to_string(), key);
        } else if let Some(value) = map.remove(key.to_string().as_str()) {
            checksum = checksum.wrapping_add(value as u64);
        }
    }
    let mut cursor = map.cursor();
    while let Some((_, value)) = cursor.next() {
        if *value % 2 == 0 {
            cursor.remove();
        }
    }
    drop(cursor);
    map.shrink(0);
    Ok(Outcome {
        len: map.len(),
        table_len: Some(map.table_len()),
        checksum,
    })
}

fn run_int_map(w: &mut Workload) -> color_eyre::Result<Outcome> {
    let mut map: IntMap<i64> =
        IntMap::try_with_capacity_and_load_factor(w.capacity, w.load_factor)?;
    let mut checksum = 0u64;
    for _ in 0..w.ops {
        let key = w.key();
        if w.inserting() {
            map.insert(key as i32, key);
        } else if let Some(value) = map.remove(key as i32) {
            checksum = checksum.wrapping_add(value as u64);
        }
    }
    Ok(Outcome {
        len: map.len(),
        table_len: Some(map.table_len()),
        checksum,
    })
}

fn run_long_map(w: &mut Workload) -> color_eyre::Result<Outcome> {
    let mut map: LongMap<i64> =
        LongMap::try_with_capacity_and_load_factor(w.capacity, w.load_factor)?;
    let mut checksum = 0u64;
    for _ in 0..w.ops {
        // spread keys over the upper bits as well
        let key = w.key().wrapping_mul(0x1_0000_0001);
        if w.inserting() {
            map.insert(key, key);
        } else if let Some(value) = map.remove(key) {
            checksum = checksum.wrapping_add(value as u64);
        }
    }
    Ok(Outcome {
        len: map.len(),
        table_len: Some(map.table_len()),
        checksum,
    })
}

fn run_object_int_map(w: &mut Workload) -> color_eyre::Result<Outcome> {
    let mut counts: ObjectIntMap<i64> =
        ObjectIntMap::try_with_capacity_and_load_factor(w.capacity, w.load_factor)?;
    let mut checksum = 0u64;
    for _ in 0..w.ops {
        let key = w.key() / 8;
        let previous = counts.get_and_increment(key, 0, 1);
        checksum = checksum.wrapping_add(previous as u64);
    }
    Ok(Outcome {
        len: counts.len(),
        table_len: Some(counts.table_len()),
        checksum,
    })
}

fn run_object_float_map(w: &mut Workload) -> color_eyre::Result<Outcome> {
    let mut map: ObjectFloatMap<i64> =
        ObjectFloatMap::try_with_capacity_and_load_factor(w.capacity, w.load_factor)?;
    let mut checksum = 0u64;
    for _ in 0..w.ops {
        let key = w.key();
        if w.inserting() {
            map.insert(key, key as f32 * 0.5);
        } else if map.remove(&key).is_some() {
            checksum += 1;
        }
    }
    if map.contains_value_within(0.0, 0.25) {
        checksum += 1;
    }
    Ok(Outcome {
        len: map.len(),
        table_len: Some(map.table_len()),
        checksum,
    })
}

fn run_object_set(w: &mut Workload) -> color_eyre::Result<Outcome> {
    let mut set: ObjectSet<i64> =
        ObjectSet::try_with_capacity_and_load_factor(w.capacity, w.load_factor)?;
    let mut checksum = 0u64;
    for _ in 0..w.ops {
        let key = w.key();
        if w.inserting() {
            set.add(key);
        } else if set.remove(&key) {
            checksum += 1;
        }
    }
    set.clear_to(w.capacity);
    Ok(Outcome {
        len: set.len(),
        table_len: Some(set.table_len()),
        checksum,
    })
}

fn run_int_set(w: &mut Workload) -> color_eyre::Result<Outcome> {
    let mut set = IntSet::try_with_capacity_and_load_factor(w.capacity, w.load_factor)?;
    let mut checksum = 0u64;
    for _ in 0..w.ops {
        let key = w.key() as i32;
        if w.inserting() {
            set.add(key);
        } else if set.remove(key) {
            checksum += 1;
        }
    }
    let mut cursor = set.cursor();
    while let Some(key) = cursor.next() {
        if key % 3 == 0 {
            cursor.remove();
        }
    }
    drop(cursor);
    Ok(Outcome {
        len: set.len(),
        table_len: Some(set.table_len()),
        checksum,
    })
}

fn run_ordered_map(w: &mut Workload) -> color_eyre::Result<Outcome> {
    let mut map: OrderedMap<i64, i64> =
        OrderedMap::try_with_capacity_and_load_factor(w.capacity, w.load_factor)?;
    let mut checksum = 0u64;
    for _ in 0..w.ops {
        let key = w.small_key();
        if w.inserting() {
            map.insert(key, key);
        } else if let Some(value) = map.remove(&key) {
            checksum = checksum.wrapping_add(value as u64);
        }
    }
    if let Some((&first, _)) = map.get_index(0) {
        map.alter(&first, i64::MAX);
    }
    Ok(Outcome {
        len: map.len(),
        table_len: Some(map.as_map().table_len()),
        checksum,
    })
}

fn run_array_map(w: &mut Workload) -> Outcome {
    let mut map = ArrayMap::with_capacity(w.capacity);
    let mut checksum = 0u64;
    for _ in 0..w.ops {
        let key = w.small_key();
        if w.inserting() {
            map.put(key, key);
        } else if let Some(value) = map.remove_key(&key) {
            checksum = checksum.wrapping_add(value as u64);
        }
    }
    Outcome {
        len: map.len(),
        table_len: None,
        checksum,
    }
}

fn run(container: Container, w: &mut Workload) -> color_eyre::Result<Outcome> {
    Ok(match container {
        Container::Array => run_array(w),
        Container::Queue => run_queue(w),
        Container::ObjectMap => run_object_map(w)?,
        Container::IntMap => run_int_map(w)?,
        Container::LongMap => run_long_map(w)?,
        Container::ObjectIntMap => run_object_int_map(w)?,
        Container::ObjectFloatMap => run_object_float_map(w)?,
        Container::ObjectSet => run_object_set(w)?,
        Container::IntSet => run_int_set(w)?,
        Container::OrderedMap => run_ordered_map(w)?,
        Container::ArrayMap => run_array_map(w),
        Container::All => unreachable!("expanded by the caller"),
    })
}

fn main() -> color_eyre::Result<()> {
    let args = Args::parse();

    color_eyre::install()?;
    micro_logger::setup();

    let containers: &[Container] = match args.container {
        Container::All => &Container::EACH,
        ref single => std::slice::from_ref(single),
    };

    for &container in containers {
        let mut workload = Workload {
            rng: SmallRng::seed_from_u64(args.seed),
            ops: args.ops,
            key_space: (args.ops as i64 / 4).max(16),
            capacity: args.capacity,
            load_factor: args.load_factor,
        };

        let start = Instant::now();
        let outcome = run(container, &mut workload)?;
        let elapsed = start.elapsed();

        match outcome.table_len {
            Some(table_len) => log::info!(
                "{container:?}: {} ops in {elapsed:.2?}, {} live entries in {table_len} slots \
                 (checksum {:#x})",
                args.ops,
                outcome.len,
                outcome.checksum,
            ),
            None => log::info!(
                "{container:?}: {} ops in {elapsed:.2?}, {} live items (checksum {:#x})",
                args.ops,
                outcome.len,
                outcome.checksum,
            ),
        }
    }

    Ok(())
}
