use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use flatrb::{FlatMap, FlatSet, HashFlatMap, HashFlatSet};
use std::collections::{BTreeMap, BTreeSet};

const N: usize = 10_000;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

// ─── Map insert benchmarks ──────────────────────────────────────────────────

fn bench_map_insert(c: &mut Criterion, group_name: &str, keys: &[i64]) {
    let mut group = c.benchmark_group(group_name);

    group.bench_function(BenchmarkId::new("FlatMap", N), |b| {
        b.iter(|| {
            let mut map = FlatMap::new();
            for &k in keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("HashFlatMap", N), |b| {
        b.iter(|| {
            let mut map: HashFlatMap<i64, i64> = HashFlatMap::with_capacity(N);
            for &k in keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.finish();
}

fn bench_map_insert_ordered(c: &mut Criterion) {
    bench_map_insert(c, "map_insert_ordered", &ordered_keys(N));
}

fn bench_map_insert_reverse(c: &mut Criterion) {
    let mut keys = ordered_keys(N);
    keys.reverse();
    bench_map_insert(c, "map_insert_reverse", &keys);
}

fn bench_map_insert_random(c: &mut Criterion) {
    bench_map_insert(c, "map_insert_random", &random_keys(N));
}

// ─── Map lookup benchmarks ──────────────────────────────────────────────────

fn bench_map_get(c: &mut Criterion, group_name: &str, keys: &[i64]) {
    let flat_map: FlatMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let hash_map: HashFlatMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group(group_name);

    group.bench_function(BenchmarkId::new("FlatMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for &k in keys {
                if let Some(&v) = flat_map.get(&k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("HashFlatMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for &k in keys {
                if let Some(&v) = hash_map.get(&k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for &k in keys {
                if let Some(&v) = bt_map.get(&k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.finish();
}

fn bench_map_get_ordered(c: &mut Criterion) {
    bench_map_get(c, "map_get_ordered", &ordered_keys(N));
}

fn bench_map_get_random(c: &mut Criterion) {
    bench_map_get(c, "map_get_random", &random_keys(N));
}

// ─── Map remove benchmarks ──────────────────────────────────────────────────

fn bench_map_remove(c: &mut Criterion, group_name: &str, keys: &[i64]) {
    let mut group = c.benchmark_group(group_name);

    group.bench_function(BenchmarkId::new("FlatMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<FlatMap<i64, i64>>(),
            |mut map| {
                for &k in keys {
                    map.remove(&k);
                }
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("HashFlatMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<HashFlatMap<i64, i64>>(),
            |mut map| {
                for &k in keys {
                    map.remove(&k);
                }
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<BTreeMap<i64, i64>>(),
            |mut map| {
                for &k in keys {
                    map.remove(&k);
                }
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_map_remove_ordered(c: &mut Criterion) {
    bench_map_remove(c, "map_remove_ordered", &ordered_keys(N));
}

fn bench_map_remove_random(c: &mut Criterion) {
    bench_map_remove(c, "map_remove_random", &random_keys(N));
}

// ─── Map iteration benchmarks ───────────────────────────────────────────────

fn bench_map_iterate(c: &mut Criterion) {
    let keys = random_keys(N);
    let flat_map: FlatMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let hash_map: HashFlatMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("map_iterate");

    group.bench_function(BenchmarkId::new("FlatMap", N), |b| {
        b.iter(|| flat_map.values().fold(0i64, |acc, &v| acc.wrapping_add(v)));
    });

    group.bench_function(BenchmarkId::new("HashFlatMap", N), |b| {
        b.iter(|| hash_map.values().fold(0i64, |acc, &v| acc.wrapping_add(v)));
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| bt_map.values().fold(0i64, |acc, &v| acc.wrapping_add(v)));
    });

    group.finish();
}

// ─── Set benchmarks ─────────────────────────────────────────────────────────

fn bench_set_insert_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("set_insert_random");

    group.bench_function(BenchmarkId::new("FlatSet", N), |b| {
        b.iter(|| {
            let mut set = FlatSet::new();
            for &k in &keys {
                set.insert(k);
            }
            set
        });
    });

    group.bench_function(BenchmarkId::new("HashFlatSet", N), |b| {
        b.iter(|| {
            let mut set: HashFlatSet<i64> = HashFlatSet::with_capacity(N);
            for &k in &keys {
                set.insert(k);
            }
            set
        });
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter(|| {
            let mut set = BTreeSet::new();
            for &k in &keys {
                set.insert(k);
            }
            set
        });
    });

    group.finish();
}

fn bench_set_contains_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let flat_set: FlatSet<i64> = keys.iter().copied().collect();
    let hash_set: HashFlatSet<i64> = keys.iter().copied().collect();
    let bt_set: BTreeSet<i64> = keys.iter().copied().collect();

    let mut group = c.benchmark_group("set_contains_random");

    group.bench_function(BenchmarkId::new("FlatSet", N), |b| {
        b.iter(|| {
            let mut count = 0usize;
            for &k in &keys {
                if flat_set.contains(&k) {
                    count += 1;
                }
            }
            count
        });
    });

    group.bench_function(BenchmarkId::new("HashFlatSet", N), |b| {
        b.iter(|| {
            let mut count = 0usize;
            for &k in &keys {
                if hash_set.contains(&k) {
                    count += 1;
                }
            }
            count
        });
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter(|| {
            let mut count = 0usize;
            for &k in &keys {
                if bt_set.contains(&k) {
                    count += 1;
                }
            }
            count
        });
    });

    group.finish();
}

fn bench_set_pop_first(c: &mut Criterion) {
    let keys = random_keys(N);

    let mut group = c.benchmark_group("set_pop_first");

    group.bench_function(BenchmarkId::new("FlatSet", N), |b| {
        b.iter_batched(
            || keys.iter().copied().collect::<FlatSet<i64>>(),
            |mut set| {
                while set.pop_first().is_some() {}
                set
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("HashFlatSet", N), |b| {
        b.iter_batched(
            || keys.iter().copied().collect::<HashFlatSet<i64>>(),
            |mut set| {
                while set.pop_first().is_some() {}
                set
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter_batched(
            || keys.iter().copied().collect::<BTreeSet<i64>>(),
            |mut set| {
                while set.pop_first().is_some() {}
                set
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ─── Criterion Groups ───────────────────────────────────────────────────────

criterion_group!(map_insert_benches, bench_map_insert_ordered, bench_map_insert_reverse, bench_map_insert_random,);

criterion_group!(map_get_benches, bench_map_get_ordered, bench_map_get_random,);

criterion_group!(map_remove_benches, bench_map_remove_ordered, bench_map_remove_random,);

criterion_group!(map_iterate_benches, bench_map_iterate,);

criterion_group!(set_benches, bench_set_insert_random, bench_set_contains_random, bench_set_pop_first,);

criterion_main!(map_insert_benches, map_get_benches, map_remove_benches, map_iterate_benches, set_benches,);
