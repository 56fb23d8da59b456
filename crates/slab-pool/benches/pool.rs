// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use criterion::{criterion_group, criterion_main, Criterion};
use slab_pool::Pool;

// target: < 50 ns, steady state allocation from an already-warmed size class.
fn get_put_warm(c: &mut Criterion) {
    let mut pool = Pool::new(1 << 16, 64, 4096, 1.5).unwrap();
    // warm up one slab so the benchmark measures free-list reuse, not
    // first-touch slab creation.
    let warm = pool.get(128).unwrap();
    pool.put(warm).unwrap();

    c.bench_function("pool_get_put_warm_128", |b| {
        b.iter(|| {
            let chunk = pool.get(128).unwrap();
            pool.put(chunk).unwrap();
        })
    });
}

// target: < 200 ns, includes first-touch slab creation and free-list init.
fn get_cold_new_slab(c: &mut Criterion) {
    c.bench_function("pool_get_cold_new_slab", |b| {
        b.iter_batched(
            || Pool::new(1 << 16, 64, 4096, 1.5).unwrap(),
            |mut pool| pool.get(128).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, get_put_warm, get_cold_new_slab);
criterion_main!(benches);
