use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use change_kit::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn counting_subscriber<A: ChangeAdapter>(adapter: &A) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&count);
    adapter.subscribe(move |_| {
        sink.fetch_add(1, Ordering::Relaxed);
    });
    count
}

fn bench_single_update(c: &mut Criterion) {
    c.bench_function("SingleAdapter::update x1000", |b| {
        b.iter(|| {
            let mut value = SingleAdapter::new(0u64);
            let count = counting_subscriber(&value);
            for i in 0..1000 {
                value.update(i);
            }
            black_box(count.load(Ordering::Relaxed))
        })
    });
}

fn bench_list_add(c: &mut Criterion) {
    c.bench_function("ListAdapter::add x100", |b| {
        b.iter(|| {
            let mut list: ListAdapter<u32> = ListAdapter::new();
            let count = counting_subscriber(&list);
            for i in 0..100u32 {
                list.add(i);
            }
            black_box(count.load(Ordering::Relaxed))
        })
    });

    // Snapshot cost grows with the list.
    c.bench_function("ListAdapter::add into 10k list", |b| {
        b.iter(|| {
            let mut list = ListAdapter::from_items(0..10_000u32);
            let count = counting_subscriber(&list);
            list.add(black_box(42));
            black_box(count.load(Ordering::Relaxed))
        })
    });
}

fn bench_set_random_ops(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let ops: Vec<(bool, u32)> = (0..1000)
        .map(|_| (rng.gen_bool(0.5), rng.gen_range(0..200)))
        .collect();

    c.bench_function("SetAdapter random add/remove x1000", |b| {
        b.iter(|| {
            let mut set: SetAdapter<u32> = SetAdapter::new();
            let count = counting_subscriber(&set);
            for &(insert, x) in &ops {
                if insert {
                    set.add(x);
                } else {
                    set.remove(&x);
                }
            }
            black_box(count.load(Ordering::Relaxed))
        })
    });
}

fn bench_map(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(11);
    let keys: Vec<u32> = (0..1000).map(|_| rng.gen_range(0..500)).collect();

    c.bench_function("MapAdapter random add x1000", |b| {
        b.iter(|| {
            let map: MapAdapter<u32, u32> = MapAdapter::new();
            let count = counting_subscriber(&map);
            for &k in &keys {
                map.add(k, k);
            }
            black_box(count.load(Ordering::Relaxed))
        })
    });

    let batch: Vec<(u32, u32)> = (0..100).map(|k| (k, k)).collect();
    c.bench_function("MapAdapter::add_all 100 entries", |b| {
        b.iter(|| {
            let map: MapAdapter<u32, u32> = MapAdapter::new();
            map.add_all(batch.iter().copied());
            black_box(map.len())
        })
    });
}

fn bench_filtered_fanout(c: &mut Criterion) {
    c.bench_function("ListAdapter 10 filtered subscribers x100", |b| {
        b.iter(|| {
            let mut list: ListAdapter<u32> = ListAdapter::new();
            let hits = Arc::new(AtomicUsize::new(0));
            for i in 0..10 {
                let sink = Arc::clone(&hits);
                let filter = if i % 2 == 0 {
                    by_change_type(ChangeType::Add)
                } else {
                    by_change_type(ChangeType::Remove)
                };
                list.subscribe_filtered(filter, move |_| {
                    sink.fetch_add(1, Ordering::Relaxed);
                });
            }
            for i in 0..100 {
                list.add(i);
            }
            black_box(hits.load(Ordering::Relaxed))
        })
    });
}

criterion_group!(
    benches,
    bench_single_update,
    bench_list_add,
    bench_set_random_ops,
    bench_map,
    bench_filtered_fanout,
);
criterion_main!(benches);
