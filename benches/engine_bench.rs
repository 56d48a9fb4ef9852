use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use kvsrv::{KvStore, KvsEngine};
use rand::distributions::Alphanumeric;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const KEYS: usize = 100;

fn random_keys(rng: &mut SmallRng) -> Vec<String> {
    (0..KEYS)
        .map(|_| {
            let len = rng.gen_range(1..=32);
            (&mut *rng).sample_iter(&Alphanumeric).take(len).map(char::from).collect()
        })
        .collect()
}

/// compares appends that are applied with retransmitted appends that are skipped
fn append_bench(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(1);
    let keys = random_keys(&mut rng);

    let mut group = c.benchmark_group("append");
    group.bench_function("fresh", |b| {
        b.iter_batched(
            KvStore::new,
            |store| {
                for (op_id, key) in keys.iter().enumerate() {
                    black_box(store.append("client", op_id as u64 + 1, key, "value"));
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.bench_function("duplicate", |b| {
        b.iter_batched(
            || {
                let store = KvStore::new();
                store.append("client", 1, &keys[0], "value");
                store
            },
            |store| {
                for key in keys.iter() {
                    black_box(store.append("client", 1, key, "value"));
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn get_bench(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(2);
    let keys = random_keys(&mut rng);
    let store = KvStore::new();
    for (op_id, key) in keys.iter().enumerate() {
        store.put("writer", op_id as u64 + 1, key, "value");
    }

    c.bench_function("get", |b| {
        let mut op_id = 0_u64;
        b.iter(|| {
            for key in keys.iter() {
                op_id += 1;
                black_box(store.get("reader", op_id, key));
            }
        })
    });
}

criterion_group!(benches, append_bench, get_bench);
criterion_main!(benches);
