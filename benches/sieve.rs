use criterion::{criterion_group, criterion_main, Criterion};
use primer::{BitArray, PrimeSieve};
use std::hint::black_box;

fn bench_run_sieve(c: &mut Criterion) {
    for limit in [10_000i64, 1_000_000, 10_000_000] {
        c.bench_function(&format!("{}/fn=run_sieve limit={limit}", module_path!()), |b| {
            b.iter(|| {
                let mut sieve = PrimeSieve::new(black_box(limit)).unwrap();
                sieve.run_sieve().unwrap();
                black_box(sieve)
            });
        });
    }
}

fn bench_clear_rotating(c: &mut Criterion) {
    let size = 1 << 20;
    for stride in [3usize, 31, 32, 1_009] {
        c.bench_function(
            &format!("{}/fn=clear_rotating size={size} stride={stride}", module_path!()),
            |b| {
                b.iter(|| {
                    let mut bits = BitArray::new(size).unwrap();
                    bits.clear_rotating(black_box(stride), black_box(stride)).unwrap();
                    black_box(bits)
                });
            },
        );
    }
}

fn bench_count(c: &mut Criterion) {
    let mut sieve = PrimeSieve::new(10_000_000).unwrap();
    sieve.run_sieve().unwrap();
    c.bench_function(&format!("{}/fn=count_primes limit=10000000", module_path!()), |b| {
        b.iter(|| black_box(&sieve).count_primes().unwrap());
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_run_sieve, bench_clear_rotating, bench_count,
}
criterion_main!(benches);
