//! Criterion benchmarks for bitmap construction, reads, and Boolean ops.
//!
//! Run with:
//!   cargo bench --bench ops
//!
//! Two shapes are exercised: a sparse random-stride bitmap (runs dominate)
//! and a dense one (literals dominate). Throughput is reported in bits of
//! the uncompressed vector.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ewah::Ewah;

/// Deterministic xorshift64 stream for reproducible shapes.
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }
}

fn walk(seed: u64, count: usize, max_stride: u64) -> Vec<u64> {
    let mut rng = Rng(seed);
    let mut bit = 0u64;
    (0..count)
        .map(|_| {
            bit += 1 + rng.next() % max_stride;
            bit
        })
        .collect()
}

fn build(bits: &[u64]) -> Ewah {
    let mut bm = Ewah::new();
    for &b in bits {
        bm.set(b).unwrap();
    }
    bm
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");

    for &(name, stride) in &[("sparse", 5_000u64), ("dense", 8)] {
        let bits = walk(0xcc9e_2d51, 10_000, stride);
        let total_bits = bits.last().copied().unwrap_or(0) + 1;
        group.throughput(Throughput::Elements(bits.len() as u64));
        group.bench_with_input(BenchmarkId::new("set", name), &bits, |b, bits| {
            b.iter(|| {
                let mut bm = Ewah::new();
                for &i in bits {
                    bm.set(i).unwrap();
                }
                bm
            })
        });
        let bm = build(&bits);
        group.throughput(Throughput::Elements(total_bits));
        group.bench_with_input(BenchmarkId::new("get_ascending", name), &bm, |b, bm| {
            b.iter(|| {
                let mut ones = 0u64;
                for i in (0..bm.size_in_bits()).step_by(64) {
                    ones += u64::from(bm.get(i));
                }
                ones
            })
        });
        group.bench_with_input(BenchmarkId::new("cardinality", name), &bm, |b, bm| {
            b.iter(|| bm.cardinality())
        });
    }
    group.finish();
}

fn bench_boolean_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("boolean_ops");

    for &(name, stride) in &[("sparse", 5_000u64), ("dense", 8)] {
        let a = build(&walk(0xcc9e_2d51, 10_000, stride));
        let b = build(&walk(0x5bd1_e995, 10_000, stride));
        let bits = a.size_in_bits().max(b.size_in_bits());
        group.throughput(Throughput::Elements(bits));

        group.bench_with_input(BenchmarkId::new("and", name), &(&a, &b), |bench, (a, b)| {
            bench.iter(|| a.and(b))
        });
        group.bench_with_input(BenchmarkId::new("or", name), &(&a, &b), |bench, (a, b)| {
            bench.iter(|| a.or(b))
        });
        group.bench_with_input(BenchmarkId::new("xor", name), &(&a, &b), |bench, (a, b)| {
            bench.iter(|| a.xor(b))
        });
        group.bench_with_input(
            BenchmarkId::new("and_not", name),
            &(&a, &b),
            |bench, (a, b)| bench.iter(|| a.and_not(b)),
        );

        // Counter sink: same kernels, no output allocation.
        group.bench_with_input(
            BenchmarkId::new("and_cardinality", name),
            &(&a, &b),
            |bench, (a, b)| bench.iter(|| a.and_cardinality(b)),
        );
        group.bench_with_input(
            BenchmarkId::new("or_cardinality", name),
            &(&a, &b),
            |bench, (a, b)| bench.iter(|| a.or_cardinality(b)),
        );
    }
    group.finish();
}

fn bench_not(c: &mut Criterion) {
    let mut group = c.benchmark_group("not");
    let bm = build(&walk(0xcc9e_2d51, 10_000, 64));
    group.throughput(Throughput::Elements(bm.size_in_bits()));
    group.bench_with_input(BenchmarkId::new("not", "mixed"), &bm, |bench, bm| {
        bench.iter(|| {
            let mut c = bm.clone();
            c.not();
            c
        })
    });
    group.finish();
}

criterion_group!(benches, bench_construction, bench_boolean_ops, bench_not);
criterion_main!(benches);
