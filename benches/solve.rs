//! Peeling and solving throughput.
//!
//! - `peel`: hypergraph construction and peeling only, below and above the
//!   peeling threshold.
//! - `gf2` / `gf3`: one full `generate_and_solve` attempt.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use linear3::{Gf2, Gf3, Linear3Solver, XorGraph};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::hint::black_box;

const PEEL_SIZES: [u32; 3] = [10_000, 100_000, 1_000_000];
// Residual rows are dense: solving is meant for chunks of keys.
const SOLVE_SIZES: [u32; 3] = [1_000, 4_000, 16_000];

fn random_keys(n: usize) -> Vec<[u64; 3]> {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    (0..n)
        .map(|_| [rng.next_u64(), rng.next_u64(), rng.next_u64()])
        .collect()
}

fn bench_peel(c: &mut Criterion) {
    let mut group = c.benchmark_group("peel");
    for &m in &PEEL_SIZES {
        let keys = random_keys(m as usize);
        group.throughput(Throughput::Elements(u64::from(m)));
        // 1.23 peels completely, 1.10 leaves a core.
        for (label, ratio) in [("1.23", 1.23), ("1.10", 1.10)] {
            let n = (f64::from(m) * ratio) as u32;
            let mut g = XorGraph::new(n, m);
            group.bench_with_input(BenchmarkId::new(label, m), &keys, |b, keys| {
                b.iter(|| {
                    g.reset();
                    g.build(keys, 1).unwrap();
                    black_box(g.peel())
                });
            });
        }
    }
    group.finish();
}

fn bench_gf2(c: &mut Criterion) {
    let mut group = c.benchmark_group("gf2");
    group.sample_size(20);
    for &m in &SOLVE_SIZES {
        let keys = random_keys(m as usize);
        let values: Vec<u64> = keys.iter().map(|k| k[0]).collect();
        let mut solver = Linear3Solver::<Gf2>::new((f64::from(m) * 1.12) as u32, m);
        group.throughput(Throughput::Elements(u64::from(m)));
        group.bench_with_input(BenchmarkId::from_parameter(m), &keys, |b, keys| {
            b.iter(|| black_box(solver.generate_and_solve(keys, 1, &values)));
        });
    }
    group.finish();
}

fn bench_gf3(c: &mut Criterion) {
    let mut group = c.benchmark_group("gf3");
    group.sample_size(20);
    for &m in &SOLVE_SIZES {
        let keys = random_keys(m as usize);
        let mut solver = Linear3Solver::<Gf3>::new((f64::from(m) * 1.12) as u32, m);
        group.throughput(Throughput::Elements(u64::from(m)));
        group.bench_with_input(BenchmarkId::from_parameter(m), &keys, |b, keys| {
            b.iter(|| black_box(solver.generate_and_solve(keys, 1)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_peel, bench_gf2, bench_gf3);
criterion_main!(benches);
