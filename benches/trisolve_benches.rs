use RustedKernels::backend::{KernelConfig, Launcher};
use RustedKernels::sparse::{CompressedMatrix, TriangularTag, inplace_solve, inplace_solve_trans};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

/// banded lower triangular matrix with `band` sub-diagonals and a dominant diagonal
fn banded_lower(n: usize, band: usize, rng: &mut StdRng) -> CompressedMatrix<f64> {
    let mut triplets = Vec::with_capacity(n * (band + 1));
    for i in 0..n {
        triplets.push((i, i, 2.0 + rng.random_range(0.0..1.0)));
        for j in i.saturating_sub(band)..i {
            triplets.push((i, j, rng.random_range(-1.0..1.0) / band as f64));
        }
    }
    CompressedMatrix::from_triplets(n, &triplets).unwrap()
}

fn bench_forward(c: &mut Criterion) {
    let launcher = Launcher::new(KernelConfig::default()).unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    let mut group = c.benchmark_group("csr_lu_forward");
    for n in [1_000usize, 10_000] {
        let lower = banded_lower(n, 8, &mut rng);
        let b: Vec<f64> = (0..n).map(|i| (i % 13) as f64).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, _| {
            bench.iter(|| {
                let mut x = b.clone();
                inplace_solve(&launcher, &lower, &mut x, TriangularTag::Lower).unwrap();
                black_box(x)
            })
        });
    }
    group.finish();
}

fn bench_trans_forward(c: &mut Criterion) {
    let launcher = Launcher::new(KernelConfig::default()).unwrap();
    let mut rng = StdRng::seed_from_u64(43);
    let mut group = c.benchmark_group("csr_trans_lu_forward");
    for n in [1_000usize, 10_000] {
        let upper = banded_lower(n, 8, &mut rng).transpose();
        let b: Vec<f64> = (0..n).map(|i| (i % 13) as f64).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, _| {
            bench.iter(|| {
                let mut x = b.clone();
                inplace_solve_trans(&launcher, &upper, &mut x, TriangularTag::Lower).unwrap();
                black_box(x)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_forward, bench_trans_forward);
criterion_main!(benches);
