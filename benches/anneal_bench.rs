//! Criterion benchmarks for u-anneal.
//!
//! Uses the Sphere function to measure pure annealing overhead
//! independent of any domain.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_anneal::sa::{CandidateGeneration, Direction, SaConfig, SaRunner};

fn sphere(x: &[f64]) -> f64 {
    x.iter().map(|v| v * v).sum()
}

fn base_config() -> SaConfig {
    SaConfig::default()
        .with_seed(42)
        .with_direction(Direction::Minimize)
        .with_initial_temperature(10.0)
        .with_step_length_factor(0.1)
        .with_convergence_relative_tolerance(0.0)
}

fn bench_isotropic_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("isotropic_sphere");
    group.sample_size(10);

    for &dim in &[10usize, 50, 100] {
        let config = base_config()
            .with_cooling_factor(0.999)
            .with_num_cost_samples(100)
            .with_max_cooling_iterations(5_000);
        let guess = vec![1.0; dim];
        group.bench_with_input(
            BenchmarkId::from_parameter(dim),
            &(config, guess),
            |b, (c, g)| {
                b.iter(|| {
                    let result = SaRunner::run(sphere, black_box(c), black_box(g.clone()));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

fn bench_adaptive_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("adaptive_sphere");
    group.sample_size(10);

    for &dim in &[5usize, 10, 20] {
        // enough samples per level for a full-rank covariance
        let config = base_config()
            .with_cooling_factor(0.9)
            .with_num_cost_samples(10 * dim)
            .with_max_cooling_iterations(20)
            .with_generation(CandidateGeneration::adaptive());
        let guess = vec![1.0; dim];
        group.bench_with_input(
            BenchmarkId::from_parameter(dim),
            &(config, guess),
            |b, (c, g)| {
                b.iter(|| {
                    // may stop early on an empty or degenerate level
                    let result = SaRunner::run(sphere, black_box(c), black_box(g.clone()));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_isotropic_sphere, bench_adaptive_sphere);
criterion_main!(benches);
